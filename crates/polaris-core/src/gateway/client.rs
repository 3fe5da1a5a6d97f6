use starknet_types_core::felt::Felt;

use crate::artifacts::ContractAbi;
use crate::errors::ClientError;
use crate::gateway::Transaction;

/// Lifecycle status reported by the gateway for a submitted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TxStatus {
    NotReceived,
    Received,
    Pending,
    Rejected,
    AcceptedOnL2,
    AcceptedOnL1,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Rejected | TxStatus::AcceptedOnL2 | TxStatus::AcceptedOnL1)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, TxStatus::AcceptedOnL2 | TxStatus::AcceptedOnL1)
    }

    pub fn code(&self) -> &'static str {
        match self {
            TxStatus::NotReceived => "NOT_RECEIVED",
            TxStatus::Received => "RECEIVED",
            TxStatus::Pending => "PENDING",
            TxStatus::Rejected => "REJECTED",
            TxStatus::AcceptedOnL2 => "ACCEPTED_ON_L2",
            TxStatus::AcceptedOnL1 => "ACCEPTED_ON_L1",
        }
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Gateway acknowledgment of a submitted transaction.
#[derive(Clone, Debug)]
pub struct SubmitReceipt {
    pub code: String,
    pub transaction_hash: Felt,
    pub contract_address: Option<Felt>,
    pub class_hash: Option<Felt>,
}

/// Narrow contract against the network-facing gateway service. This core
/// never speaks the wire protocol; everything network-shaped lives behind
/// this trait.
pub trait GatewayClient {
    /// Human-readable identifier of the network this client points at.
    fn network(&self) -> &str;

    fn submit(
        &self,
        transaction: &Transaction,
        token: Option<&str>,
    ) -> Result<SubmitReceipt, ClientError>;

    fn poll(&self, transaction_hash: Felt) -> Result<TxStatus, ClientError>;

    /// ABI of the contract deployed at `contract_address`, or
    /// `ClientError::ContractNotFound` if nothing lives there.
    fn fetch_abi(&self, contract_address: Felt) -> Result<ContractAbi, ClientError>;

    /// Read-only entry-point execution; no transaction is created.
    fn call(
        &self,
        contract_address: Felt,
        entry_point: &str,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, ClientError>;
}

/// Client decorator retrying transient network failures exactly once.
/// Bounded so backoff never masks a persistent failure.
pub struct RetryOnce<C> {
    inner: C,
}

impl<C: GatewayClient> RetryOnce<C> {
    pub fn new(inner: C) -> Self {
        RetryOnce { inner }
    }

    fn retry<T>(
        &self,
        attempt: impl Fn(&C) -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        match attempt(&self.inner) {
            Err(ClientError::Network(_)) => attempt(&self.inner),
            other => other,
        }
    }
}

impl<C: GatewayClient> GatewayClient for RetryOnce<C> {
    fn network(&self) -> &str {
        self.inner.network()
    }

    fn submit(
        &self,
        transaction: &Transaction,
        token: Option<&str>,
    ) -> Result<SubmitReceipt, ClientError> {
        self.retry(|client| client.submit(transaction, token))
    }

    fn poll(&self, transaction_hash: Felt) -> Result<TxStatus, ClientError> {
        self.retry(|client| client.poll(transaction_hash))
    }

    fn fetch_abi(&self, contract_address: Felt) -> Result<ContractAbi, ClientError> {
        self.retry(|client| client.fetch_abi(contract_address))
    }

    fn call(
        &self,
        contract_address: Felt,
        entry_point: &str,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, ClientError> {
        self.retry(|client| client.call(contract_address, entry_point, calldata))
    }
}
