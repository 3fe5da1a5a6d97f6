pub mod client;
pub mod facade;
pub mod ledger;

use indexmap::IndexMap;
use starknet_types_core::felt::Felt;

use crate::artifacts::CompiledContract;
use crate::errors::{GatewayError, GatewayResult, SignerError};
use crate::typing::Value;

pub use client::{GatewayClient, RetryOnce, SubmitReceipt, TxStatus};
pub use facade::GatewayFacade;
pub use ledger::{OpenRequest, Payload, RequestAction, RequestLedger, RequestOutcome, RequestRecord};

/// Outbound transaction, fully built and ready for submission.
#[derive(Clone, Debug)]
pub enum Transaction {
    Deploy {
        contract: CompiledContract,
        salt: Felt,
        constructor_calldata: Vec<Felt>,
    },
    Declare {
        contract: CompiledContract,
        sender_address: Felt,
        max_fee: u128,
        nonce: u64,
        version: u64,
        signature: Vec<Felt>,
    },
    Invoke {
        contract_address: Felt,
        entry_point: String,
        calldata: Vec<Felt>,
        fee: FeePolicy,
        signature: Vec<Felt>,
    },
}

/// Fee policy of a signed transaction. The variants make "exactly one of
/// explicit max fee and auto-estimation" a type-level property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeePolicy {
    Max(u128),
    AutoEstimate,
}

impl FeePolicy {
    pub fn validate(&self) -> GatewayResult<()> {
        match self {
            FeePolicy::Max(0) => Err(GatewayError::InputValidation(
                "max_fee must be greater than 0.".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Ledger-payload fields of this policy, mirroring how the caller set it.
    pub fn payload_fields(&self) -> (Value, Value) {
        match self {
            FeePolicy::Max(fee) => (Value::Integer(*fee as i128), Value::Bool(false)),
            FeePolicy::AutoEstimate => (Value::String("auto".to_string()), Value::Bool(true)),
        }
    }
}

/// Signing capability collaborator: given a built transaction, produce a
/// signature over it.
pub trait TransactionSigner {
    fn sign(&self, transaction: &Transaction) -> Result<Vec<Felt>, SignerError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeployResponse {
    pub code: String,
    pub address: Felt,
    pub transaction_hash: Felt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeclareResponse {
    pub code: String,
    pub class_hash: Felt,
    pub transaction_hash: Felt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InvokeResponse {
    pub code: String,
    pub transaction_hash: Felt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallResponse {
    pub raw: Vec<Felt>,
    pub outputs: IndexMap<String, Value>,
}
