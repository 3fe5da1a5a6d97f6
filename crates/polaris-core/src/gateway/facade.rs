//! Orchestration core: builds typed transactions from artifacts and inputs,
//! drives the codec, records every request in the ledger, submits through the
//! gateway client and optionally polls to acceptance.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use starknet_types_core::felt::Felt;

use crate::artifacts::{CompiledContract, ContractAbi};
use crate::codec;
use crate::constants::{
    CONSTRUCTOR_ENTRY, DECLARE_MAX_FEE, DECLARE_NONCE, DECLARE_SENDER_ADDRESS, MAX_POLL_ATTEMPTS,
    POLL_INTERVAL_MS, TRANSACTION_VERSION,
};
use crate::errors::{ClientError, GatewayError, GatewayResult};
use crate::gateway::client::{GatewayClient, SubmitReceipt, TxStatus};
use crate::gateway::ledger::{Payload, RequestAction, RequestLedger, RequestRecord};
use crate::gateway::{
    CallResponse, DeclareResponse, DeployResponse, FeePolicy, InvokeResponse, Transaction,
    TransactionSigner,
};
use crate::typing::{CallInput, Value};

pub struct GatewayFacade {
    project_root: PathBuf,
    client: Box<dyn GatewayClient>,
    ledger: RequestLedger,
}

impl GatewayFacade {
    pub fn new(project_root: PathBuf, client: Box<dyn GatewayClient>) -> Self {
        GatewayFacade { project_root, client, ledger: RequestLedger::new() }
    }

    pub fn network(&self) -> &str {
        self.client.network()
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Ordered history of every request this facade issued.
    pub fn requests(&self) -> Vec<RequestRecord> {
        self.ledger.snapshot()
    }

    /// Builds and submits a deploy transaction for a compiled artifact.
    ///
    /// `salt` is a `0x`-prefixed hex string; absent, a random salt is drawn.
    pub fn deploy(
        &mut self,
        compiled_contract_path: &Path,
        inputs: Option<&CallInput>,
        token: Option<&str>,
        salt: Option<&str>,
        wait_for_acceptance: bool,
    ) -> GatewayResult<DeployResponse> {
        let path = self.project_root.join(compiled_contract_path);
        let salt = resolve_salt(salt)?;

        let mut payload = Payload::new();
        payload.insert("contract".to_string(), Value::string(path.display().to_string()));
        payload.insert("network".to_string(), Value::string(self.client.network().to_string()));
        payload.insert(
            "constructor_args".to_string(),
            inputs.map(CallInput::to_value).unwrap_or_else(|| Value::array(vec![])),
        );
        payload.insert("salt".to_string(), Value::string(salt.to_hex_string()));
        if let Some(token) = token {
            payload.insert("token".to_string(), Value::string(token));
        }
        let open = self.ledger.begin(RequestAction::Deploy, payload);

        let contract = CompiledContract::from_path(&path)?;
        let constructor_calldata = constructor_calldata(&contract.abi, inputs)?;
        let transaction = Transaction::Deploy { contract, salt, constructor_calldata };
        let receipt = self.submit_transaction(&transaction, token)?;

        let mut response = Payload::new();
        response.insert("code".to_string(), Value::string(receipt.code.clone()));
        response.insert("transaction_hash".to_string(), Value::felt(receipt.transaction_hash));
        if let Some(address) = receipt.contract_address {
            response.insert("address".to_string(), Value::felt(address));
        }
        self.ledger.complete(open, response);

        let address = receipt.contract_address.ok_or_else(|| {
            GatewayError::TransactionSubmission(
                "deploy receipt did not include a contract address".to_string(),
            )
        })?;
        let mut code = receipt.code;
        if wait_for_acceptance {
            code = self.wait_for_acceptance(receipt.transaction_hash)?.code().to_string();
        }
        Ok(DeployResponse { code, address, transaction_hash: receipt.transaction_hash })
    }

    /// Submits a declare transaction for a compiled artifact. Sender, fee and
    /// nonce are the sentinel values from `constants`; an absent signer
    /// yields an unsigned declare.
    pub fn declare(
        &mut self,
        compiled_contract_path: &Path,
        signer: Option<&dyn TransactionSigner>,
        token: Option<&str>,
        wait_for_acceptance: bool,
    ) -> GatewayResult<DeclareResponse> {
        let path = self.project_root.join(compiled_contract_path);

        let mut payload = Payload::new();
        payload.insert("contract".to_string(), Value::string(path.display().to_string()));
        payload.insert(
            "sender_address".to_string(),
            Value::string(DECLARE_SENDER_ADDRESS.to_hex_string()),
        );
        payload.insert("max_fee".to_string(), Value::Integer(DECLARE_MAX_FEE as i128));
        payload.insert("version".to_string(), Value::from(TRANSACTION_VERSION));
        payload.insert("nonce".to_string(), Value::from(DECLARE_NONCE));
        let open = self.ledger.begin(RequestAction::Declare, payload);

        let contract = CompiledContract::from_path(&path)?;
        let build = |signature: Vec<Felt>| Transaction::Declare {
            contract: contract.clone(),
            sender_address: DECLARE_SENDER_ADDRESS,
            max_fee: DECLARE_MAX_FEE,
            nonce: DECLARE_NONCE,
            version: TRANSACTION_VERSION,
            signature,
        };
        let unsigned = build(vec![]);
        let signature = match signer {
            Some(signer) => signer.sign(&unsigned)?,
            None => vec![],
        };
        let transaction = build(signature);
        let receipt = self.submit_transaction(&transaction, token)?;

        let mut response = Payload::new();
        response.insert("code".to_string(), Value::string(receipt.code.clone()));
        response.insert("transaction_hash".to_string(), Value::felt(receipt.transaction_hash));
        if let Some(class_hash) = receipt.class_hash {
            response.insert("class_hash".to_string(), Value::felt(class_hash));
        }
        self.ledger.complete(open, response);

        let class_hash = receipt.class_hash.ok_or_else(|| {
            GatewayError::TransactionSubmission(
                "declare receipt did not include a class hash".to_string(),
            )
        })?;
        let mut code = receipt.code;
        if wait_for_acceptance {
            code = self.wait_for_acceptance(receipt.transaction_hash)?.code().to_string();
        }
        Ok(DeclareResponse { code, class_hash, transaction_hash: receipt.transaction_hash })
    }

    /// Builds, signs and submits an invoke transaction against a live
    /// contract, resolving the target function from its on-chain ABI.
    pub fn invoke(
        &mut self,
        contract_address: Felt,
        function_name: &str,
        account_address: Felt,
        signer: &dyn TransactionSigner,
        inputs: Option<&CallInput>,
        fee: FeePolicy,
        wait_for_acceptance: bool,
    ) -> GatewayResult<InvokeResponse> {
        fee.validate()?;
        let (max_fee, auto_estimate_fee) = fee.payload_fields();

        let mut payload = Payload::new();
        payload.insert("contract_address".to_string(), Value::felt(contract_address));
        payload.insert("function_name".to_string(), Value::string(function_name));
        payload.insert("max_fee".to_string(), max_fee);
        payload.insert("auto_estimate_fee".to_string(), auto_estimate_fee);
        payload.insert(
            "inputs".to_string(),
            inputs.map(CallInput::to_value).unwrap_or_else(|| Value::array(vec![])),
        );
        payload.insert("account_address".to_string(), Value::felt(account_address));
        let open = self.ledger.begin(RequestAction::Invoke, payload);

        let abi = self.contract_abi(contract_address)?;
        if abi.function(function_name).is_none() {
            return Err(GatewayError::UnknownFunction(function_name.to_string()));
        }
        let calldata = encode_inputs(&abi, function_name, inputs)?;
        let build = |signature: Vec<Felt>| Transaction::Invoke {
            contract_address,
            entry_point: function_name.to_string(),
            calldata: calldata.clone(),
            fee,
            signature,
        };
        let unsigned = build(vec![]);
        let signature = signer.sign(&unsigned)?;
        let transaction = build(signature);
        let receipt = self.submit_transaction(&transaction, None)?;

        let mut response = Payload::new();
        response.insert("code".to_string(), Value::string(receipt.code.clone()));
        response.insert("transaction_hash".to_string(), Value::felt(receipt.transaction_hash));
        self.ledger.complete(open, response);

        let mut code = receipt.code;
        if wait_for_acceptance {
            code = self.wait_for_acceptance(receipt.transaction_hash)?.code().to_string();
        }
        Ok(InvokeResponse { code, transaction_hash: receipt.transaction_hash })
    }

    /// Read-only entry-point call. No transaction is created; the ledger
    /// still gets one paired request/response record.
    pub fn call(
        &mut self,
        contract_address: Felt,
        function_name: &str,
        inputs: Option<&CallInput>,
    ) -> GatewayResult<CallResponse> {
        let mut payload = Payload::new();
        payload.insert("contract_address".to_string(), Value::felt(contract_address));
        payload.insert("function_name".to_string(), Value::string(function_name));
        payload.insert(
            "inputs".to_string(),
            inputs.map(CallInput::to_value).unwrap_or_else(|| Value::array(vec![])),
        );
        let open = self.ledger.begin(RequestAction::Call, payload);

        let abi = self.contract_abi(contract_address)?;
        if abi.function(function_name).is_none() {
            return Err(GatewayError::UnknownFunction(function_name.to_string()));
        }
        let calldata = encode_inputs(&abi, function_name, inputs)?;
        let raw = self
            .client
            .call(contract_address, function_name, &calldata)
            .map_err(|e| GatewayError::TransactionSubmission(e.to_string()))?;
        let outputs = codec::decode_outputs(&abi, function_name, &raw)
            .map_err(codec::report_to_gateway_error)?;

        let mut response = Payload::new();
        response.insert(
            "result".to_string(),
            Value::Array(raw.iter().copied().map(Value::Felt).collect()),
        );
        self.ledger.complete(open, response);

        Ok(CallResponse { raw, outputs })
    }

    fn submit_transaction(
        &self,
        transaction: &Transaction,
        token: Option<&str>,
    ) -> GatewayResult<SubmitReceipt> {
        self.client
            .submit(transaction, token)
            .map_err(|e| GatewayError::TransactionSubmission(e.to_string()))
    }

    fn contract_abi(&self, contract_address: Felt) -> GatewayResult<ContractAbi> {
        self.client.fetch_abi(contract_address).map_err(|e| match e {
            ClientError::ContractNotFound(address) => GatewayError::ContractNotFound(address),
            other => GatewayError::TransactionSubmission(other.to_string()),
        })
    }

    /// Blocks the calling flow until the transaction reaches a terminal
    /// status, bounded by the polling cap. Rejection and timeout surface as
    /// submission failures.
    fn wait_for_acceptance(&self, transaction_hash: Felt) -> GatewayResult<TxStatus> {
        tracing::info!("Waiting for acceptance...");
        for attempt in 0..MAX_POLL_ATTEMPTS {
            let status = self
                .client
                .poll(transaction_hash)
                .map_err(|e| GatewayError::TransactionSubmission(e.to_string()))?;
            if status == TxStatus::Rejected {
                return Err(GatewayError::TransactionSubmission(format!(
                    "transaction {} was rejected",
                    transaction_hash.to_hex_string()
                )));
            }
            if status.is_accepted() {
                return Ok(status);
            }
            if attempt + 1 < MAX_POLL_ATTEMPTS {
                thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
            }
        }
        Err(GatewayError::TransactionSubmission(format!(
            "timed out waiting for acceptance of transaction {}",
            transaction_hash.to_hex_string()
        )))
    }
}

/// Encodes constructor inputs for an artifact. A contract without a
/// constructor accepts no inputs.
pub(crate) fn constructor_calldata(
    abi: &ContractAbi,
    inputs: Option<&CallInput>,
) -> GatewayResult<Vec<Felt>> {
    match abi.constructor() {
        None => {
            if inputs.map(|input| !input.is_empty()).unwrap_or(false) {
                return Err(GatewayError::InputValidation(
                    "Inputs provided to a contract with no constructor.".to_string(),
                ));
            }
            Ok(vec![])
        }
        Some(_) => encode_inputs(abi, CONSTRUCTOR_ENTRY, inputs),
    }
}

fn encode_inputs(
    abi: &ContractAbi,
    entry_name: &str,
    inputs: Option<&CallInput>,
) -> GatewayResult<Vec<Felt>> {
    let empty = CallInput::Named(Default::default());
    let input = inputs.unwrap_or(&empty);
    codec::encode(abi, entry_name, input).map_err(codec::report_to_gateway_error)
}

fn resolve_salt(salt: Option<&str>) -> GatewayResult<Felt> {
    match salt {
        None => Ok(Felt::from(rand::random::<u128>())),
        Some(given) => {
            if !given.starts_with("0x") {
                return Err(GatewayError::InputValidation(format!(
                    "salt must be a hex string prefixed with `0x`, got `{given}`"
                )));
            }
            Felt::from_hex(given).map_err(|e| {
                GatewayError::InputValidation(format!("invalid salt `{given}`: {e}"))
            })
        }
    }
}
