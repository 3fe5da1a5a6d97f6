//! Scripted operations exposed to tests and migrations. Each cheatcode is a
//! named capability with a fixed calling convention: required positional
//! arguments, then at most one keyword-only `config` object. Validation
//! happens here, before any operation logic runs, so scripts fail with a
//! message naming what they got wrong.

mod declare;
mod deploy;
mod invoke;
mod warp;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use starknet_types_core::felt::Felt;

use crate::codec;
use crate::errors::CheatcodeError;
use crate::gateway::{GatewayFacade, InvokeResponse, RequestRecord, TransactionSigner};
use crate::typing::{CallInput, Value};

pub use declare::{DeclareConfig, DeclaredContract};
pub use deploy::{DeployConfig, DeployContractConfig, DeployedContract, PreparedContract};
pub use invoke::InvokeConfig;
pub use warp::{BlockCheats, TimestampRevert};

/// Signature contract of one cheatcode: positional parameter names (the
/// first `required` of them are mandatory) and the recognized keys of the
/// trailing `config` object.
pub struct CheatcodeSpec {
    pub name: &'static str,
    pub positional: &'static [&'static str],
    pub required: usize,
    pub config_options: &'static [&'static str],
}

lazy_static! {
    pub static ref CHEATCODE_SPECS: IndexMap<&'static str, CheatcodeSpec> = {
        let specs = [
            CheatcodeSpec {
                name: "declare",
                positional: &["contract"],
                required: 1,
                config_options: &["wait_for_acceptance"],
            },
            CheatcodeSpec {
                name: "deploy",
                positional: &["contract"],
                required: 1,
                config_options: &["inputs", "wait_for_acceptance"],
            },
            CheatcodeSpec {
                name: "invoke",
                positional: &["contract_address", "function_name", "inputs"],
                required: 3,
                config_options: &["max_fee", "auto_estimate_fee", "wait_for_acceptance"],
            },
            CheatcodeSpec {
                name: "prepare",
                positional: &["declared", "constructor_args"],
                required: 1,
                config_options: &[],
            },
            CheatcodeSpec {
                name: "deploy_contract",
                positional: &["contract", "constructor_args"],
                required: 1,
                config_options: &["wait_for_acceptance"],
            },
            CheatcodeSpec {
                name: "warp",
                positional: &["blk_timestamp", "target_contract_address"],
                required: 1,
                config_options: &[],
            },
        ];
        specs.into_iter().map(|spec| (spec.name, spec)).collect()
    };
}

/// A cheatcode invocation as a script expresses it: positional values plus an
/// optional keyword-only configuration object.
#[derive(Clone, Debug)]
pub struct CheatcodeCall {
    pub name: String,
    pub positional: Vec<Value>,
    pub config: Option<Value>,
}

impl CheatcodeCall {
    pub fn new(name: impl Into<String>, positional: Vec<Value>) -> Self {
        CheatcodeCall { name: name.into(), positional, config: None }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// Result value a cheatcode hands back to the calling script.
#[derive(Debug)]
pub enum CheatcodeOutcome {
    Declared(DeclaredContract),
    Prepared(PreparedContract),
    Deployed(DeployedContract),
    Invoked(InvokeResponse),
    Warped(TimestampRevert),
}

/// Signing identity available to signed cheatcodes, passed in explicitly at
/// construction time. No ambient globals.
#[derive(Clone, Default)]
pub struct Credentials {
    pub account_address: Option<Felt>,
    pub signer: Option<Arc<dyn TransactionSigner>>,
}

impl Credentials {
    pub fn new(account_address: Felt, signer: Arc<dyn TransactionSigner>) -> Self {
        Credentials { account_address: Some(account_address), signer: Some(signer) }
    }
}

/// Maps a script-facing contract identifier onto a compiled-artifact path:
/// an explicit `.json` path is used as-is, anything else is looked up in the
/// build output directory.
#[derive(Clone, Debug)]
pub struct ContractPathResolver {
    build_dir: PathBuf,
}

impl ContractPathResolver {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        ContractPathResolver { build_dir: build_dir.into() }
    }

    pub fn resolve(&self, identifier: &str) -> PathBuf {
        if identifier.ends_with(".json") {
            PathBuf::from(identifier)
        } else {
            self.build_dir.join(format!("{identifier}.json"))
        }
    }
}

/// Execution context binding the cheatcode set to one facade, one artifact
/// resolver, one set of credentials and one local block-state table.
pub struct Cheatcodes {
    facade: GatewayFacade,
    resolver: ContractPathResolver,
    credentials: Credentials,
    declare_token: Option<String>,
    block: Rc<RefCell<BlockCheats>>,
}

impl Cheatcodes {
    pub fn new(facade: GatewayFacade, resolver: ContractPathResolver) -> Self {
        Cheatcodes {
            facade,
            resolver,
            credentials: Credentials::default(),
            declare_token: None,
            block: Rc::new(RefCell::new(BlockCheats::default())),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_declare_token(mut self, token: impl Into<String>) -> Self {
        self.declare_token = Some(token.into());
        self
    }

    pub fn facade(&self) -> &GatewayFacade {
        &self.facade
    }

    /// Ledger history of every request the underlying facade issued.
    pub fn requests(&self) -> Vec<RequestRecord> {
        self.facade.requests()
    }

    pub fn block_cheats(&self) -> Rc<RefCell<BlockCheats>> {
        Rc::clone(&self.block)
    }

    pub(crate) fn resolved_path(&self, identifier: &str) -> PathBuf {
        self.resolver.resolve(identifier)
    }

    pub(crate) fn project_path(&self, identifier: &str) -> PathBuf {
        self.facade.project_root().join(self.resolved_path(identifier))
    }

    /// Validates a call against its signature contract and routes it to the
    /// operation it names.
    pub fn dispatch(&mut self, call: &CheatcodeCall) -> Result<CheatcodeOutcome, CheatcodeError> {
        let spec = CHEATCODE_SPECS
            .get(call.name.as_str())
            .ok_or_else(|| CheatcodeError::Unknown(call.name.clone()))?;
        validate_shape(call, spec)?;

        match spec.name {
            "declare" => {
                let contract = string_argument(spec, &call.positional[0], "contract")?;
                let config = declare::DeclareConfig::from_call(spec, call)?;
                self.declare(&contract, config).map(CheatcodeOutcome::Declared)
            }
            "deploy" => {
                let contract = string_argument(spec, &call.positional[0], "contract")?;
                let config = deploy::DeployConfig::from_call(spec, call)?;
                self.deploy(&contract, config).map(CheatcodeOutcome::Deployed)
            }
            "invoke" => {
                let contract_address =
                    felt_argument(spec, &call.positional[0], "contract_address")?;
                let function_name = string_argument(spec, &call.positional[1], "function_name")?;
                let inputs = call_input_argument(spec, &call.positional[2])?;
                let config = invoke::InvokeConfig::from_call(spec, call)?;
                self.invoke(contract_address, &function_name, inputs.as_ref(), config)
                    .map(CheatcodeOutcome::Invoked)
            }
            "prepare" => {
                let declared = DeclaredContract::from_value(spec, &call.positional[0])?;
                let constructor_args = call.positional.get(1);
                self.prepare(&declared, constructor_args).map(CheatcodeOutcome::Prepared)
            }
            "deploy_contract" => {
                let contract = string_argument(spec, &call.positional[0], "contract")?;
                let constructor_args = call.positional.get(1);
                let config = deploy::DeployContractConfig::from_call(spec, call)?;
                self.deploy_contract(&contract, constructor_args, config)
                    .map(CheatcodeOutcome::Deployed)
            }
            "warp" => {
                let timestamp = timestamp_argument(spec, &call.positional[0])?;
                let target = call
                    .positional
                    .get(1)
                    .map(|value| felt_argument(spec, value, "target_contract_address"))
                    .transpose()?;
                self.warp(timestamp, target).map(CheatcodeOutcome::Warped)
            }
            _ => Err(CheatcodeError::Unknown(call.name.clone())),
        }
    }
}

/// Enforces the positional/keyword split. Anything past the declared
/// positional parameters must be the keyword-only config object.
fn validate_shape(call: &CheatcodeCall, spec: &CheatcodeSpec) -> Result<(), CheatcodeError> {
    if call.positional.len() > spec.positional.len() {
        return Err(CheatcodeError::KeywordOnlyArgument {
            cheatcode: spec.name,
            arguments: vec!["config"],
        });
    }
    if call.positional.len() < spec.required {
        let missing = spec.positional[call.positional.len()];
        return Err(CheatcodeError::failed(
            spec.name,
            format!("missing required argument `{missing}`"),
        ));
    }
    if let Some(config) = &call.config {
        let entries = config.as_object().ok_or_else(|| {
            CheatcodeError::failed(
                spec.name,
                format!("config must be an object, got {}", config.get_type()),
            )
        })?;
        for key in entries.keys() {
            if !spec.config_options.contains(&key.as_str()) {
                return Err(CheatcodeError::failed(
                    spec.name,
                    format!("unknown configuration option `{key}`"),
                ));
            }
        }
    }
    Ok(())
}

fn config_entries<'a>(
    call: &'a CheatcodeCall,
) -> Option<&'a IndexMap<String, Value>> {
    call.config.as_ref().and_then(Value::as_object)
}

pub(crate) fn config_bool(
    spec: &CheatcodeSpec,
    call: &CheatcodeCall,
    key: &str,
) -> Result<bool, CheatcodeError> {
    match config_entries(call).and_then(|entries| entries.get(key)) {
        None => Ok(false),
        Some(value) => value.as_bool().ok_or_else(|| {
            CheatcodeError::failed(
                spec.name,
                format!("configuration option `{key}` must be a boolean, got {}", value.get_type()),
            )
        }),
    }
}

pub(crate) fn config_value<'a>(call: &'a CheatcodeCall, key: &str) -> Option<&'a Value> {
    config_entries(call).and_then(|entries| entries.get(key))
}

fn string_argument(
    spec: &CheatcodeSpec,
    value: &Value,
    name: &str,
) -> Result<String, CheatcodeError> {
    value.as_string().map(str::to_string).ok_or_else(|| {
        CheatcodeError::failed(
            spec.name,
            format!("argument `{name}` must be a string, got {}", value.get_type()),
        )
    })
}

fn felt_argument(spec: &CheatcodeSpec, value: &Value, name: &str) -> Result<Felt, CheatcodeError> {
    codec::value_to_felt(value).map_err(|report| {
        CheatcodeError::failed(spec.name, format!("argument `{name}` is invalid:\n{report:?}"))
    })
}

fn timestamp_argument(spec: &CheatcodeSpec, value: &Value) -> Result<u64, CheatcodeError> {
    match value.as_integer() {
        Some(timestamp) if (0..=i128::from(u64::MAX)).contains(&timestamp) => Ok(timestamp as u64),
        _ => Err(CheatcodeError::failed(
            spec.name,
            format!("argument `blk_timestamp` must be a non-negative integer, got {}", value.get_type()),
        )),
    }
}

fn call_input_argument(
    spec: &CheatcodeSpec,
    value: &Value,
) -> Result<Option<CallInput>, CheatcodeError> {
    if matches!(value, Value::Array(items) if items.is_empty()) {
        return Ok(None);
    }
    codec::call_input_from_value(value)
        .map(Some)
        .map_err(|report| {
            CheatcodeError::failed(spec.name, format!("argument `inputs` is invalid:\n{report:?}"))
        })
}

/// Converts a value-shaped constructor-argument payload into a call input.
/// Absent or empty arguments mean "no constructor inputs".
pub(crate) fn constructor_args_input(
    spec: &CheatcodeSpec,
    constructor_args: Option<&Value>,
) -> Result<Option<CallInput>, CheatcodeError> {
    match constructor_args {
        None => Ok(None),
        Some(value) => call_input_argument(spec, value),
    }
}

pub(crate) fn spec(name: &str) -> &'static CheatcodeSpec {
    &CHEATCODE_SPECS[name]
}
