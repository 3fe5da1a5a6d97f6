use std::path::PathBuf;

use starknet_types_core::felt::Felt;

use crate::cheatcodes::{config_bool, spec, CheatcodeCall, CheatcodeSpec, Cheatcodes};
use crate::errors::CheatcodeError;
use crate::typing::Value;

/// Class declared on the network, handed back to the script so it can be
/// prepared and deployed later.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclaredContract {
    pub class_hash: Felt,
    pub contract_path: PathBuf,
}

impl DeclaredContract {
    /// Value-shaped form, for scripts that pass results between cheatcodes
    /// dynamically.
    pub fn to_value(&self) -> Value {
        let mut entries = indexmap::IndexMap::new();
        entries.insert("class_hash".to_string(), Value::felt(self.class_hash));
        entries.insert(
            "contract_path".to_string(),
            Value::string(self.contract_path.display().to_string()),
        );
        Value::Object(entries)
    }

    pub(crate) fn from_value(
        spec: &CheatcodeSpec,
        value: &Value,
    ) -> Result<Self, CheatcodeError> {
        let entries = value.as_object().ok_or_else(|| {
            CheatcodeError::failed(
                spec.name,
                format!("argument `declared` must be a declared contract, got {}", value.get_type()),
            )
        })?;
        let class_hash = entries
            .get("class_hash")
            .and_then(|v| crate::codec::value_to_felt(v).ok())
            .ok_or_else(|| {
                CheatcodeError::failed(spec.name, "argument `declared` is missing `class_hash`")
            })?;
        let contract_path = entries
            .get("contract_path")
            .and_then(Value::as_string)
            .map(PathBuf::from)
            .ok_or_else(|| {
                CheatcodeError::failed(spec.name, "argument `declared` is missing `contract_path`")
            })?;
        Ok(DeclaredContract { class_hash, contract_path })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeclareConfig {
    pub wait_for_acceptance: bool,
}

impl DeclareConfig {
    pub(crate) fn from_call(
        spec: &CheatcodeSpec,
        call: &CheatcodeCall,
    ) -> Result<Self, CheatcodeError> {
        Ok(DeclareConfig { wait_for_acceptance: config_bool(spec, call, "wait_for_acceptance")? })
    }
}

impl Cheatcodes {
    /// Declares a compiled contract class on the network.
    pub fn declare(
        &mut self,
        contract: &str,
        config: DeclareConfig,
    ) -> Result<DeclaredContract, CheatcodeError> {
        let contract_path = self.resolved_path(contract);
        let signer = self.credentials.signer.clone();
        let token = self.declare_token.clone();
        let response = self
            .facade
            .declare(
                &contract_path,
                signer.as_deref(),
                token.as_deref(),
                config.wait_for_acceptance,
            )
            .map_err(|e| CheatcodeError::failed(spec("declare").name, e.to_string()))?;
        Ok(DeclaredContract { class_hash: response.class_hash, contract_path })
    }
}
