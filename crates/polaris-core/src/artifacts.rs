use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use starknet_types_core::felt::Felt;

use crate::constants::CONSTRUCTOR_ENTRY;
use crate::errors::{GatewayError, GatewayResult};

/// A compiled contract artifact: the opaque program blob plus its ABI.
/// Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompiledContract {
    #[serde(default)]
    pub program: JsonValue,
    pub abi: ContractAbi,
    /// Raw artifact text as read from disk; kept for declare payloads and the
    /// locally computed class identifier.
    #[serde(skip)]
    pub source: String,
}

impl CompiledContract {
    /// Loads an artifact from a compiled-output path. A missing file is a
    /// user-actionable error pointing at the build step.
    pub fn from_path(path: &Path) -> GatewayResult<Self> {
        let source = fs::read_to_string(path)
            .map_err(|_| GatewayError::ArtifactNotFound(path.to_path_buf()))?;
        let mut contract: CompiledContract = serde_json::from_str(&source).map_err(|e| {
            GatewayError::InputValidation(format!(
                "Couldn't parse compiled contract `{}`: {e}",
                path.display()
            ))
        })?;
        contract.source = source;
        Ok(contract)
    }

    /// Class identifier of this artifact, computed locally over the compiled
    /// output. Stable for identical artifacts.
    pub fn class_hash(&self) -> Felt {
        let digest = Sha256::digest(self.source.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        // Top byte zeroed so the identifier stays inside the field.
        bytes[0] = 0;
        Felt::from_bytes_be(&bytes)
    }
}

/// Ordered list of a contract's entry-point descriptors. Read-only; used for
/// lookup and argument transformation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAbi {
    pub entries: Vec<AbiEntry>,
}

impl ContractAbi {
    pub fn new(entries: Vec<AbiEntry>) -> Self {
        ContractAbi { entries }
    }

    /// Resolves a callable entry (anything but a struct definition) by name.
    pub fn entry(&self, name: &str) -> Option<&AbiEntry> {
        self.entries.iter().find(|e| e.kind != AbiEntryKind::Struct && e.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&AbiEntry> {
        self.entries.iter().find(|e| e.kind == AbiEntryKind::Function && e.name == name)
    }

    pub fn constructor(&self) -> Option<&AbiEntry> {
        self.entries.iter().find(|e| e.kind == AbiEntryKind::Constructor)
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor().is_some()
    }

    /// Resolves a struct type definition by name.
    pub fn struct_entry(&self, name: &str) -> Option<&AbiEntry> {
        self.entries.iter().find(|e| e.kind == AbiEntryKind::Struct && e.name == name)
    }

    /// Names of callable entries, for lookup-failure hints.
    pub fn callable_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.kind != AbiEntryKind::Struct)
            .map(|e| e.name.as_str())
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbiEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AbiEntryKind,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    /// Field declarations of a struct definition entry.
    #[serde(default)]
    pub members: Vec<AbiParam>,
}

impl AbiEntry {
    pub fn is_constructor(&self) -> bool {
        self.kind == AbiEntryKind::Constructor && self.name == CONSTRUCTOR_ENTRY
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiEntryKind {
    Constructor,
    Function,
    Event,
    Struct,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbiParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        AbiParam { name: name.into(), ty: ty.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_artifact_json() {
        let raw = r#"{
            "program": {"data": []},
            "abi": [
                {"type": "constructor", "name": "constructor",
                 "inputs": [{"name": "x", "type": "felt"}], "outputs": []},
                {"type": "function", "name": "get_balance", "inputs": [],
                 "outputs": [{"name": "res", "type": "felt"}]},
                {"type": "struct", "name": "Point",
                 "members": [{"name": "x", "type": "felt"}, {"name": "y", "type": "felt"}]}
            ]
        }"#;
        let contract: CompiledContract = serde_json::from_str(raw).unwrap();
        assert!(contract.abi.has_constructor());
        assert!(contract.abi.function("get_balance").is_some());
        assert!(contract.abi.struct_entry("Point").is_some());
        assert!(contract.abi.entry("Point").is_none());
        assert_eq!(contract.abi.struct_entry("Point").unwrap().members.len(), 2);
    }

    #[test]
    fn class_hash_is_stable_per_source() {
        let a = CompiledContract {
            program: JsonValue::Null,
            abi: ContractAbi::default(),
            source: "artifact-a".to_string(),
        };
        let b = CompiledContract { source: "artifact-b".to_string(), ..a.clone() };
        assert_eq!(a.class_hash(), a.class_hash());
        assert_ne!(a.class_hash(), b.class_hash());
    }
}
