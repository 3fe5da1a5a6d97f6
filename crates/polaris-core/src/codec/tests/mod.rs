use indexmap::IndexMap;
use starknet_types_core::felt::Felt;

use crate::artifacts::{AbiEntry, AbiEntryKind, AbiParam, ContractAbi};
use crate::typing::Value;

mod decoding;

fn entry(kind: AbiEntryKind, name: &str, inputs: Vec<AbiParam>, outputs: Vec<AbiParam>) -> AbiEntry {
    AbiEntry { name: name.to_string(), kind, inputs, outputs, members: vec![] }
}

fn struct_definition(name: &str, members: Vec<AbiParam>) -> AbiEntry {
    AbiEntry {
        name: name.to_string(),
        kind: AbiEntryKind::Struct,
        inputs: vec![],
        outputs: vec![],
        members,
    }
}

/// ABI shared by the codec tests: scalar, array and struct parameters plus a
/// constructor.
fn sample_abi() -> ContractAbi {
    ContractAbi::new(vec![
        entry(
            AbiEntryKind::Constructor,
            "constructor",
            vec![AbiParam::new("initial_balance", "felt")],
            vec![],
        ),
        entry(
            AbiEntryKind::Function,
            "transfer",
            vec![AbiParam::new("recipient", "felt"), AbiParam::new("amount", "felt")],
            vec![],
        ),
        entry(
            AbiEntryKind::Function,
            "batch_mint",
            vec![AbiParam::new("recipients", "felt*")],
            vec![],
        ),
        entry(
            AbiEntryKind::Function,
            "move_to",
            vec![AbiParam::new("destination", "Point")],
            vec![AbiParam::new("previous", "Point")],
        ),
        entry(
            AbiEntryKind::Function,
            "get_balance",
            vec![],
            vec![AbiParam::new("balance", "felt")],
        ),
        struct_definition(
            "Point",
            vec![AbiParam::new("x", "felt"), AbiParam::new("y", "felt")],
        ),
    ])
}

fn named(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn felts(values: &[u64]) -> Vec<Felt> {
    values.iter().copied().map(Felt::from).collect()
}
