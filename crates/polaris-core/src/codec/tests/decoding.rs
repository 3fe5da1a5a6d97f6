use starknet_types_core::felt::Felt;

use super::{felts, named, sample_abi};
use crate::codec::{decode, decode_outputs, encode};
use crate::errors::CodecError;
use crate::typing::{CallInput, Value};

#[test]
fn scalars_decode_into_declaration_order() {
    let abi = sample_abi();
    let decoded = decode(&abi, "transfer", &felts(&[0xaa, 7])).unwrap();
    let keys: Vec<_> = decoded.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["recipient", "amount"]);
    assert_eq!(decoded.get("amount"), Some(&Value::Felt(Felt::from(7u64))));
}

#[test]
fn arrays_decode_from_their_length_prefix() {
    let abi = sample_abi();
    let decoded = decode(&abi, "batch_mint", &felts(&[2, 11, 22])).unwrap();
    assert_eq!(
        decoded.get("recipients"),
        Some(&Value::Array(vec![
            Value::Felt(Felt::from(11u64)),
            Value::Felt(Felt::from(22u64)),
        ]))
    );
}

#[test]
fn structs_decode_member_by_member() {
    let abi = sample_abi();
    let decoded = decode(&abi, "move_to", &felts(&[3, 4])).unwrap();
    let expected = Value::object(named(&[
        ("x", Value::Felt(Felt::from(3u64))),
        ("y", Value::Felt(Felt::from(4u64))),
    ]));
    assert_eq!(decoded.get("destination"), Some(&expected));
}

#[test]
fn outputs_decode_against_the_declared_outputs() {
    let abi = sample_abi();
    let decoded = decode_outputs(&abi, "get_balance", &felts(&[1000])).unwrap();
    assert_eq!(decoded.get("balance"), Some(&Value::Felt(Felt::from(1000u64))));
}

#[test]
fn trailing_calldata_is_an_error() {
    let abi = sample_abi();
    let report = decode(&abi, "transfer", &felts(&[1, 2, 3])).unwrap_err();
    assert!(matches!(report.current_context(), CodecError::TrailingCalldata(1)));
}

#[test]
fn exhausted_calldata_is_an_error() {
    let abi = sample_abi();
    let report = decode(&abi, "transfer", &felts(&[1])).unwrap_err();
    assert!(matches!(report.current_context(), CodecError::CalldataExhausted));
}

#[test]
fn array_length_prefix_must_fit() {
    let abi = sample_abi();
    let huge = Felt::from_hex("0x1000000000000000000000000000000000000000000000000").unwrap();
    let report = decode(&abi, "batch_mint", &[huge]).unwrap_err();
    assert!(matches!(report.current_context(), CodecError::OutOfRange));
}

#[test]
fn array_encoding_round_trips_through_decode() {
    let abi = sample_abi();
    let input = CallInput::Named(named(&[(
        "recipients",
        Value::array(vec![Value::integer(5), Value::integer(6)]),
    )]));
    let calldata = encode(&abi, "batch_mint", &input).unwrap();
    let decoded = decode(&abi, "batch_mint", &calldata).unwrap();
    assert_eq!(
        decoded.get("recipients"),
        Some(&Value::Array(vec![
            Value::Felt(Felt::from(5u64)),
            Value::Felt(Felt::from(6u64)),
        ]))
    );
}

#[test]
fn named_encoding_round_trips_through_decode() {
    let abi = sample_abi();
    let input = CallInput::Named(named(&[
        ("recipient", Value::string("0x123")),
        ("amount", Value::integer(55)),
    ]));
    let calldata = encode(&abi, "transfer", &input).unwrap();
    let decoded = decode(&abi, "transfer", &calldata).unwrap();
    assert_eq!(decoded.get("recipient"), Some(&Value::Felt(Felt::from(0x123u64))));
    assert_eq!(decoded.get("amount"), Some(&Value::Felt(Felt::from(55u64))));
}
