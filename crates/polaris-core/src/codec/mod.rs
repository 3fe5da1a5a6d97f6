//! ABI-driven transformation between host values and the flat field-element
//! calldata encoding contracts consume.
//!
//! Scalars are single felts; arrays are length-prefixed runs of their element
//! type (`T*`); struct parameters resolve a struct definition entry of the
//! same ABI and recurse over its members in declaration order.

use error_stack::{Report, ResultExt};
use indexmap::IndexMap;
use starknet_types_core::felt::Felt;

use crate::artifacts::{AbiEntry, AbiParam, ContractAbi};
use crate::constants::FELT_TYPE;
use crate::errors::{CodecError, GatewayError};
use crate::typing::{CallInput, Value};

#[cfg(test)]
mod tests;

pub type CodecResult<T> = Result<T, Report<CodecError>>;

/// Encodes a call input into calldata for the named ABI entry.
///
/// Raw inputs pass through unchanged: the caller asserts they already match
/// the encoding, trading safety for an explicit escape hatch.
pub fn encode(abi: &ContractAbi, entry_name: &str, input: &CallInput) -> CodecResult<Vec<Felt>> {
    let entry = resolve_entry(abi, entry_name)?;
    match input {
        CallInput::Raw(calldata) => Ok(calldata.clone()),
        CallInput::Named(fields) => encode_named(abi, entry, fields)
            .attach_printable_lazy(|| format!("encoding arguments for entry `{entry_name}`")),
    }
}

/// Decodes calldata into a named mapping against the entry's declared inputs.
/// The calldata must be consumed exactly.
pub fn decode(
    abi: &ContractAbi,
    entry_name: &str,
    calldata: &[Felt],
) -> CodecResult<IndexMap<String, Value>> {
    let entry = resolve_entry(abi, entry_name)?;
    decode_params(abi, &entry.inputs, calldata)
        .attach_printable_lazy(|| format!("decoding arguments of entry `{entry_name}`"))
}

/// Decodes an entry's return values. Same scheme as `decode`, over the
/// declared outputs.
pub fn decode_outputs(
    abi: &ContractAbi,
    entry_name: &str,
    calldata: &[Felt],
) -> CodecResult<IndexMap<String, Value>> {
    let entry = resolve_entry(abi, entry_name)?;
    decode_params(abi, &entry.outputs, calldata)
        .attach_printable_lazy(|| format!("decoding outputs of entry `{entry_name}`"))
}

/// Converts a host value into a raw-or-named call input: an array is taken as
/// already-encoded calldata, a mapping as named arguments.
pub fn call_input_from_value(value: &Value) -> CodecResult<CallInput> {
    match value {
        Value::Array(items) => {
            let mut calldata = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let felt = value_to_felt(item)
                    .attach_printable_lazy(|| format!("calldata element #{}", i + 1))?;
                calldata.push(felt);
            }
            Ok(CallInput::Raw(calldata))
        }
        Value::Object(entries) => Ok(CallInput::Named(entries.clone())),
        other => Err(Report::new(CodecError::InvalidType {
            expected: "an array of field elements or a mapping of parameter names".to_string(),
            received: other.get_type().to_string(),
        })),
    }
}

/// Maps a codec report onto the public gateway taxonomy. Callers never see
/// raw codec failures.
pub fn report_to_gateway_error(report: Report<CodecError>) -> GatewayError {
    match report.current_context() {
        CodecError::UnknownEntry(name) => GatewayError::UnknownEntry(name.clone()),
        _ => GatewayError::InputValidation(format!("{report:?}")),
    }
}

fn resolve_entry<'a>(abi: &'a ContractAbi, entry_name: &str) -> CodecResult<&'a AbiEntry> {
    abi.entry(entry_name).ok_or_else(|| {
        let available = abi.callable_names();
        let mut report = Report::new(CodecError::UnknownEntry(entry_name.to_string()));
        if !available.is_empty() {
            report = report
                .attach_printable(format!("available entries: {}", available.join(", ")));
        }
        report
    })
}

fn encode_named(
    abi: &ContractAbi,
    entry: &AbiEntry,
    fields: &IndexMap<String, Value>,
) -> CodecResult<Vec<Felt>> {
    for key in fields.keys() {
        if !entry.inputs.iter().any(|param| param.name == *key) {
            return Err(Report::new(CodecError::UnexpectedArgument(key.clone()))
                .attach_printable(format!("entry `{}` declares no such parameter", entry.name)));
        }
    }

    let mut calldata = vec![];
    for (i, param) in entry.inputs.iter().enumerate() {
        let value = fields
            .get(&param.name)
            .ok_or_else(|| Report::new(CodecError::MissingArgument(param.name.clone())))?;
        encode_value(abi, value, &param.ty, &mut calldata).attach_printable_lazy(|| {
            format!("encoding parameter #{} (`{}` of type `{}`)", i + 1, param.name, param.ty)
        })?;
    }
    Ok(calldata)
}

fn encode_value(abi: &ContractAbi, value: &Value, ty: &str, out: &mut Vec<Felt>) -> CodecResult<()> {
    if let Some(element_ty) = ty.strip_suffix('*') {
        let items = value.as_array().ok_or_else(|| {
            Report::new(CodecError::InvalidType {
                expected: format!("an array for `{ty}`"),
                received: value.get_type().to_string(),
            })
        })?;
        out.push(Felt::from(items.len() as u64));
        for (i, item) in items.iter().enumerate() {
            encode_value(abi, item, element_ty, out)
                .attach_printable_lazy(|| format!("array element #{}", i + 1))?;
        }
        return Ok(());
    }

    if ty == FELT_TYPE {
        out.push(value_to_felt(value)?);
        return Ok(());
    }

    let definition = abi
        .struct_entry(ty)
        .ok_or_else(|| Report::new(CodecError::UnknownTypeDescriptor(ty.to_string())))?;
    let fields = value.as_object().ok_or_else(|| {
        Report::new(CodecError::InvalidType {
            expected: format!("a mapping for struct `{ty}`"),
            received: value.get_type().to_string(),
        })
    })?;
    for key in fields.keys() {
        if !definition.members.iter().any(|member| member.name == *key) {
            return Err(Report::new(CodecError::UnexpectedArgument(key.clone()))
                .attach_printable(format!("struct `{ty}` declares no such member")));
        }
    }
    for member in &definition.members {
        let field = fields
            .get(&member.name)
            .ok_or_else(|| Report::new(CodecError::MissingArgument(member.name.clone())))?;
        encode_value(abi, field, &member.ty, out)
            .attach_printable_lazy(|| format!("struct member `{}.{}`", ty, member.name))?;
    }
    Ok(())
}

fn decode_params(
    abi: &ContractAbi,
    params: &[AbiParam],
    calldata: &[Felt],
) -> CodecResult<IndexMap<String, Value>> {
    let mut cursor = Cursor { calldata, position: 0 };
    let mut decoded = IndexMap::new();
    for param in params {
        let value = decode_value(abi, &param.ty, &mut cursor)
            .attach_printable_lazy(|| format!("decoding `{}` of type `{}`", param.name, param.ty))?;
        decoded.insert(param.name.clone(), value);
    }
    let remaining = cursor.remaining();
    if remaining > 0 {
        return Err(Report::new(CodecError::TrailingCalldata(remaining)));
    }
    Ok(decoded)
}

fn decode_value(abi: &ContractAbi, ty: &str, cursor: &mut Cursor<'_>) -> CodecResult<Value> {
    if let Some(element_ty) = ty.strip_suffix('*') {
        let length = felt_to_usize(&cursor.next()?)?;
        let mut items = Vec::with_capacity(length);
        for i in 0..length {
            let item = decode_value(abi, element_ty, cursor)
                .attach_printable_lazy(|| format!("array element #{}", i + 1))?;
            items.push(item);
        }
        return Ok(Value::Array(items));
    }

    if ty == FELT_TYPE {
        return Ok(Value::Felt(cursor.next()?));
    }

    let definition = abi
        .struct_entry(ty)
        .ok_or_else(|| Report::new(CodecError::UnknownTypeDescriptor(ty.to_string())))?;
    let mut fields = IndexMap::new();
    for member in &definition.members {
        let value = decode_value(abi, &member.ty, cursor)
            .attach_printable_lazy(|| format!("struct member `{}.{}`", ty, member.name))?;
        fields.insert(member.name.clone(), value);
    }
    Ok(Value::Object(fields))
}

/// Converts a scalar host value into a field element.
pub fn value_to_felt(value: &Value) -> CodecResult<Felt> {
    match value {
        Value::Felt(felt) => Ok(*felt),
        Value::Integer(i) if *i >= 0 => Ok(Felt::from(*i as u128)),
        Value::Integer(_) => Err(Report::new(CodecError::OutOfRange)
            .attach_printable("field elements are non-negative")),
        Value::Bool(b) => Ok(Felt::from(*b as u64)),
        Value::String(s) if s.starts_with("0x") => Felt::from_hex(s).map_err(|e| {
            Report::new(CodecError::InvalidType {
                expected: "a field element".to_string(),
                received: format!("invalid hex string `{s}`: {e}"),
            })
        }),
        Value::String(s) => s.parse::<u128>().map(Felt::from).map_err(|_| {
            Report::new(CodecError::InvalidType {
                expected: "a field element".to_string(),
                received: format!("non-numeric string `{s}`"),
            })
        }),
        other => Err(Report::new(CodecError::InvalidType {
            expected: "a field element".to_string(),
            received: other.get_type().to_string(),
        })),
    }
}

fn felt_to_usize(value: &Felt) -> CodecResult<usize> {
    let bytes = value.to_bytes_be();
    if bytes[..24].iter().any(|b| *b != 0) {
        return Err(Report::new(CodecError::OutOfRange)
            .attach_printable("length prefix does not fit in a machine word"));
    }
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[24..]);
    usize::try_from(u64::from_be_bytes(word)).map_err(|_| Report::new(CodecError::OutOfRange))
}

struct Cursor<'a> {
    calldata: &'a [Felt],
    position: usize,
}

impl Cursor<'_> {
    fn next(&mut self) -> CodecResult<Felt> {
        let felt = self
            .calldata
            .get(self.position)
            .copied()
            .ok_or_else(|| Report::new(CodecError::CalldataExhausted))?;
        self.position += 1;
        Ok(felt)
    }

    fn remaining(&self) -> usize {
        self.calldata.len() - self.position
    }
}
