use indexmap::IndexMap;
use starknet_types_core::felt::Felt;

/// Host-native value a script hands to a cheatcode or operation, before any
/// ABI-driven transformation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i128),
    String(String),
    Felt(Felt),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn bool(value: bool) -> Self {
        Value::Bool(value)
    }

    pub fn integer(value: i128) -> Self {
        Value::Integer(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn felt(value: Felt) -> Self {
        Value::Felt(value)
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(values)
    }

    pub fn object(entries: IndexMap<String, Value>) -> Self {
        Value::Object(entries)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn get_type(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::String(_) => "string",
            Value::Felt(_) => "felt",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Value::Integer(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Integer(value as i128)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i128)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Felt> for Value {
    fn from(value: Felt) -> Self {
        Value::Felt(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Object(entries)
    }
}

/// Input to a contract entry point: either already-encoded calldata (used
/// as-is, no structural validation by design) or a named mapping transformed
/// against the entry's ABI declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum CallInput {
    Raw(Vec<Felt>),
    Named(IndexMap<String, Value>),
}

impl CallInput {
    pub fn raw(calldata: Vec<Felt>) -> Self {
        CallInput::Raw(calldata)
    }

    pub fn named(entries: IndexMap<String, Value>) -> Self {
        CallInput::Named(entries)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CallInput::Raw(calldata) => calldata.is_empty(),
            CallInput::Named(entries) => entries.is_empty(),
        }
    }

    /// Ledger-payload representation of the input, as given by the caller.
    pub fn to_value(&self) -> Value {
        match self {
            CallInput::Raw(calldata) => {
                Value::Array(calldata.iter().copied().map(Value::Felt).collect())
            }
            CallInput::Named(entries) => Value::Object(entries.clone()),
        }
    }
}

impl From<Vec<Felt>> for CallInput {
    fn from(calldata: Vec<Felt>) -> Self {
        CallInput::Raw(calldata)
    }
}

impl From<IndexMap<String, Value>> for CallInput {
    fn from(entries: IndexMap<String, Value>) -> Self {
        CallInput::Named(entries)
    }
}
