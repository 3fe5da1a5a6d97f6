use std::path::PathBuf;

use thiserror::Error;

use crate::constants::BUILD_COMMAND;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures surfaced by the gateway facade. Every lower-level failure (codec
/// report, client error) is re-wrapped into one of these before it crosses
/// the public boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Couldn't find `{}`\nDid you run `{BUILD_COMMAND}`?", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Input validation failed with the following error:\n{0}")]
    InputValidation(String),

    #[error("Couldn't find ABI entry `{0}`")]
    UnknownEntry(String),

    #[error("Tried to call unknown function: '{0}'")]
    UnknownFunction(String),

    #[error("Tried to call unknown contract:\n{0}")]
    ContractNotFound(String),

    #[error("Transaction failed:\n{0}")]
    TransactionSubmission(String),

    #[error(transparent)]
    Signer(#[from] SignerError),
}

/// Codec-internal error contexts, carried inside `error_stack::Report`s so
/// each failure keeps a breadcrumb trail of what was being encoded. Reports
/// never escape the facade: see [`crate::codec::report_to_gateway_error`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown ABI entry `{0}`")]
    UnknownEntry(String),

    #[error("missing argument `{0}`")]
    MissingArgument(String),

    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),

    #[error("expected {expected}, got {received}")]
    InvalidType { expected: String, received: String },

    #[error("unknown type descriptor `{0}`")]
    UnknownTypeDescriptor(String),

    #[error("calldata exhausted while decoding")]
    CalldataExhausted,

    #[error("unconsumed calldata: {0} field element(s) left")]
    TrailingCalldata(usize),

    #[error("value out of range for a field element")]
    OutOfRange,
}

/// Failures reported by the network gateway client collaborator.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no contract found at address {0}")]
    ContractNotFound(String),

    #[error("transaction rejected by the gateway: {0}")]
    Rejected(String),

    #[error("network failure: {0}")]
    Network(String),
}

/// Failures reported by the signing collaborator.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Failures surfaced to scripts by the cheatcode dispatch framework.
#[derive(Debug, Error)]
pub enum CheatcodeError {
    #[error("Unknown cheatcode `{0}`")]
    Unknown(String),

    #[error(
        "Cheatcode `{cheatcode}` accepts the following arguments only by keyword: [{}]",
        .arguments.join(", ")
    )]
    KeywordOnlyArgument { cheatcode: &'static str, arguments: Vec<&'static str> },

    #[error("Cheatcode `{cheatcode}` failed:\n{message}")]
    Failed { cheatcode: &'static str, message: String },
}

impl CheatcodeError {
    pub fn failed(cheatcode: &'static str, message: impl Into<String>) -> Self {
        CheatcodeError::Failed { cheatcode, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_not_found_carries_build_hint() {
        let err = GatewayError::ArtifactNotFound(PathBuf::from("./build/main.json"));
        let message = err.to_string();
        assert!(message.contains("Couldn't find `./build/main.json`"));
        assert!(message.contains("polaris build"));
    }

    #[test]
    fn keyword_only_argument_names_config() {
        let err = CheatcodeError::KeywordOnlyArgument {
            cheatcode: "invoke",
            arguments: vec!["config"],
        };
        assert!(err.to_string().contains("[config]"));
        assert!(err.to_string().contains("`invoke`"));
    }
}
