use starknet_types_core::felt::Felt;

// The network rejects declare transactions whose sender, fee or nonce differ
// from these values. They become user-configurable once that constraint is
// lifted network-side.
pub const DECLARE_SENDER_ADDRESS: Felt = Felt::ONE;
pub const DECLARE_MAX_FEE: u128 = 0;
pub const DECLARE_NONCE: u64 = 0;

pub const TRANSACTION_VERSION: u64 = 0;

// Acceptance polling
pub const POLL_INTERVAL_MS: u64 = 2_000;
pub const MAX_POLL_ATTEMPTS: usize = 60;

// Scalar type descriptor of the native argument encoding
pub const FELT_TYPE: &str = "felt";

// ABI entry name of a contract constructor
pub const CONSTRUCTOR_ENTRY: &str = "constructor";

// Command the user must run to produce compiled artifacts
pub const BUILD_COMMAND: &str = "polaris build";
