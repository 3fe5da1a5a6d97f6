#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_derive;

pub mod artifacts;
pub mod cheatcodes;
pub mod codec;
pub mod constants;
pub mod errors;
pub mod gateway;
pub mod migrations;
pub mod typing;

#[cfg(test)]
mod tests;

pub use starknet_types_core::felt::Felt;
