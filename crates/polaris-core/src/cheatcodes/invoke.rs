use starknet_types_core::felt::Felt;

use crate::cheatcodes::{config_bool, config_value, spec, CheatcodeCall, CheatcodeSpec, Cheatcodes};
use crate::errors::CheatcodeError;
use crate::gateway::{FeePolicy, InvokeResponse};
use crate::typing::CallInput;

#[derive(Clone, Copy, Debug, Default)]
pub struct InvokeConfig {
    pub max_fee: Option<u128>,
    pub auto_estimate_fee: bool,
    pub wait_for_acceptance: bool,
}

impl InvokeConfig {
    pub(crate) fn from_call(
        spec: &CheatcodeSpec,
        call: &CheatcodeCall,
    ) -> Result<Self, CheatcodeError> {
        let max_fee = match config_value(call, "max_fee") {
            None => None,
            Some(value) => match value.as_integer() {
                Some(fee) if fee >= 0 => Some(fee as u128),
                _ => {
                    return Err(CheatcodeError::failed(
                        spec.name,
                        format!(
                            "configuration option `max_fee` must be a non-negative integer, got {}",
                            value.get_type()
                        ),
                    ))
                }
            },
        };
        Ok(InvokeConfig {
            max_fee,
            auto_estimate_fee: config_bool(spec, call, "auto_estimate_fee")?,
            wait_for_acceptance: config_bool(spec, call, "wait_for_acceptance")?,
        })
    }

    /// Resolves the fee policy, enforcing that exactly one of the two fee
    /// options is set and that an explicit fee is positive.
    pub(crate) fn fee_policy(&self, cheatcode: &'static str) -> Result<FeePolicy, CheatcodeError> {
        match (self.max_fee, self.auto_estimate_fee) {
            (None, false) => Err(CheatcodeError::failed(
                cheatcode,
                "Either max_fee or auto_estimate_fee argument is required.",
            )),
            (Some(_), true) => Err(CheatcodeError::failed(
                cheatcode,
                "Arguments max_fee and auto_estimate_fee are mutually exclusive.",
            )),
            (Some(0), false) => {
                Err(CheatcodeError::failed(cheatcode, "max_fee must be greater than 0."))
            }
            (Some(fee), false) => Ok(FeePolicy::Max(fee)),
            (None, true) => Ok(FeePolicy::AutoEstimate),
        }
    }
}

impl Cheatcodes {
    /// Builds, signs and submits an invoke transaction against a live
    /// contract. Requires both a fee policy and full signing credentials.
    pub fn invoke(
        &mut self,
        contract_address: Felt,
        function_name: &str,
        inputs: Option<&CallInput>,
        config: InvokeConfig,
    ) -> Result<InvokeResponse, CheatcodeError> {
        let invoke_spec = spec("invoke");
        let fee = config.fee_policy(invoke_spec.name)?;
        let account_address = self.credentials.account_address.ok_or_else(|| {
            CheatcodeError::failed(
                invoke_spec.name,
                "Account address is required for fetching nonce. Please either provide it in the \
                 function call, or with the global account-address option.",
            )
        })?;
        let signer = self.credentials.signer.clone().ok_or_else(|| {
            CheatcodeError::failed(
                invoke_spec.name,
                "Signing is required when using invoke. Please either provide CLI credentials or \
                 a custom signer.",
            )
        })?;
        self.facade
            .invoke(
                contract_address,
                function_name,
                account_address,
                signer.as_ref(),
                inputs,
                fee,
                config.wait_for_acceptance,
            )
            .map_err(|e| CheatcodeError::failed(invoke_spec.name, e.to_string()))
    }
}
