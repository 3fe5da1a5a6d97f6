use std::path::PathBuf;

use starknet_types_core::felt::Felt;

use crate::artifacts::CompiledContract;
use crate::cheatcodes::{
    config_bool, config_value, constructor_args_input, spec, CheatcodeCall, CheatcodeSpec,
    Cheatcodes, DeclaredContract,
};
use crate::codec;
use crate::errors::CheatcodeError;
use crate::gateway::facade::constructor_calldata;
use crate::typing::{CallInput, Value};

/// A declared class with its constructor calldata already bound, ready for
/// deployment.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedContract {
    pub class_hash: Felt,
    pub contract_path: PathBuf,
    pub constructor_calldata: Vec<Felt>,
}

/// Address of a contract instance live on the network.
#[derive(Clone, Debug, PartialEq)]
pub struct DeployedContract {
    pub contract_address: Felt,
    pub class_hash: Option<Felt>,
}

#[derive(Clone, Debug, Default)]
pub struct DeployConfig {
    pub inputs: Option<CallInput>,
    pub wait_for_acceptance: bool,
}

impl DeployConfig {
    pub(crate) fn from_call(
        spec: &CheatcodeSpec,
        call: &CheatcodeCall,
    ) -> Result<Self, CheatcodeError> {
        let inputs = match config_value(call, "inputs") {
            None => None,
            Some(value) => codec::call_input_from_value(value).map(Some).map_err(|report| {
                CheatcodeError::failed(
                    spec.name,
                    format!("configuration option `inputs` is invalid:\n{report:?}"),
                )
            })?,
        };
        Ok(DeployConfig {
            inputs,
            wait_for_acceptance: config_bool(spec, call, "wait_for_acceptance")?,
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeployContractConfig {
    pub wait_for_acceptance: bool,
}

impl DeployContractConfig {
    pub(crate) fn from_call(
        spec: &CheatcodeSpec,
        call: &CheatcodeCall,
    ) -> Result<Self, CheatcodeError> {
        Ok(DeployContractConfig {
            wait_for_acceptance: config_bool(spec, call, "wait_for_acceptance")?,
        })
    }
}

impl Cheatcodes {
    /// Deploys a compiled artifact directly, encoding any constructor inputs
    /// against its ABI.
    pub fn deploy(
        &mut self,
        contract: &str,
        config: DeployConfig,
    ) -> Result<DeployedContract, CheatcodeError> {
        let contract_path = self.resolved_path(contract);
        let response = self
            .facade
            .deploy(
                &contract_path,
                config.inputs.as_ref(),
                self.declare_token.clone().as_deref(),
                None,
                config.wait_for_acceptance,
            )
            .map_err(|e| CheatcodeError::failed(spec("deploy").name, e.to_string()))?;
        Ok(DeployedContract { contract_address: response.address, class_hash: None })
    }

    /// Binds constructor calldata to a declared class. Purely local: loads
    /// the artifact, encodes the arguments, touches no network state.
    pub fn prepare(
        &mut self,
        declared: &DeclaredContract,
        constructor_args: Option<&Value>,
    ) -> Result<PreparedContract, CheatcodeError> {
        let prepare_spec = spec("prepare");
        let path = self.facade.project_root().join(&declared.contract_path);
        let contract = CompiledContract::from_path(&path)
            .map_err(|e| CheatcodeError::failed(prepare_spec.name, e.to_string()))?;
        let input = constructor_args_input(prepare_spec, constructor_args)?;
        let calldata = constructor_calldata(&contract.abi, input.as_ref())
            .map_err(|e| CheatcodeError::failed(prepare_spec.name, e.to_string()))?;
        Ok(PreparedContract {
            class_hash: declared.class_hash,
            contract_path: declared.contract_path.clone(),
            constructor_calldata: calldata,
        })
    }

    /// Deploys a prepared contract, passing its bound calldata through
    /// unchanged.
    pub fn deploy_prepared(
        &mut self,
        prepared: &PreparedContract,
        config: DeployContractConfig,
    ) -> Result<DeployedContract, CheatcodeError> {
        let input = CallInput::Raw(prepared.constructor_calldata.clone());
        let response = self
            .facade
            .deploy(
                &prepared.contract_path,
                Some(&input),
                None,
                None,
                config.wait_for_acceptance,
            )
            .map_err(|e| CheatcodeError::failed(spec("deploy_contract").name, e.to_string()))?;
        Ok(DeployedContract {
            contract_address: response.address,
            class_hash: Some(prepared.class_hash),
        })
    }

    /// Composition of declare, prepare and deploy. The class identifier is
    /// bound locally from the artifact; the single network transaction is the
    /// deploy itself. Sub-step failures propagate unchanged.
    pub fn deploy_contract(
        &mut self,
        contract: &str,
        constructor_args: Option<&Value>,
        config: DeployContractConfig,
    ) -> Result<DeployedContract, CheatcodeError> {
        let deploy_spec = spec("deploy_contract");
        let artifact = CompiledContract::from_path(&self.project_path(contract))
            .map_err(|e| CheatcodeError::failed(deploy_spec.name, e.to_string()))?;
        let declared = DeclaredContract {
            class_hash: artifact.class_hash(),
            contract_path: self.resolved_path(contract),
        };
        let prepared = self.prepare(&declared, constructor_args)?;
        self.deploy_prepared(&prepared, config)
    }
}
