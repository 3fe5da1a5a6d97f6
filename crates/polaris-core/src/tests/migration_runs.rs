use std::path::Path;

use starknet_types_core::felt::Felt;

use super::harness::{counter_abi_json, write_artifact, MockGateway};
use crate::cheatcodes::{Cheatcodes, ContractPathResolver, DeclareConfig, DeployContractConfig};
use crate::errors::CheatcodeError;
use crate::gateway::{GatewayClient, RequestAction};
use crate::migrations::{
    MigrationDirection, MigrationError, MigrationRunner, MigrationScript,
};
use crate::typing::Value;

/// Forward: deploy the counter with an initial balance. Rollback: re-declare
/// the class only.
struct CounterMigration;

impl MigrationScript for CounterMigration {
    fn up(&self, cheatcodes: &mut Cheatcodes) -> Result<(), CheatcodeError> {
        let mut args = indexmap::IndexMap::new();
        args.insert("x".to_string(), Value::integer(1));
        cheatcodes
            .deploy_contract("main", Some(&Value::Object(args)), DeployContractConfig::default())
            .map(|_| ())
    }

    fn down(&self, cheatcodes: &mut Cheatcodes) -> Result<(), CheatcodeError> {
        cheatcodes.declare("main", DeclareConfig::default()).map(|_| ())
    }
}

fn runner_for(project_root: &Path) -> MigrationRunner {
    MigrationRunner::new(
        Box::new(CounterMigration),
        project_root,
        ContractPathResolver::new("build"),
        Box::new(|| Box::new(MockGateway::new()) as Box<dyn GatewayClient>),
    )
}

#[test]
fn up_and_down_produce_independent_ledgers() {
    let project = tempfile::tempdir().unwrap();
    write_artifact(project.path(), "build/main.json", counter_abi_json());
    let runner = runner_for(project.path());

    let up = runner.run(MigrationDirection::Up).unwrap();
    assert_eq!(up.direction, MigrationDirection::Up);
    assert_eq!(up.requests.len(), 1);
    assert_eq!(up.requests[0].action, RequestAction::Deploy);
    assert!(up.requests[0].response().is_some());

    let down = runner.run(MigrationDirection::Down).unwrap();
    assert_eq!(down.requests.len(), 1);
    assert_eq!(down.requests[0].action, RequestAction::Declare);

    // the up history was not carried into the down run
    assert_eq!(up.requests.len(), 1);
}

#[test]
fn a_failing_script_reports_the_requests_made_so_far() {
    let project = tempfile::tempdir().unwrap();
    // no artifact written: the declare inside deploy_contract cannot load it
    let runner = runner_for(project.path());

    let err = runner.run(MigrationDirection::Up).unwrap_err();
    match err {
        MigrationError::ScriptFailed { direction, source, requests } => {
            assert_eq!(direction, MigrationDirection::Up);
            assert!(source.to_string().contains("Couldn't find"));
            // failed while binding the class, before any request went out
            assert!(requests.is_empty());
        }
    }
}

#[test]
fn down_never_implicitly_runs_up() {
    let project = tempfile::tempdir().unwrap();
    write_artifact(project.path(), "build/main.json", counter_abi_json());
    let runner = runner_for(project.path());

    let down = runner.run(MigrationDirection::Down).unwrap();
    let actions: Vec<_> = down.requests.iter().map(|r| r.action).collect();
    assert_eq!(actions, vec![RequestAction::Declare]);
}

#[test]
fn migration_scripts_see_typed_cheatcode_results() {
    let project = tempfile::tempdir().unwrap();
    write_artifact(project.path(), "build/main.json", counter_abi_json());

    struct AddressAssertingMigration;
    impl MigrationScript for AddressAssertingMigration {
        fn up(&self, cheatcodes: &mut Cheatcodes) -> Result<(), CheatcodeError> {
            let mut args = indexmap::IndexMap::new();
            args.insert("x".to_string(), Value::integer(1));
            let deployed = cheatcodes.deploy_contract(
                "main",
                Some(&Value::Object(args)),
                DeployContractConfig::default(),
            )?;
            assert_ne!(deployed.contract_address, Felt::ZERO);
            assert!(deployed.class_hash.is_some());
            Ok(())
        }

        fn down(&self, _cheatcodes: &mut Cheatcodes) -> Result<(), CheatcodeError> {
            Ok(())
        }
    }

    let runner = MigrationRunner::new(
        Box::new(AddressAssertingMigration),
        project.path(),
        ContractPathResolver::new("build"),
        Box::new(|| Box::new(MockGateway::new()) as Box<dyn GatewayClient>),
    );
    runner.run(MigrationDirection::Up).unwrap();
}
