//! Runs a user-authored forward/rollback script pair against a chosen
//! network. Each run binds the cheatcode set to a fresh facade, so ledger
//! histories of separate runs never mix.

use std::path::PathBuf;

use thiserror::Error;

use crate::cheatcodes::{Cheatcodes, ContractPathResolver, Credentials};
use crate::errors::CheatcodeError;
use crate::gateway::{GatewayClient, GatewayFacade, RequestRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationDirection {
    Up,
    Down,
}

impl MigrationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationDirection::Up => "up",
            MigrationDirection::Down => "down",
        }
    }
}

impl std::fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A migration script: two independent bodies. Running one never implicitly
/// runs the other; authors keep them inverse where that matters.
pub trait MigrationScript {
    fn up(&self, cheatcodes: &mut Cheatcodes) -> Result<(), CheatcodeError>;
    fn down(&self, cheatcodes: &mut Cheatcodes) -> Result<(), CheatcodeError>;
}

/// Ordered ledger history of one completed migration run.
#[derive(Debug)]
pub struct MigrationResult {
    pub direction: MigrationDirection,
    pub requests: Vec<RequestRecord>,
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration `{direction}` failed:\n{source}")]
    ScriptFailed {
        direction: MigrationDirection,
        source: CheatcodeError,
        /// Requests issued before the failure, for display and debugging.
        requests: Vec<RequestRecord>,
    },
}

pub struct MigrationRunner {
    script: Box<dyn MigrationScript>,
    project_root: PathBuf,
    resolver: ContractPathResolver,
    client_builder: Box<dyn Fn() -> Box<dyn GatewayClient>>,
    credentials: Credentials,
    declare_token: Option<String>,
}

impl MigrationRunner {
    pub fn new(
        script: Box<dyn MigrationScript>,
        project_root: impl Into<PathBuf>,
        resolver: ContractPathResolver,
        client_builder: Box<dyn Fn() -> Box<dyn GatewayClient>>,
    ) -> Self {
        MigrationRunner {
            script,
            project_root: project_root.into(),
            resolver,
            client_builder,
            credentials: Credentials::default(),
            declare_token: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_declare_token(mut self, token: impl Into<String>) -> Self {
        self.declare_token = Some(token.into());
        self
    }

    /// Executes exactly one of the two script bodies with a fresh cheatcode
    /// context. The full ordered request history comes back either way.
    pub fn run(&self, direction: MigrationDirection) -> Result<MigrationResult, MigrationError> {
        let facade = GatewayFacade::new(self.project_root.clone(), (self.client_builder)());
        let mut cheatcodes = Cheatcodes::new(facade, self.resolver.clone())
            .with_credentials(self.credentials.clone());
        if let Some(token) = &self.declare_token {
            cheatcodes = cheatcodes.with_declare_token(token.clone());
        }

        tracing::info!(%direction, "running migration");
        let outcome = match direction {
            MigrationDirection::Up => self.script.up(&mut cheatcodes),
            MigrationDirection::Down => self.script.down(&mut cheatcodes),
        };
        let requests = cheatcodes.requests();
        match outcome {
            Ok(()) => Ok(MigrationResult { direction, requests }),
            Err(source) => Err(MigrationError::ScriptFailed { direction, source, requests }),
        }
    }
}
