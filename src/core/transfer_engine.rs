mod scp;
mod simulated;

use std::path::PathBuf;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::TransferRequest;

pub use scp::ScpEngine;
pub use simulated::SimulatedEngine;

/// What the external transfer process reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl EngineOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// The transfer tool could not be started.
#[derive(Debug, Error)]
#[error("failed to launch {program}: {source}")]
pub struct LaunchError {
    pub program: String,
    #[source]
    pub source: std::io::Error,
}

#[async_trait]
pub trait TransferEngine: Send + Sync {
    /// Run one transfer to completion. No timeout is applied.
    async fn transfer(&self, req: &TransferRequest) -> Result<EngineOutput, LaunchError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransferEngineType {
    #[default]
    Scp,
    Simulated,
}

pub fn create_engine(engine_type: TransferEngineType, scp_program: PathBuf) -> Box<dyn TransferEngine> {
    match engine_type {
        TransferEngineType::Scp => Box::new(ScpEngine::new(scp_program)),
        TransferEngineType::Simulated => Box::new(SimulatedEngine::default()),
    }
}
