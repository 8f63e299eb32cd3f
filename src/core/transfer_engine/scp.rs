use crate::core::models::TransferRequest;
use crate::core::transfer_engine::{EngineOutput, LaunchError, TransferEngine};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Runs the system `scp` (or a configured stand-in) as a child process.
pub struct ScpEngine {
    program: PathBuf,
}

impl ScpEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ScpEngine {
    fn default() -> Self {
        Self::new("scp")
    }
}

#[async_trait]
impl TransferEngine for ScpEngine {
    async fn transfer(&self, req: &TransferRequest) -> Result<EngineOutput, LaunchError> {
        debug!(
            program = %self.program.display(),
            source = %req.source,
            destination = %req.destination,
            port = req.port.get(),
            "Launching scp"
        );

        // stdin is null and stdout/stderr are captured by output()
        let output = Command::new(&self.program)
            .arg("-P")
            .arg(req.port.to_string())
            .arg(&req.source)
            .arg(&req.destination)
            .output()
            .await
            .map_err(|source| LaunchError {
                program: self.program.display().to_string(),
                source,
            })?;

        Ok(EngineOutput {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
