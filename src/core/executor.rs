use std::sync::Arc;

use tracing::{Instrument, error, info, info_span, warn};

use super::audit_log::AuditLog;
use super::models::{TransferOutcome, TransferRecord, TransferRequest, TransferStatus};
use super::transfer_engine::TransferEngine;

pub const SUCCESS_MESSAGE: &str = "Transfer successful!";

/// Runs transfers through an engine and records every attempt.
///
/// `copy` never returns an error: launch faults, non-zero exits and audit
/// write failures all end up in the returned `TransferOutcome` or the
/// diagnostic log.
pub struct TransferExecutor {
    engine: Box<dyn TransferEngine>,
    audit: Arc<AuditLog>,
}

impl TransferExecutor {
    pub fn new(engine: Box<dyn TransferEngine>, audit: Arc<AuditLog>) -> Self {
        Self { engine, audit }
    }

    pub async fn copy(&self, req: &TransferRequest) -> TransferOutcome {
        let span = info_span!(
            "transfer",
            source = %req.source,
            destination = %req.destination,
            port = req.port.get()
        );

        async {
            info!("Starting transfer");

            let (status, outcome) = match self.engine.transfer(req).await {
                Ok(output) if output.success() => {
                    info!("Transfer successful");
                    (TransferStatus::Success, TransferOutcome::success(SUCCESS_MESSAGE))
                }
                Ok(output) => {
                    let stderr = output.stderr.trim();
                    let message = if stderr.is_empty() {
                        match output.exit_code {
                            Some(code) => format!("Transfer failed with exit code {}", code),
                            None => "Transfer was terminated before completing".to_string(),
                        }
                    } else {
                        stderr.to_string()
                    };
                    warn!(exit_code = ?output.exit_code, error = %message, "Transfer failed");
                    (TransferStatus::Failed, TransferOutcome::failure(message))
                }
                Err(e) => {
                    error!(error = %e, "Transfer could not be started");
                    (TransferStatus::Error, TransferOutcome::failure(e.to_string()))
                }
            };

            let record = TransferRecord::now(req, status);
            if let Err(e) = self.audit.append(&record).await {
                error!(error = %e, status = %status, "Failed to write audit record");
            }

            outcome
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transfer_engine::{EngineOutput, LaunchError};
    use async_trait::async_trait;
    use std::num::NonZeroU16;
    use tempfile::tempdir;

    /// Engine that replays a fixed result.
    enum Canned {
        Exit(Option<i32>, &'static str),
        Launch,
    }

    #[async_trait]
    impl TransferEngine for Canned {
        async fn transfer(&self, _req: &TransferRequest) -> Result<EngineOutput, LaunchError> {
            match self {
                Canned::Exit(code, stderr) => Ok(EngineOutput {
                    exit_code: *code,
                    stderr: stderr.to_string(),
                }),
                Canned::Launch => Err(LaunchError {
                    program: "scp".to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            }
        }
    }

    fn request() -> TransferRequest {
        TransferRequest::new("/tmp/a.txt", "u@h:/srv", NonZeroU16::new(22).unwrap())
    }

    async fn run(engine: Canned) -> (TransferOutcome, Vec<String>) {
        let dir = tempdir().unwrap();
        let audit = Arc::new(AuditLog::new(dir.path().join("xscp.log")));
        let executor = TransferExecutor::new(Box::new(engine), audit.clone());
        let outcome = executor.copy(&request()).await;
        let lines = audit.tail(100).await.unwrap();
        (outcome, lines)
    }

    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let (outcome, lines) = run(Canned::Exit(Some(0), "")).await;
        assert_eq!(outcome, TransferOutcome::success(SUCCESS_MESSAGE));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("STATUS: SUCCESS"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_returns_trimmed_stderr() {
        let (outcome, lines) = run(Canned::Exit(Some(1), "  ssh: connect refused \n")).await;
        assert_eq!(outcome, TransferOutcome::failure("ssh: connect refused"));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("STATUS: FAILED"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_stderr_uses_generic_message() {
        let (outcome, _) = run(Canned::Exit(Some(255), " ")).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Transfer failed with exit code 255");

        let (outcome, lines) = run(Canned::Exit(None, "")).await;
        assert!(!outcome.success);
        assert!(lines[0].ends_with("STATUS: FAILED"));
    }

    #[tokio::test]
    async fn test_launch_fault_is_error() {
        let (outcome, lines) = run(Canned::Launch).await;
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("failed to launch scp"));
        assert!(lines[0].ends_with("STATUS: ERROR"));
    }

    #[tokio::test]
    async fn test_audit_failure_keeps_outcome() {
        let dir = tempdir().unwrap();
        // The log path is a directory, so every append fails
        let audit = Arc::new(AuditLog::new(dir.path()));
        let executor = TransferExecutor::new(Box::new(Canned::Exit(Some(0), "")), audit);

        let outcome = executor.copy(&request()).await;
        assert_eq!(outcome, TransferOutcome::success(SUCCESS_MESSAGE));
    }
}
