use crate::core::models::TransferRequest;
use crate::core::transfer_engine::{EngineOutput, LaunchError, TransferEngine};
use async_trait::async_trait;
use std::path::Path;
use tokio::time::{Duration, sleep};

/// Pretends to copy without touching the network.
///
/// The transfer succeeds when the local source exists and fails the way
/// `scp` would when it does not.
pub struct SimulatedEngine {
    pub delay: Duration,
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
        }
    }
}

#[async_trait]
impl TransferEngine for SimulatedEngine {
    async fn transfer(&self, req: &TransferRequest) -> Result<EngineOutput, LaunchError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if Path::new(&req.source).exists() {
            Ok(EngineOutput {
                exit_code: Some(0),
                stderr: String::new(),
            })
        } else {
            Ok(EngineOutput {
                exit_code: Some(1),
                stderr: format!("scp: {}: No such file or directory\n", req.source),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU16;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_existing_source_succeeds() {
        let file = NamedTempFile::new().unwrap();
        let engine = SimulatedEngine {
            delay: Duration::ZERO,
        };
        let req = TransferRequest::new(
            file.path().to_string_lossy(),
            "u@h:/tmp",
            NonZeroU16::new(22).unwrap(),
        );

        let out = engine.transfer(&req).await.unwrap();
        assert!(out.success());
        assert!(out.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_missing_source_fails_like_scp() {
        let engine = SimulatedEngine {
            delay: Duration::ZERO,
        };
        let req = TransferRequest::new(
            "/definitely/not/here.bin",
            "u@h:/tmp",
            NonZeroU16::new(22).unwrap(),
        );

        let out = engine.transfer(&req).await.unwrap();
        assert_eq!(out.exit_code, Some(1));
        assert!(out.stderr.contains("No such file or directory"));
    }
}
