use std::num::NonZeroU16;
use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::core::audit_log::AuditLog;
use crate::core::executor::TransferExecutor;
use crate::core::models::{TransferOutcome, TransferRequest};
use crate::core::transfer_engine::{TransferEngine, create_engine};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Single entry point shared by the CLI, the menu and the web UI.
pub struct Orchestrator {
    executor: TransferExecutor,
    audit: Arc<AuditLog>,
}

impl Orchestrator {
    pub fn new(engine: Box<dyn TransferEngine>, audit: Arc<AuditLog>) -> Self {
        Self {
            executor: TransferExecutor::new(engine, audit.clone()),
            audit,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let engine = create_engine(config.transfer_engine, config.scp_program.clone());
        let audit = Arc::new(AuditLog::new(&config.log_file));
        Self::new(engine, audit)
    }

    pub async fn copy_file(
        &self,
        source: impl Into<String>,
        destination: impl Into<String>,
        port: NonZeroU16,
    ) -> TransferOutcome {
        let req = TransferRequest::new(source, destination, port);
        self.executor.copy(&req).await
    }

    /// Last `limit` raw audit lines, oldest first. Read faults yield an empty list.
    pub async fn recent_history(&self, limit: usize) -> Vec<String> {
        self.audit.tail(limit).await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read transfer history");
            Vec::new()
        })
    }

    /// Destination of the latest logged transfer, for pre-filling forms.
    pub async fn suggested_destination(&self) -> Option<String> {
        self.audit.last_destination().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read last destination");
            None
        })
    }
}
