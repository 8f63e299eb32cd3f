use std::sync::Arc;

use anyhow::Result;

use crate::config::AppConfig;
use crate::core::{Orchestrator, PathSandbox};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let orchestrator = Arc::new(Orchestrator::from_config(&config));
        Self {
            config: Arc::new(config),
            orchestrator,
        }
    }

    /// Sandbox over the configured safe root. Only the web UI needs one.
    pub fn sandbox(&self) -> Result<PathSandbox> {
        let root = self.config.resolved_safe_root()?;
        Ok(PathSandbox::new(root)?)
    }
}
