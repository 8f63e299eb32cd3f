use std::net::{Ipv4Addr, SocketAddr};
use std::num::NonZeroU16;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use nix::unistd::{Uid, User};
use serde::{Deserialize, Serialize};

use crate::core::orchestrator::DEFAULT_HISTORY_LIMIT;
use crate::core::transfer_engine::TransferEngineType;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "xscp.toml";
pub const ENV_PREFIX: &str = "XSCP_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_file: PathBuf,
    /// Root exposed by the web file browser. Defaults to the user's home.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_root: Option<PathBuf>,
    pub transfer_engine: TransferEngineType,
    pub scp_program: PathBuf,
    pub default_port: NonZeroU16,
    pub history_limit: usize,
    pub web_bind: SocketAddr,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("xscp.log"),
            safe_root: None,
            transfer_engine: TransferEngineType::Scp,
            scp_program: PathBuf::from("scp"),
            default_port: NonZeroU16::new(22).unwrap_or(NonZeroU16::MIN),
            history_limit: DEFAULT_HISTORY_LIMIT,
            web_bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 5000)),
            verbose: false,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Load defaults, then the TOML file, then `XSCP_*` variables, then `overrides`.
    ///
    /// `overrides` is usually the parsed command line; fields it leaves out
    /// (skipped during serialization) do not clobber lower layers.
    ///
    /// A file named explicitly must exist; only the implicit `xscp.toml` is optional.
    pub fn new<T: Serialize>(config_file: Option<&Path>, overrides: Option<&T>) -> Result<Self> {
        if let Some(file) = config_file.filter(|f| !f.exists()) {
            anyhow::bail!("Config file {} not found", file.display());
        }
        let file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX));

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .context("Failed to load configuration")
    }

    /// The configured sandbox root, or the invoking user's home directory.
    pub fn resolved_safe_root(&self) -> Result<PathBuf> {
        match &self.safe_root {
            Some(root) => Ok(root.clone()),
            None => home_dir().context("Could not determine home directory for the file browser"),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// `$HOME`, falling back to the password database entry for the current uid.
pub fn home_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        return Some(PathBuf::from(home));
    }

    User::from_uid(Uid::current()).ok()?.map(|user| user.dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Overrides {
        #[serde(skip_serializing_if = "Option::is_none")]
        log_file: Option<PathBuf>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default_port: Option<u16>,
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.log_file, PathBuf::from("xscp.log"));
        assert_eq!(config.default_port.get(), 22);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.web_bind.to_string(), "127.0.0.1:5000");
        assert_eq!(config.transfer_engine, TransferEngineType::Scp);
    }

    #[test]
    fn test_toml_layer_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(
            Toml::string(
                r#"
                log_file = "/var/log/xscp.log"
                transfer_engine = "simulated"
                web_bind = "0.0.0.0:8080"
                "#,
            ),
        );

        let config = AppConfig::extract(figment).unwrap();
        assert_eq!(config.log_file, PathBuf::from("/var/log/xscp.log"));
        assert_eq!(config.transfer_engine, TransferEngineType::Simulated);
        assert_eq!(config.web_bind.port(), 8080);
        assert_eq!(config.history_limit, 10);
    }

    #[test]
    fn test_overrides_win_and_skipped_fields_keep_lower_layers() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(&file, "log_file = \"from-file.log\"\nhistory_limit = 3\n").unwrap();

        let overrides = Overrides {
            log_file: Some(PathBuf::from("from-cli.log")),
            default_port: None,
        };
        let config = AppConfig::new(Some(file.as_path()), Some(&overrides)).unwrap();

        assert_eq!(config.log_file, PathBuf::from("from-cli.log"));
        assert_eq!(config.history_limit, 3);
        assert_eq!(config.default_port.get(), 22);
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("xscp-typo.toml");

        let err = AppConfig::new::<Overrides>(Some(file.as_path()), None).unwrap_err();
        assert!(err.to_string().contains("xscp-typo.toml"), "{}", err);
        assert!(err.to_string().contains("not found"), "{}", err);
    }

    #[test]
    fn test_zero_port_is_rejected() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("default_port = 0"));
        assert!(AppConfig::extract(figment).is_err());
    }

    #[test]
    fn test_config_dumps_as_toml() {
        let toml = AppConfig::default().to_toml().unwrap();
        assert!(toml.contains("log_file = \"xscp.log\""));
        assert!(!toml.contains("safe_root"));
    }
}
