//! Command-line surface: argument parsing, mode selection and the one-shot
//! operations. The interactive menu lives in [`tui`].

pub mod tui;

use std::net::SocketAddr;
use std::num::NonZeroU16;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser};
use serde::Serialize;

use crate::context::AppContext;
use crate::core::transfer_engine::TransferEngineType;

#[derive(Parser, Debug)]
#[command(name = "xscp")]
#[command(about = "A simple SCP tool with CLI, menu, and web interfaces", long_about = None)]
pub struct Cli {
    /// Source file path
    #[arg(short, long)]
    pub source: Option<String>,

    /// Destination (e.g. user@host:/path)
    #[arg(short, long)]
    pub dest: Option<String>,

    /// SSH port [default: 22]
    #[arg(short, long)]
    pub port: Option<NonZeroU16>,

    /// Launch the web UI
    #[arg(short, long)]
    pub web: bool,

    /// Print recent transfers and exit
    #[arg(short = 'l', long)]
    pub history: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Config file [default: ./xscp.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Command-line values layered on top of the config file and environment.
#[derive(Args, Serialize, Debug, Default)]
pub struct ConfigOverrides {
    /// Audit log file
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Root directory exposed by the web file browser
    #[serde(rename = "safe_root", skip_serializing_if = "Option::is_none")]
    #[arg(long = "root")]
    pub root: Option<PathBuf>,

    /// Web UI listen address
    #[serde(rename = "web_bind", skip_serializing_if = "Option::is_none")]
    #[arg(long = "bind")]
    pub bind: Option<SocketAddr>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, value_enum)]
    pub transfer_engine: Option<TransferEngineType>,

    /// Program launched by the scp engine
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    pub scp_program: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(short, long, num_args = 0..=1, default_missing_value = "true")]
    pub verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub json_logs: Option<bool>,
}

/// What the process should do, decided from the parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    PrintConfig,
    Web,
    History,
    Copy {
        source: String,
        dest: String,
    },
    /// Partial source/destination arguments pre-fill the menu's copy form.
    Interactive {
        source: Option<String>,
        dest: Option<String>,
    },
}

impl Mode {
    /// Whether diagnostics go to stderr. The menu owns the terminal, so it
    /// only logs when asked to be verbose.
    pub fn logs_to_stderr(&self, verbose: bool) -> bool {
        verbose || !matches!(self, Mode::Interactive { .. })
    }
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.print_config {
            return Mode::PrintConfig;
        }
        if self.web {
            return Mode::Web;
        }
        if self.history {
            return Mode::History;
        }

        match (&self.source, &self.dest) {
            (Some(source), Some(dest)) => Mode::Copy {
                source: source.clone(),
                dest: dest.clone(),
            },
            _ => Mode::Interactive {
                source: self.source.clone(),
                dest: self.dest.clone(),
            },
        }
    }
}

/// Run one transfer and report it on stdout. Exit status mirrors the outcome.
pub async fn run_copy(ctx: &AppContext, source: &str, dest: &str, port: NonZeroU16) -> ExitCode {
    let outcome = ctx.orchestrator.copy_file(source, dest, port).await;

    if outcome.success {
        println!("[OK] {}", outcome.message);
        ExitCode::SUCCESS
    } else {
        println!("[FAILED] {}", outcome.message);
        ExitCode::FAILURE
    }
}

pub async fn print_history(ctx: &AppContext) {
    let lines = ctx
        .orchestrator
        .recent_history(ctx.config.history_limit)
        .await;

    if lines.is_empty() {
        println!("No transfers logged yet.");
        return;
    }

    println!("=== Transfer History (Last {}) ===", ctx.config.history_limit);
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("xscp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_arguments_is_interactive() {
        assert_eq!(
            parse(&[]).mode(),
            Mode::Interactive {
                source: None,
                dest: None
            }
        );
    }

    #[test]
    fn test_source_and_dest_is_copy() {
        let cli = parse(&["-s", "a.txt", "-d", "u@h:/tmp", "-p", "2222"]);
        assert_eq!(
            cli.mode(),
            Mode::Copy {
                source: "a.txt".into(),
                dest: "u@h:/tmp".into()
            }
        );
        assert_eq!(cli.port.map(NonZeroU16::get), Some(2222));
    }

    #[test]
    fn test_partial_copy_args_fall_back_to_menu() {
        assert_eq!(
            parse(&["--source", "a.txt"]).mode(),
            Mode::Interactive {
                source: Some("a.txt".into()),
                dest: None
            }
        );
    }

    #[test]
    fn test_web_wins_over_copy_args() {
        assert_eq!(parse(&["-w", "-s", "a", "-d", "b"]).mode(), Mode::Web);
        assert_eq!(parse(&["--history"]).mode(), Mode::History);
    }

    #[test]
    fn test_menu_logs_only_when_verbose() {
        let menu = parse(&[]).mode();
        assert!(!menu.logs_to_stderr(false));
        assert!(menu.logs_to_stderr(true));
        assert!(parse(&["-s", "a", "-d", "b"]).mode().logs_to_stderr(false));
    }

    #[test]
    fn test_zero_port_is_rejected() {
        assert!(Cli::try_parse_from(["xscp", "-s", "a", "-d", "b", "-p", "0"]).is_err());
    }

    #[test]
    fn test_overrides_serialize_only_given_fields() {
        let cli = parse(&["--root", "/srv", "--verbose", "--transfer-engine", "simulated"]);
        let value = serde_json::to_value(&cli.overrides).unwrap();

        assert_eq!(value["safe_root"], "/srv");
        assert_eq!(value["verbose"], true);
        assert_eq!(value["transfer_engine"], "simulated");
        assert!(value.get("log_file").is_none());
        assert!(value.get("json_logs").is_none());
    }
}
