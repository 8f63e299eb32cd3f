use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use xscp::cli::{self, Cli, Mode, tui};
use xscp::logging::{self, LogConfig};
use xscp::{config, context, web};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let mode = args.mode();

    let config = config::AppConfig::new(args.config.as_deref(), Some(&args.overrides))?;

    logging::init(LogConfig {
        json: config.json_logs,
        verbose: config.verbose,
        enabled: mode.logs_to_stderr(config.verbose),
    });

    let port = args.port.unwrap_or(config.default_port);
    let ctx = context::AppContext::new(config);

    match mode {
        Mode::PrintConfig => print!("{}", ctx.config.to_toml()?),
        Mode::Web => run_web(ctx).await.context("Failed to run web UI")?,
        Mode::History => cli::print_history(&ctx).await,
        Mode::Copy { source, dest } => {
            return Ok(cli::run_copy(&ctx, &source, &dest, port).await);
        }
        Mode::Interactive { source, dest } => {
            let prefill = tui::Prefill {
                source,
                destination: dest,
                port: args.port,
            };
            tui::run(ctx, prefill).await.context("Menu exited with an error")?
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_web(ctx: context::AppContext) -> Result<()> {
    let sandbox = ctx.sandbox()?;
    let server = Arc::new(web::WebServer::new(&ctx, sandbox));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down web UI");
            signal_server.shutdown();
        }
    });

    println!("Web UI running at http://{}", ctx.config.web_bind);
    server.start().await
}
