//! Interactive menu for xscp.
//!
//! Copy a file, browse directories, or review the transfer log without
//! remembering command-line flags.

mod app;
mod input;
mod ui;

use std::io::{self, stdout};
use std::num::NonZeroU16;

use anyhow::{Context, Result};
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::context::AppContext;
use app::TuiApp;

/// Values given on the command line that seed the copy form.
#[derive(Debug, Default, Clone)]
pub struct Prefill {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub port: Option<NonZeroU16>,
}

/// Run the menu until the user exits.
pub async fn run(ctx: AppContext, prefill: Prefill) -> Result<()> {
    let start_dir = std::env::current_dir().context("Failed to determine working directory")?;
    let mut app = TuiApp::new(
        ctx.orchestrator.clone(),
        &start_dir,
        ctx.config.history_limit,
        ctx.config.default_port,
    )?;
    app.form.source = prefill.source.unwrap_or_default();
    app.form.destination = prefill.destination.unwrap_or_default();
    if let Some(port) = prefill.port {
        app.form.port = port.to_string();
    }

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Blocking read; nothing updates in the background
        let event = event::read()?;
        if let Some(action) = input::handle_event(event, app.input_mode()) {
            app.handle_action(action).await;
        }

        if app.pending.is_some() {
            // Show "Transferring..." before blocking on the transfer
            terminal.draw(|frame| ui::render(frame, app))?;
            app.run_pending().await;
        }
    }

    Ok(())
}
