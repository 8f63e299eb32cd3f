//! Menu application state and logic.

use std::num::NonZeroU16;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::core::{EntryKind, Listing, Orchestrator, PathSandbox, TransferRequest};

pub const MENU_ITEMS: [&str; 4] = ["Copy File", "Browse Directory", "View Transfer Log", "Exit"];

const MENU_COPY: usize = 0;
const MENU_BROWSE: usize = 1;
const MENU_LOG: usize = 2;
const MENU_EXIT: usize = 3;

/// Current view being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Menu { selected: usize },
    /// Directory browser; Enter on a file picks it as the copy source.
    Browse { selected: usize },
    Form { focus: Field },
    Log { scroll: u16 },
}

impl Default for View {
    fn default() -> Self {
        View::Menu { selected: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Source,
    Destination,
    Port,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Source => Field::Destination,
            Field::Destination => Field::Port,
            Field::Port => Field::Source,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Source => Field::Port,
            Field::Destination => Field::Source,
            Field::Port => Field::Destination,
        }
    }
}

/// Whether keystrokes navigate or type into a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Navigate,
    Edit,
}

/// Actions that can be triggered by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Select,
    Back,
    Parent,
    NextField,
    PrevField,
    Input(char),
    Backspace,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyForm {
    pub source: String,
    pub destination: String,
    pub port: String,
}

impl CopyForm {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Source => &self.source,
            Field::Destination => &self.destination,
            Field::Port => &self.port,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Source => &mut self.source,
            Field::Destination => &mut self.destination,
            Field::Port => &mut self.port,
        }
    }
}

/// Last message shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub success: bool,
    pub message: String,
}

pub struct TuiApp {
    orchestrator: Arc<Orchestrator>,
    /// The menu browses the whole filesystem, unlike the web UI.
    browser: PathSandbox,
    history_limit: usize,
    default_port: NonZeroU16,
    pub view: View,
    pub listing: Listing,
    pub form: CopyForm,
    pub history: Vec<String>,
    pub status: Option<Status>,
    /// Transfer queued by the form, run by the event loop after a redraw.
    pub pending: Option<TransferRequest>,
    pub running: bool,
}

impl TuiApp {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        start_dir: &Path,
        history_limit: usize,
        default_port: NonZeroU16,
    ) -> Result<Self> {
        let browser = PathSandbox::new("/")?;
        let listing = browser.list(start_dir);

        Ok(Self {
            orchestrator,
            browser,
            history_limit,
            default_port,
            view: View::default(),
            listing,
            form: CopyForm::default(),
            history: Vec::new(),
            status: None,
            pending: None,
            running: true,
        })
    }

    pub fn input_mode(&self) -> InputMode {
        match self.view {
            View::Form { .. } => InputMode::Edit,
            _ => InputMode::Navigate,
        }
    }

    /// Handle an action and update state accordingly.
    pub async fn handle_action(&mut self, action: Action) {
        match (self.view.clone(), action) {
            (_, Action::Quit) => self.running = false,
            (View::Menu { .. }, Action::Back) => {}
            (_, Action::Back) => self.view = View::Menu { selected: 0 },

            (View::Menu { selected }, Action::Up) => {
                self.view = View::Menu {
                    selected: selected.saturating_sub(1),
                }
            }
            (View::Menu { selected }, Action::Down) => {
                self.view = View::Menu {
                    selected: (selected + 1).min(MENU_ITEMS.len() - 1),
                }
            }
            (View::Menu { selected }, Action::Select) => self.open_menu_item(selected).await,

            (View::Browse { selected }, Action::Up) => {
                self.view = View::Browse {
                    selected: selected.saturating_sub(1),
                }
            }
            (View::Browse { selected }, Action::Down) => {
                let last = self.listing.items.len().saturating_sub(1);
                self.view = View::Browse {
                    selected: (selected + 1).min(last),
                }
            }
            (View::Browse { selected }, Action::Select) => self.select_entry(selected).await,
            (View::Browse { .. }, Action::Parent) => {
                if let Some(parent) = self.listing.parent_path.clone() {
                    self.browse(&parent);
                }
            }

            (View::Form { focus }, Action::NextField | Action::Down) => {
                self.view = View::Form {
                    focus: focus.next(),
                }
            }
            (View::Form { focus }, Action::PrevField | Action::Up) => {
                self.view = View::Form {
                    focus: focus.prev(),
                }
            }
            (View::Form { focus }, Action::Input(c)) => {
                if focus != Field::Port || c.is_ascii_digit() {
                    self.form.field_mut(focus).push(c);
                }
            }
            (View::Form { focus }, Action::Backspace) => {
                self.form.field_mut(focus).pop();
            }
            (View::Form { .. }, Action::Select) => self.submit(),

            (View::Log { scroll }, Action::Up) => {
                self.view = View::Log {
                    scroll: scroll.saturating_sub(1),
                }
            }
            (View::Log { scroll }, Action::Down) => {
                self.view = View::Log {
                    scroll: scroll.saturating_add(1),
                }
            }

            _ => {}
        }
    }

    async fn open_menu_item(&mut self, selected: usize) {
        match selected {
            MENU_COPY => self.open_form().await,
            MENU_BROWSE => {
                let current = self.listing.current_path.clone();
                self.browse(&current);
            }
            MENU_LOG => {
                self.history = self.orchestrator.recent_history(self.history_limit).await;
                self.view = View::Log { scroll: 0 };
            }
            MENU_EXIT => self.running = false,
            _ => {}
        }
    }

    fn browse(&mut self, path: &Path) {
        self.listing = self.browser.list(path);
        self.view = View::Browse { selected: 0 };
    }

    async fn select_entry(&mut self, selected: usize) {
        let Some(entry) = self.listing.items.get(selected).cloned() else {
            return;
        };

        match entry.kind {
            EntryKind::Folder => self.browse(&entry.path),
            EntryKind::File => {
                self.form.source = entry.path.to_string_lossy().into_owned();
                self.open_form().await;
            }
        }
    }

    /// Show the copy form, pre-filling destination and port when empty.
    pub async fn open_form(&mut self) {
        if self.form.destination.is_empty() {
            if let Some(dest) = self.orchestrator.suggested_destination().await {
                self.form.destination = dest;
            }
        }
        if self.form.port.is_empty() {
            self.form.port = self.default_port.to_string();
        }

        let focus = if self.form.source.is_empty() {
            Field::Source
        } else {
            Field::Destination
        };
        self.view = View::Form { focus };
    }

    fn submit(&mut self) {
        let source = self.form.source.trim();
        let destination = self.form.destination.trim();

        if source.is_empty() || destination.is_empty() {
            self.status = Some(Status {
                success: false,
                message: "Source and destination are required".to_string(),
            });
            return;
        }

        let Ok(port) = self.form.port.trim().parse::<NonZeroU16>() else {
            self.status = Some(Status {
                success: false,
                message: format!("Invalid port: {}", self.form.port),
            });
            return;
        };

        // Relative sources are taken against the browsed directory
        let source = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            self.listing.current_path.join(source)
        };

        self.pending = Some(TransferRequest::new(
            source.to_string_lossy(),
            destination,
            port,
        ));
        self.status = None;
    }

    /// Run the queued transfer, if any, and record its outcome in the status line.
    pub async fn run_pending(&mut self) {
        let Some(req) = self.pending.take() else {
            return;
        };

        let outcome = self
            .orchestrator
            .copy_file(req.source, req.destination, req.port)
            .await;

        self.status = Some(Status {
            success: outcome.success,
            message: outcome.message,
        });
    }
}
