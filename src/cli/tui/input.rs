//! Input handling for the TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{Action, InputMode};

/// Convert a crossterm key event to an Action.
pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    match mode {
        InputMode::Edit => match key.code {
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Enter => Some(Action::Select),
            KeyCode::Tab | KeyCode::Down => Some(Action::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Action::PrevField),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        InputMode::Navigate => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                Some(Action::Select)
            }
            KeyCode::Left | KeyCode::Backspace | KeyCode::Char('h') => Some(Action::Parent),
            _ => None,
        },
    }
}

/// Convert a crossterm Event to an Action.
pub fn handle_event(event: Event, mode: InputMode) -> Option<Action> {
    match event {
        // Windows reports releases too
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(key, mode),
        _ => None,
    }
}
