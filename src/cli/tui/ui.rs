//! UI rendering for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::core::EntryKind;

use super::app::{Field, MENU_ITEMS, TuiApp, View};

const BANNER: [&str; 2] = ["XScp  (⌐■_■)", "Simple SCP tool designed for simplicity"];

/// Purple shades, one per banner line.
const BANNER_COLORS: [u8; 2] = [93, 105];

/// Main render function - dispatches to view-specific renderers.
pub fn render(frame: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Banner
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/help
        ])
        .split(frame.area());

    render_banner(frame, chunks[0]);

    match &app.view {
        View::Menu { selected } => render_menu(frame, chunks[1], *selected),
        View::Browse { selected } => render_browser(frame, app, chunks[1], *selected),
        View::Form { focus } => render_form(frame, app, chunks[1], *focus),
        View::Log { scroll } => render_log(frame, app, chunks[1], *scroll),
    }

    render_footer(frame, app, chunks[2]);
}

fn render_banner(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = BANNER
        .iter()
        .zip(BANNER_COLORS)
        .map(|(text, color)| {
            Line::from(Span::styled(
                format!("  {}", text),
                Style::default()
                    .fg(Color::Indexed(color))
                    .add_modifier(Modifier::BOLD),
            ))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::Indexed(99)));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn highlight(is_selected: bool) -> Style {
    if is_selected {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn render_menu(frame: &mut Frame, area: Rect, selected: usize) {
    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let is_selected = i == selected;
            let line = Line::from(vec![
                Span::raw(if is_selected { "> " } else { "  " }),
                Span::raw(format!("{}) {}", i + 1, label)),
            ]);
            ListItem::new(line).style(highlight(is_selected))
        })
        .collect();

    let block = Block::default()
        .title("Menu")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(List::new(items).block(block), area);
}

fn render_browser(frame: &mut Frame, app: &TuiApp, area: Rect, selected: usize) {
    let block = Block::default()
        .title(format!("📂 {}", app.listing.current_path.display()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.listing.items.is_empty() {
        let text = Paragraph::new("  (empty or unreadable)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    // Keep the selection on screen in long directories
    let visible = area.height.saturating_sub(2) as usize;
    let skip = (selected + 1).saturating_sub(visible);

    let items: Vec<ListItem> = app
        .listing
        .items
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, entry)| {
            let is_selected = i == selected;
            let (icon, color) = match entry.kind {
                EntryKind::Folder => ("📂", Color::Yellow),
                EntryKind::File => ("📄", Color::White),
            };
            let line = Line::from(vec![
                Span::raw(if is_selected { "> " } else { "  " }),
                Span::raw(format!("{} ", icon)),
                Span::styled(entry.name.clone(), Style::default().fg(color)),
            ]);
            ListItem::new(line).style(highlight(is_selected))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_form(frame: &mut Frame, app: &TuiApp, area: Rect, focus: Field) {
    let block = Block::default()
        .title("Copy File")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let fields = [
        (Field::Source, "Source:      "),
        (Field::Destination, "Destination: "),
        (Field::Port, "Port:        "),
    ];

    let mut lines: Vec<Line> = fields
        .iter()
        .map(|(field, label)| {
            let focused = *field == focus;
            let value = app.form.field(*field);
            let value_style = if focused {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(format!("  {}", label), Style::default().fg(Color::Cyan)),
                Span::styled(value.to_string(), value_style),
                Span::raw(if focused { "_" } else { "" }),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    if app.form.destination.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Destination format: user@host:/path",
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_log(frame: &mut Frame, app: &TuiApp, area: Rect, scroll: u16) {
    let block = Block::default()
        .title(format!("Transfer History (Last {})", app.history.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.history.is_empty() {
        let text = Paragraph::new("  No transfers logged yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let lines: Vec<Line> = app
        .history
        .iter()
        .map(|line| {
            let color = if line.ends_with("SUCCESS") {
                Color::Green
            } else if line.ends_with("FAILED") || line.ends_with("ERROR") {
                Color::Red
            } else {
                Color::Gray
            };
            Line::from(Span::styled(format!("  {}", line), Style::default().fg(color)))
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let help_text = match &app.view {
        View::Menu { .. } => "[↑↓] Navigate  [Enter] Select  [q] Quit",
        View::Browse { .. } => "[↑↓] Navigate  [Enter] Open/Pick  [←] Parent  [Esc] Menu  [q] Quit",
        View::Form { .. } => "[Tab] Next field  [Enter] Copy  [Esc] Menu  [Ctrl-C] Quit",
        View::Log { .. } => "[↑↓] Scroll  [Esc] Menu  [q] Quit",
    };

    let mut spans = vec![Span::raw(format!("  {}", help_text))];

    if app.pending.is_some() {
        spans.push(Span::styled(
            "  Transferring...",
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(status) = &app.status {
        let (prefix, color) = if status.success {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };
        spans.push(Span::styled(
            format!("  {} {}", prefix, status.message),
            Style::default().fg(color),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
