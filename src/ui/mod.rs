mod confirm;
mod help;
mod home;
mod library;
mod modal;

use crate::api::VideoApi;
use crate::app::{App, View};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Top-level render dispatch.
pub fn render<A: VideoApi>(app: &App<A>, frame: &mut Frame) {
    match app.view {
        View::Home => home::render(app, frame),
        View::Library => library::render(app, frame),
    }

    // Overlays, innermost last
    if app.modal_open() {
        modal::render(app, frame);
    }
    if app.pending_delete.is_some() {
        confirm::render(frame);
    }
    if app.show_help {
        help::render(frame);
    }
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// Status-bar key hint: highlighted key followed by its label.
fn key_hint<'a>(key: &'a str, label: &'a str) -> [Span<'a>; 2] {
    [
        Span::styled(
            key,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(label),
    ]
}

/// One-line banner: the error message if shown, else the loading indicator.
fn banner<A: VideoApi>(app: &App<A>) -> Paragraph<'static> {
    use crate::dom::{Document, ids};

    if let Some(message) = app.error_banner() {
        Paragraph::new(Line::from(vec![
            Span::styled(" ✖ ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled(message, Style::default().fg(Color::Red)),
        ]))
    } else if !app.doc().is_hidden(ids::LOADING) {
        Paragraph::new(Span::styled(" Loading...", Style::default().fg(Color::Yellow)))
    } else {
        Paragraph::new("")
    }
}
