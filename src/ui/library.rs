use crate::api::VideoApi;
use crate::app::App;
use crate::controller::LibraryState;
use crate::dom::{Document, ids};
use crate::render::{THUMBNAIL_PLACEHOLDER, URL_DISPLAY_MAX, format_date, truncate_str, truncate_url};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{banner, key_hint};

pub fn render<A: VideoApi>(app: &App<A>, frame: &mut Frame) {
    let area = frame.area();
    let doc = app.doc();
    let videos = app.controller.library();

    // Layout: header(3) + banner(1) + grid(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let header = Paragraph::new(format!(
        " vidmark   Preview  [Library]   {} videos",
        videos.len()
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Left)
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, chunks[0]);

    frame.render_widget(banner(app), chunks[1]);

    let grid_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Library ");

    // ── Empty state ──
    if !doc.is_hidden(ids::EMPTY_LIBRARY) || videos.is_empty() {
        let message = if !doc.is_hidden(ids::EMPTY_LIBRARY) {
            "\n  Your library is empty. Preview a video and save it (Tab)."
        } else if app.controller.library_state() == LibraryState::Failed {
            "\n  Could not load the library. Press r to retry."
        } else {
            ""
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(grid_block);
        frame.render_widget(empty, chunks[2]);
    } else {
        // ── Cards ──
        let title_width = (area.width as usize).saturating_sub(URL_DISPLAY_MAX + 24).max(12);
        let items: Vec<ListItem> = videos
            .iter()
            .map(|video| {
                let thumb = if video.thumbnail_url().is_some() {
                    "🖼 "
                } else {
                    THUMBNAIL_PLACEHOLDER
                };
                let line = Line::from(vec![
                    Span::styled(
                        format!("{:>4} ", video.id),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(format!("{} ", thumb)),
                    Span::styled(
                        format!(
                            "{:<width$}",
                            truncate_str(&video.title, title_width),
                            width = title_width
                        ),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("  {}", truncate_url(&video.source_url, URL_DISPLAY_MAX)),
                        Style::default().fg(Color::Blue),
                    ),
                    Span::styled(
                        format!("  {}", format_date(&video.created_at)),
                        Style::default().fg(Color::Yellow),
                    ),
                ]);
                ListItem::new(line)
            })
            .collect();

        let position = format!(
            " {} of {} ",
            (app.list_selected + 1).min(videos.len()),
            videos.len()
        );

        let list_widget = List::new(items)
            .block(grid_block.title_bottom(Line::from(position).alignment(Alignment::Right)))
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");

        let mut list_state = ListState::default();
        list_state.select(Some(app.list_selected));
        frame.render_stateful_widget(list_widget, chunks[2], &mut list_state);
    }

    // ── Status bar ──
    let mut spans = Vec::new();
    spans.extend(key_hint(" ↑↓", " Navigate  "));
    spans.extend(key_hint("Enter", " Open  "));
    spans.extend(key_hint("d", " Delete  "));
    spans.extend(key_hint("r", " Reload  "));
    spans.extend(key_hint("Tab", " Preview  "));
    spans.extend(key_hint("?", " Help  "));
    spans.push(Span::styled(
        app.status_msg.as_str(),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[3]);
}
