use crate::api::VideoApi;
use crate::app::{App, InputMode, PLAYBACK_SPEEDS};
use crate::controller::PreviewState;
use crate::dom::{Document, classes, ids};
use crate::render::{embed_source, truncate_str};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use std::time::Instant;
use unicode_width::UnicodeWidthStr;

use super::{banner, key_hint};

pub fn render<A: VideoApi>(app: &App<A>, frame: &mut Frame) {
    let area = frame.area();
    let doc = app.doc();

    // Layout: header(3) + url(3) + banner(1) + preview(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let header = Paragraph::new(" vidmark   [Preview]  Library")
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

    // ── URL bar ──
    let editing = app.input_mode == InputMode::Editing;
    let busy = doc.is_disabled(ids::PREVIEW_BTN);
    let url_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let button_label = doc.text(ids::PREVIEW_BTN).unwrap_or_default();
    let url_label = " 🔗 ";
    let url_bar = Paragraph::new(format!("{}{}", url_label, app.url_input))
        .style(url_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(url_style)
                .title(" Video URL ")
                .title_bottom(
                    Line::from(Span::styled(
                        format!(" [{}] ", button_label),
                        if busy {
                            Style::default().fg(Color::DarkGray)
                        } else {
                            Style::default().fg(Color::Cyan)
                        },
                    ))
                    .alignment(Alignment::Right),
                ),
        );
    frame.render_widget(url_bar, chunks[1]);

    if editing {
        let cursor_x = chunks[1].x + 1 + (url_label.width() + app.url_input.width()) as u16;
        let cursor_y = chunks[1].y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    frame.render_widget(banner(app), chunks[2]);

    // ── Preview ──
    let preview_title = match app.controller.preview_state() {
        PreviewState::Previewing => " Preview (loading) ".to_string(),
        PreviewState::Saving => " Preview (saving) ".to_string(),
        PreviewState::Saved => match app.controller.revert_due() {
            Some(due) => format!(
                " Preview (saved, {:.1}s) ",
                due.saturating_duration_since(Instant::now()).as_secs_f32()
            ),
            None => " Preview (saved) ".to_string(),
        },
        PreviewState::Idle | PreviewState::Previewed => " Preview ".to_string(),
    };
    let preview_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(preview_title);

    if doc.is_hidden(ids::VIDEO_PREVIEW) {
        let placeholder = Paragraph::new("\n  Nothing previewed yet. Press i, paste a link and hit Enter.")
            .style(Style::default().fg(Color::DarkGray))
            .block(preview_block);
        frame.render_widget(placeholder, chunks[3]);
    } else {
        let player_html = doc.inner_html(ids::VIDEO_PLAYER).unwrap_or_default();
        let native = player_html.to_ascii_lowercase().contains("<video");
        let player = embed_source(&player_html).unwrap_or_else(|| "embedded player".to_string());
        let width = (area.width as usize).saturating_sub(14);

        let save_label = doc.text(ids::SAVE_VIDEO_BTN).unwrap_or_default();
        let save_style = if doc.has_class(ids::SAVE_VIDEO_BTN, classes::BTN_PRIMARY) {
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
        } else if doc.is_disabled(ids::SAVE_VIDEO_BTN) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(" Title:  ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    truncate_str(&doc.text(ids::VIDEO_TITLE).unwrap_or_default(), width),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled(" Source: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    truncate_str(&doc.text(ids::VIDEO_SOURCE).unwrap_or_default(), width),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                ),
            ]),
            Line::from(vec![
                Span::styled(" Player: ", Style::default().fg(Color::DarkGray)),
                Span::styled(truncate_str(&player, width), Style::default().fg(Color::White)),
            ]),
            Line::from(vec![
                Span::styled(" Speed:  ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{}x", PLAYBACK_SPEEDS[app.speed_index]),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    if native { "" } else { "  (embedded players ignore speed)" },
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(format!(" [ {} ] ", save_label), save_style)),
        ];

        let preview = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(preview_block);
        frame.render_widget(preview, chunks[3]);
    }

    // ── Status bar ──
    let mut spans = Vec::new();
    spans.extend(key_hint(" i", " Edit  "));
    spans.extend(key_hint("Enter", " Preview  "));
    spans.extend(key_hint("s", " Save  "));
    spans.extend(key_hint("+/-", " Speed  "));
    spans.extend(key_hint("Tab", " Library  "));
    spans.extend(key_hint("?", " Help  "));
    spans.push(Span::styled(
        app.status_msg.as_str(),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[4]);
}
