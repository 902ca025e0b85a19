use crate::api::VideoApi;
use crate::app::{App, PLAYBACK_SPEEDS};
use crate::dom::{Document, ids};
use crate::render::{embed_source, format_date};
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::centered_rect;

pub fn render<A: VideoApi>(app: &App<A>, frame: &mut Frame) {
    let area = centered_rect(75, 50, frame.area());
    let doc = app.doc();

    frame.render_widget(Clear, area);

    let title = doc.text(ids::MODAL_VIDEO_TITLE).unwrap_or_default();
    let player_html = doc.inner_html(ids::MODAL_VIDEO_PLAYER).unwrap_or_default();
    let player = embed_source(&player_html).unwrap_or_else(|| "embedded player".to_string());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", title),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(video) = app.controller.modal_video() {
        lines.push(Line::from(vec![
            Span::styled(" Source: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                video.source_url.clone(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled(" Saved:  ", Style::default().fg(Color::DarkGray)),
            Span::styled(format_date(&video.created_at), Style::default().fg(Color::Yellow)),
        ]));
    }

    lines.push(Line::from(vec![
        Span::styled(" Player: ", Style::default().fg(Color::DarkGray)),
        Span::styled(player, Style::default().fg(Color::White)),
    ]));
    lines.push(Line::from(vec![
        Span::styled(" Speed:  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}x", PLAYBACK_SPEEDS[app.modal_speed_index]),
            Style::default().fg(Color::Yellow),
        ),
    ]));

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Video ")
                .title_bottom(
                    Line::from(" Esc close   +/- speed ").style(Style::default().fg(Color::DarkGray)),
                ),
        );

    frame.render_widget(modal, area);
}
