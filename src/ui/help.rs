use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::centered_rect;

fn section(title: &str) -> Line<'_> {
    Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )])
}

fn binding<'a>(keys: &'a str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(keys, Style::default().fg(Color::Yellow)),
        Span::raw(action),
    ])
}

pub fn render(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(""),
        section("  Global"),
        binding("    ?         ", "Toggle this help"),
        binding("    Tab       ", "Switch between Preview and Library"),
        binding("    q         ", "Quit application"),
        binding("    Ctrl+C    ", "Quit from anywhere"),
        Line::from(""),
        section("  Preview Page"),
        binding("    i or /    ", "Edit the video URL"),
        binding("    Enter     ", "Preview the URL"),
        binding("    Esc       ", "Stop editing"),
        binding("    s         ", "Save the previewed video"),
        binding("    +/-       ", "Change playback speed (native video only)"),
        binding("    x         ", "Clear the URL"),
        Line::from(""),
        section("  Library Page"),
        binding("    ↑/k ↓/j   ", "Navigate videos"),
        binding("    Enter     ", "Open video"),
        binding("    d         ", "Delete video"),
        binding("    r         ", "Reload library"),
        Line::from(""),
        section("  Video Window"),
        binding("    +/-       ", "Change playback speed (native video only)"),
        binding("    Esc/q     ", "Close and stop playback"),
        Line::from(""),
    ];

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help: Keybindings ")
                .title_bottom(Line::from(" Press ? or Esc to close ").style(Style::default().fg(Color::DarkGray))),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}
