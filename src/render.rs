//! HTML fragments and text formatting for the library view.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use unicode_width::UnicodeWidthChar;

use crate::models::SavedVideo;

/// Default cap for source URLs shown on cards.
pub const URL_DISPLAY_MAX: usize = 50;

/// Shown in place of a thumbnail when the video has none.
pub const THUMBNAIL_PLACEHOLDER: &str = "🎥";

static EMBED_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)src\s*=\s*["']([^"']+)["']"#).expect("valid regex"));

/// Escape text for insertion into HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cap a URL at `max_length` characters, appending `...` when cut.
pub fn truncate_url(url: &str, max_length: usize) -> String {
    match url.char_indices().nth(max_length) {
        None => url.to_string(),
        Some((cut, _)) => format!("{}...", &url[..cut]),
    }
}

/// Render a backend timestamp as `M/D/YYYY`.
///
/// Accepts SQLite's `YYYY-MM-DD HH:MM:SS`, RFC 3339 and bare dates.
/// Timestamps with an offset are shown in the viewer's local date.
pub fn format_date(timestamp: &str) -> String {
    format_date_in(timestamp, &Local)
}

fn format_date_in<Tz: TimeZone>(timestamp: &str, tz: &Tz) -> String {
    let ts = timestamp.trim();
    let date = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|dt| dt.date())
        .or_else(|_| DateTime::parse_from_rfc3339(ts).map(|dt| dt.with_timezone(tz).date_naive()))
        .or_else(|_| NaiveDate::parse_from_str(ts, "%Y-%m-%d"));

    match date {
        Ok(d) => format!("{}/{}/{}", d.month(), d.day(), d.year()),
        Err(_) => "Invalid Date".to_string(),
    }
}

/// Player URL referenced by an embed snippet, if any.
pub fn embed_source(embed_html: &str) -> Option<String> {
    EMBED_SRC
        .captures(embed_html)
        .map(|caps| caps[1].to_string())
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return s.to_string();
    }

    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut result = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}

fn render_thumbnail(video: &SavedVideo) -> String {
    match video.thumbnail_url() {
        Some(src) => format!(
            r#"<img src="{}" alt="{}" onerror="this.style.display='none'">"#,
            escape_html(src),
            escape_html(&video.title)
        ),
        None => THUMBNAIL_PLACEHOLDER.to_string(),
    }
}

/// One library card. Title and URL are escaped; the id drives the click
/// handlers through `data-video-id`.
pub fn render_video_card(video: &SavedVideo) -> String {
    format!(
        r#"<div class="video-card" data-video-id="{id}">
    <div class="video-card-thumbnail">{thumb}</div>
    <div class="video-card-content">
        <h3>{title}</h3>
        <p>{url}</p>
        <div class="video-card-actions">
            <span class="video-date">{date}</span>
            <button class="btn btn-danger" data-action="delete" data-video-id="{id}">Delete</button>
        </div>
    </div>
</div>"#,
        id = video.id,
        thumb = render_thumbnail(video),
        title = escape_html(&video.title),
        url = escape_html(&truncate_url(&video.source_url, URL_DISPLAY_MAX)),
        date = format_date(&video.created_at),
    )
}

pub fn render_video_grid(videos: &[SavedVideo]) -> String {
    videos
        .iter()
        .map(render_video_card)
        .collect::<Vec<_>>()
        .join("\n")
}
