use serde::{Deserialize, Serialize};

/// Result of `POST /api/preview`, merged with the URL the user typed.
///
/// Held only in controller memory between a successful preview and a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPreview {
    pub title: String,
    /// Trusted, server-sanitized player markup.
    pub embed_html: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl VideoPreview {
    /// Bind a preview response to the URL it was requested for.
    ///
    /// The typed URL always wins over anything the server echoed back.
    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = url.to_string();
        self
    }
}

/// A video persisted in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedVideo {
    pub id: i64,
    pub title: String,
    pub source_url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub embed_html: String,
    #[serde(default)]
    pub created_at: String,
}

impl SavedVideo {
    /// Thumbnail URL, treating the empty string the backend stores as absent.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Body of `POST /api/preview`.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewRequest<'a> {
    pub url: &'a str,
}

/// Acknowledgement returned by `POST /api/videos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaveAck {
    pub id: i64,
    #[serde(default)]
    pub message: String,
}

/// Error payload the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
