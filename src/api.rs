//! HTTP client for the video library backend.

use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::{ApiErrorBody, PreviewRequest, SaveAck, SavedVideo, VideoPreview};

/// Operations the controller needs from the backend.
#[allow(async_fn_in_trait)]
pub trait VideoApi {
    /// `POST /api/preview`
    async fn preview(&self, url: &str) -> AppResult<VideoPreview>;

    /// `POST /api/videos`
    async fn save(&self, video: &VideoPreview) -> AppResult<SaveAck>;

    /// `GET /api/videos`
    async fn list(&self) -> AppResult<Vec<SavedVideo>>;

    /// `GET /api/videos/{id}`
    async fn get(&self, id: i64) -> AppResult<SavedVideo>;

    /// `DELETE /api/videos/{id}`
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// reqwest-backed [`VideoApi`].
///
/// No timeout is configured; requests run with the transport defaults.
pub struct HttpVideoApi {
    http: Client,
    base_url: String,
}

impl HttpVideoApi {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`AppError::Api`], preferring the
    /// server's `{"error": ...}` message over `fallback`.
    async fn check(response: Response, fallback: &str) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());

        warn!("API request failed: {} {}", status, message);
        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl VideoApi for HttpVideoApi {
    async fn preview(&self, url: &str) -> AppResult<VideoPreview> {
        let endpoint = self.url("/api/preview");
        debug!("POST {} url={}", endpoint, url);

        let response = self
            .http
            .post(&endpoint)
            .json(&PreviewRequest { url })
            .send()
            .await?;
        let response = Self::check(response, "Failed to preview video").await?;
        Ok(response.json().await?)
    }

    async fn save(&self, video: &VideoPreview) -> AppResult<SaveAck> {
        let endpoint = self.url("/api/videos");
        debug!("POST {} source_url={}", endpoint, video.source_url);

        let response = self.http.post(&endpoint).json(video).send().await?;
        let response = Self::check(response, "Failed to save video").await?;
        Ok(response.json().await?)
    }

    async fn list(&self) -> AppResult<Vec<SavedVideo>> {
        let endpoint = self.url("/api/videos");
        debug!("GET {}", endpoint);

        let response = self.http.get(&endpoint).send().await?;
        let response = Self::check(response, "Failed to load library").await?;
        Ok(response.json().await?)
    }

    async fn get(&self, id: i64) -> AppResult<SavedVideo> {
        let endpoint = self.url(&format!("/api/videos/{}", id));
        debug!("GET {}", endpoint);

        let response = self.http.get(&endpoint).send().await?;
        let response = Self::check(response, "Failed to load video").await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let endpoint = self.url(&format!("/api/videos/{}", id));
        debug!("DELETE {}", endpoint);

        let response = self.http.delete(&endpoint).send().await?;
        Self::check(response, "Failed to delete video").await?;
        Ok(())
    }
}
