use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::api::VideoApi;
use crate::dom::{Document, Page, classes, ids};
use crate::error::{AppError, AppResult};
use crate::models::{SaveAck, SavedVideo, VideoPreview};
use crate::render::render_video_grid;

/// How long the save button shows its confirmation before reverting.
pub const SAVED_FEEDBACK_DELAY: Duration = Duration::from_secs(2);

pub const PREVIEW_LABEL: &str = "Preview";
pub const PREVIEW_BUSY_LABEL: &str = "Loading...";
pub const SAVE_BUSY_LABEL: &str = "Saving...";
pub const SAVED_LABEL: &str = "Saved!";
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this video?";
pub const EMPTY_URL_MESSAGE: &str = "Please enter a video URL";

/// Lifecycle of the preview/save workflow on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    Previewing,
    Previewed,
    Saving,
    Saved,
}

/// Lifecycle of the library grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryState {
    NotLoaded,
    Loading,
    Empty,
    Populated,
    Failed,
}

/// User interactions the markup can raise.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    PreviewClicked,
    /// Key pressed in the URL input, named like `KeyboardEvent.key`.
    UrlKeyPressed(String),
    SaveClicked,
    SpeedChanged(String),
    ModalSpeedChanged(String),
    ModalCloseClicked,
    /// Click inside the modal overlay; only backdrop clicks close it.
    ModalClicked { on_backdrop: bool },
    CardClicked(i64),
    DeleteClicked(i64),
}

/// Save-button restore scheduled after a successful save.
#[derive(Debug, Clone)]
struct PendingRevert {
    due: Instant,
    label: String,
}

/// Save-button state captured when a save goes in flight.
#[derive(Debug, Clone)]
struct SaveBusy {
    label: String,
    prior: PreviewState,
}

/// Binds UI events to API calls and renders the results into a [`Document`].
pub struct ViewController<A, D> {
    api: A,
    doc: D,
    current_video: Option<VideoPreview>,
    preview_state: PreviewState,
    library_state: LibraryState,
    library: Vec<SavedVideo>,
    modal_video: Option<SavedVideo>,
    pending_revert: Option<PendingRevert>,
    saving: Option<SaveBusy>,
}

impl<A: VideoApi, D: Document> ViewController<A, D> {
    pub fn new(api: A, doc: D) -> Self {
        Self {
            api,
            doc,
            current_video: None,
            preview_state: PreviewState::Idle,
            library_state: LibraryState::NotLoaded,
            library: Vec::new(),
            modal_video: None,
            pending_revert: None,
            saving: None,
        }
    }

    /// Start-up work for the page the document represents.
    pub async fn init(&mut self, page: Page) -> AppResult<()> {
        debug!("Initializing controller for {:?} page", page);
        if page == Page::Library {
            self.load_library().await?;
        }
        Ok(())
    }

    /// Route a UI event to its action. Failures have already been surfaced
    /// in the document by the time they are returned.
    pub async fn handle(&mut self, event: UiEvent) -> AppResult<()> {
        match event {
            UiEvent::PreviewClicked => {
                self.preview_video().await?;
            }
            UiEvent::UrlKeyPressed(key) => {
                if key == "Enter" {
                    self.preview_video().await?;
                }
            }
            UiEvent::SaveClicked => {
                self.save_video().await?;
            }
            UiEvent::SpeedChanged(value) => {
                self.change_playback_speed(&value);
            }
            UiEvent::ModalSpeedChanged(value) => {
                self.change_modal_playback_speed(&value);
            }
            UiEvent::ModalCloseClicked => self.close_modal(),
            UiEvent::ModalClicked { on_backdrop } => {
                if on_backdrop {
                    self.close_modal();
                }
            }
            UiEvent::CardClicked(id) => {
                self.open_video_modal(id).await?;
            }
            UiEvent::DeleteClicked(id) => {
                self.delete_video(id).await?;
            }
        }
        Ok(())
    }

    /// Apply the synchronous half of an event: the busy markers shown while
    /// its request is in flight. A host that draws between `begin` and
    /// `handle` shows them before the request starts.
    ///
    /// Returns false when the triggering control is disabled; the event must
    /// then be dropped.
    pub fn begin(&mut self, event: &UiEvent) -> bool {
        match event {
            UiEvent::PreviewClicked => self.begin_preview(),
            UiEvent::UrlKeyPressed(key) if key == "Enter" => self.begin_preview(),
            UiEvent::SaveClicked => self.begin_save(),
            _ => true,
        }
    }

    fn begin_preview(&mut self) -> bool {
        if self.doc.is_disabled(ids::PREVIEW_BTN) {
            return false;
        }
        if !self.input_url().is_empty() {
            self.show_preview_busy();
        }
        true
    }

    fn begin_save(&mut self) -> bool {
        if self.doc.is_disabled(ids::SAVE_VIDEO_BTN) {
            return false;
        }
        if self.current_video.is_some() && self.saving.is_none() {
            let busy = self.show_save_busy();
            self.saving = Some(busy);
        }
        true
    }

    fn input_url(&self) -> String {
        self.doc
            .value(ids::VIDEO_URL)
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    fn show_preview_busy(&mut self) {
        self.preview_state = PreviewState::Previewing;
        self.doc.set_disabled(ids::PREVIEW_BTN, true);
        self.doc.set_text(ids::PREVIEW_BTN, PREVIEW_BUSY_LABEL);
        self.doc.show(ids::LOADING);
        self.doc.hide(ids::ERROR);
        self.doc.hide(ids::VIDEO_PREVIEW);
    }

    /// Preview the URL currently in the input.
    pub async fn preview_video(&mut self) -> AppResult<VideoPreview> {
        let url = self.input_url();
        if url.is_empty() {
            return Err(self.fail(AppError::Validation(EMPTY_URL_MESSAGE.to_string())));
        }

        info!("Previewing {}", url);
        self.show_preview_busy();

        let result = self.api.preview(&url).await;

        self.doc.set_disabled(ids::PREVIEW_BTN, false);
        self.doc.set_text(ids::PREVIEW_BTN, PREVIEW_LABEL);
        self.doc.hide(ids::LOADING);

        match result {
            Ok(preview) => {
                let video = preview.with_source_url(&url);
                self.revert_save_button();
                self.display_video_preview(&video);
                self.current_video = Some(video.clone());
                self.preview_state = PreviewState::Previewed;
                Ok(video)
            }
            Err(e) => {
                self.current_video = None;
                self.preview_state = PreviewState::Idle;
                Err(self.fail(e))
            }
        }
    }

    fn display_video_preview(&mut self, video: &VideoPreview) {
        self.doc.set_inner_html(ids::VIDEO_PLAYER, &video.embed_html);
        self.doc.set_text(ids::VIDEO_TITLE, &video.title);
        self.doc.set_text(ids::VIDEO_SOURCE, &video.source_url);
        self.doc.set_disabled(ids::SAVE_VIDEO_BTN, false);
        self.doc.show(ids::VIDEO_PREVIEW);
        self.doc.scroll_into_view(ids::VIDEO_PREVIEW);
    }

    /// Save the last previewed video to the library.
    pub async fn save_video(&mut self) -> AppResult<SaveAck> {
        let Some(video) = self.current_video.clone() else {
            return Err(self.fail(AppError::NoCurrentVideo));
        };

        let busy = match self.saving.take() {
            Some(busy) => busy,
            None => self.show_save_busy(),
        };

        info!("Saving {}", video.source_url);
        let result = self.api.save(&video).await;
        match result {
            Ok(ack) => {
                info!("Saved video {}", ack.id);
                self.doc.set_text(ids::SAVE_VIDEO_BTN, SAVED_LABEL);
                self.doc.remove_class(ids::SAVE_VIDEO_BTN, classes::BTN_SUCCESS);
                self.doc.add_class(ids::SAVE_VIDEO_BTN, classes::BTN_PRIMARY);
                self.pending_revert = Some(PendingRevert {
                    due: Instant::now() + SAVED_FEEDBACK_DELAY,
                    label: busy.label,
                });
                self.preview_state = PreviewState::Saved;
                Ok(ack)
            }
            Err(e) => {
                self.doc.set_disabled(ids::SAVE_VIDEO_BTN, false);
                self.doc.set_text(ids::SAVE_VIDEO_BTN, &busy.label);
                self.doc.remove_class(ids::SAVE_VIDEO_BTN, classes::BTN_PRIMARY);
                self.doc.add_class(ids::SAVE_VIDEO_BTN, classes::BTN_SUCCESS);
                self.preview_state = match busy.prior {
                    PreviewState::Saved => PreviewState::Previewed,
                    other => other,
                };
                Err(self.fail(e))
            }
        }
    }

    /// A pending "Saved!" revert is consumed here; its label is the one to
    /// restore.
    fn show_save_busy(&mut self) -> SaveBusy {
        let label = match self.pending_revert.take() {
            Some(pending) => pending.label,
            None => self.doc.text(ids::SAVE_VIDEO_BTN).unwrap_or_default(),
        };
        let busy = SaveBusy {
            label,
            prior: self.preview_state,
        };
        self.preview_state = PreviewState::Saving;
        self.doc.set_disabled(ids::SAVE_VIDEO_BTN, true);
        self.doc.set_text(ids::SAVE_VIDEO_BTN, SAVE_BUSY_LABEL);
        busy
    }

    /// Run deferred UI work that is due at `now`. Returns true if anything
    /// changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.pending_revert {
            Some(pending) if now >= pending.due => {
                self.revert_save_button();
                true
            }
            _ => false,
        }
    }

    /// When the "Saved!" confirmation will revert, if one is showing.
    pub fn revert_due(&self) -> Option<Instant> {
        self.pending_revert.as_ref().map(|p| p.due)
    }

    fn revert_save_button(&mut self) {
        let Some(pending) = self.pending_revert.take() else {
            return;
        };
        debug!("Reverting save button to {:?}", pending.label);
        self.doc.set_text(ids::SAVE_VIDEO_BTN, &pending.label);
        self.doc.remove_class(ids::SAVE_VIDEO_BTN, classes::BTN_PRIMARY);
        self.doc.add_class(ids::SAVE_VIDEO_BTN, classes::BTN_SUCCESS);
        self.doc.set_disabled(ids::SAVE_VIDEO_BTN, false);
        if self.preview_state == PreviewState::Saved {
            self.preview_state = PreviewState::Previewed;
        }
    }

    /// Fetch the library and render it as a grid or the empty state.
    pub async fn load_library(&mut self) -> AppResult<usize> {
        self.show_library_loading();

        let result = self.api.list().await;
        self.doc.hide(ids::LOADING);

        match result {
            Ok(videos) => {
                let count = videos.len();
                if videos.is_empty() {
                    self.doc.set_inner_html(ids::VIDEO_GRID, "");
                    self.doc.show(ids::EMPTY_LIBRARY);
                    self.library_state = LibraryState::Empty;
                } else {
                    self.doc
                        .set_inner_html(ids::VIDEO_GRID, &render_video_grid(&videos));
                    self.library_state = LibraryState::Populated;
                }
                self.library = videos;
                info!("Library loaded: {} videos", count);
                Ok(count)
            }
            Err(e) => {
                self.library_state = LibraryState::Failed;
                Err(self.fail(e))
            }
        }
    }

    /// Busy markers of a library load, applied ahead of the request.
    pub fn show_library_loading(&mut self) {
        self.library_state = LibraryState::Loading;
        self.doc.show(ids::LOADING);
        self.doc.hide(ids::ERROR);
        self.doc.hide(ids::EMPTY_LIBRARY);
    }

    /// Fetch one video and show it in the modal overlay.
    pub async fn open_video_modal(&mut self, id: i64) -> AppResult<()> {
        debug!("Opening video {}", id);
        let result = self.api.get(id).await;
        let video = match result {
            Ok(video) => video,
            Err(e) => return Err(self.fail(e)),
        };

        self.doc.set_text(ids::MODAL_VIDEO_TITLE, &video.title);
        self.doc.set_inner_html(ids::MODAL_VIDEO_PLAYER, &video.embed_html);
        self.doc.show(ids::VIDEO_MODAL);
        self.modal_video = Some(video);
        Ok(())
    }

    /// Hide the modal and drop its player so playback stops.
    pub fn close_modal(&mut self) {
        self.doc.hide(ids::VIDEO_MODAL);
        self.doc.set_inner_html(ids::MODAL_VIDEO_PLAYER, "");
        self.modal_video = None;
    }

    /// Delete after user confirmation, then reload the library.
    ///
    /// Returns `Ok(false)` when the user declined.
    pub async fn delete_video(&mut self, id: i64) -> AppResult<bool> {
        if !self.doc.confirm(DELETE_CONFIRMATION) {
            debug!("Delete of {} declined", id);
            return Ok(false);
        }

        info!("Deleting video {}", id);
        let result = self.api.delete(id).await;
        if let Err(e) = result {
            return Err(self.fail(e));
        }

        if let Err(e) = self.load_library().await {
            debug!("Library reload after delete failed: {}", e);
        }
        Ok(true)
    }

    /// Apply a playback rate to the preview player. Only native video
    /// elements honor it; iframe players are left alone.
    pub fn change_playback_speed(&mut self, value: &str) -> bool {
        self.apply_playback_rate(ids::VIDEO_PLAYER, value)
    }

    pub fn change_modal_playback_speed(&mut self, value: &str) -> bool {
        self.apply_playback_rate(ids::MODAL_VIDEO_PLAYER, value)
    }

    fn apply_playback_rate(&mut self, container: &str, value: &str) -> bool {
        match value.trim().parse::<f64>() {
            Ok(rate) if rate.is_finite() && rate > 0.0 => {
                let applied = self.doc.set_playback_rate(container, rate);
                debug!("Playback rate {} on #{}: applied={}", rate, container, applied);
                applied
            }
            _ => {
                warn!("Ignoring invalid playback rate {:?}", value);
                false
            }
        }
    }

    /// Show a message in the error banner, or as an alert when the page has
    /// no banner.
    pub fn show_error(&mut self, message: &str) {
        if self.doc.has(ids::ERROR) {
            self.doc.set_text(ids::ERROR, message);
            self.doc.show(ids::ERROR);
        } else {
            self.doc.alert(message);
        }
    }

    fn fail(&mut self, error: AppError) -> AppError {
        warn!("Action failed: {}", error);
        self.show_error(&error.user_message());
        error
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn doc(&self) -> &D {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn current_video(&self) -> Option<&VideoPreview> {
        self.current_video.as_ref()
    }

    pub fn preview_state(&self) -> PreviewState {
        self.preview_state
    }

    pub fn library_state(&self) -> LibraryState {
        self.library_state
    }

    /// The list rendered by the last successful library load.
    pub fn library(&self) -> &[SavedVideo] {
        &self.library
    }

    pub fn modal_video(&self) -> Option<&SavedVideo> {
        self.modal_video.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Preview(String),
        Save(VideoPreview),
        List,
        Get(i64),
        Delete(i64),
    }

    #[derive(Default)]
    struct FakeApi {
        calls: RefCell<Vec<Call>>,
        preview_response: Option<VideoPreview>,
        videos: RefCell<Vec<SavedVideo>>,
        offline: bool,
        fail_save: bool,
        fail_list: bool,
        fail_delete: bool,
    }

    impl FakeApi {
        fn with_preview(preview: VideoPreview) -> Self {
            Self {
                preview_response: Some(preview),
                ..Self::default()
            }
        }

        fn with_videos(videos: Vec<SavedVideo>) -> Self {
            Self {
                videos: RefCell::new(videos),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn record(&self, call: Call) -> AppResult<()> {
            self.calls.borrow_mut().push(call);
            if self.offline {
                Err(AppError::Network("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn api_error(status: u16, message: &str) -> AppError {
        AppError::Api {
            status,
            message: message.to_string(),
        }
    }

    impl VideoApi for FakeApi {
        async fn preview(&self, url: &str) -> AppResult<VideoPreview> {
            self.record(Call::Preview(url.to_string()))?;
            self.preview_response
                .clone()
                .ok_or_else(|| api_error(400, "Unsupported video URL"))
        }

        async fn save(&self, video: &VideoPreview) -> AppResult<SaveAck> {
            self.record(Call::Save(video.clone()))?;
            if self.fail_save {
                return Err(api_error(500, "Database is locked"));
            }
            let mut videos = self.videos.borrow_mut();
            let id = videos.len() as i64 + 1;
            videos.push(SavedVideo {
                id,
                title: video.title.clone(),
                source_url: video.source_url.clone(),
                thumbnail: video.thumbnail.clone(),
                video_url: video.video_url.clone(),
                embed_html: video.embed_html.clone(),
                created_at: "2024-03-05 10:11:12".to_string(),
            });
            Ok(SaveAck {
                id,
                message: "Video saved successfully".to_string(),
            })
        }

        async fn list(&self) -> AppResult<Vec<SavedVideo>> {
            self.record(Call::List)?;
            if self.fail_list {
                return Err(api_error(500, "Failed to load library"));
            }
            Ok(self.videos.borrow().clone())
        }

        async fn get(&self, id: i64) -> AppResult<SavedVideo> {
            self.record(Call::Get(id))?;
            self.videos
                .borrow()
                .iter()
                .find(|v| v.id == id)
                .cloned()
                .ok_or_else(|| api_error(404, "Video not found"))
        }

        async fn delete(&self, id: i64) -> AppResult<()> {
            self.record(Call::Delete(id))?;
            if self.fail_delete {
                return Err(api_error(500, "Failed to delete video"));
            }
            let mut videos = self.videos.borrow_mut();
            let before = videos.len();
            videos.retain(|v| v.id != id);
            if videos.len() == before {
                return Err(api_error(404, "Video not found"));
            }
            Ok(())
        }
    }

    fn youtube_preview() -> VideoPreview {
        VideoPreview {
            title: "YouTube Video abc".to_string(),
            embed_html: r#"<iframe src="https://www.youtube.com/embed/abc"></iframe>"#.to_string(),
            source_url: String::new(),
            thumbnail: Some("https://img.youtube.com/vi/abc/maxresdefault.jpg".to_string()),
            video_url: Some("https://www.youtube.com/embed/abc".to_string()),
        }
    }

    fn native_preview() -> VideoPreview {
        VideoPreview {
            title: "clip.mp4".to_string(),
            embed_html: r#"<video controls><source src="https://cdn.x/clip.mp4"></video>"#
                .to_string(),
            source_url: String::new(),
            thumbnail: None,
            video_url: Some("https://cdn.x/clip.mp4".to_string()),
        }
    }

    fn saved(id: i64, title: &str) -> SavedVideo {
        SavedVideo {
            id,
            title: title.to_string(),
            source_url: format!("https://vimeo.com/{}", id),
            thumbnail: None,
            video_url: None,
            embed_html: format!(r#"<iframe src="https://player.vimeo.com/video/{}"></iframe>"#, id),
            created_at: "2024-03-05 10:11:12".to_string(),
        }
    }

    fn home(api: FakeApi, url: &str) -> ViewController<FakeApi, MemoryDocument> {
        let mut doc = MemoryDocument::home_page();
        doc.set_value(ids::VIDEO_URL, url);
        ViewController::new(api, doc)
    }

    fn library(api: FakeApi) -> ViewController<FakeApi, MemoryDocument> {
        ViewController::new(api, MemoryDocument::library_page())
    }

    fn assert_preview_button_idle(ctrl: &ViewController<FakeApi, MemoryDocument>) {
        assert!(!ctrl.doc().is_disabled(ids::PREVIEW_BTN));
        assert_eq!(ctrl.doc().text(ids::PREVIEW_BTN).as_deref(), Some(PREVIEW_LABEL));
        assert!(ctrl.doc().is_hidden(ids::LOADING));
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected_without_request() {
        for url in ["", "   ", "\t\n"] {
            let mut ctrl = home(FakeApi::with_preview(youtube_preview()), url);
            let err = ctrl.preview_video().await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert!(ctrl.api().calls().is_empty());
            assert!(!ctrl.doc().is_hidden(ids::ERROR));
            assert_eq!(ctrl.doc().text(ids::ERROR).as_deref(), Some(EMPTY_URL_MESSAGE));
            assert_preview_button_idle(&ctrl);
        }
    }

    #[tokio::test]
    async fn test_preview_renders_and_enables_save() {
        let mut ctrl = home(
            FakeApi::with_preview(youtube_preview()),
            "  https://youtu.be/abc  ",
        );
        ctrl.doc_mut().set_disabled(ids::SAVE_VIDEO_BTN, true);

        let video = ctrl.preview_video().await.unwrap();

        assert_eq!(video.source_url, "https://youtu.be/abc");
        assert_eq!(
            ctrl.api().calls(),
            vec![Call::Preview("https://youtu.be/abc".to_string())]
        );
        assert_eq!(ctrl.preview_state(), PreviewState::Previewed);
        let doc = ctrl.doc();
        assert!(!doc.is_hidden(ids::VIDEO_PREVIEW));
        assert!(doc.element(ids::VIDEO_PREVIEW).unwrap().scrolled_into_view);
        assert_eq!(
            doc.inner_html(ids::VIDEO_PLAYER).unwrap(),
            youtube_preview().embed_html
        );
        assert_eq!(doc.text(ids::VIDEO_TITLE).as_deref(), Some("YouTube Video abc"));
        assert_eq!(
            doc.text(ids::VIDEO_SOURCE).as_deref(),
            Some("https://youtu.be/abc")
        );
        assert!(!doc.is_disabled(ids::SAVE_VIDEO_BTN));
        assert!(doc.is_hidden(ids::ERROR));
        assert_preview_button_idle(&ctrl);
    }

    #[tokio::test]
    async fn test_save_payload_carries_source_url() {
        let mut ctrl = home(FakeApi::with_preview(youtube_preview()), "https://youtu.be/abc");
        ctrl.preview_video().await.unwrap();
        let ack = ctrl.save_video().await.unwrap();
        assert_eq!(ack.id, 1);

        let calls = ctrl.api().calls();
        let Some(Call::Save(payload)) = calls.last() else {
            panic!("expected a save call, got {:?}", calls);
        };
        assert_eq!(payload.source_url, "https://youtu.be/abc");
        assert_eq!(payload.title, "YouTube Video abc");
        assert_eq!(payload.video_url, youtube_preview().video_url);
        assert_eq!(payload.thumbnail, youtube_preview().thumbnail);
    }

    #[tokio::test]
    async fn test_save_without_preview_fails_without_request() {
        let mut ctrl = home(FakeApi::with_preview(youtube_preview()), "https://youtu.be/abc");
        let err = ctrl.save_video().await.unwrap_err();
        assert!(matches!(err, AppError::NoCurrentVideo));
        assert!(ctrl.api().calls().is_empty());
        assert_eq!(ctrl.doc().text(ids::ERROR).as_deref(), Some("No video to save"));
    }

    #[tokio::test]
    async fn test_preview_api_failure_returns_to_idle() {
        let mut ctrl = home(FakeApi::default(), "https://example.com/page");
        let err = ctrl.preview_video().await.unwrap_err();
        assert!(matches!(err, AppError::Api { status: 400, .. }));
        assert_eq!(ctrl.preview_state(), PreviewState::Idle);
        assert!(ctrl.current_video().is_none());
        assert_eq!(
            ctrl.doc().text(ids::ERROR).as_deref(),
            Some("Unsupported video URL")
        );
        assert!(ctrl.doc().is_hidden(ids::VIDEO_PREVIEW));
        assert_preview_button_idle(&ctrl);

        let err = ctrl.save_video().await.unwrap_err();
        assert!(matches!(err, AppError::NoCurrentVideo));
    }

    #[tokio::test]
    async fn test_preview_network_failure_resets_button() {
        let api = FakeApi {
            offline: true,
            ..FakeApi::with_preview(youtube_preview())
        };
        let mut ctrl = home(api, "https://youtu.be/abc");
        let err = ctrl.preview_video().await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
        assert!(
            ctrl.doc()
                .text(ids::ERROR)
                .unwrap()
                .starts_with("Network error")
        );
        assert_preview_button_idle(&ctrl);
    }

    #[tokio::test]
    async fn test_saved_confirmation_reverts_after_delay() {
        let mut ctrl = home(FakeApi::with_preview(youtube_preview()), "https://youtu.be/abc");
        ctrl.preview_video().await.unwrap();
        ctrl.save_video().await.unwrap();

        assert_eq!(ctrl.preview_state(), PreviewState::Saved);
        assert_eq!(ctrl.doc().text(ids::SAVE_VIDEO_BTN).as_deref(), Some(SAVED_LABEL));
        assert!(ctrl.doc().is_disabled(ids::SAVE_VIDEO_BTN));
        assert!(ctrl.doc().has_class(ids::SAVE_VIDEO_BTN, classes::BTN_PRIMARY));
        assert!(!ctrl.doc().has_class(ids::SAVE_VIDEO_BTN, classes::BTN_SUCCESS));

        assert!(!ctrl.tick(Instant::now()));
        assert_eq!(ctrl.doc().text(ids::SAVE_VIDEO_BTN).as_deref(), Some(SAVED_LABEL));

        assert!(ctrl.tick(Instant::now() + SAVED_FEEDBACK_DELAY));
        assert_eq!(
            ctrl.doc().text(ids::SAVE_VIDEO_BTN).as_deref(),
            Some("Save to Library")
        );
        assert!(!ctrl.doc().is_disabled(ids::SAVE_VIDEO_BTN));
        assert!(ctrl.doc().has_class(ids::SAVE_VIDEO_BTN, classes::BTN_SUCCESS));
        assert!(!ctrl.doc().has_class(ids::SAVE_VIDEO_BTN, classes::BTN_PRIMARY));
        assert_eq!(ctrl.preview_state(), PreviewState::Previewed);
        assert!(ctrl.revert_due().is_none());
    }

    #[tokio::test]
    async fn test_save_failure_restores_button() {
        let api = FakeApi {
            fail_save: true,
            ..FakeApi::with_preview(youtube_preview())
        };
        let mut ctrl = home(api, "https://youtu.be/abc");
        ctrl.preview_video().await.unwrap();
        let err = ctrl.save_video().await.unwrap_err();

        assert!(matches!(err, AppError::Api { status: 500, .. }));
        assert_eq!(
            ctrl.doc().text(ids::SAVE_VIDEO_BTN).as_deref(),
            Some("Save to Library")
        );
        assert!(!ctrl.doc().is_disabled(ids::SAVE_VIDEO_BTN));
        assert_eq!(ctrl.doc().text(ids::ERROR).as_deref(), Some("Database is locked"));
        assert_eq!(ctrl.preview_state(), PreviewState::Previewed);
        assert!(ctrl.revert_due().is_none());
    }

    #[tokio::test]
    async fn test_new_preview_cancels_pending_revert() {
        let mut ctrl = home(FakeApi::with_preview(youtube_preview()), "https://youtu.be/abc");
        ctrl.preview_video().await.unwrap();
        ctrl.save_video().await.unwrap();
        assert!(ctrl.revert_due().is_some());

        ctrl.preview_video().await.unwrap();
        assert!(ctrl.revert_due().is_none());
        assert_eq!(
            ctrl.doc().text(ids::SAVE_VIDEO_BTN).as_deref(),
            Some("Save to Library")
        );
        assert!(!ctrl.doc().is_disabled(ids::SAVE_VIDEO_BTN));
    }

    #[tokio::test]
    async fn test_begin_preview_shows_busy_and_blocks_retrigger() {
        let mut ctrl = home(FakeApi::with_preview(youtube_preview()), "https://youtu.be/abc");
        assert!(ctrl.begin(&UiEvent::UrlKeyPressed("Enter".to_string())));

        assert_eq!(ctrl.preview_state(), PreviewState::Previewing);
        assert!(ctrl.doc().is_disabled(ids::PREVIEW_BTN));
        assert_eq!(ctrl.doc().text(ids::PREVIEW_BTN).as_deref(), Some(PREVIEW_BUSY_LABEL));
        assert!(!ctrl.doc().is_hidden(ids::LOADING));
        assert!(ctrl.api().calls().is_empty());

        assert!(!ctrl.begin(&UiEvent::PreviewClicked));
        assert!(!ctrl.begin(&UiEvent::UrlKeyPressed("Enter".to_string())));

        ctrl.handle(UiEvent::UrlKeyPressed("Enter".to_string()))
            .await
            .unwrap();
        assert_eq!(
            ctrl.api().calls(),
            vec![Call::Preview("https://youtu.be/abc".to_string())]
        );
        assert_preview_button_idle(&ctrl);
        assert!(ctrl.begin(&UiEvent::PreviewClicked));
    }

    #[tokio::test]
    async fn test_begin_with_empty_url_leaves_button_alone() {
        let mut ctrl = home(FakeApi::with_preview(youtube_preview()), "  ");
        assert!(ctrl.begin(&UiEvent::PreviewClicked));
        assert_preview_button_idle(&ctrl);
        assert_eq!(ctrl.preview_state(), PreviewState::Idle);
    }

    #[tokio::test]
    async fn test_begin_save_keeps_label_to_restore() {
        let mut ctrl = home(FakeApi::with_preview(youtube_preview()), "https://youtu.be/abc");
        ctrl.preview_video().await.unwrap();

        assert!(ctrl.begin(&UiEvent::SaveClicked));
        assert_eq!(ctrl.preview_state(), PreviewState::Saving);
        assert_eq!(ctrl.doc().text(ids::SAVE_VIDEO_BTN).as_deref(), Some(SAVE_BUSY_LABEL));
        assert!(!ctrl.begin(&UiEvent::SaveClicked));

        ctrl.handle(UiEvent::SaveClicked).await.unwrap();
        assert_eq!(ctrl.preview_state(), PreviewState::Saved);
        assert!(ctrl.tick(Instant::now() + SAVED_FEEDBACK_DELAY));
        assert_eq!(
            ctrl.doc().text(ids::SAVE_VIDEO_BTN).as_deref(),
            Some("Save to Library")
        );
        let saves = ctrl
            .api()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Save(_)))
            .count();
        assert_eq!(saves, 1);
    }

    #[tokio::test]
    async fn test_load_empty_library() {
        let mut ctrl = library(FakeApi::default());
        let count = ctrl.load_library().await.unwrap();
        assert_eq!(count, 0);
        assert_eq!(ctrl.library_state(), LibraryState::Empty);
        assert!(!ctrl.doc().is_hidden(ids::EMPTY_LIBRARY));
        assert!(ctrl.doc().inner_html(ids::VIDEO_GRID).unwrap().is_empty());
        assert!(ctrl.doc().is_hidden(ids::LOADING));
    }

    #[tokio::test]
    async fn test_load_populated_library() {
        let mut ctrl = library(FakeApi::with_videos(vec![
            saved(1, "<i>first</i>"),
            saved(2, "second"),
        ]));
        let count = ctrl.load_library().await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(ctrl.library_state(), LibraryState::Populated);
        assert!(ctrl.doc().is_hidden(ids::EMPTY_LIBRARY));
        let grid = ctrl.doc().inner_html(ids::VIDEO_GRID).unwrap();
        assert_eq!(grid.matches(r#"class="video-card""#).count(), 2);
        assert!(grid.contains("&lt;i&gt;first&lt;/i&gt;"));
        assert!(!grid.contains("<i>first"));
        assert_eq!(ctrl.library().len(), 2);
    }

    #[tokio::test]
    async fn test_load_library_failure() {
        let api = FakeApi {
            fail_list: true,
            ..FakeApi::default()
        };
        let mut ctrl = library(api);
        assert!(ctrl.load_library().await.is_err());
        assert_eq!(ctrl.library_state(), LibraryState::Failed);
        assert_eq!(
            ctrl.doc().text(ids::ERROR).as_deref(),
            Some("Failed to load library")
        );
        assert!(ctrl.doc().is_hidden(ids::LOADING));
    }

    #[tokio::test]
    async fn test_delete_declined_sends_nothing() {
        let mut ctrl = library(FakeApi::with_videos(vec![saved(1, "a")]));
        let deleted = ctrl.delete_video(1).await.unwrap();
        assert!(!deleted);
        assert!(ctrl.api().calls().is_empty());
        assert_eq!(ctrl.doc().confirm_prompts(), [DELETE_CONFIRMATION.to_string()]);
    }

    #[tokio::test]
    async fn test_delete_confirmed_then_reloads() {
        let mut ctrl = library(FakeApi::with_videos(vec![saved(1, "a"), saved(2, "b")]));
        ctrl.load_library().await.unwrap();
        ctrl.doc_mut().answer_next_confirm(true);

        let deleted = ctrl.delete_video(1).await.unwrap();

        assert!(deleted);
        assert_eq!(
            ctrl.api().calls(),
            vec![Call::List, Call::Delete(1), Call::List]
        );
        assert_eq!(ctrl.library().len(), 1);
        let grid = ctrl.doc().inner_html(ids::VIDEO_GRID).unwrap();
        assert!(!grid.contains(r#"data-video-id="1""#));
        assert!(grid.contains(r#"data-video-id="2""#));
    }

    #[tokio::test]
    async fn test_deleting_last_video_clears_grid() {
        let mut ctrl = library(FakeApi::with_videos(vec![saved(5, "only")]));
        ctrl.load_library().await.unwrap();
        ctrl.doc_mut().answer_next_confirm(true);
        ctrl.delete_video(5).await.unwrap();

        assert_eq!(ctrl.library_state(), LibraryState::Empty);
        assert!(ctrl.doc().inner_html(ids::VIDEO_GRID).unwrap().is_empty());
        assert!(!ctrl.doc().is_hidden(ids::EMPTY_LIBRARY));
    }

    #[tokio::test]
    async fn test_delete_failure_surfaces_without_reload() {
        let api = FakeApi {
            fail_delete: true,
            ..FakeApi::with_videos(vec![saved(1, "a")])
        };
        let mut ctrl = library(api);
        ctrl.doc_mut().answer_next_confirm(true);
        assert!(ctrl.delete_video(1).await.is_err());
        assert_eq!(ctrl.api().calls(), vec![Call::Delete(1)]);
        assert_eq!(
            ctrl.doc().text(ids::ERROR).as_deref(),
            Some("Failed to delete video")
        );
    }

    #[tokio::test]
    async fn test_modal_open_and_close() {
        let mut ctrl = library(FakeApi::with_videos(vec![saved(3, "Three")]));
        ctrl.open_video_modal(3).await.unwrap();

        assert!(!ctrl.doc().is_hidden(ids::VIDEO_MODAL));
        assert_eq!(ctrl.doc().text(ids::MODAL_VIDEO_TITLE).as_deref(), Some("Three"));
        assert!(
            ctrl.doc()
                .inner_html(ids::MODAL_VIDEO_PLAYER)
                .unwrap()
                .contains("<iframe")
        );
        assert_eq!(ctrl.modal_video().map(|v| v.id), Some(3));

        ctrl.close_modal();
        assert!(ctrl.doc().is_hidden(ids::VIDEO_MODAL));
        assert_eq!(ctrl.doc().inner_html(ids::MODAL_VIDEO_PLAYER).as_deref(), Some(""));
        assert!(ctrl.modal_video().is_none());
    }

    #[tokio::test]
    async fn test_modal_missing_video_shows_error() {
        let mut ctrl = library(FakeApi::default());
        assert!(ctrl.open_video_modal(42).await.is_err());
        assert!(ctrl.doc().is_hidden(ids::VIDEO_MODAL));
        assert_eq!(ctrl.doc().text(ids::ERROR).as_deref(), Some("Video not found"));
    }

    #[tokio::test]
    async fn test_playback_speed_native_only() {
        let mut ctrl = home(FakeApi::with_preview(native_preview()), "https://cdn.x/clip.mp4");
        ctrl.preview_video().await.unwrap();
        assert!(ctrl.change_playback_speed("1.5"));
        assert_eq!(
            ctrl.doc().element(ids::VIDEO_PLAYER).unwrap().playback_rate,
            Some(1.5)
        );
        assert!(!ctrl.change_playback_speed("fast"));
        assert!(!ctrl.change_playback_speed("-1"));

        let mut ctrl = home(FakeApi::with_preview(youtube_preview()), "https://youtu.be/abc");
        ctrl.preview_video().await.unwrap();
        assert!(!ctrl.change_playback_speed("2"));
        assert_eq!(ctrl.doc().element(ids::VIDEO_PLAYER).unwrap().playback_rate, None);
    }

    #[tokio::test]
    async fn test_error_falls_back_to_alert() {
        let mut doc = MemoryDocument::home_page();
        doc.remove(ids::ERROR);
        let mut ctrl = ViewController::new(FakeApi::default(), doc);
        assert!(ctrl.preview_video().await.is_err());
        assert_eq!(ctrl.doc().alerts(), [EMPTY_URL_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_event_dispatch() {
        let mut ctrl = home(FakeApi::with_preview(youtube_preview()), "https://youtu.be/abc");
        ctrl.handle(UiEvent::UrlKeyPressed("a".to_string())).await.unwrap();
        assert!(ctrl.api().calls().is_empty());

        ctrl.handle(UiEvent::UrlKeyPressed("Enter".to_string()))
            .await
            .unwrap();
        assert_eq!(ctrl.api().calls().len(), 1);

        ctrl.handle(UiEvent::SaveClicked).await.unwrap();
        assert!(matches!(ctrl.api().calls().last(), Some(Call::Save(_))));
    }

    #[tokio::test]
    async fn test_modal_backdrop_only_closes_on_backdrop() {
        let mut ctrl = library(FakeApi::with_videos(vec![saved(1, "a")]));
        ctrl.handle(UiEvent::CardClicked(1)).await.unwrap();
        ctrl.handle(UiEvent::ModalClicked { on_backdrop: false })
            .await
            .unwrap();
        assert!(!ctrl.doc().is_hidden(ids::VIDEO_MODAL));

        ctrl.handle(UiEvent::ModalClicked { on_backdrop: true })
            .await
            .unwrap();
        assert!(ctrl.doc().is_hidden(ids::VIDEO_MODAL));
        assert!(ctrl.doc().inner_html(ids::MODAL_VIDEO_PLAYER).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_init_loads_library_only_on_library_page() {
        let mut ctrl = home(FakeApi::default(), "");
        ctrl.init(Page::Home).await.unwrap();
        assert!(ctrl.api().calls().is_empty());

        let mut ctrl = library(FakeApi::with_videos(vec![saved(1, "a")]));
        ctrl.init(Page::Library).await.unwrap();
        assert_eq!(ctrl.api().calls(), vec![Call::List]);
        assert_eq!(ctrl.library_state(), LibraryState::Populated);
    }
}
