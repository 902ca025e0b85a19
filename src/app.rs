use std::time::Instant;

use tracing::debug;

use crate::api::VideoApi;
use crate::controller::{UiEvent, ViewController};
use crate::dom::{Document, MemoryDocument, Page, ids};
use crate::models::SavedVideo;

/// Which page is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Library,
}

impl View {
    pub fn page(self) -> Page {
        match self {
            Self::Home => Page::Home,
            Self::Library => Page::Library,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Home => Self::Library,
            Self::Library => Self::Home,
        }
    }
}

/// Input mode for the URL bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Network work requested by a key press. It runs on the next loop pass,
/// after a frame with its busy markers has been drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Event(UiEvent),
    LoadLibrary,
}

/// Playback rates offered by the speed controls.
pub const PLAYBACK_SPEEDS: [&str; 6] = ["0.5", "0.75", "1", "1.25", "1.5", "2"];
const DEFAULT_SPEED_INDEX: usize = 2;

/// Main application state for the terminal front-end.
pub struct App<A> {
    pub controller: ViewController<A, MemoryDocument>,
    pub should_quit: bool,
    pub view: View,
    pub show_help: bool,
    pub input_mode: InputMode,

    // Home page
    pub url_input: String,
    pub speed_index: usize,

    // Library page
    pub list_selected: usize,
    pub pending_delete: Option<i64>,
    pub modal_speed_index: usize,

    // Status message
    pub status_msg: String,

    queued: Option<Job>,
}

impl<A: VideoApi> App<A> {
    pub fn new(api: A, view: View) -> Self {
        Self {
            controller: ViewController::new(api, MemoryDocument::combined()),
            should_quit: false,
            view,
            show_help: false,
            input_mode: if view == View::Home {
                InputMode::Editing
            } else {
                InputMode::Normal
            },
            url_input: String::new(),
            speed_index: DEFAULT_SPEED_INDEX,
            list_selected: 0,
            pending_delete: None,
            modal_speed_index: DEFAULT_SPEED_INDEX,
            status_msg: String::new(),
            queued: None,
        }
    }

    pub fn doc(&self) -> &MemoryDocument {
        self.controller.doc()
    }

    /// Initial page load.
    pub async fn init(&mut self) {
        if self.controller.init(self.view.page()).await.is_ok() {
            self.status_msg = self.view_status();
        }
    }

    fn view_status(&self) -> String {
        match self.view {
            View::Home => "Paste a video URL and press Enter".to_string(),
            View::Library => format!("{} videos in library", self.controller.library().len()),
        }
    }

    /// Route an event through the controller and record the outcome.
    pub async fn dispatch(&mut self, event: UiEvent) {
        match self.controller.handle(event).await {
            Ok(()) => self.status_msg.clear(),
            Err(e) => self.status_msg = e.user_message(),
        }
    }

    /// Schedule network work. Dropped while another job is pending or when
    /// the triggering control is disabled.
    pub fn queue(&mut self, job: Job) {
        if self.queued.is_some() {
            debug!("Busy, dropping {:?}", job);
            return;
        }
        let accepted = match &job {
            Job::Event(event) => self.controller.begin(event),
            Job::LoadLibrary => {
                self.controller.show_library_loading();
                true
            }
        };
        if accepted {
            self.queued = Some(job);
        } else {
            debug!("Control disabled, dropping {:?}", job);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.queued.is_some()
    }

    /// Run the pending job, if any, and record its outcome.
    pub async fn run_queued(&mut self) {
        let Some(job) = self.queued.take() else {
            return;
        };
        match job {
            Job::LoadLibrary => {
                if self.controller.load_library().await.is_ok() {
                    self.clamp_selection();
                }
                self.status_msg = self.view_status();
            }
            Job::Event(event) => {
                let delete = match &event {
                    UiEvent::DeleteClicked(id) => Some(*id),
                    _ => None,
                };
                let preview = matches!(
                    event,
                    UiEvent::PreviewClicked | UiEvent::UrlKeyPressed(_)
                );
                self.dispatch(event).await;

                if preview && self.status_msg.is_empty() {
                    if let Some(video) = self.controller.current_video() {
                        self.status_msg = format!("Previewing: {}", video.title);
                    }
                }
                if let Some(id) = delete {
                    self.clamp_selection();
                    if self.status_msg.is_empty() {
                        self.status_msg = format!("Deleted video {}", id);
                    }
                }
            }
        }
    }

    /// Switch pages. The library reloads every time it is shown.
    pub fn switch_view(&mut self, view: View) {
        if self.modal_open() {
            self.controller.close_modal();
        }
        self.controller.doc_mut().hide(ids::ERROR);
        self.view = view;
        self.input_mode = InputMode::Normal;
        self.status_msg = self.view_status();
        if view == View::Library {
            self.queue(Job::LoadLibrary);
        }
    }

    pub fn modal_open(&self) -> bool {
        !self.doc().is_hidden(ids::VIDEO_MODAL)
    }

    pub fn error_banner(&self) -> Option<String> {
        if self.doc().is_hidden(ids::ERROR) {
            None
        } else {
            self.doc().text(ids::ERROR)
        }
    }

    // ── Home page ──

    pub fn push_char(&mut self, c: char) {
        self.url_input.push(c);
        self.sync_url();
    }

    pub fn pop_char(&mut self) {
        self.url_input.pop();
        self.sync_url();
    }

    pub fn clear_input(&mut self) {
        self.url_input.clear();
        self.sync_url();
    }

    fn sync_url(&mut self) {
        let url = self.url_input.clone();
        self.controller.doc_mut().set_value(ids::VIDEO_URL, &url);
    }

    pub fn submit_url(&mut self) {
        self.queue(Job::Event(UiEvent::UrlKeyPressed("Enter".to_string())));
    }

    pub fn save(&mut self) {
        self.queue(Job::Event(UiEvent::SaveClicked));
    }

    /// Step the playback rate of whichever player is in front.
    pub fn cycle_speed(&mut self, forward: bool) {
        let modal = self.modal_open();
        let index = if modal {
            &mut self.modal_speed_index
        } else {
            &mut self.speed_index
        };
        *index = step(*index, PLAYBACK_SPEEDS.len(), forward);
        let speed = PLAYBACK_SPEEDS[*index];

        let applied = if modal {
            self.controller.change_modal_playback_speed(speed)
        } else {
            self.controller.change_playback_speed(speed)
        };
        self.status_msg = if applied {
            format!("Playback speed {}x", speed)
        } else {
            "Speed control only works with native video players".to_string()
        };
    }

    // ── Library page ──

    pub fn selected_video(&self) -> Option<&SavedVideo> {
        self.controller.library().get(self.list_selected)
    }

    pub fn list_next(&mut self) {
        if self.list_selected + 1 < self.controller.library().len() {
            self.list_selected += 1;
        }
    }

    pub fn list_prev(&mut self) {
        self.list_selected = self.list_selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.controller.library().len();
        if self.list_selected >= len {
            self.list_selected = len.saturating_sub(1);
        }
    }

    pub fn open_selected(&mut self) {
        if let Some(id) = self.selected_video().map(|v| v.id) {
            self.modal_speed_index = DEFAULT_SPEED_INDEX;
            self.queue(Job::Event(UiEvent::CardClicked(id)));
        }
    }

    pub async fn close_modal(&mut self) {
        self.dispatch(UiEvent::ModalCloseClicked).await;
    }

    pub fn request_delete(&mut self) {
        self.pending_delete = self.selected_video().map(|v| v.id);
    }

    /// Resolve the delete confirmation overlay.
    pub async fn answer_delete(&mut self, confirmed: bool) {
        if self.is_busy() {
            return;
        }
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        self.controller.doc_mut().answer_next_confirm(confirmed);
        if confirmed {
            self.queue(Job::Event(UiEvent::DeleteClicked(id)));
            return;
        }
        self.dispatch(UiEvent::DeleteClicked(id)).await;
        if self.status_msg.is_empty() {
            self.status_msg = "Delete cancelled".to_string();
        }
    }

    pub fn reload_library(&mut self) {
        self.queue(Job::LoadLibrary);
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.controller.tick(now)
    }
}

fn step(index: usize, len: usize, forward: bool) -> usize {
    if forward {
        (index + 1).min(len - 1)
    } else {
        index.saturating_sub(1)
    }
}
