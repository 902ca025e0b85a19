//! The element-id binding contract between the controller and its markup.

use std::collections::{BTreeSet, HashMap, VecDeque};

use tracing::debug;

use crate::render::escape_html;

/// Element ids the controller reads and writes.
pub mod ids {
    pub const VIDEO_URL: &str = "videoUrl";
    pub const PREVIEW_BTN: &str = "previewBtn";
    pub const SAVE_VIDEO_BTN: &str = "saveVideoBtn";
    pub const SPEED_CONTROL: &str = "speedControl";
    pub const LOADING: &str = "loading";
    pub const ERROR: &str = "error";
    pub const VIDEO_PREVIEW: &str = "videoPreview";
    pub const VIDEO_PLAYER: &str = "videoPlayer";
    pub const VIDEO_TITLE: &str = "videoTitle";
    pub const VIDEO_SOURCE: &str = "videoSource";

    pub const EMPTY_LIBRARY: &str = "emptyLibrary";
    pub const VIDEO_GRID: &str = "videoGrid";
    pub const VIDEO_MODAL: &str = "videoModal";
    pub const MODAL_VIDEO_TITLE: &str = "modalVideoTitle";
    pub const MODAL_VIDEO_PLAYER: &str = "modalVideoPlayer";
    pub const MODAL_SPEED_CONTROL: &str = "modalSpeedControl";
    pub const MODAL_CLOSE: &str = "modalClose";
}

/// CSS classes with behavioral meaning.
pub mod classes {
    pub const HIDDEN: &str = "hidden";
    pub const BTN_SUCCESS: &str = "btn-success";
    pub const BTN_PRIMARY: &str = "btn-primary";
}

/// Which page the markup belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Library,
}

/// Element-level operations on a rendered page.
///
/// Operations on ids that are absent from the page are no-ops; readers
/// return `None`.
pub trait Document {
    fn has(&self, id: &str) -> bool;

    /// Current value of a form control.
    fn value(&self, id: &str) -> Option<String>;

    fn text(&self, id: &str) -> Option<String>;
    fn set_text(&mut self, id: &str, text: &str);

    fn inner_html(&self, id: &str) -> Option<String>;
    fn set_inner_html(&mut self, id: &str, html: &str);

    fn has_class(&self, id: &str, class: &str) -> bool;
    fn add_class(&mut self, id: &str, class: &str);
    fn remove_class(&mut self, id: &str, class: &str);

    fn is_disabled(&self, id: &str) -> bool;
    fn set_disabled(&mut self, id: &str, disabled: bool);

    fn scroll_into_view(&mut self, id: &str);

    /// Set the playback rate of a native `<video>` inside `container`.
    ///
    /// Returns `false` when the container holds no native video element,
    /// e.g. an iframe player.
    fn set_playback_rate(&mut self, container: &str, rate: f64) -> bool;

    /// Blocking yes/no prompt.
    fn confirm(&mut self, message: &str) -> bool;

    /// Blocking message box.
    fn alert(&mut self, message: &str);

    fn show(&mut self, id: &str) {
        self.remove_class(id, classes::HIDDEN);
    }

    fn hide(&mut self, id: &str) {
        self.add_class(id, classes::HIDDEN);
    }

    fn is_hidden(&self, id: &str) -> bool {
        self.has_class(id, classes::HIDDEN)
    }
}

/// State of a single element in a [`MemoryDocument`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub value: String,
    pub text: String,
    pub inner_html: String,
    pub classes: BTreeSet<String>,
    pub disabled: bool,
    pub playback_rate: Option<f64>,
    pub scrolled_into_view: bool,
}

impl Element {
    fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            inner_html: escape_html(text),
            ..Self::default()
        }
    }

    fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes = classes.iter().map(|c| c.to_string()).collect();
        self
    }

    fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            ..Self::default()
        }
    }

    fn hidden(self) -> Self {
        self.with_classes(&[classes::HIDDEN])
    }
}

/// In-memory page used by tests and the terminal front-end.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: HashMap<String, Element>,
    confirm_answers: VecDeque<bool>,
    confirm_prompts: Vec<String>,
    alerts: Vec<String>,
}

impl MemoryDocument {
    /// A document with no elements at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The elements of the home (preview) page.
    pub fn home_page() -> Self {
        let mut doc = Self::empty();
        doc.add_home_elements();
        doc.add_shared_elements();
        doc
    }

    /// The elements of the library page.
    pub fn library_page() -> Self {
        let mut doc = Self::empty();
        doc.add_library_elements();
        doc.add_shared_elements();
        doc
    }

    /// Both pages in one document, sharing the loading and error elements.
    pub fn combined() -> Self {
        let mut doc = Self::empty();
        doc.add_home_elements();
        doc.add_library_elements();
        doc.add_shared_elements();
        doc
    }

    fn add_shared_elements(&mut self) {
        self.insert(ids::LOADING, Element::default().hidden());
        self.insert(ids::ERROR, Element::default().hidden());
    }

    fn add_home_elements(&mut self) {
        self.insert(ids::VIDEO_URL, Element::default());
        self.insert(ids::PREVIEW_BTN, Element::with_text("Preview"));
        self.insert(
            ids::SAVE_VIDEO_BTN,
            Element::with_text("Save to Library").with_classes(&["btn", classes::BTN_SUCCESS]),
        );
        self.insert(ids::SPEED_CONTROL, Element::with_value("1"));
        self.insert(ids::VIDEO_PREVIEW, Element::default().hidden());
        self.insert(ids::VIDEO_PLAYER, Element::default());
        self.insert(ids::VIDEO_TITLE, Element::default());
        self.insert(ids::VIDEO_SOURCE, Element::default());
    }

    fn add_library_elements(&mut self) {
        self.insert(ids::EMPTY_LIBRARY, Element::default().hidden());
        self.insert(ids::VIDEO_GRID, Element::default());
        self.insert(ids::VIDEO_MODAL, Element::default().hidden());
        self.insert(ids::MODAL_VIDEO_TITLE, Element::default());
        self.insert(ids::MODAL_VIDEO_PLAYER, Element::default());
        self.insert(ids::MODAL_SPEED_CONTROL, Element::with_value("1"));
        self.insert(ids::MODAL_CLOSE, Element::with_text("×"));
    }

    pub fn insert(&mut self, id: &str, element: Element) {
        self.elements.insert(id.to_string(), element);
    }

    pub fn remove(&mut self, id: &str) -> Option<Element> {
        self.elements.remove(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Type into a form control.
    pub fn set_value(&mut self, id: &str, value: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.value = value.to_string();
        }
    }

    /// Queue the answer for the next [`Document::confirm`] prompt.
    ///
    /// Prompts with nothing queued are declined.
    pub fn answer_next_confirm(&mut self, answer: bool) {
        self.confirm_answers.push_back(answer);
    }

    pub fn confirm_prompts(&self) -> &[String] {
        &self.confirm_prompts
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    fn with_element(&mut self, id: &str, f: impl FnOnce(&mut Element)) {
        match self.elements.get_mut(id) {
            Some(el) => f(el),
            None => debug!("element #{} not present, skipping", id),
        }
    }
}

impl Document for MemoryDocument {
    fn has(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn value(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|el| el.value.clone())
    }

    fn text(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|el| el.text.clone())
    }

    fn set_text(&mut self, id: &str, text: &str) {
        self.with_element(id, |el| {
            el.text = text.to_string();
            el.inner_html = escape_html(text);
            el.playback_rate = None;
        });
    }

    fn inner_html(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|el| el.inner_html.clone())
    }

    fn set_inner_html(&mut self, id: &str, html: &str) {
        self.with_element(id, |el| {
            el.inner_html = html.to_string();
            el.text.clear();
            el.playback_rate = None;
        });
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements
            .get(id)
            .is_some_and(|el| el.classes.contains(class))
    }

    fn add_class(&mut self, id: &str, class: &str) {
        self.with_element(id, |el| {
            el.classes.insert(class.to_string());
        });
    }

    fn remove_class(&mut self, id: &str, class: &str) {
        self.with_element(id, |el| {
            el.classes.remove(class);
        });
    }

    fn is_disabled(&self, id: &str) -> bool {
        self.elements.get(id).is_some_and(|el| el.disabled)
    }

    fn set_disabled(&mut self, id: &str, disabled: bool) {
        self.with_element(id, |el| el.disabled = disabled);
    }

    fn scroll_into_view(&mut self, id: &str) {
        self.with_element(id, |el| el.scrolled_into_view = true);
    }

    fn set_playback_rate(&mut self, container: &str, rate: f64) -> bool {
        let Some(el) = self.elements.get_mut(container) else {
            return false;
        };
        if !el.inner_html.to_ascii_lowercase().contains("<video") {
            return false;
        }
        el.playback_rate = Some(rate);
        true
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirm_prompts.push(message.to_string());
        self.confirm_answers.pop_front().unwrap_or(false)
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
