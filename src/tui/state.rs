use std::time::Instant;

use tracing::debug;

use super::image::Thumbnails;
use super::results::ResultsView;
use super::zoom::ZoomLayer;
use crate::debounce::Debouncer;
use crate::fetch::FetchService;
use crate::Config;

/// Search captured when the debounce was armed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    pub thumb_size: u32,
}

/// Thumbnail size for a viewport `width` pixels wide: three quarters of it.
pub fn thumb_size_for_width(width: u32) -> u32 {
    width - (width >> 2)
}

/// Main application state.
pub struct AppState {
    /// Search text typed so far.
    pub(crate) query: String,
    /// Cursor position in the search text, as a byte offset.
    pub(crate) cursor_position: usize,
    /// Width of the results area in pixels.
    pub(crate) viewport_width_px: u32,
    /// Pending search, fired once typing pauses.
    pub(crate) debouncer: Debouncer<SearchRequest>,
    pub(crate) service: FetchService,
    pub(crate) results: ResultsView,
    pub(crate) zoom: ZoomLayer,
    /// Pictures for the rows and the overlay; disabled in text-only mode.
    pub(crate) thumbnails: Thumbnails,
    /// Endpoint shown in the status bar.
    pub(crate) api_url: String,
    /// Should the application quit?
    pub should_quit: bool,
}

impl AppState {
    pub fn new(service: FetchService, config: &Config) -> Self {
        Self {
            query: String::new(),
            cursor_position: 0,
            viewport_width_px: 0,
            debouncer: Debouncer::new(config.debounce()),
            results: ResultsView::new(&service, config.toast_duration()),
            service,
            zoom: ZoomLayer::new(config.zoom_fade()),
            thumbnails: Thumbnails::disabled(),
            api_url: config.api_url(),
            should_quit: false,
        }
    }

    /// Show thumbnails through `thumbnails` instead of text only.
    pub fn with_thumbnails(mut self, thumbnails: Thumbnails) -> Self {
        self.thumbnails = thumbnails;
        self
    }

    pub fn set_viewport_width(&mut self, width_px: u32) {
        self.viewport_width_px = width_px;
    }

    pub fn thumb_size(&self) -> u32 {
        thumb_size_for_width(self.viewport_width_px)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The text changed: drop whatever search is pending or in flight and
    /// schedule one for the current text.
    fn text_changed(&mut self, now: Instant) {
        self.service.cancel();
        let request = SearchRequest {
            term: self.query.clone(),
            thumb_size: self.thumb_size(),
        };
        if self.debouncer.arm(request, now) {
            debug!("superseded pending search");
        }
    }

    pub(crate) fn insert_char(&mut self, c: char, now: Instant) {
        self.query.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
        self.text_changed(now);
    }

    pub(crate) fn backspace(&mut self, now: Instant) {
        if let Some(c) = self.query[..self.cursor_position].chars().next_back() {
            self.cursor_position -= c.len_utf8();
            self.query.remove(self.cursor_position);
            self.text_changed(now);
        }
    }

    pub(crate) fn delete(&mut self, now: Instant) {
        if self.cursor_position < self.query.len() {
            self.query.remove(self.cursor_position);
            self.text_changed(now);
        }
    }

    /// Clear the whole search text.
    pub(crate) fn clear_query(&mut self, now: Instant) {
        if !self.query.is_empty() {
            self.query.clear();
            self.cursor_position = 0;
            self.text_changed(now);
        }
    }

    pub(crate) fn move_left(&mut self) {
        if let Some(c) = self.query[..self.cursor_position].chars().next_back() {
            self.cursor_position -= c.len_utf8();
        }
    }

    pub(crate) fn move_right(&mut self) {
        if let Some(c) = self.query[self.cursor_position..].chars().next() {
            self.cursor_position += c.len_utf8();
        }
    }

    pub(crate) fn move_home(&mut self) {
        self.cursor_position = 0;
    }

    pub(crate) fn move_end(&mut self) {
        self.cursor_position = self.query.len();
    }

    /// Zoom into the selected row ("tap"). Ignored while an overlay exists.
    pub(crate) fn show_selected_image(&mut self, now: Instant) -> bool {
        match self.results.selected().cloned() {
            Some(image) => self.zoom.show(image, now),
            None => false,
        }
    }

    /// Tap on the overlay: start fading it out.
    pub(crate) fn dismiss_zoom(&mut self, now: Instant) {
        self.zoom.dismiss(now);
    }
}
