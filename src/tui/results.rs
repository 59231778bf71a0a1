//! Results list: subscribes to the fetch service and keeps the rows shown on
//! screen in step with the latest completed search.

use std::time::{Duration, Instant};

use tracing::debug;

use super::toast::Toast;
use crate::error::ErrorKind;
use crate::fetch::{FetchEvent, FetchService, Subscription};
use crate::models::ImageResult;

pub const ERROR_MESSAGE: &str = "Could not fetch images. Check your connection.";

/// Toast text for a failed fetch of the given kind.
pub fn error_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Network => ERROR_MESSAGE,
        ErrorKind::Decode | ErrorKind::Parse => "Wikipedia sent a response that could not be read.",
        ErrorKind::Dispatch => "Some search results could not be delivered.",
        ErrorKind::Config => "Could not fetch images: invalid configuration.",
    }
}

pub struct ResultsView {
    service: FetchService,
    subscription: Subscription,
    /// Only results that have a thumbnail.
    rows: Vec<ImageResult>,
    /// Pages in the last completed result set, with or without thumbnail.
    total: usize,
    selected: usize,
    searching: bool,
    toast: Option<Toast>,
    toast_duration: Duration,
}

impl ResultsView {
    pub fn new(service: &FetchService, toast_duration: Duration) -> Self {
        Self {
            service: service.clone(),
            subscription: service.subscribe(),
            rows: Vec::new(),
            total: 0,
            selected: 0,
            searching: false,
            toast: None,
            toast_duration,
        }
    }

    /// Apply every event queued since the last poll and expire the toast.
    /// Returns the number of events applied.
    pub fn poll(&mut self, now: Instant) -> usize {
        let events: Vec<FetchEvent> = self.subscription.try_iter().collect();
        let count = events.len();
        for event in events {
            self.apply(event, now);
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
        count
    }

    pub fn apply(&mut self, event: FetchEvent, now: Instant) {
        match event {
            FetchEvent::Started { .. } => {
                self.searching = true;
            }
            FetchEvent::Failed { cycle, failure } => {
                debug!(cycle, kind = ?failure.kind, "showing fetch error");
                self.searching = false;
                self.toast = Some(Toast::new(
                    error_message(failure.kind),
                    self.toast_duration,
                    now,
                ));
            }
            FetchEvent::Completed { cycle, images } => {
                self.searching = false;
                self.total = images.len();
                self.rows = images.into_iter().filter(|i| i.has_thumbnail()).collect();
                self.selected = 0;
                debug!(cycle, total = self.total, shown = self.rows.len(), "results replaced");
            }
        }
    }

    pub fn rows(&self) -> &[ImageResult] {
        &self.rows
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The row a tap (Enter) would zoom into.
    pub fn selected(&self) -> Option<&ImageResult> {
        self.rows.get(self.selected)
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_by(&mut self, delta: isize) {
        let last = self.rows.len().saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }
}

impl Drop for ResultsView {
    fn drop(&mut self) {
        self.service.unsubscribe(self.subscription.id());
    }
}
