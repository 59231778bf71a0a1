//! Full-screen zoom overlay with fade in / fade out.
//!
//! At most one overlay exists at a time. Dismissing it starts a fade-out and
//! the overlay is only removed once that fade-out has run to completion; a
//! zoom request arriving before then is ignored.

use std::time::{Duration, Instant};

use crate::models::ImageResult;

pub const FADE_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    FadingIn { started: Instant },
    FadingOut { started: Instant },
}

#[derive(Debug, Clone)]
pub struct ZoomOverlay {
    image: ImageResult,
    fade: Duration,
    phase: Phase,
}

impl ZoomOverlay {
    fn open(image: ImageResult, fade: Duration, now: Instant) -> Self {
        Self {
            image,
            fade,
            phase: Phase::FadingIn { started: now },
        }
    }

    pub fn image(&self) -> &ImageResult {
        &self.image
    }

    /// Animation progress in `0.0..=1.0` since `started`.
    fn progress(&self, started: Instant, now: Instant) -> f32 {
        if self.fade.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(started);
        (elapsed.as_secs_f32() / self.fade.as_secs_f32()).min(1.0)
    }

    /// Current opacity, 0.0 (invisible) to 1.0 (opaque).
    pub fn opacity(&self, now: Instant) -> f32 {
        match self.phase {
            Phase::FadingIn { started } => self.progress(started, now),
            Phase::FadingOut { started } => 1.0 - self.progress(started, now),
        }
    }

    pub fn is_closing(&self) -> bool {
        matches!(self.phase, Phase::FadingOut { .. })
    }

    fn close(&mut self, now: Instant) {
        // A running fade-in is abandoned; the fade-out always starts opaque.
        if !self.is_closing() {
            self.phase = Phase::FadingOut { started: now };
        }
    }

    fn is_finished(&self, now: Instant) -> bool {
        match self.phase {
            Phase::FadingOut { started } => now.saturating_duration_since(started) >= self.fade,
            Phase::FadingIn { .. } => false,
        }
    }
}

/// Owner of the (optional) overlay.
#[derive(Debug)]
pub struct ZoomLayer {
    fade: Duration,
    overlay: Option<ZoomOverlay>,
}

impl ZoomLayer {
    pub fn new(fade: Duration) -> Self {
        Self {
            fade,
            overlay: None,
        }
    }

    /// Open an overlay for `image`. Ignored (returns `false`) while another
    /// overlay exists, even one that is fading out.
    pub fn show(&mut self, image: ImageResult, now: Instant) -> bool {
        if self.overlay.is_some() {
            return false;
        }
        self.overlay = Some(ZoomOverlay::open(image, self.fade, now));
        true
    }

    /// Start fading the overlay out.
    pub fn dismiss(&mut self, now: Instant) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.close(now);
        }
    }

    /// Remove the overlay once its fade-out has completed.
    pub fn tick(&mut self, now: Instant) {
        if self.overlay.as_ref().is_some_and(|o| o.is_finished(now)) {
            self.overlay = None;
        }
    }

    pub fn overlay(&self) -> Option<&ZoomOverlay> {
        self.overlay.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.overlay.is_some()
    }
}

impl Default for ZoomLayer {
    fn default() -> Self {
        Self::new(FADE_DURATION)
    }
}
