//! Configuration file support.
//!
//! All keys are optional; missing keys keep their defaults. CLI flags are
//! applied on top by the binary.
//!
//! ```toml
//! language = "de"
//! debounce_ms = 600
//! result_limit = 25
//! thumbnails = false
//! log_level = "debug"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, WikiImagesError};
use crate::fetch::IMAGES_LIMIT;
use crate::url::api_url_for_language;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Wikipedia language edition, e.g. `"en"`.
    pub language: String,
    /// Full endpoint override; takes precedence over `language`.
    pub api_url: Option<String>,
    /// Quiet period after the last keystroke before searching.
    pub debounce_ms: u64,
    /// Pages requested per search.
    pub result_limit: u32,
    /// Duration of the zoom overlay fade in and fade out.
    pub zoom_fade_ms: u64,
    /// How long an error toast stays on screen.
    pub toast_ms: u64,
    pub request_timeout_secs: u64,
    /// Draw thumbnails when the terminal supports an image protocol.
    pub thumbnails: bool,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            api_url: None,
            debounce_ms: 1000,
            result_limit: IMAGES_LIMIT,
            zoom_fade_ms: 300,
            toast_ms: 2000,
            request_timeout_secs: 15,
            thumbnails: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| WikiImagesError::Config {
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            WikiImagesError::Config { message } => WikiImagesError::Config {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    /// Endpoint to query: the explicit override, else the language edition.
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| api_url_for_language(&self.language))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn zoom_fade(&self) -> Duration {
        Duration::from_millis(self.zoom_fade_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
