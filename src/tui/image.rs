//! Thumbnails on screen: terminal image support and decoded pictures.

use std::collections::{HashMap, HashSet};

use ::image::DynamicImage;
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use tracing::debug;

use crate::models::ImageResult;
use crate::thumbnails::ThumbnailLoader;

/// Whether the terminal supports image display
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageProtocol {
    Supported,
    None,
}

impl ImageProtocol {
    pub fn detect() -> Self {
        // Kitty graphics or iTerm2 inline images
        if let Ok(term) = std::env::var("TERM") {
            if term.contains("kitty") || term.contains("ghostty") {
                return ImageProtocol::Supported;
            }
        }
        if let Ok(prog) = std::env::var("TERM_PROGRAM") {
            let prog = prog.to_lowercase();
            if prog.contains("ghostty") || prog.contains("wezterm") || prog.contains("iterm") {
                return ImageProtocol::Supported;
            }
        }
        ImageProtocol::None
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, ImageProtocol::Supported)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailState {
    /// Not requested, or thumbnails are off.
    Missing,
    Loading,
    Ready,
    Failed,
}

struct Entry {
    image: DynamicImage,
    row: StatefulProtocol,
    zoomed: Option<StatefulProtocol>,
}

/// Decoded thumbnails for the rows on screen, each with its own render
/// protocol for the list and, once zoomed, for the overlay.
pub struct Thumbnails {
    picker: Option<Picker>,
    loader: Option<ThumbnailLoader>,
    ready: HashMap<String, Entry>,
    loading: HashSet<String>,
    failed: HashSet<String>,
}

impl Thumbnails {
    /// Text-only mode: nothing is downloaded.
    pub fn disabled() -> Self {
        Self {
            picker: None,
            loader: None,
            ready: HashMap::new(),
            loading: HashSet::new(),
            failed: HashSet::new(),
        }
    }

    pub fn new(picker: Picker, loader: ThumbnailLoader) -> Self {
        Self {
            picker: Some(picker),
            loader: Some(loader),
            ..Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.picker.is_some() && self.loader.is_some()
    }

    /// Request a thumbnail for every row and drop pictures no row shows.
    pub fn sync(&mut self, rows: &[ImageResult]) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };

        let wanted: HashSet<&str> = rows.iter().map(|row| row.url.as_str()).collect();
        self.ready.retain(|url, _| {
            let keep = wanted.contains(url.as_str());
            if !keep {
                loader.forget(url);
            }
            keep
        });
        // A failed thumbnail gets another try on the next search.
        for url in self.failed.drain() {
            loader.forget(&url);
        }

        for row in rows {
            if !self.ready.contains_key(&row.url) && loader.request(&row.url) {
                self.loading.insert(row.url.clone());
            }
        }
    }

    /// Take in finished downloads. Returns how many arrived.
    pub fn poll(&mut self) -> usize {
        let (Some(loader), Some(picker)) = (self.loader.as_ref(), self.picker.as_mut()) else {
            return 0;
        };

        let mut count = 0;
        for loaded in loader.try_iter() {
            count += 1;
            self.loading.remove(&loaded.url);
            match loaded.image {
                Ok(image) => {
                    let row = picker.new_resize_protocol(image.clone());
                    self.ready.insert(
                        loaded.url,
                        Entry {
                            image,
                            row,
                            zoomed: None,
                        },
                    );
                }
                Err(failure) => {
                    debug!(url = %loaded.url, kind = ?failure.kind, "no thumbnail");
                    self.failed.insert(loaded.url);
                }
            }
        }
        count
    }

    pub fn state(&self, url: &str) -> ThumbnailState {
        if self.ready.contains_key(url) {
            ThumbnailState::Ready
        } else if self.failed.contains(url) {
            ThumbnailState::Failed
        } else if self.loading.contains(url) {
            ThumbnailState::Loading
        } else {
            ThumbnailState::Missing
        }
    }

    pub fn row_protocol(&mut self, url: &str) -> Option<&mut StatefulProtocol> {
        self.ready.get_mut(url).map(|entry| &mut entry.row)
    }

    /// Protocol for the zoom overlay, sized independently of the list row.
    pub fn zoomed_protocol(&mut self, url: &str) -> Option<&mut StatefulProtocol> {
        let picker = self.picker.as_mut()?;
        let entry = self.ready.get_mut(url)?;
        let image = &entry.image;
        Some(
            entry
                .zoomed
                .get_or_insert_with(|| picker.new_resize_protocol(image.clone())),
        )
    }
}

impl Default for Thumbnails {
    fn default() -> Self {
        Self::disabled()
    }
}
