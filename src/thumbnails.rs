//! Background thumbnail loading.
//!
//! A small pool of worker threads downloads thumbnail bytes and decodes them
//! with `image`, so the UI thread only ever sees finished pictures.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender, TryIter};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::{FetchFailure, Result};

/// Worker threads per loader.
pub const WORKERS: usize = 4;

/// Anything that can fetch the bytes behind a thumbnail URL.
pub trait ThumbnailSource: Send + Sync {
    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Decode downloaded bytes (PNG, JPEG, GIF or WebP).
pub fn decode_thumbnail(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Outcome of one thumbnail request.
#[derive(Debug)]
pub struct LoadedThumbnail {
    pub url: String,
    pub image: std::result::Result<DynamicImage, FetchFailure>,
}

/// Handle on the worker pool. Dropping it stops the workers once their
/// current download finishes.
pub struct ThumbnailLoader {
    requests: Sender<String>,
    loaded: Receiver<LoadedThumbnail>,
    requested: HashSet<String>,
}

impl ThumbnailLoader {
    pub fn spawn(source: Arc<dyn ThumbnailSource>) -> Self {
        Self::with_workers(source, WORKERS)
    }

    pub fn with_workers(source: Arc<dyn ThumbnailSource>, workers: usize) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<String>();
        let (loaded_tx, loaded_rx) = mpsc::channel();
        let request_rx = Arc::new(Mutex::new(request_rx));

        for worker in 0..workers.max(1) {
            let source = Arc::clone(&source);
            let request_rx = Arc::clone(&request_rx);
            let loaded_tx = loaded_tx.clone();
            thread::spawn(move || {
                loop {
                    let next = request_rx
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .recv();
                    let Ok(url) = next else { break };

                    let loaded = load(source.as_ref(), url);
                    if loaded_tx.send(loaded).is_err() {
                        break;
                    }
                }
                debug!(worker, "thumbnail worker stopped");
            });
        }

        Self {
            requests: request_tx,
            loaded: loaded_rx,
            requested: HashSet::new(),
        }
    }

    /// Queue `url` unless it is empty or already requested. Returns whether
    /// it was queued.
    pub fn request(&mut self, url: &str) -> bool {
        if url.is_empty() || self.requested.contains(url) {
            return false;
        }
        if self.requests.send(url.to_string()).is_err() {
            warn!(%url, "thumbnail workers are gone");
            return false;
        }
        self.requested.insert(url.to_string());
        true
    }

    /// Allow `url` to be requested again.
    pub fn forget(&mut self, url: &str) {
        self.requested.remove(url);
    }

    /// Drain finished thumbnails without blocking.
    pub fn try_iter(&self) -> TryIter<'_, LoadedThumbnail> {
        self.loaded.try_iter()
    }
}

fn load(source: &dyn ThumbnailSource, url: String) -> LoadedThumbnail {
    let image = source
        .download(&url)
        .and_then(|bytes| decode_thumbnail(&bytes))
        .map_err(|err| {
            warn!(%url, error = %err, "thumbnail failed");
            FetchFailure::from(&err)
        });
    LoadedThumbnail { url, image }
}


#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::test_support::{png_bytes, MapSource};
    use super::*;
    use crate::error::ErrorKind;

    fn collect(loader: &ThumbnailLoader, want: usize) -> Vec<LoadedThumbnail> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut loaded = Vec::new();
        while loaded.len() < want && Instant::now() < deadline {
            loaded.extend(loader.try_iter());
            thread::sleep(Duration::from_millis(5));
        }
        loaded
    }

    #[test]
    fn decodes_png_bytes() {
        let image = decode_thumbnail(&png_bytes(3, [0, 128, 255])).unwrap();
        assert_eq!((image.width(), image.height()), (3, 3));
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let err = decode_thumbnail(b"<html>not found</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn loads_each_url_once() {
        let source = MapSource::new(&[("https://x/a.png", png_bytes(2, [255, 0, 0]))]);
        let mut loader = ThumbnailLoader::with_workers(source.clone(), 2);

        assert!(loader.request("https://x/a.png"));
        assert!(!loader.request("https://x/a.png"));
        assert!(!loader.request(""));

        let loaded = collect(&loader, 1);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].url, "https://x/a.png");
        assert_eq!(loaded[0].image.as_ref().unwrap().width(), 2);
        assert_eq!(*source.hits.lock().unwrap(), vec!["https://x/a.png"]);
    }

    #[test]
    fn failures_are_reported_per_url() {
        let source = MapSource::new(&[("https://x/bad.png", b"nope".to_vec())]);
        let mut loader = ThumbnailLoader::spawn(source);

        loader.request("https://x/bad.png");
        loader.request("https://x/missing.png");

        let mut loaded = collect(&loader, 2);
        loaded.sort_by(|a, b| a.url.cmp(&b.url));
        let kinds: Vec<ErrorKind> = loaded
            .iter()
            .map(|l| l.image.as_ref().unwrap_err().kind)
            .collect();
        assert_eq!(kinds, vec![ErrorKind::Decode, ErrorKind::Network]);
    }

    #[test]
    fn forgotten_urls_can_be_requested_again() {
        let source = MapSource::new(&[]);
        let mut loader = ThumbnailLoader::with_workers(source, 1);
        assert!(loader.request("https://x/a.png"));
        loader.forget("https://x/a.png");
        assert!(loader.request("https://x/a.png"));
    }
}
