//! Terminal front end.
//!
//! Layout:
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              Wikipedia Images                │
//! ├──────────────────────────────────────────────┤
//! │ Search: [ferr_______________________]        │
//! ├──────────────────────────────────────────────┤
//! │ > Ferris wheel                               │
//! │   https://upload.wikimedia.org/...           │
//! │   Ferrari                                    │
//! │   https://upload.wikimedia.org/...           │
//! ├──────────────────────────────────────────────┤
//! │ 12 images │ https://en.wikipedia.org/w/api.php│
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The main loop (see the `wiki-images` binary) draws, runs
//! [`process_state`], then waits briefly for input and hands it to
//! [`handle_event`]. Fetch results arrive on the loop's thread through the
//! results view's subscription.

pub mod actions;
pub mod events;
pub mod image;
pub mod results;
pub mod state;
pub mod terminal;
pub mod toast;
pub mod ui;
pub mod zoom;

pub use actions::process_state;
pub use events::handle_event;
pub use image::{ImageProtocol, Thumbnails};
pub use state::AppState;
pub use terminal::{restore_terminal, setup_terminal, viewport_width_px};
pub use ui::render;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use crate::error::Result;
    use crate::fetch::{FetchService, ImageSource};
    use crate::models::ImageResult;

    /// Answers every search with the same images and records the requests.
    pub(crate) struct StaticSource {
        images: Vec<ImageResult>,
        pub(crate) requests: Mutex<Vec<(String, u32)>>,
    }

    impl ImageSource for StaticSource {
        fn search(&self, term: &str, thumb_size: u32, _limit: u32) -> Result<Vec<ImageResult>> {
            self.requests
                .lock()
                .unwrap()
                .push((term.to_string(), thumb_size));
            Ok(self.images.clone())
        }
    }

    pub(crate) fn static_service(images: Vec<ImageResult>) -> (FetchService, Arc<StaticSource>) {
        let source = Arc::new(StaticSource {
            images,
            requests: Mutex::new(Vec::new()),
        });
        (FetchService::new(source.clone()), source)
    }

    pub(crate) fn sample_images() -> Vec<ImageResult> {
        vec![
            ImageResult::new("Ferris wheel", "https://upload.wikimedia.org/wheel.jpg"),
            ImageResult::new("Ferrite", ""),
            ImageResult::new("Ferrari", "https://upload.wikimedia.org/ferrari.jpg"),
            ImageResult::new("Ferrous", ""),
        ]
    }
}
