//! Wikipedia image search, as you type.
//!
//! The library covers everything below the screen: building the
//! [MediaWiki action API](https://www.mediawiki.org/wiki/API:Main_page) query,
//! fetching and parsing page thumbnails, debouncing keystrokes, and fanning
//! fetch lifecycle events out to subscribers. The [`tui`] module puts a
//! terminal front end on top of it.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use wiki_images::{FetchEvent, FetchService, WikiClient};
//!
//! let client = WikiClient::new(wiki_images::url::API_URL).unwrap();
//! let service = FetchService::new(Arc::new(client));
//! let events = service.subscribe();
//!
//! service.fetch_images("Ferris", 240);
//! while let Ok(event) = events.recv_timeout(Duration::from_secs(10)) {
//!     if let FetchEvent::Completed { images, .. } = event {
//!         for image in images.iter().filter(|i| i.has_thumbnail()) {
//!             println!("{}: {}", image.title, image.url);
//!         }
//!         break;
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod models;
pub mod thumbnails;
pub mod tui;
pub mod url;

// Re-export the main public types at the crate root for convenience.
pub use client::WikiClient;
pub use config::Config;
pub use debounce::Debouncer;
pub use error::{ErrorKind, FetchFailure, WikiImagesError};
pub use fetch::{FetchEvent, FetchService, FetchTicket, ImageSource, Subscription, IMAGES_LIMIT};
pub use models::{parse_images, ImageResult};
pub use thumbnails::{LoadedThumbnail, ThumbnailLoader, ThumbnailSource};
