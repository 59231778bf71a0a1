use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// One page returned by an image search.
///
/// `url` is empty when the page has no thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResult {
    pub title: String,
    pub url: String,
}

impl ImageResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    pub fn has_thumbnail(&self) -> bool {
        !self.url.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Raw API payload: `{ query: { pages: { <id>: { title, thumbnail?: { source } } } } }`
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBlock>,
}

#[derive(Debug, Deserialize)]
struct QueryBlock {
    /// Keyed by page id; missing pages would carry negative ids.
    #[serde(default)]
    pages: Option<BTreeMap<i64, Page>>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: String,
}

/// Parse an API response body into search results.
///
/// Pages come out in ascending numeric page id order. A body without `query` or
/// `pages` is an empty result, not an error; anything that is not JSON, or
/// a page missing its `title` (or a thumbnail missing its `source`), is a
/// parse error.
pub fn parse_images(body: &str) -> Result<Vec<ImageResult>> {
    let response: QueryResponse = serde_json::from_str(body)?;

    let pages = match response.query.and_then(|q| q.pages) {
        Some(pages) => pages,
        None => return Ok(Vec::new()),
    };

    Ok(pages
        .into_values()
        .map(|page| ImageResult {
            title: page.title,
            url: page.thumbnail.map(|t| t.source).unwrap_or_default(),
        })
        .collect())
}
