use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::error::{Result, WikiImagesError};
use crate::fetch::ImageSource;
use crate::models::{parse_images, ImageResult};
use crate::thumbnails::ThumbnailSource;
use crate::url::search_images_url_at;

const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (terminal image search)"
);

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Blocking client for the MediaWiki action API.
///
/// ```no_run
/// use wiki_images::WikiClient;
///
/// let client = WikiClient::new(wiki_images::url::API_URL).unwrap();
/// for image in client.search_images("Ferris", 200, 10).unwrap() {
///     println!("{}: {}", image.title, image.url);
/// }
/// ```
pub struct WikiClient {
    api_url: String,
    http: Client,
}

impl WikiClient {
    /// Create a client for `api_url`, e.g. `https://en.wikipedia.org/w/api.php`.
    pub fn new(api_url: &str) -> Result<Self> {
        Self::with_timeout(api_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Search pages whose title starts with `search_term` and return their
    /// thumbnails.
    ///
    /// The term is percent-encoded here; `thumb_size` caps the thumbnail's
    /// larger dimension and `limit` the number of pages.
    pub fn search_images(
        &self,
        search_term: &str,
        thumb_size: u32,
        limit: u32,
    ) -> Result<Vec<ImageResult>> {
        let encoded = urlencoding::encode(search_term);
        let url = search_images_url_at(&self.api_url, &encoded, thumb_size, limit);
        debug!(%url, "requesting page images");

        // The API accepts the query string on a body-less POST.
        let response = self.http.post(url).send()?;
        let body = self.read_body(response)?;
        parse_images(&body)
    }

    /// Fetch the raw bytes of a thumbnail.
    pub fn download_thumbnail(&self, url: &str) -> Result<Vec<u8>> {
        debug!(%url, "downloading thumbnail");
        let response = self.http.get(url).header(ACCEPT, "image/*").send()?;
        let response = check_status(response)?;
        let bytes = response.bytes().map_err(WikiImagesError::Decode)?;
        Ok(bytes.to_vec())
    }

    /// Check the status code and decode the body strictly as UTF-8.
    fn read_body(&self, response: Response) -> Result<String> {
        let response = check_status(response)?;

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(declared_charset);
        if let Some(charset) = charset {
            if charset != "utf-8" && charset != "utf8" {
                return Err(WikiImagesError::UnsupportedCharset { charset });
            }
        }

        let bytes = response.bytes().map_err(WikiImagesError::Decode)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        return Err(WikiImagesError::Status { status });
    }
    Ok(response)
}

/// The lowercased `charset` parameter of a `Content-Type` value, if any.
fn declared_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.trim().split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

impl ImageSource for WikiClient {
    fn search(&self, search_term: &str, thumb_size: u32, limit: u32) -> Result<Vec<ImageResult>> {
        self.search_images(search_term, thumb_size, limit)
    }
}

impl ThumbnailSource for WikiClient {
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.download_thumbnail(url)
    }
}
