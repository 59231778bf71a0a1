use thiserror::Error;

/// Error type for image search operations.
///
/// - `RequestFailed`: network/transport errors (wraps `reqwest::Error`)
/// - `Status`: the API answered with a non-2xx status code
/// - `Decode`: the response body could not be read
/// - `InvalidUtf8`: the body is not valid UTF-8
/// - `UnsupportedCharset`: the body declares a charset other than UTF-8
/// - `Image`: thumbnail bytes are not a decodable image
/// - `Parse`: the body is not the JSON document we expect
/// - `Config`: a configuration file could not be understood
/// - `Io`: local I/O (config file, log file)
#[derive(Debug, Error)]
pub enum WikiImagesError {
    #[error("Request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("API returned HTTP {status}")]
    Status { status: u16 },

    #[error("Could not decode response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Response body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Unsupported response charset: {charset}")]
    UnsupportedCharset { charset: String },

    #[error("Could not decode thumbnail: {0}")]
    Image(#[from] image::ImageError),

    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for WikiImagesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WikiImagesError::Decode(err)
        } else {
            WikiImagesError::RequestFailed(err)
        }
    }
}

/// Coarse classification of a failure, as surfaced to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Decode,
    Parse,
    /// A notification could not be delivered to a subscriber.
    Dispatch,
    Config,
}

impl WikiImagesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WikiImagesError::RequestFailed(_) | WikiImagesError::Status { .. } => {
                ErrorKind::Network
            }
            WikiImagesError::Decode(_)
            | WikiImagesError::InvalidUtf8(_)
            | WikiImagesError::UnsupportedCharset { .. }
            | WikiImagesError::Image(_) => ErrorKind::Decode,
            WikiImagesError::Parse(_) => ErrorKind::Parse,
            WikiImagesError::Config { .. } | WikiImagesError::Io(_) => ErrorKind::Config,
        }
    }
}

/// Cloneable summary of a failed fetch cycle, carried on
/// [`FetchEvent::Failed`](crate::FetchEvent::Failed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl FetchFailure {
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Dispatch,
            message: message.into(),
        }
    }
}

impl From<&WikiImagesError> for FetchFailure {
    fn from(err: &WikiImagesError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WikiImagesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_are_classified_as_parse() {
        let err: WikiImagesError = serde_json::from_str::<serde_json::Value>("{\"query\":")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let failure = FetchFailure::from(&err);
        assert_eq!(failure.kind, ErrorKind::Parse);
        assert!(failure.message.starts_with("Malformed response"));
    }

    #[test]
    fn status_errors_count_as_network_failures() {
        let err = WikiImagesError::Status { status: 503 };
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.to_string(), "API returned HTTP 503");
    }

    #[test]
    fn invalid_utf8_is_a_decode_failure() {
        let err: WikiImagesError = String::from_utf8(vec![b'Z', 0xff, 0xfe]).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = WikiImagesError::UnsupportedCharset {
            charset: "iso-8859-1".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn undecodable_images_are_decode_failures() {
        let err: WikiImagesError = image::load_from_memory(b"not an image").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().starts_with("Could not decode thumbnail"));
    }
}
