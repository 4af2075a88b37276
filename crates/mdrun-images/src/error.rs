//! Image loading errors.

/// Payload could not be decoded into an image.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Failure to fetch a single image.
///
/// Failures are never cached; a later fetch of the same URL retries.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid image URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("undecodable image: {0}")]
    Decode(#[from] DecodeError),
    #[error("fetch task failed: {0}")]
    Join(String),
}
