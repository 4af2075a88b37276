//! Image loading for styled markdown documents.
//!
//! - [`ImageCache`]: process-lifetime cache with synchronous [`lookup`] and
//!   async [`fetch`], backed by a weight-bounded `moka` store and an optional
//!   persistent payload layer
//! - [`ImageSource`]: blocking network collaborator; [`HttpSource`] is the
//!   default
//! - [`DecodedImage`]: a payload decoded with the `image` crate, with its
//!   format and natural dimensions
//! - [`DisplayDocument`] and [`load_pending`]: placeholder substitution and
//!   in-place replacement as fetches complete
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mdrun_images::{DisplayDocument, HttpSource, ImageCache, load_pending};
//! use mdrun_renderer::StyledRenderer;
//!
//! # async fn run() {
//! let doc = StyledRenderer::new().render_markdown("![Logo](https://example.com/logo.png)");
//! let cache = Arc::new(ImageCache::new(HttpSource::default()));
//!
//! let (mut display, pending) = DisplayDocument::prepare(&doc, &cache, 300.0);
//! let failures = load_pending(Arc::clone(&cache), pending, |update| {
//!     display.apply(update);
//! })
//! .await;
//! # }
//! ```
//!
//! [`lookup`]: ImageCache::lookup
//! [`fetch`]: ImageCache::fetch

mod cache;
mod consts;
mod decode;
mod display;
mod error;
mod scale;
mod source;

pub use cache::{ImageCache, normalize_url};
pub use consts::{DEFAULT_BODY_LIMIT, DEFAULT_MAX_WIDTH, DEFAULT_MEMORY_CAPACITY, PAYLOAD_BUCKET};
pub use decode::{DecodedImage, ImageFormat};
pub use display::{
    DisplayDocument, ImageContent, ImageUpdate, LoadFailure, PendingLoad, Segment, load_pending,
};
pub use error::{DecodeError, FetchError};
pub use scale::{DisplaySize, placeholder_size, scaled_size};
pub use source::{HttpSource, ImageSource};
