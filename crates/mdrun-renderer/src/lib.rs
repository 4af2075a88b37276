//! Markdown document tree to styled text run conversion.
//!
//! This crate turns a parsed markdown document into a linear [`StyledDocument`]:
//! an ordered sequence of [`StyledRun`]s, each pairing literal text with a full
//! set of [`StyleAttributes`] a rich-text widget can display directly.
//!
//! # Architecture
//!
//! - [`DocumentTree`]: read-only node graph, built from pulldown-cmark events or
//!   programmatically
//! - [`StyledRenderer`]: recursive converter dispatching on [`NodeKind`]
//! - [`depth`]: list and quote nesting depth from the ancestor chain
//! - [`IndentLayout`]: marker column and tab stop positions
//!
//! The renderer performs no I/O. Images are recorded as [`ImageMarker`]
//! attributes; fetching them is left to the consumer.
//!
//! # Example
//!
//! ```
//! use mdrun_renderer::StyledRenderer;
//!
//! let doc = StyledRenderer::new().render_markdown("![Logo](https://example.com/logo.png)");
//! let images: Vec<_> = doc.image_refs().map(|r| r.marker.url.clone()).collect();
//! assert_eq!(images, vec!["https://example.com/logo.png"]);
//! ```

pub mod depth;
mod document;
mod layout;
mod reference;
mod renderer;
mod style;
mod tree;
mod util;

pub use document::{ImageRef, RunSpan, StyledDocument, StyledRun};
pub use layout::{EstimatedMetrics, IndentLayout, TextMeasure};
pub use reference::{Mention, MentionRule, is_valid_reference};
pub use renderer::{DEFAULT_BASE_FONT_SIZE, StyledRenderer};
pub use style::{
    ColorTag, FontFamily, FontSlant, FontSpec, FontWeight, ImageMarker, ParagraphStyle,
    StyleAttributes, TabAlignment, TabStop,
};
pub use tree::{DocumentTree, Node, NodeId, NodeKind, TreeBuilder};
pub use util::unescape_newlines;
