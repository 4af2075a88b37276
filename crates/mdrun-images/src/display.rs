//! Placeholder policy for displaying a styled document with images.
//!
//! [`DisplayDocument::prepare`] splits a [`StyledDocument`] into segments and
//! resolves every image against the cache: hits become loaded
//! images, misses become placeholders and are returned as [`PendingLoad`]s.
//! [`load_pending`] fetches those concurrently and hands each success back to
//! the caller, who applies it with [`DisplayDocument::apply`].

use std::sync::Arc;

use mdrun_renderer::{StyledDocument, StyledRun};
use tokio::task::JoinSet;

use crate::cache::ImageCache;
use crate::decode::DecodedImage;
use crate::error::FetchError;
use crate::scale::{DisplaySize, placeholder_size, scaled_size};

/// What an image segment currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageContent {
    Placeholder(DisplaySize),
    Loaded {
        image: Arc<DecodedImage>,
        size: DisplaySize,
    },
}

impl ImageContent {
    pub fn size(&self) -> DisplaySize {
        match self {
            Self::Placeholder(size) | Self::Loaded { size, .. } => *size,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// One displayable unit of a [`DisplayDocument`].
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(StyledRun),
    /// One image; `runs` keep its styled alt text and link for accessibility.
    Image {
        runs: Vec<StyledRun>,
        url: String,
        content: ImageContent,
    },
}

/// An image segment still waiting for its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub segment: usize,
    pub url: String,
}

/// A successful fetch, ready to be applied to its segment.
#[derive(Debug, Clone)]
pub struct ImageUpdate {
    pub segment: usize,
    pub url: String,
    pub image: Arc<DecodedImage>,
}

/// A fetch that failed. The segment keeps its placeholder.
#[derive(Debug)]
pub struct LoadFailure {
    pub segment: usize,
    pub url: String,
    pub error: FetchError,
}

/// Display-ready view of a styled document.
#[derive(Debug, Clone)]
pub struct DisplayDocument {
    segments: Vec<Segment>,
    max_width: f32,
}

impl DisplayDocument {
    /// Substitute every image with a cached image or a placeholder.
    ///
    /// Returns the document and the loads to issue for cache misses, in
    /// document order. Each image yields one pending load, even when several
    /// images share a URL.
    pub fn prepare(
        document: &StyledDocument,
        cache: &ImageCache,
        max_width: f32,
    ) -> (Self, Vec<PendingLoad>) {
        let runs = document.runs();
        let mut images = document.image_refs().peekable();
        let mut segments = Vec::with_capacity(runs.len());
        let mut pending = Vec::new();

        let mut index = 0;
        while index < runs.len() {
            let Some(image) = images.next_if(|image| image.runs.start == index) else {
                segments.push(Segment::Text(runs[index].clone()));
                index += 1;
                continue;
            };

            let url = image.marker.url.clone();
            let content = match cache.lookup(&url) {
                Some(cached) => ImageContent::Loaded {
                    size: scaled_size(cached.width, cached.height, max_width),
                    image: cached,
                },
                None => {
                    pending.push(PendingLoad {
                        segment: segments.len(),
                        url: url.clone(),
                    });
                    ImageContent::Placeholder(placeholder_size(max_width))
                }
            };
            segments.push(Segment::Image {
                runs: runs[image.runs.clone()].to_vec(),
                url,
                content,
            });
            index = image.runs.end;
        }

        (
            Self {
                segments,
                max_width,
            },
            pending,
        )
    }

    /// Replace a segment's placeholder with a fetched image, in place.
    ///
    /// Returns `false` if the segment does not exist or shows a different URL.
    pub fn apply(&mut self, update: ImageUpdate) -> bool {
        let max_width = self.max_width;
        match self.segments.get_mut(update.segment) {
            Some(Segment::Image { url, content, .. }) if *url == update.url => {
                *content = ImageContent::Loaded {
                    size: scaled_size(update.image.width, update.image.height, max_width),
                    image: update.image,
                };
                true
            }
            _ => false,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    /// Number of image segments still showing a placeholder.
    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| {
                matches!(
                    segment,
                    Segment::Image {
                        content: ImageContent::Placeholder(_),
                        ..
                    }
                )
            })
            .count()
    }
}

/// Fetch every pending load concurrently.
///
/// `on_update` runs on the calling task, once per successful fetch, in
/// completion order. Failures are collected and returned; a failed load does
/// not affect the others.
pub async fn load_pending(
    cache: Arc<ImageCache>,
    pending: Vec<PendingLoad>,
    mut on_update: impl FnMut(ImageUpdate),
) -> Vec<LoadFailure> {
    let mut join_set = JoinSet::new();
    for load in pending {
        let cache = Arc::clone(&cache);
        join_set.spawn(async move {
            let result = cache.fetch(&load.url).await;
            (load, result)
        });
    }

    let mut failures = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((load, Ok(image))) => on_update(ImageUpdate {
                segment: load.segment,
                url: load.url,
                image,
            }),
            Ok((load, Err(error))) => failures.push(LoadFailure {
                segment: load.segment,
                url: load.url,
                error,
            }),
            Err(e) => tracing::warn!("image load task failed: {e}"),
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use mdrun_renderer::StyledRenderer;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cache::tests::MockSource;
    use crate::decode::tests::png;

    const WIDE: &str = "https://example.com/wide.png";
    const SMALL: &str = "https://example.com/small.png";

    fn render(markdown: &str) -> StyledDocument {
        StyledRenderer::new().render_markdown(markdown)
    }

    fn cache() -> Arc<ImageCache> {
        Arc::new(ImageCache::new(MockSource::new(&[
            (WIDE, png(600, 400)),
            (SMALL, png(100, 50)),
        ])))
    }

    #[tokio::test]
    async fn test_prepare_uses_placeholders_for_misses() {
        let doc = render(&format!("Intro ![wide]({WIDE}) and ![small]({SMALL})"));
        let cache = cache();
        cache.fetch(SMALL).await.unwrap();

        let (display, pending) = DisplayDocument::prepare(&doc, &cache, 300.0);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].url, WIDE);
        assert_eq!(display.placeholder_count(), 1);

        let Segment::Image { content, runs, .. } = &display.segments()[pending[0].segment] else {
            panic!("expected image segment");
        };
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "wide");
        assert_eq!(content.size(), DisplaySize {
            width: 300.0,
            height: 180.0
        });

        let loaded: Vec<_> = display
            .segments()
            .iter()
            .filter_map(|segment| match segment {
                Segment::Image { content, .. } if content.is_loaded() => Some(content.size()),
                _ => None,
            })
            .collect();
        assert_eq!(loaded, vec![DisplaySize {
            width: 100.0,
            height: 50.0
        }]);
    }

    #[tokio::test]
    async fn test_load_pending_replaces_placeholders() {
        let doc = render(&format!("![wide]({WIDE})\n\n![small]({SMALL})"));
        let cache = cache();
        let (mut display, pending) = DisplayDocument::prepare(&doc, &cache, 300.0);
        assert_eq!(pending.len(), 2);

        let mut updates = Vec::new();
        let failures = load_pending(Arc::clone(&cache), pending, |update| updates.push(update)).await;
        assert!(failures.is_empty());

        for update in updates {
            assert!(display.apply(update));
        }
        assert_eq!(display.placeholder_count(), 0);
        assert!(cache.lookup(WIDE).is_some());

        let sizes: Vec<_> = display
            .segments()
            .iter()
            .filter_map(|segment| match segment {
                Segment::Image { content, .. } => Some(content.size()),
                Segment::Text(_) => None,
            })
            .collect();
        assert_eq!(sizes, vec![
            DisplaySize {
                width: 300.0,
                height: 200.0
            },
            DisplaySize {
                width: 100.0,
                height: 50.0
            },
        ]);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_placeholder() {
        let missing = "https://example.com/missing.png";
        let doc = render(&format!("![gone]({missing}) ![small]({SMALL})"));
        let cache = cache();
        let (mut display, pending) = DisplayDocument::prepare(&doc, &cache, 300.0);

        let mut applied = 0;
        let failures = load_pending(Arc::clone(&cache), pending, |update| {
            if display.apply(update) {
                applied += 1;
            }
        })
        .await;

        assert_eq!(applied, 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].url, missing);
        assert!(matches!(failures[0].error, FetchError::Http(_)));
        assert_eq!(display.placeholder_count(), 1);
        assert!(cache.lookup(missing).is_none());
    }

    #[tokio::test]
    async fn test_apply_rejects_mismatched_segment() {
        let doc = render(&format!("text ![small]({SMALL})"));
        let cache = cache();
        let (mut display, pending) = DisplayDocument::prepare(&doc, &cache, 300.0);
        let image = cache.fetch(SMALL).await.unwrap();

        assert!(!display.apply(ImageUpdate {
            segment: 0,
            url: SMALL.to_owned(),
            image: Arc::clone(&image),
        }));
        assert!(!display.apply(ImageUpdate {
            segment: pending[0].segment,
            url: WIDE.to_owned(),
            image: Arc::clone(&image),
        }));
        assert!(!display.apply(ImageUpdate {
            segment: 99,
            url: SMALL.to_owned(),
            image,
        }));
        assert_eq!(display.placeholder_count(), 1);
    }

    #[test]
    fn test_styled_alt_text_is_one_segment() {
        let doc = render(&format!("![a *wide* `view`]({WIDE})"));
        assert_eq!(doc.len(), 4);

        let cache = cache();
        let (display, pending) = DisplayDocument::prepare(&doc, &cache, 300.0);

        assert_eq!(pending, vec![PendingLoad {
            segment: 0,
            url: WIDE.to_owned(),
        }]);
        assert_eq!(display.segments().len(), 1);
        let Segment::Image { runs, .. } = &display.segments()[0] else {
            panic!("expected image segment");
        };
        let texts: Vec<_> = runs.iter().map(|run| run.text.as_str()).collect();
        assert_eq!(texts, vec!["a ", "wide", " ", " view "]);
    }

    #[test]
    fn test_document_without_images() {
        let doc = render("# Title\n\nJust text.");
        let cache = cache();
        let (display, pending) = DisplayDocument::prepare(&doc, &cache, 300.0);

        assert!(pending.is_empty());
        assert_eq!(display.segments().len(), doc.len());
        assert!(
            display
                .segments()
                .iter()
                .all(|segment| matches!(segment, Segment::Text(_)))
        );
    }
}
