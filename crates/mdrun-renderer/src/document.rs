//! Styled run sequence produced by the renderer.

use std::ops::Range;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::style::{ImageMarker, StyleAttributes};

/// A contiguous piece of text with one fixed set of attributes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StyledRun {
    pub text: String,
    pub style: StyleAttributes,
}

impl StyledRun {
    #[must_use]
    pub fn new(text: impl Into<String>, style: StyleAttributes) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A run selected by an attribute query, with its position in the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSpan {
    /// Index of the run in [`StyledDocument::runs`].
    pub index: usize,
    /// Byte range of the run inside [`StyledDocument::text`].
    pub range: Range<usize>,
}

/// One image found in a document, covering all runs of its alt text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef<'a> {
    /// Indices of the alt text runs in [`StyledDocument::runs`].
    pub runs: Range<usize>,
    /// Byte range of the alt text inside [`StyledDocument::text`].
    pub range: Range<usize>,
    pub marker: &'a ImageMarker,
}

/// Ordered sequence of styled runs.
///
/// Runs are only ever appended. Style changes are applied to a freshly built
/// sub-document before it is appended to its parent, never to runs the parent
/// already holds.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct StyledDocument {
    runs: Vec<StyledRun>,
}

impl StyledDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document holding a single run.
    #[must_use]
    pub fn from_run(text: impl Into<String>, style: StyleAttributes) -> Self {
        Self {
            runs: vec![StyledRun::new(text, style)],
        }
    }

    pub fn push(&mut self, run: StyledRun) {
        self.runs.push(run);
    }

    pub fn push_text(&mut self, text: impl Into<String>, style: StyleAttributes) {
        self.push(StyledRun::new(text, style));
    }

    /// Append all runs of `other`, keeping their order.
    pub fn append(&mut self, mut other: StyledDocument) {
        self.runs.append(&mut other.runs);
    }

    /// Return this document with `run` placed before all existing runs.
    #[must_use]
    pub fn prepended(mut self, run: StyledRun) -> Self {
        self.runs.insert(0, run);
        self
    }

    /// Apply `f` to the style of every run.
    #[must_use]
    pub fn map_styles(mut self, f: impl Fn(&mut StyleAttributes)) -> Self {
        for run in &mut self.runs {
            f(&mut run.style);
        }
        self
    }

    #[must_use]
    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Concatenated text of all runs.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Enumerate the runs whose style matches `predicate`.
    ///
    /// Ranges are byte offsets into [`text`](Self::text).
    pub fn spans_where<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = RunSpan> + 'a
    where
        P: Fn(&StyleAttributes) -> bool + 'a,
    {
        let mut offset = 0;
        self.runs
            .iter()
            .enumerate()
            .filter_map(move |(index, run)| {
                let start = offset;
                offset += run.text.len();
                predicate(&run.style).then_some(RunSpan {
                    index,
                    range: start..offset,
                })
            })
    }

    /// Images in document order.
    ///
    /// Consecutive runs carrying an equal marker belong to one image.
    pub fn image_refs(&self) -> impl Iterator<Item = ImageRef<'_>> {
        let mut refs: Vec<ImageRef<'_>> = Vec::new();
        for span in self.spans_where(|style| style.image.is_some()) {
            let Some(marker) = self.runs[span.index].style.image.as_ref() else {
                continue;
            };
            if let Some(last) = refs.last_mut()
                && last.runs.end == span.index
                && last.marker == marker
            {
                last.runs.end = span.index + 1;
                last.range.end = span.range.end;
                continue;
            }
            refs.push(ImageRef {
                runs: span.index..span.index + 1,
                range: span.range,
                marker,
            });
        }
        refs.into_iter()
    }

    /// Link targets in document order, one entry per run.
    pub fn links(&self) -> impl Iterator<Item = (RunSpan, &str)> {
        self.spans_where(|style| style.link.is_some())
            .filter_map(|span| Some((span.clone(), self.runs[span.index].style.link.as_deref()?)))
    }

    /// Entity mention identifiers in document order, one entry per run.
    pub fn mentions(&self) -> impl Iterator<Item = (RunSpan, &str)> {
        self.spans_where(|style| style.mention.is_some())
            .filter_map(|span| {
                Some((span.clone(), self.runs[span.index].style.mention.as_deref()?))
            })
    }
}

impl<'a> IntoIterator for &'a StyledDocument {
    type Item = &'a StyledRun;
    type IntoIter = std::slice::Iter<'a, StyledRun>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter()
    }
}
