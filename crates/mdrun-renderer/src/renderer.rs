//! Document tree to styled run conversion.

use pulldown_cmark::Options;

use crate::depth::{is_contained_in, list_item_depth, quote_depth};
use crate::document::{StyledDocument, StyledRun};
use crate::layout::{EstimatedMetrics, IndentLayout, TextMeasure};
use crate::reference::{MentionRule, is_valid_reference};
use crate::style::{
    ColorTag, FontFamily, FontSlant, FontSpec, FontWeight, ImageMarker, ParagraphStyle,
    StyleAttributes,
};
use crate::tree::{DocumentTree, NodeId, NodeKind, gfm_options};
use crate::util::unescape_newlines;

/// Default body text size in points.
pub const DEFAULT_BASE_FONT_SIZE: f32 = 15.0;

/// Bullet glyph of unordered list markers.
const BULLET: &str = "•";

/// Text of an image run without alt text.
const OBJECT_REPLACEMENT: &str = "\u{FFFC}";

/// Nesting beyond this level is rendered as plain text.
const MAX_NESTING: usize = 256;

/// Converts a [`DocumentTree`] into a [`StyledDocument`].
///
/// The renderer holds configuration only. Each call builds a fresh document,
/// so one instance can be shared across threads and reused for any number of
/// trees.
///
/// # Example
///
/// ```
/// use mdrun_renderer::StyledRenderer;
///
/// let doc = StyledRenderer::new().render_markdown("# Hello\n\n**Bold** text");
/// assert_eq!(doc.text(), "Hello\n\nBold text");
/// assert!(doc.runs()[0].style.is_bold());
/// ```
#[derive(Clone, Debug)]
pub struct StyledRenderer<M = EstimatedMetrics> {
    base_font_size: f32,
    mentions: MentionRule,
    unescape_newlines: bool,
    gfm: bool,
    metrics: M,
}

impl StyledRenderer {
    /// Create a renderer with the default base font size and estimated metrics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_font_size: DEFAULT_BASE_FONT_SIZE,
            mentions: MentionRule::default(),
            unescape_newlines: true,
            gfm: true,
            metrics: EstimatedMetrics,
        }
    }
}

impl Default for StyledRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TextMeasure> StyledRenderer<M> {
    /// Set the base font size all relative sizes derive from.
    #[must_use]
    pub fn with_base_font_size(mut self, size: f32) -> Self {
        self.base_font_size = size;
        self
    }

    /// Set the rule that recognizes entity mention links.
    #[must_use]
    pub fn with_mentions(mut self, rule: MentionRule) -> Self {
        self.mentions = rule;
        self
    }

    /// Enable or disable rewriting of literal `\n` in [`render_markdown`](Self::render_markdown).
    #[must_use]
    pub fn with_unescape_newlines(mut self, enabled: bool) -> Self {
        self.unescape_newlines = enabled;
        self
    }

    /// Enable or disable tables, strikethrough and task lists.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Replace the text metrics used to measure marker widths.
    #[must_use]
    pub fn with_metrics<N: TextMeasure>(self, metrics: N) -> StyledRenderer<N> {
        StyledRenderer {
            base_font_size: self.base_font_size,
            mentions: self.mentions,
            unescape_newlines: self.unescape_newlines,
            gfm: self.gfm,
            metrics,
        }
    }

    #[must_use]
    pub fn base_font_size(&self) -> f32 {
        self.base_font_size
    }

    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            gfm_options()
        } else {
            Options::empty()
        }
    }

    /// Parse and render markdown text.
    pub fn render_markdown(&self, markdown: &str) -> StyledDocument {
        let tree = if self.unescape_newlines {
            DocumentTree::parse_ext(&unescape_newlines(markdown), self.parser_options())
        } else {
            DocumentTree::parse_ext(markdown, self.parser_options())
        };
        self.render(&tree)
    }

    /// Render a document tree.
    pub fn render(&self, tree: &DocumentTree) -> StyledDocument {
        self.visit(tree, tree.root(), 0)
    }

    fn visit(&self, tree: &DocumentTree, id: NodeId, nesting: usize) -> StyledDocument {
        if nesting >= MAX_NESTING {
            return StyledDocument::from_run(plain_text(tree, id), self.base_style());
        }

        match tree.kind(id) {
            NodeKind::Text { content } => {
                StyledDocument::from_run(content.as_str(), self.base_style())
            }
            NodeKind::Emphasis => self
                .visit_children(tree, id, nesting)
                .map_styles(|style| style.slant = FontSlant::Italic),
            NodeKind::Strong => self
                .visit_children(tree, id, nesting)
                .map_styles(|style| style.weight = FontWeight::Bold),
            NodeKind::Strikethrough => self
                .visit_children(tree, id, nesting)
                .map_styles(|style| style.strikethrough = true),
            NodeKind::Paragraph => {
                let mut doc = self.visit_children(tree, id, nesting);
                if tree.has_next_sibling(id) {
                    if is_contained_in(tree, id, NodeKind::is_list) {
                        doc.push(self.separator("\n"));
                    } else {
                        doc.push(self.separator("\n\n"));
                    }
                }
                doc
            }
            NodeKind::Heading { level } => {
                let size = self.heading_size(*level);
                let mut doc = self.visit_children(tree, id, nesting).map_styles(|style| {
                    style.weight = FontWeight::Bold;
                    style.font_size = size;
                });
                if tree.has_next_sibling(id) {
                    doc.push(self.separator("\n\n"));
                }
                doc
            }
            NodeKind::InlineCode { code } => {
                StyledDocument::from_run(format!(" {code} "), self.code_style())
            }
            NodeKind::CodeBlock { code } => self.code_block(tree, id, code),
            NodeKind::Link { destination } => {
                self.link(self.visit_children(tree, id, nesting), destination.as_deref())
            }
            NodeKind::Image { source, title } => {
                self.image(tree, id, source.as_deref(), title.as_deref(), nesting)
            }
            NodeKind::UnorderedList => self.unordered_list(tree, id, nesting),
            NodeKind::OrderedList => self.ordered_list(tree, id, nesting),
            NodeKind::ListItem => {
                let mut doc = self.visit_children(tree, id, nesting);
                if tree.has_next_sibling(id) {
                    doc.push(self.separator("\n"));
                }
                doc
            }
            NodeKind::BlockQuote => self.block_quote(tree, id, nesting),
            NodeKind::SoftBreak => StyledDocument::from_run(" ", self.base_style()),
            NodeKind::LineBreak => StyledDocument::from_run("\n", self.base_style()),
            NodeKind::Document
            | NodeKind::ThematicBreak
            | NodeKind::Html { .. }
            | NodeKind::Other(_) => self.visit_children(tree, id, nesting),
        }
    }

    fn visit_children(&self, tree: &DocumentTree, id: NodeId, nesting: usize) -> StyledDocument {
        let mut doc = StyledDocument::new();
        for &child in tree.children(id) {
            doc.append(self.visit(tree, child, nesting + 1));
        }
        doc
    }

    fn base_style(&self) -> StyleAttributes {
        StyleAttributes::base(self.base_font_size)
    }

    fn separator(&self, text: &str) -> StyledRun {
        StyledRun::new(text, self.base_style())
    }

    fn heading_size(&self, level: u8) -> f32 {
        (28.0 - 2.0 * f32::from(level)) * self.base_font_size / DEFAULT_BASE_FONT_SIZE
    }

    fn code_style(&self) -> StyleAttributes {
        let font = FontSpec::regular(self.base_font_size - 1.0).with_family(FontFamily::Monospace);
        StyleAttributes {
            foreground: Some(ColorTag::CodeText),
            background: Some(ColorTag::CodeBackground),
            ..StyleAttributes::from_font(font)
        }
    }

    fn code_block(&self, tree: &DocumentTree, id: NodeId, code: &str) -> StyledDocument {
        let code = code.strip_suffix('\n').unwrap_or(code);
        let style = StyleAttributes {
            paragraph: Some(ParagraphStyle {
                first_line_head_indent: 12.0,
                head_indent: 12.0,
                tail_indent: -12.0,
                line_spacing: 4.0,
                paragraph_spacing: 8.0,
                ..ParagraphStyle::default()
            }),
            ..self.code_style()
        };
        let mut doc = StyledDocument::from_run(format!("\n{code}\n"), style);
        if tree.has_next_sibling(id) {
            doc.push(self.separator("\n"));
        }
        doc
    }

    fn link(&self, content: StyledDocument, destination: Option<&str>) -> StyledDocument {
        let mention = destination.and_then(|dest| self.mentions.resolve(dest));
        let (target, mention_id) = match mention {
            Some(mention) => (Some(mention.uri), Some(mention.id)),
            None => (
                destination
                    .filter(|dest| is_valid_reference(dest))
                    .map(str::to_owned),
                None,
            ),
        };

        content.map_styles(|style| {
            style.foreground = Some(ColorTag::Link);
            if let Some(target) = &target {
                style.link = Some(target.clone());
            }
            if let Some(id) = &mention_id {
                style.mention = Some(id.clone());
            }
        })
    }

    /// Image alt text keeps its inline styles; every run carries the same
    /// image marker. Empty alt text becomes a single U+FFFC run.
    fn image(
        &self,
        tree: &DocumentTree,
        id: NodeId,
        source: Option<&str>,
        title: Option<&str>,
        nesting: usize,
    ) -> StyledDocument {
        let mut alt = self.visit_children(tree, id, nesting);
        if alt.text().is_empty() {
            alt = StyledDocument::new();
            alt.push_text(OBJECT_REPLACEMENT, self.base_style());
        }

        let marker = source
            .filter(|src| is_valid_reference(src))
            .map(|src| ImageMarker {
                url: src.to_owned(),
                title: title.map(str::to_owned),
                node: id.index(),
            });
        alt.map_styles(|style| {
            if let Some(marker) = &marker {
                style.image = Some(marker.clone());
                style.link = Some(marker.url.clone());
                style.foreground = Some(ColorTag::Link);
            }
            style.image_title = title.map(str::to_owned);
        })
    }

    fn unordered_list(&self, tree: &DocumentTree, list: NodeId, nesting: usize) -> StyledDocument {
        let font = FontSpec::regular(self.base_font_size);
        let marker_width = self.metrics.marker_width(BULLET, &font);

        let mut doc = StyledDocument::new();
        for &item in tree.children(list) {
            let depth = list_item_depth(tree, item);
            let layout = IndentLayout::list(depth, marker_width);
            let marker = StyledRun::new(
                format!("\t{BULLET}\t"),
                marker_style(font, &layout, depth),
            );
            doc.append(self.visit(tree, item, nesting + 1).prepended(marker));
        }

        if tree.has_next_sibling(list) {
            doc.push(self.separator("\n\n"));
        }
        doc
    }

    fn ordered_list(&self, tree: &DocumentTree, list: NodeId, nesting: usize) -> StyledDocument {
        let numeral_font =
            FontSpec::regular(self.base_font_size).with_family(FontFamily::MonospaceDigits);
        let items = tree.children(list);
        // Widest ordinal in the list sets the marker column for every item.
        let marker_width = self
            .metrics
            .marker_width(&format!("{}.", items.len()), &numeral_font);

        let mut doc = StyledDocument::new();
        for (index, &item) in items.iter().enumerate() {
            let depth = list_item_depth(tree, item);
            let layout = IndentLayout::list(depth, marker_width);
            let marker = StyledRun::new(
                format!("\t{}.\t", index + 1),
                marker_style(numeral_font, &layout, depth),
            );
            doc.append(self.visit(tree, item, nesting + 1).prepended(marker));
        }

        if tree.has_next_sibling(list) {
            if is_contained_in(tree, list, NodeKind::is_list) {
                doc.push(self.separator("\n"));
            } else {
                doc.push(self.separator("\n\n"));
            }
        }
        doc
    }

    fn block_quote(&self, tree: &DocumentTree, quote: NodeId, nesting: usize) -> StyledDocument {
        let mut doc = StyledDocument::new();
        for &child in tree.children(quote) {
            let depth = quote_depth(tree, quote);
            let layout = IndentLayout::quote(depth);
            let marker = StyledRun::new(
                "\t",
                StyleAttributes {
                    paragraph: Some(layout.quote_paragraph_style()),
                    quote_depth: Some(depth),
                    background: Some(ColorTag::QuoteBackground),
                    ..self.base_style()
                },
            );
            let converted = self
                .visit(tree, child, nesting + 1)
                .prepended(marker)
                .map_styles(|style| style.foreground = Some(ColorTag::QuoteText));
            doc.append(converted);
        }

        if tree.has_next_sibling(quote) {
            doc.push(self.separator("\n\n"));
        }
        doc
    }
}

fn marker_style(font: FontSpec, layout: &IndentLayout, depth: usize) -> StyleAttributes {
    StyleAttributes {
        paragraph: Some(layout.list_paragraph_style()),
        list_depth: Some(depth),
        ..StyleAttributes::from_font(font)
    }
}

/// Literal text below `id`, without styling.
fn plain_text(tree: &DocumentTree, id: NodeId) -> String {
    let mut text = String::new();
    for node in tree.descendants(id) {
        match tree.kind(node) {
            NodeKind::Text { content } => text.push_str(content),
            NodeKind::InlineCode { code } | NodeKind::CodeBlock { code } => text.push_str(code),
            NodeKind::SoftBreak => text.push(' '),
            NodeKind::LineBreak => text.push('\n'),
            _ => {}
        }
    }
    text
}
