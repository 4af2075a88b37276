//! Read-only document tree consumed by the renderer.
//!
//! Nodes live in an arena owned by [`DocumentTree`] and are addressed by
//! [`NodeId`]. Every node knows its parent and its index among siblings, which
//! is all the renderer needs for depth and separator decisions.
//!
//! Trees are built either from markdown via [`DocumentTree::parse`]
//! (pulldown-cmark events) or programmatically via [`DocumentTree::builder`].

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, TextMergeStream};

use crate::util::heading_level_to_num;

/// Handle of a node inside a [`DocumentTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Kind of a document node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading { level: u8 },
    Text { content: String },
    Emphasis,
    Strong,
    Strikethrough,
    InlineCode { code: String },
    CodeBlock { code: String },
    Link { destination: Option<String> },
    Image { source: Option<String>, title: Option<String> },
    UnorderedList,
    OrderedList,
    ListItem,
    BlockQuote,
    SoftBreak,
    LineBreak,
    ThematicBreak,
    Html { content: String },
    /// Any construct without dedicated rendering (tables, footnotes, ...).
    Other(&'static str),
}

impl NodeKind {
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::UnorderedList | Self::OrderedList)
    }

    #[must_use]
    pub fn is_block_quote(&self) -> bool {
        matches!(self, Self::BlockQuote)
    }

    /// Inline kinds may not sit directly inside a list item.
    fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Text { .. }
                | Self::Emphasis
                | Self::Strong
                | Self::Strikethrough
                | Self::InlineCode { .. }
                | Self::Link { .. }
                | Self::Image { .. }
                | Self::SoftBreak
                | Self::LineBreak
                | Self::Html { .. }
        )
    }
}

/// A node of the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    /// Absent for the root.
    pub parent: Option<NodeId>,
    /// Index among the parent's children.
    pub index_in_parent: usize,
}

/// Arena-backed document tree. The root is always a [`NodeKind::Document`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl DocumentTree {
    /// Parse markdown into a tree with tables, strikethrough and task lists enabled.
    #[must_use]
    pub fn parse(markdown: &str) -> Self {
        Self::parse_ext(markdown, gfm_options())
    }

    /// Parse markdown into a tree with explicit parser options.
    #[must_use]
    pub fn parse_ext(markdown: &str, options: Options) -> Self {
        let parser = Parser::new_ext(markdown, options);
        let mut adapter = EventAdapter::default();
        for event in TextMergeStream::new(parser) {
            adapter.event(event);
        }
        adapter.finish()
    }

    #[must_use]
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// The sibling directly after `id`, if any.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let parent = node.parent?;
        self.children(parent).get(node.index_in_parent + 1).copied()
    }

    #[must_use]
    pub fn has_next_sibling(&self, id: NodeId) -> bool {
        self.next_sibling(id).is_some()
    }

    /// Strict ancestors of `id`, nearest first.
    ///
    /// The walk stops after as many steps as the tree has nodes, so a
    /// malformed parent chain cannot loop forever.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.parent(id);
        let mut remaining = self.nodes.len();
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let ancestor = current?;
            current = self.parent(ancestor);
            Some(ancestor)
        })
    }

    /// All node ids in depth-first, left-to-right order.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![id];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.children(next).iter().rev().copied());
            Some(next)
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the document has no content below the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }
}

pub(crate) fn gfm_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Incremental builder for [`DocumentTree`].
///
/// ```
/// use mdrun_renderer::{DocumentTree, NodeKind};
///
/// let mut builder = DocumentTree::builder();
/// builder.node(NodeKind::Paragraph, |b| {
///     b.leaf(NodeKind::Text { content: "hi".to_owned() });
/// });
/// let tree = builder.finish();
/// assert_eq!(tree.children(tree.root()).len(), 1);
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                children: Vec::new(),
                parent: None,
                index_in_parent: 0,
            }],
            stack: vec![NodeId(0)],
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId(0))
    }

    fn current_kind(&self) -> &NodeKind {
        &self.nodes[self.current().0].kind
    }

    fn add(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.current();
        let id = NodeId(self.nodes.len());
        let siblings = &mut self.nodes[parent.0].children;
        let index_in_parent = siblings.len();
        siblings.push(id);
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
            parent: Some(parent),
            index_in_parent,
        });
        id
    }

    /// Add a container node and make it current.
    pub fn open(&mut self, kind: NodeKind) -> NodeId {
        let id = self.add(kind);
        self.stack.push(id);
        id
    }

    /// Close the current container. The root is never closed.
    pub fn close(&mut self) -> Option<NodeId> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Add a childless node under the current container.
    pub fn leaf(&mut self, kind: NodeKind) -> NodeId {
        self.add(kind)
    }

    /// Add a container and fill it with `children`.
    pub fn node(&mut self, kind: NodeKind, children: impl FnOnce(&mut Self)) -> NodeId {
        let id = self.open(kind);
        children(self);
        self.close();
        id
    }

    #[must_use]
    pub fn finish(self) -> DocumentTree {
        DocumentTree { nodes: self.nodes }
    }
}

/// Translates the pulldown-cmark event stream into builder calls.
#[derive(Debug)]
struct EventAdapter {
    builder: TreeBuilder,
    /// Paragraph opened around inline content of a tight list item.
    implicit_paragraph: Option<NodeId>,
}

impl Default for EventAdapter {
    fn default() -> Self {
        Self {
            builder: TreeBuilder::new(),
            implicit_paragraph: None,
        }
    }
}

impl EventAdapter {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline(NodeKind::InlineCode {
                code: code.into_string(),
            }),
            Event::InlineMath(math) | Event::DisplayMath(math) => self.inline(NodeKind::Text {
                content: math.into_string(),
            }),
            Event::Html(html) | Event::InlineHtml(html) => self.inline(NodeKind::Html {
                content: html.into_string(),
            }),
            Event::SoftBreak => self.inline(NodeKind::SoftBreak),
            Event::HardBreak => self.inline(NodeKind::LineBreak),
            Event::Rule => self.block_leaf(NodeKind::ThematicBreak),
            Event::TaskListMarker(checked) => self.inline(NodeKind::Text {
                content: if checked { "☑ " } else { "☐ " }.to_owned(),
            }),
            Event::FootnoteReference(label) => self.inline(NodeKind::Text {
                content: format!("[{label}]"),
            }),
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading {
                level: heading_level_to_num(level),
            },
            Tag::BlockQuote(_) => NodeKind::BlockQuote,
            Tag::CodeBlock(_) => NodeKind::CodeBlock {
                code: String::new(),
            },
            Tag::List(Some(_)) => NodeKind::OrderedList,
            Tag::List(None) => NodeKind::UnorderedList,
            Tag::Item => NodeKind::ListItem,
            Tag::Emphasis => NodeKind::Emphasis,
            Tag::Strong => NodeKind::Strong,
            Tag::Strikethrough => NodeKind::Strikethrough,
            Tag::Link { dest_url, .. } => NodeKind::Link {
                destination: non_empty(dest_url.into_string()),
            },
            Tag::Image {
                dest_url, title, ..
            } => NodeKind::Image {
                source: non_empty(dest_url.into_string()),
                title: non_empty(title.into_string()),
            },
            Tag::Table(_) => NodeKind::Other("table"),
            Tag::TableHead => NodeKind::Other("table-head"),
            Tag::TableRow => NodeKind::Other("table-row"),
            Tag::TableCell => NodeKind::Other("table-cell"),
            Tag::HtmlBlock => NodeKind::Other("html-block"),
            Tag::FootnoteDefinition(_) => NodeKind::Other("footnote-definition"),
            _ => NodeKind::Other("container"),
        };
        if kind.is_inline() {
            self.ensure_paragraph();
        } else {
            self.end_implicit_paragraph();
        }
        self.builder.open(kind);
    }

    fn end_tag(&mut self, tag: TagEnd) {
        if matches!(tag, TagEnd::Item) {
            self.end_implicit_paragraph();
        }
        self.builder.close();
    }

    fn text(&mut self, text: &str) {
        let current = self.builder.current();
        if let NodeKind::CodeBlock { code } = &mut self.builder.nodes[current.0].kind {
            code.push_str(text);
            return;
        }
        self.inline(NodeKind::Text {
            content: text.to_owned(),
        });
    }

    fn inline(&mut self, kind: NodeKind) {
        self.ensure_paragraph();
        self.builder.leaf(kind);
    }

    fn block_leaf(&mut self, kind: NodeKind) {
        self.end_implicit_paragraph();
        self.builder.leaf(kind);
    }

    fn ensure_paragraph(&mut self) {
        if matches!(self.builder.current_kind(), NodeKind::ListItem) {
            let id = self.builder.open(NodeKind::Paragraph);
            self.implicit_paragraph = Some(id);
        }
    }

    fn end_implicit_paragraph(&mut self) {
        if let Some(id) = self.implicit_paragraph.take()
            && self.builder.current() == id
        {
            self.builder.close();
        }
    }

    fn finish(self) -> DocumentTree {
        self.builder.finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
