//! Markdown converter - transforms an element tree into Markdown
//!
//! This module holds the recursive tree walker. It is written against the
//! [`DocumentNode`] capability, so any tree implementing that trait can be
//! converted; `markup5ever_rcdom` handles from [`crate::parser`] are the
//! common case.
//!
//! # Conversion Strategy
//!
//! Traversal is depth-first in document order. Dispatch decisions are made
//! top-down, but text is composed bottom-up: every node returns its Markdown
//! fragment, built from its children's fragments once they are all computed.
//!
//! Conversion never fails. Anything unusual (ragged tables, anchors without
//! targets, nested tables) degrades to a partial or empty fragment and is
//! recorded as a [`ConversionWarning`] on the returned [`Conversion`].
//!
//! # Element Handlers
//!
//! | Element | Markdown |
//! | --- | --- |
//! | `h1`-`h6` | `# Title` + blank line |
//! | `p` | trimmed text + blank line |
//! | `strong`, `b` / `em`, `i` | `**text**` / `*text*` |
//! | `ul`, `ol` | items + trailing newline |
//! | `li` | `- item` |
//! | `blockquote` | `> text` + blank line |
//! | `code` / `pre` | `` `code` `` / fenced block |
//! | `br` | newline |
//! | `a[href]` | numbered citation `[[n]](href)` |
//! | citation marker | numbered citation for its inner link |
//! | `table` | GFM table via [`crate::table`] |
//! | anything else | children passed through |
//!
//! # Citations
//!
//! Each call to [`MarkdownConverter::convert`] creates a fresh
//! `ConversionContext` owning its own citation registry, so numbering always
//! starts at 1 and never leaks between conversions.
//!
//! # Examples
//!
//! ```rust
//! use citation_markdown_converter::converter::MarkdownConverter;
//! use citation_markdown_converter::parser::parse_html;
//!
//! let html = br#"<h1>R</h1><p>Hi <a href="http://e.com/a">cite</a></p>"#;
//! let dom = parse_html(html).expect("Parse failed");
//! let conversion = MarkdownConverter::new().convert_dom(&dom);
//! assert_eq!(conversion.markdown, "# R\n\nHi [[1]](http://e.com/a)\n\n");
//! ```

use crate::citation::{CitationDedup, CitationRegistry};
use crate::error::ConversionError;
use crate::output::tidy_markdown;
use crate::parser::parse_html;
use crate::sanitize::escape_inline;
use crate::table;
use crate::tree::{DocumentNode, NodeKind};
use crate::warning::ConversionWarning;
use markup5ever_rcdom::RcDom;

/// Maximum nesting depth walked before a subtree is skipped
const DEFAULT_MAX_DEPTH: usize = 1000;

/// Class that marks an element as a citation marker
const DEFAULT_CITATION_MARKER_CLASS: &str = "citation";

/// Conversion options
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// How citation targets are deduplicated
    pub citation_dedup: CitationDedup,
    /// Class identifying citation marker elements (together with
    /// `data-state="closed"`)
    pub citation_marker_class: String,
    /// Nesting depth beyond which subtrees are skipped with a warning
    pub max_depth: usize,
    /// Collapse excess blank lines in [`convert_html`] output
    pub collapse_blank_lines: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            citation_dedup: CitationDedup::default(),
            citation_marker_class: DEFAULT_CITATION_MARKER_CLASS.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            collapse_blank_lines: true,
        }
    }
}

/// Result of one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Generated Markdown
    pub markdown: String,
    /// Non-fatal anomalies, in the order they were found
    pub warnings: Vec<ConversionWarning>,
}

/// Per-call conversion state
///
/// Owns the citation registry and collected warnings for exactly one
/// top-level conversion. It is created inside [`MarkdownConverter::convert`]
/// and consumed when the call returns.
#[derive(Debug)]
pub(crate) struct ConversionContext {
    citations: CitationRegistry,
    warnings: Vec<ConversionWarning>,
}

impl ConversionContext {
    pub(crate) fn new(dedup: CitationDedup) -> Self {
        Self {
            citations: CitationRegistry::new(dedup),
            warnings: Vec::new(),
        }
    }

    /// Record a warning and emit it as a tracing event
    pub(crate) fn warn(&mut self, warning: ConversionWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    #[cfg(test)]
    pub(crate) fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    fn citations(&mut self) -> &mut CitationRegistry {
        &mut self.citations
    }

    fn into_conversion(self, markdown: String) -> Conversion {
        Conversion {
            markdown,
            warnings: self.warnings,
        }
    }
}

/// Formatting rule selected for an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Heading(usize),
    Paragraph,
    Strong,
    Emphasis,
    List,
    ListItem,
    Blockquote,
    InlineCode,
    CodeBlock,
    LineBreak,
    Link,
    CitationMarker,
    Table,
    /// thead/tbody/tfoot/tr/th/td met outside a table root
    TableSection,
    /// head, script, style and similar: never rendered
    NonContent,
    /// Default for unrecognized markup: render children unchanged
    Passthrough,
}

/// Main Markdown converter
///
/// The converter only holds configuration; all mutable state lives in the
/// per-call `ConversionContext`, so one converter can be reused for any
/// number of conversions.
///
/// # Usage
///
/// ```rust
/// use citation_markdown_converter::citation::CitationDedup;
/// use citation_markdown_converter::converter::{ConversionOptions, MarkdownConverter};
/// use citation_markdown_converter::parser::parse_html;
///
/// let options = ConversionOptions {
///     citation_dedup: CitationDedup::BaseForm,
///     ..Default::default()
/// };
/// let converter = MarkdownConverter::with_options(options);
///
/// let html = br#"<p><a href="https://x.com/a?x=1">a</a> <a href="https://x.com/a?z=2">b</a></p>"#;
/// let dom = parse_html(html).expect("Failed to parse");
/// let conversion = converter.convert_dom(&dom);
/// assert_eq!(
///     conversion.markdown,
///     "[[1]](https://x.com/a?x=1) [[1]](https://x.com/a?z=2)\n\n"
/// );
/// ```
pub struct MarkdownConverter {
    options: ConversionOptions,
}

impl MarkdownConverter {
    /// Create a new converter with default options
    pub fn new() -> Self {
        Self {
            options: ConversionOptions::default(),
        }
    }

    /// Create a new converter with custom options
    pub fn with_options(options: ConversionOptions) -> Self {
        Self { options }
    }

    /// Active options
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert a tree (or any subtree) to Markdown
    ///
    /// Always completes; structural anomalies are reported in
    /// [`Conversion::warnings`]. Converting the same tree twice yields
    /// identical output, since every call starts with a fresh registry.
    pub fn convert<N: DocumentNode>(&self, root: &N) -> Conversion {
        let mut ctx = ConversionContext::new(self.options.citation_dedup);
        let markdown = self.traverse_node(root, &mut ctx, 0);
        ctx.into_conversion(markdown)
    }

    /// Convert a parsed document, starting at its root
    pub fn convert_dom(&self, dom: &RcDom) -> Conversion {
        self.convert(&dom.document)
    }

    /// Render one node and its subtree
    ///
    /// # Depth Tracking
    ///
    /// `depth` counts levels below the conversion root. A subtree starting
    /// beyond `max_depth` is skipped with a warning, which bounds recursion on
    /// adversarial inputs.
    fn traverse_node<N: DocumentNode>(
        &self,
        node: &N,
        ctx: &mut ConversionContext,
        depth: usize,
    ) -> String {
        if depth > self.options.max_depth {
            ctx.warn(ConversionWarning::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
            return String::new();
        }

        match node.kind() {
            NodeKind::Document => self.render_children(node, ctx, depth),
            NodeKind::Element => self.handle_element(node, ctx, depth),
            NodeKind::Text => escape_inline(&node.text().unwrap_or_default()),
            // Comments, doctypes and processing instructions are ignored
            NodeKind::Other => String::new(),
        }
    }

    /// Concatenate the fragments of all children in document order
    fn render_children<N: DocumentNode>(
        &self,
        node: &N,
        ctx: &mut ConversionContext,
        depth: usize,
    ) -> String {
        let mut output = String::new();
        for child in node.children() {
            output.push_str(&self.traverse_node(&child, ctx, depth + 1));
        }
        output
    }

    /// Pick the formatting rule for an element
    fn classify<N: DocumentNode>(&self, node: &N, tag: &str) -> ElementKind {
        if self.is_citation_marker(node) {
            return ElementKind::CitationMarker;
        }

        match tag {
            "h1" => ElementKind::Heading(1),
            "h2" => ElementKind::Heading(2),
            "h3" => ElementKind::Heading(3),
            "h4" => ElementKind::Heading(4),
            "h5" => ElementKind::Heading(5),
            "h6" => ElementKind::Heading(6),
            "p" => ElementKind::Paragraph,
            "strong" | "b" => ElementKind::Strong,
            "em" | "i" => ElementKind::Emphasis,
            "ul" | "ol" => ElementKind::List,
            "li" => ElementKind::ListItem,
            "blockquote" => ElementKind::Blockquote,
            "code" => ElementKind::InlineCode,
            "pre" => ElementKind::CodeBlock,
            "br" => ElementKind::LineBreak,
            "a" => ElementKind::Link,
            "table" => ElementKind::Table,
            "thead" | "tbody" | "tfoot" | "tr" | "th" | "td" => ElementKind::TableSection,
            "head" | "script" | "style" | "noscript" | "template" => ElementKind::NonContent,
            _ => ElementKind::Passthrough,
        }
    }

    /// Whether `node` is a resolved ("closed") citation marker
    fn is_citation_marker<N: DocumentNode>(&self, node: &N) -> bool {
        node.has_class(&self.options.citation_marker_class)
            && node
                .attribute("data-state")
                .is_some_and(|state| state.eq_ignore_ascii_case("closed"))
    }

    /// Handle an element according to its [`ElementKind`]
    fn handle_element<N: DocumentNode>(
        &self,
        node: &N,
        ctx: &mut ConversionContext,
        depth: usize,
    ) -> String {
        let tag = node.tag_name().unwrap_or_default();

        match self.classify(node, &tag) {
            ElementKind::Heading(level) => {
                let content = self.render_children(node, ctx, depth);
                format!("{} {}\n\n", "#".repeat(level), content.trim())
            }
            ElementKind::Paragraph => {
                let content = self.render_children(node, ctx, depth);
                format!("{}\n\n", content.trim())
            }
            ElementKind::Strong => format!("**{}**", self.render_children(node, ctx, depth)),
            ElementKind::Emphasis => format!("*{}*", self.render_children(node, ctx, depth)),
            ElementKind::List => self.handle_list(node, ctx, depth),
            ElementKind::ListItem => {
                let content = self.render_children(node, ctx, depth);
                format!("- {}\n", content.trim())
            }
            ElementKind::Blockquote => {
                let content = self.render_children(node, ctx, depth);
                format!("> {}\n\n", content.trim())
            }
            ElementKind::InlineCode => {
                format!("`{}`", self.collect_text(node, ctx, depth))
            }
            ElementKind::CodeBlock => self.handle_code_block(node, ctx, depth),
            ElementKind::LineBreak => "\n".to_string(),
            ElementKind::Link => self.handle_link(node, ctx, depth),
            ElementKind::CitationMarker => self.handle_citation_marker(node, ctx),
            ElementKind::Table => self.handle_table(node, ctx, depth),
            ElementKind::TableSection | ElementKind::Passthrough => {
                self.render_children(node, ctx, depth)
            }
            ElementKind::NonContent => String::new(),
        }
    }

    /// Handle list elements (ul/ol)
    ///
    /// Items are passed through and the list ends with one extra newline.
    /// Whitespace-only text between items is formatting, not content, and is
    /// skipped so items stay on consecutive lines.
    fn handle_list<N: DocumentNode>(
        &self,
        node: &N,
        ctx: &mut ConversionContext,
        depth: usize,
    ) -> String {
        let mut output = String::new();
        for child in node.children() {
            if child.kind() == NodeKind::Text
                && child.text().is_some_and(|text| text.trim().is_empty())
            {
                continue;
            }
            output.push_str(&self.traverse_node(&child, ctx, depth + 1));
        }
        output.push('\n');
        output
    }

    /// Handle code block elements (pre)
    ///
    /// Content is taken verbatim from the descendant text, without escaping or
    /// whitespace normalization. A `language-xxx` or `lang-xxx` class on the
    /// `pre` or its first `code` child becomes the fence's info string.
    ///
    /// # Output Format
    ///
    /// ````text
    /// ```rust
    /// fn main() {}
    /// ```
    /// ````
    fn handle_code_block<N: DocumentNode>(
        &self,
        node: &N,
        ctx: &mut ConversionContext,
        depth: usize,
    ) -> String {
        let language = code_language(node)
            .or_else(|| {
                node.first_descendant(|n| n.is_element("code"))
                    .and_then(|code| code_language(&code))
            })
            .unwrap_or_default();

        let content = self.collect_text(node, ctx, depth);
        format!(
            "```{}\n{}\n```\n\n",
            language,
            content.trim_end_matches(['\n', '\r'])
        )
    }

    /// Raw descendant text of a code element, honoring the depth limit
    ///
    /// Walks with an explicit stack instead of recursing. Text below
    /// `max_depth` is dropped and each skipped subtree is reported, as in
    /// [`Self::traverse_node`].
    fn collect_text<N: DocumentNode>(
        &self,
        node: &N,
        ctx: &mut ConversionContext,
        depth: usize,
    ) -> String {
        let mut output = String::new();
        let mut stack: Vec<(N, usize)> = node
            .children()
            .into_iter()
            .rev()
            .map(|child| (child, depth + 1))
            .collect();

        while let Some((current, level)) = stack.pop() {
            if level > self.options.max_depth {
                ctx.warn(ConversionWarning::DepthLimitExceeded {
                    limit: self.options.max_depth,
                });
                continue;
            }
            match current.kind() {
                NodeKind::Text => output.push_str(&current.text().unwrap_or_default()),
                NodeKind::Element | NodeKind::Document => stack.extend(
                    current
                        .children()
                        .into_iter()
                        .rev()
                        .map(|child| (child, level + 1)),
                ),
                NodeKind::Other => {}
            }
        }
        output
    }

    /// Handle anchor elements
    ///
    /// An anchor with a target becomes a numbered citation. Inside a citation
    /// marker it contributes nothing, since the marker emits the citation. An
    /// anchor without a target keeps only its inner content.
    fn handle_link<N: DocumentNode>(
        &self,
        node: &N,
        ctx: &mut ConversionContext,
        depth: usize,
    ) -> String {
        match link_target(node) {
            Some(href) => {
                if node
                    .closest_ancestor(|n| self.is_citation_marker(n))
                    .is_some()
                {
                    return String::new();
                }
                ctx.citations().cite(&href)
            }
            None => {
                ctx.warn(ConversionWarning::AnchorWithoutTarget);
                self.render_children(node, ctx, depth)
            }
        }
    }

    /// Handle a citation marker
    ///
    /// Emits one citation for the marker's first descendant link. The rest of
    /// the marker, including any further links or nested markers, is dropped.
    fn handle_citation_marker<N: DocumentNode>(
        &self,
        node: &N,
        ctx: &mut ConversionContext,
    ) -> String {
        let target = node
            .first_descendant(|n| n.is_element("a") && link_target(n).is_some())
            .and_then(|link| link_target(&link));

        match target {
            Some(href) => ctx.citations().cite(&href),
            None => {
                ctx.warn(ConversionWarning::CitationWithoutLink);
                String::new()
            }
        }
    }

    /// Handle table elements
    ///
    /// Tables nested inside another table are not converted: the nested
    /// subtree contributes nothing and a warning is recorded. Top-level tables
    /// go through [`table::normalize_table`], with cells rendered by this
    /// converter.
    fn handle_table<N: DocumentNode>(
        &self,
        node: &N,
        ctx: &mut ConversionContext,
        depth: usize,
    ) -> String {
        if node.closest_ancestor(|n| n.is_element("table")).is_some() {
            ctx.warn(ConversionWarning::NestedTable);
            return String::new();
        }

        table::normalize_table(node, ctx, |cell, ctx| {
            self.render_children(cell, ctx, depth + levels_below_table(cell))
        })
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-empty `href` of an anchor
fn link_target<N: DocumentNode>(node: &N) -> Option<String> {
    node.attribute("href")
        .filter(|href| !href.trim().is_empty())
}

/// Number of levels between a table cell and its enclosing table
fn levels_below_table<N: DocumentNode>(cell: &N) -> usize {
    let mut levels = 0;
    let mut current = Some(cell.clone());
    while let Some(node) = current {
        if node.is_element("table") {
            break;
        }
        levels += 1;
        current = node.parent();
    }
    levels
}

/// Language named by a `language-xxx` or `lang-xxx` class
fn code_language<N: DocumentNode>(node: &N) -> Option<String> {
    let classes = node.attribute("class")?;
    classes.split_whitespace().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
    })
}

/// Parse and convert an HTML document in one step
///
/// When `collapse_blank_lines` is set, the output is tidied with
/// [`tidy_markdown`].
///
/// # Errors
///
/// Returns the loading errors of [`parse_html`]; conversion itself never fails.
///
/// # Examples
///
/// ```rust
/// use citation_markdown_converter::converter::{convert_html, ConversionOptions};
///
/// let html = b"<div>\n  <h1>Title</h1>\n\n  <p>Body</p>\n</div>";
/// let conversion = convert_html(html, ConversionOptions::default()).expect("convert");
/// assert_eq!(conversion.markdown, "# Title\n\nBody\n");
/// ```
pub fn convert_html(
    html: &[u8],
    options: ConversionOptions,
) -> Result<Conversion, ConversionError> {
    let dom = parse_html(html)?;
    let collapse = options.collapse_blank_lines;

    let mut conversion = MarkdownConverter::with_options(options).convert_dom(&dom);
    if collapse {
        conversion.markdown = tidy_markdown(&conversion.markdown);
    }

    Ok(conversion)
}
