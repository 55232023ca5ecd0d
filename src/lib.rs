//! Citation Markdown Converter
//!
//! This library converts rendered, richly formatted HTML (headings, emphasis,
//! lists, code, tables, inline citation markers) into clean Markdown, numbering
//! and deduplicating citation links as it goes.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `tree`: read-only element tree capability the converter walks
//! - `sanitize`: character-level escaping for text and table cells
//! - `citation`: per-conversion citation numbering
//! - `table`: table normalization and repair
//! - `converter`: recursive tree-to-Markdown conversion
//! - `warning`: non-fatal conversion anomalies
//! - `parser`: HTML5 parsing using html5ever
//! - `output`: caller-side output tidying
//!
//! # Example
//!
//! ```rust
//! use citation_markdown_converter::{convert_html, ConversionOptions};
//!
//! let html = br#"<h1>R</h1><p>Hi <a href="http://e.com/a">cite</a></p>"#;
//! let conversion = convert_html(html, ConversionOptions::default()).expect("convert");
//! assert_eq!(conversion.markdown, "# R\n\nHi [[1]](http://e.com/a)\n");
//! assert!(conversion.warnings.is_empty());
//! ```

// Module declarations
pub mod citation;
pub mod converter;
pub mod error;
pub mod output;
pub mod parser;
pub mod sanitize;
pub mod table;
pub mod tree;
pub mod warning;

// Re-export main types for convenience
pub use citation::{CitationDedup, CitationRegistry};
pub use converter::{Conversion, ConversionOptions, MarkdownConverter, convert_html};
pub use error::ConversionError;
pub use parser::parse_html;
pub use tree::{DocumentNode, NodeKind};
pub use warning::ConversionWarning;
