//! HTML5 parser using html5ever
//!
//! This module turns raw document bytes into an `RcDom` the converter can walk.
//! Parsing follows the WHATWG algorithm, so malformed markup (unclosed or
//! misnested tags) still yields a usable tree.
//!
//! # Decoding
//!
//! html5ever consumes UTF-8, so input is decoded first:
//!
//! 1. A byte order mark, if present, selects the encoding
//! 2. Otherwise an explicit charset label supplied by the caller
//! 3. Otherwise UTF-8
//!
//! # Examples
//!
//! ```rust
//! use citation_markdown_converter::parser::parse_html;
//!
//! let dom = parse_html(b"<h1>Hello</h1>").expect("Failed to parse HTML");
//! let malformed = parse_html(b"<p><b>unclosed").expect("Parser handles malformed HTML");
//! ```

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;
use std::borrow::Cow;

use crate::error::ConversionError;

/// Parse HTML bytes into a DOM tree, decoding with an optional charset label
///
/// # Errors
///
/// - `ConversionError::InvalidInput`: the input is empty (no root content)
/// - `ConversionError::EncodingError`: the label is unknown or the bytes are
///   invalid for the selected encoding
///
/// # Examples
///
/// ```rust
/// use citation_markdown_converter::parser::parse_html_with_charset;
///
/// let dom = parse_html_with_charset(b"<p>Caf\xE9</p>", Some("ISO-8859-1"))
///     .expect("Should transcode ISO-8859-1 input");
/// ```
pub fn parse_html_with_charset(
    html: &[u8],
    charset: Option<&str>,
) -> Result<RcDom, ConversionError> {
    if html.is_empty() {
        return Err(ConversionError::InvalidInput(
            "HTML input is empty".to_string(),
        ));
    }

    let utf8_str = decode_html_to_utf8(html, charset)?;

    let dom = parse_document(RcDom::default(), Default::default()).one(utf8_str.as_ref());

    Ok(dom)
}

/// Parse HTML bytes into a DOM tree
///
/// Convenience wrapper for [`parse_html_with_charset`] with no charset label,
/// relying on a byte order mark or defaulting to UTF-8.
pub fn parse_html(html: &[u8]) -> Result<RcDom, ConversionError> {
    parse_html_with_charset(html, None)
}

fn decode_html_to_utf8<'a>(
    html: &'a [u8],
    charset: Option<&str>,
) -> Result<Cow<'a, str>, ConversionError> {
    let (encoding, payload) = match encoding_rs::Encoding::for_bom(html) {
        Some((encoding, bom_len)) => (encoding, &html[bom_len..]),
        None => match charset {
            Some(label) => {
                let encoding =
                    encoding_rs::Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
                        ConversionError::EncodingError(format!(
                            "Unsupported charset '{}' for HTML parsing",
                            label
                        ))
                    })?;
                (encoding, html)
            }
            None => (encoding_rs::UTF_8, html),
        },
    };

    if encoding == encoding_rs::UTF_8 {
        return std::str::from_utf8(payload).map(Cow::Borrowed).map_err(|e| {
            ConversionError::EncodingError(format!(
                "Invalid UTF-8 at byte position {}: {}",
                e.valid_up_to(),
                e
            ))
        });
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(payload)
        .ok_or_else(|| {
            ConversionError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                encoding.name()
            ))
        })
}
