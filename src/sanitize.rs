//! Character-level escaping and cleanup
//!
//! These helpers make arbitrary text safe for the Markdown contexts the
//! converter emits into: running text and single table cells.

use regex::Regex;
use std::sync::OnceLock;

/// Escape characters that downstream Markdown/math renderers would misread
///
/// Currently this is the `$` sign, which math-enabled renderers treat as an
/// inline formula delimiter. A `$` that is already preceded by a backslash is
/// left as-is.
///
/// # Examples
///
/// ```rust
/// use citation_markdown_converter::sanitize::escape_inline;
///
/// assert_eq!(escape_inline("costs $5"), "costs \\$5");
/// assert_eq!(escape_inline("costs \\$5"), "costs \\$5");
/// ```
pub fn escape_inline(text: &str) -> String {
    escape_char(text, '$')
}

/// Make content safe for a single Markdown table cell
///
/// Escapes `|`, collapses embedded line breaks (and the whitespace around them)
/// into one space, and trims the result.
///
/// # Examples
///
/// ```rust
/// use citation_markdown_converter::sanitize::sanitize_cell;
///
/// assert_eq!(sanitize_cell(" a|b "), "a\\|b");
/// assert_eq!(sanitize_cell("line one\n\n  line two"), "line one line two");
/// ```
pub fn sanitize_cell(text: &str) -> String {
    static LINE_BREAKS: OnceLock<Option<Regex>> = OnceLock::new();

    let escaped = escape_char(text, '|');
    let collapsed = match LINE_BREAKS.get_or_init(|| Regex::new(r"[ \t]*[\r\n]+\s*").ok()) {
        Some(re) => re.replace_all(&escaped, " ").into_owned(),
        None => escaped.replace(['\r', '\n'], " "),
    };
    collapsed.trim().to_string()
}

/// Make content safe for a table header cell
///
/// Applies [`sanitize_cell`], then strips one symmetric layer of emphasis
/// (`**…**`, `__…__`, `*…*` or `_…_`) so header text renders plain. Regular
/// headings never go through this.
///
/// # Examples
///
/// ```rust
/// use citation_markdown_converter::sanitize::sanitize_heading_cell;
///
/// assert_eq!(sanitize_heading_cell("**Title**"), "Title");
/// assert_eq!(sanitize_heading_cell("*Name*"), "Name");
/// assert_eq!(sanitize_heading_cell("**Half*"), "**Half*");
/// ```
pub fn sanitize_heading_cell(text: &str) -> String {
    let cell = sanitize_cell(text);
    strip_emphasis(&cell).to_string()
}

fn strip_emphasis(cell: &str) -> &str {
    // Longest delimiters first so "**x**" loses both asterisks at once
    for delimiter in ["**", "__", "*", "_"] {
        if cell.len() > delimiter.len() * 2
            && let Some(inner) = cell
                .strip_prefix(delimiter)
                .and_then(|rest| rest.strip_suffix(delimiter))
            && !inner.starts_with(delimiter)
            && !inner.ends_with(delimiter)
            && inner.chars().any(|c| c != '*' && c != '_')
        {
            return inner.trim();
        }
    }
    cell
}

/// Backslash-escape every occurrence of `target` not already escaped.
fn escape_char(text: &str, target: char) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_backslash = false;

    for ch in text.chars() {
        if ch == target && !prev_backslash {
            result.push('\\');
        }
        result.push(ch);
        prev_backslash = ch == '\\' && !prev_backslash;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_inline_dollar() {
        assert_eq!(escape_inline("$x$"), "\\$x\\$");
        assert_eq!(escape_inline("no specials"), "no specials");
    }

    #[test]
    fn test_escape_inline_does_not_double_escape() {
        assert_eq!(escape_inline("\\$ already"), "\\$ already");
        // An escaped backslash does not escape the following dollar
        assert_eq!(escape_inline("\\\\$"), "\\\\\\$");
    }

    #[test]
    fn test_sanitize_cell_pipe() {
        assert_eq!(sanitize_cell("a|b"), "a\\|b");
        assert_eq!(sanitize_cell("a\\|b"), "a\\|b");
    }

    #[test]
    fn test_sanitize_cell_line_breaks() {
        assert_eq!(sanitize_cell("one\ntwo"), "one two");
        assert_eq!(sanitize_cell("one  \r\n\r\n  two\n"), "one two");
        assert_eq!(sanitize_cell("\n  padded  \n"), "padded");
    }

    #[test]
    fn test_sanitize_heading_cell_strips_bold() {
        assert_eq!(sanitize_heading_cell("**Title**"), "Title");
        assert_eq!(sanitize_heading_cell(" __Title__ "), "Title");
    }

    #[test]
    fn test_sanitize_heading_cell_strips_italic() {
        assert_eq!(sanitize_heading_cell("*Title*"), "Title");
        assert_eq!(sanitize_heading_cell("_Title_"), "Title");
    }

    #[test]
    fn test_sanitize_heading_cell_strips_one_layer_only() {
        assert_eq!(sanitize_heading_cell("***Title***"), "*Title*");
    }

    #[test]
    fn test_sanitize_heading_cell_keeps_asymmetric_markup() {
        assert_eq!(sanitize_heading_cell("**Bold** tail"), "**Bold** tail");
        assert_eq!(sanitize_heading_cell("**"), "**");
        assert_eq!(sanitize_heading_cell("****"), "****");
    }

    proptest! {
        #[test]
        fn prop_sanitized_cell_has_no_line_breaks_or_bare_pipes(
            content in "[a-z|\\n\\r ]{0,40}",
        ) {
            let cell = sanitize_cell(&content);
            prop_assert!(!cell.contains('\n'));
            prop_assert!(!cell.contains('\r'));
            prop_assert_eq!(cell.trim(), cell.as_str());

            let mut prev = None;
            for ch in cell.chars() {
                if ch == '|' {
                    prop_assert_eq!(prev, Some('\\'), "bare pipe in {:?}", cell);
                }
                prev = Some(ch);
            }
        }

        #[test]
        fn prop_escape_inline_is_idempotent(content in "[a-z$ ]{0,40}") {
            let once = escape_inline(&content);
            prop_assert_eq!(escape_inline(&once), once);
        }
    }
}
