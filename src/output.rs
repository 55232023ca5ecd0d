//! Output tidying
//!
//! The converter emits raw fragments: whitespace-only text nodes from indented
//! HTML survive, and adjacent blocks each contribute their own blank line.
//! [`tidy_markdown`] is the caller-side cleanup step applied by
//! [`crate::converter::convert_html`]; it never runs inside the converter.

/// Collapse excess blank lines and stray indentation
///
/// **Rules:**
/// 1. CRLF becomes LF
/// 2. Outside fenced code blocks, lines are trimmed
/// 3. Consecutive blank lines collapse to one; leading blank lines are dropped
/// 4. The result ends with exactly one newline (empty input stays empty)
///
/// Fenced code block content is copied verbatim.
///
/// # Examples
///
/// ```rust
/// use citation_markdown_converter::output::tidy_markdown;
///
/// assert_eq!(tidy_markdown("\n  # T\n\n\n\nBody\n\n"), "# T\n\nBody\n");
/// ```
pub fn tidy_markdown(markdown: &str) -> String {
    let markdown = markdown.replace("\r\n", "\n");
    let mut result = String::with_capacity(markdown.len());
    let mut prev_blank = true;
    let mut in_code_block = false;

    for line in markdown.lines() {
        let fence = line.trim_start().starts_with("```");

        if in_code_block && !fence {
            result.push_str(line);
            result.push('\n');
            continue;
        }
        if fence {
            in_code_block = !in_code_block;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !prev_blank {
                result.push('\n');
                prev_blank = true;
            }
        } else {
            result.push_str(trimmed);
            result.push('\n');
            prev_blank = false;
        }
    }

    while result.ends_with("\n\n") {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_blank_lines() {
        assert_eq!(tidy_markdown("a\n\n\n\nb\n\n\n"), "a\n\nb\n");
    }

    #[test]
    fn test_drops_leading_blank_lines_and_indentation() {
        assert_eq!(tidy_markdown("\n\n   # Title\n\n  text  \n"), "# Title\n\ntext\n");
    }

    #[test]
    fn test_normalizes_crlf() {
        assert_eq!(tidy_markdown("a\r\n\r\nb\r\n"), "a\n\nb\n");
    }

    #[test]
    fn test_preserves_code_block_content() {
        let input = "```\n  indented\n\n\n\n  more  \n```\n\n\nafter\n";
        assert_eq!(
            tidy_markdown(input),
            "```\n  indented\n\n\n\n  more  \n```\n\nafter\n"
        );
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert_eq!(tidy_markdown(""), "");
        assert_eq!(tidy_markdown("\n \n\t\n"), "");
    }

    #[test]
    fn test_table_survives() {
        let input = "| A | B |\n| --- | --- |\n| 3 |  |\n\n";
        assert_eq!(tidy_markdown(input), "| A | B |\n| --- | --- |\n| 3 |  |\n");
    }
}
