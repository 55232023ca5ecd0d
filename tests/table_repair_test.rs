//! Table repair tests
//!
//! Malformed tables must still come out rectangular, with every repair
//! reported as a warning rather than failing the conversion.

use citation_markdown_converter::converter::MarkdownConverter;
use citation_markdown_converter::parser::parse_html;
use citation_markdown_converter::warning::ConversionWarning;
use proptest::prelude::*;

fn convert(html: &str) -> (String, Vec<ConversionWarning>) {
    let dom = parse_html(html.as_bytes()).expect("Parse failed");
    let conversion = MarkdownConverter::new().convert_dom(&dom);
    (conversion.markdown, conversion.warnings)
}

/// A short row is padded to the header width and reported
#[test]
fn test_short_row_padded() {
    let (markdown, warnings) = convert(
        "<table>
           <thead><tr><th>A</th><th>B</th></tr></thead>
           <tbody><tr><td>1</td><td>2</td></tr><tr><td>3</td></tr></tbody>
         </table>",
    );

    assert_eq!(markdown.trim(), "| A | B |\n| --- | --- |\n| 1 | 2 |\n| 3 |  |");
    assert_eq!(
        warnings,
        vec![ConversionWarning::RowPadded {
            row: 2,
            actual: 1,
            expected: 2
        }]
    );
    assert!(warnings[0].to_string().contains("has 1 cell(s), expected 2"));
}

/// A long row is truncated from the end and reported
#[test]
fn test_long_row_truncated() {
    let (markdown, warnings) =
        convert("<table><tr><th>A</th></tr><tr><td>keep</td><td>drop</td></tr></table>");

    assert!(markdown.contains("| keep |\n"));
    assert!(!markdown.contains("drop"));
    assert_eq!(
        warnings,
        vec![ConversionWarning::RowTruncated {
            row: 1,
            actual: 2,
            expected: 1
        }]
    );
}

/// Header cells lose one layer of emphasis, body cells keep it
#[test]
fn test_header_emphasis_stripped_body_kept() {
    let (markdown, _) = convert(
        "<table><thead><tr><th><b>Name</b></th><th><em>Note</em></th></tr></thead>\
         <tbody><tr><td><b>Bold</b></td><td><em>it</em></td></tr></tbody></table>",
    );

    assert!(markdown.starts_with("| Name | Note |\n| --- | --- |\n"));
    assert!(markdown.contains("| **Bold** | *it* |"));
}

/// Pipes and line breaks inside cells cannot break the row
#[test]
fn test_cell_content_is_escaped() {
    let (markdown, _) = convert(
        "<table><tr><th>Expr</th></tr><tr><td>a|b<br>c</td></tr></table>",
    );

    assert!(markdown.contains("| a\\|b c |"));
}

/// An inner table is dropped from its cell while the outer table survives
#[test]
fn test_nested_table_omitted_outer_kept() {
    let (markdown, warnings) = convert(
        "<table>
           <tr><th>Outer</th><th>Other</th></tr>
           <tr><td>before <table><tr><td>inner</td></tr></table></td><td>right</td></tr>
         </table>",
    );

    assert!(markdown.contains("| Outer | Other |"));
    assert!(markdown.contains("| before | right |"));
    assert!(!markdown.contains("inner"));
    assert_eq!(warnings, vec![ConversionWarning::NestedTable]);
}

/// A table with nothing to use as a header produces no output
#[test]
fn test_headerless_empty_table_skipped() {
    let (markdown, warnings) = convert("<p>before</p><table></table><p>after</p>");

    assert_eq!(markdown, "before\n\nafter\n\n");
    assert_eq!(warnings, vec![ConversionWarning::EmptyTable]);
}

proptest! {
    /// Whatever the row shapes, every emitted row has the header's width
    #[test]
    fn prop_every_row_matches_header_width(
        header_width in 1usize..6,
        rows in prop::collection::vec(prop::collection::vec("[a-z|]{0,5}", 0..8), 0..5),
    ) {
        let mut html = String::from("<table><tr>");
        for c in 0..header_width {
            html.push_str(&format!("<th>h{}</th>", c));
        }
        html.push_str("</tr>");
        for row in &rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", cell));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");

        let (markdown, _) = convert(&html);
        for line in markdown.lines().filter(|l| !l.is_empty()) {
            // Escaped pipes belong to cell content, bare ones delimit cells
            let delimiters = line.replace("\\|", "").matches('|').count();
            prop_assert_eq!(delimiters, header_width + 1, "line: {}", line);
        }
    }
}
