//! Table normalization
//!
//! Converts a `<table>` subtree into a rectangular GFM table. Real-world
//! tables are often ragged or header-less, so the normalizer repairs them
//! instead of giving up:
//!
//! - The header comes from the first `<thead>` row, or else the first body row
//! - Extra header-section rows are dropped (not demoted to body rows)
//! - Body rows are padded or truncated to the header's column count
//!
//! Every repair is reported as a [`ConversionWarning`]. Cell content is
//! rendered by the tree converter, so inline formatting and citations inside
//! cells work as anywhere else; a table nested in a cell is skipped by the
//! converter and contributes an empty cell fragment.
//!
//! # Output Format
//!
//! ```markdown
//! | Name | Value |
//! | --- | --- |
//! | a | 1 |
//!
//! ```

use crate::converter::ConversionContext;
use crate::sanitize::{sanitize_cell, sanitize_heading_cell};
use crate::tree::DocumentNode;
use crate::warning::ConversionWarning;

/// Rectangular table ready to be written as Markdown
///
/// The column count is fixed by the header; [`TableModel::push_row`] forces
/// every body row to that width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableModel {
    /// Create a table with the given (already sanitized) header cells
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.header.len()
    }

    /// Header cells
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Body rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Append a body row, padding or truncating it to the column count
    ///
    /// Returns the warning describing the repair, if one was needed.
    pub fn push_row(&mut self, mut cells: Vec<String>) -> Option<ConversionWarning> {
        let expected = self.columns();
        let actual = cells.len();
        let row = self.rows.len() + 1;

        let warning = if actual < expected {
            cells.resize(expected, String::new());
            Some(ConversionWarning::RowPadded {
                row,
                actual,
                expected,
            })
        } else if actual > expected {
            cells.truncate(expected);
            Some(ConversionWarning::RowTruncated {
                row,
                actual,
                expected,
            })
        } else {
            None
        };

        self.rows.push(cells);
        warning
    }

    /// Write the table as GFM Markdown followed by a blank line
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        write_row(&mut output, &self.header);

        let separator = vec!["---"; self.columns()];
        write_row(&mut output, &separator);

        for row in &self.rows {
            write_row(&mut output, row);
        }

        output.push('\n');
        output
    }
}

fn write_row<S: AsRef<str>>(output: &mut String, cells: &[S]) {
    let joined = cells
        .iter()
        .map(|cell| cell.as_ref())
        .collect::<Vec<_>>()
        .join(" | ");
    output.push_str("| ");
    output.push_str(&joined);
    output.push_str(" |\n");
}

/// Section a row was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSection {
    Header,
    Body,
}

/// Rows of a table tagged with their section, in document order
struct TableRows<N> {
    rows: Vec<(N, RowSection)>,
}

impl<N: DocumentNode> TableRows<N> {
    fn collect(table: &N) -> Self {
        let mut rows = Vec::new();

        for child in table.children() {
            let Some(tag) = child.tag_name() else {
                continue;
            };
            match tag.as_str() {
                "thead" => rows.extend(
                    child_rows(&child)
                        .into_iter()
                        .map(|row| (row, RowSection::Header)),
                ),
                "tbody" | "tfoot" => rows.extend(
                    child_rows(&child)
                        .into_iter()
                        .map(|row| (row, RowSection::Body)),
                ),
                // Direct tr under table (html5ever normally inserts tbody)
                "tr" => rows.push((child, RowSection::Body)),
                // caption, colgroup and anything else carry no rows
                _ => {}
            }
        }

        Self { rows }
    }

    /// Index of the row used as header: the first header-section row, or
    /// else the first row of the table
    fn header_index(&self) -> Option<usize> {
        self.rows
            .iter()
            .position(|(_, section)| *section == RowSection::Header)
            .or_else(|| (!self.rows.is_empty()).then_some(0))
    }

    fn header_section_len(&self) -> usize {
        self.rows
            .iter()
            .filter(|(_, section)| *section == RowSection::Header)
            .count()
    }
}

fn child_rows<N: DocumentNode>(section: &N) -> Vec<N> {
    section
        .children()
        .into_iter()
        .filter(|child| child.is_element("tr"))
        .collect()
}

fn row_cells<N: DocumentNode>(row: &N) -> Vec<N> {
    row.children()
        .into_iter()
        .filter(|child| child.is_element("th") || child.is_element("td"))
        .collect()
}

/// Convert a table subtree into Markdown
///
/// `render_cell` renders the children of one cell element; the converter
/// passes its own child traversal. Cells are rendered in document order, so
/// a header section placed after body rows still numbers its citations
/// after theirs. Returns an empty string (with a warning) when no header can
/// be resolved.
pub(crate) fn normalize_table<N, F>(
    table: &N,
    ctx: &mut ConversionContext,
    mut render_cell: F,
) -> String
where
    N: DocumentNode,
    F: FnMut(&N, &mut ConversionContext) -> String,
{
    let table_rows = TableRows::collect(table);

    let Some(header_index) = table_rows.header_index() else {
        ctx.warn(ConversionWarning::EmptyTable);
        return String::new();
    };

    let header_section_len = table_rows.header_section_len();
    if header_section_len > 1 {
        ctx.warn(ConversionWarning::ExtraHeaderRows {
            discarded: header_section_len - 1,
        });
    }

    if row_cells(&table_rows.rows[header_index].0).is_empty() {
        ctx.warn(ConversionWarning::NoColumns);
        return String::new();
    }

    let mut header = Vec::new();
    let mut body = Vec::new();
    for (index, (row, section)) in table_rows.rows.iter().enumerate() {
        if index == header_index {
            header = row_cells(row)
                .iter()
                .map(|cell| sanitize_heading_cell(&render_cell(cell, ctx)))
                .collect();
        } else if *section == RowSection::Body {
            body.push(
                row_cells(row)
                    .iter()
                    .map(|cell| sanitize_cell(&render_cell(cell, ctx)))
                    .collect::<Vec<String>>(),
            );
        }
    }

    let mut model = TableModel::new(header);
    for cells in body {
        if let Some(warning) = model.push_row(cells) {
            ctx.warn(warning);
        }
    }

    model.to_markdown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::CitationDedup;
    use crate::parser::parse_html;
    use markup5ever_rcdom::Handle;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn first_table(html: &str) -> Handle {
        let dom = parse_html(html.as_bytes()).expect("Parse failed");
        let node = dom
            .document
            .first_descendant(|n| n.is_element("table"))
            .expect("table element");
        // rcdom's Drop detaches all descendants; keep the tree alive for the test
        std::mem::forget(dom);
        node
    }

    /// Normalize with a plain-text cell renderer
    fn normalize_text_cells(html: &str) -> (String, Vec<ConversionWarning>) {
        let table = first_table(html);
        let mut ctx = ConversionContext::new(CitationDedup::Exact);
        let markdown = normalize_table(&table, &mut ctx, |cell, _| cell.text_content());
        (markdown, ctx.warnings().to_vec())
    }

    #[test]
    fn test_model_pads_short_rows() {
        let mut model = TableModel::new(cells(&["A", "B"]));
        assert_eq!(model.push_row(cells(&["1", "2"])), None);
        assert_eq!(
            model.push_row(cells(&["3"])),
            Some(ConversionWarning::RowPadded {
                row: 2,
                actual: 1,
                expected: 2
            })
        );
        assert_eq!(
            model.to_markdown(),
            "| A | B |\n| --- | --- |\n| 1 | 2 |\n| 3 |  |\n\n"
        );
    }

    #[test]
    fn test_model_truncates_long_rows() {
        let mut model = TableModel::new(cells(&["A"]));
        assert_eq!(
            model.push_row(cells(&["1", "2", "3"])),
            Some(ConversionWarning::RowTruncated {
                row: 1,
                actual: 3,
                expected: 1
            })
        );
        assert_eq!(model.header(), &cells(&["A"])[..]);
        assert_eq!(model.rows(), &[cells(&["1"])]);
    }

    #[test]
    fn test_explicit_header_section() {
        let (markdown, warnings) = normalize_text_cells(
            "<table><thead><tr><th>H1</th><th>H2</th></tr></thead>\
             <tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
        );
        assert_eq!(markdown, "| H1 | H2 |\n| --- | --- |\n| a | b |\n\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_first_body_row_promoted_to_header() {
        let (markdown, warnings) = normalize_text_cells(
            "<table><tr><td>H</td></tr><tr><td>v</td></tr></table>",
        );
        assert_eq!(markdown, "| H |\n| --- |\n| v |\n\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_extra_header_rows_discarded() {
        let (markdown, warnings) = normalize_text_cells(
            "<table><thead><tr><th>H</th></tr><tr><th>Dropped</th></tr></thead>\
             <tbody><tr><td>v</td></tr></tbody></table>",
        );
        assert_eq!(markdown, "| H |\n| --- |\n| v |\n\n");
        assert!(!markdown.contains("Dropped"));
        assert_eq!(
            warnings,
            vec![ConversionWarning::ExtraHeaderRows { discarded: 1 }]
        );
    }

    #[test]
    fn test_empty_table_skipped() {
        let (markdown, warnings) = normalize_text_cells("<table></table>");
        assert_eq!(markdown, "");
        assert_eq!(warnings, vec![ConversionWarning::EmptyTable]);
    }

    #[test]
    fn test_header_without_cells_skipped() {
        let (markdown, warnings) =
            normalize_text_cells("<table><thead><tr></tr></thead></table>");
        assert_eq!(markdown, "");
        assert_eq!(warnings, vec![ConversionWarning::NoColumns]);
    }

    #[test]
    fn test_header_only_table() {
        let (markdown, warnings) =
            normalize_text_cells("<table><thead><tr><th>Only</th></tr></thead></table>");
        assert_eq!(markdown, "| Only |\n| --- |\n\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_cells_are_sanitized() {
        let (markdown, _) = normalize_text_cells(
            "<table><tr><th>**Head**</th></tr><tr><td>a|b\nc</td></tr></table>",
        );
        assert_eq!(markdown, "| Head |\n| --- |\n| a\\|b c |\n\n");
    }

    #[test]
    fn test_late_header_section_renders_in_document_order() {
        let table = first_table(
            "<table><tbody><tr><td>body</td></tr></tbody>\
             <thead><tr><th>head</th></tr></thead></table>",
        );
        let mut ctx = ConversionContext::new(CitationDedup::Exact);
        let mut visited = Vec::new();
        let markdown = normalize_table(&table, &mut ctx, |cell, _| {
            let text = cell.text_content();
            visited.push(text.clone());
            text
        });

        assert_eq!(visited, vec!["body", "head"]);
        assert_eq!(markdown, "| head |\n| --- |\n| body |\n\n");
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_tfoot_rows_are_body_rows() {
        let (markdown, _) = normalize_text_cells(
            "<table><thead><tr><th>H</th></tr></thead><tbody><tr><td>1</td></tr></tbody>\
             <tfoot><tr><td>total</td></tr></tfoot></table>",
        );
        assert_eq!(markdown, "| H |\n| --- |\n| 1 |\n| total |\n\n");
    }
}
