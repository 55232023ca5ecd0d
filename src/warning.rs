//! Non-fatal conversion anomalies
//!
//! Conversion is best-effort: malformed tables, anchors without targets and
//! similar problems degrade to a partial or empty fragment instead of failing.
//! Each degradation is recorded as a [`ConversionWarning`] so callers can
//! surface it, and is also emitted as a `tracing` warn event when recorded.

use std::fmt;

/// A non-fatal anomaly found while converting a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    /// The header section had more than one row; extra rows were dropped
    ExtraHeaderRows {
        /// Number of discarded rows
        discarded: usize,
    },
    /// A table had neither a header section nor body rows
    EmptyTable,
    /// The resolved header row has no cells
    NoColumns,
    /// A body row had fewer cells than the header and was padded
    RowPadded {
        /// 1-based body row index
        row: usize,
        /// Cells found in the row
        actual: usize,
        /// Column count fixed by the header
        expected: usize,
    },
    /// A body row had more cells than the header and was truncated
    RowTruncated {
        /// 1-based body row index
        row: usize,
        /// Cells found in the row
        actual: usize,
        /// Column count fixed by the header
        expected: usize,
    },
    /// A table nested inside another table was skipped
    NestedTable,
    /// A citation marker without a usable inner link was skipped
    CitationWithoutLink,
    /// An anchor without a target was rendered as plain content
    AnchorWithoutTarget,
    /// A subtree exceeded the configured nesting limit and was skipped
    DepthLimitExceeded {
        /// Configured maximum depth
        limit: usize,
    },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::ExtraHeaderRows { discarded } => write!(
                f,
                "Table header section has multiple rows; discarded {} extra row(s)",
                discarded
            ),
            ConversionWarning::EmptyTable => {
                write!(f, "Table has no header or body rows; skipped")
            }
            ConversionWarning::NoColumns => write!(f, "Table header has no cells; skipped"),
            ConversionWarning::RowPadded {
                row,
                actual,
                expected,
            } => write!(
                f,
                "Table row {} has {} cell(s), expected {}; padded with empty cells",
                row, actual, expected
            ),
            ConversionWarning::RowTruncated {
                row,
                actual,
                expected,
            } => write!(
                f,
                "Table row {} has {} cell(s), expected {}; truncated",
                row, actual, expected
            ),
            ConversionWarning::NestedTable => {
                write!(f, "Nested table inside a table cell is not supported; skipped")
            }
            ConversionWarning::CitationWithoutLink => {
                write!(f, "Citation marker contains no link target; skipped")
            }
            ConversionWarning::AnchorWithoutTarget => {
                write!(f, "Link has no target; rendered as plain content")
            }
            ConversionWarning::DepthLimitExceeded { limit } => write!(
                f,
                "Nesting depth exceeds limit of {}; subtree skipped",
                limit
            ),
        }
    }
}
