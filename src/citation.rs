//! Citation numbering
//!
//! Every link target met during one conversion gets a 1-based sequence
//! number, assigned in first-encounter order. Depending on
//! [`CitationDedup`], targets are matched either verbatim or by their base
//! form (scheme + host + path), so `https://x.com/a?x=1` and
//! `https://x.com/a#y` can share one number.
//!
//! A registry lives for exactly one conversion call. The converter creates a
//! fresh one inside its per-call context, so repeated or concurrent
//! conversions never see each other's numbering.

use std::collections::HashMap;
use url::Url;

/// How link targets are matched when assigning citation numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CitationDedup {
    /// Only identical target strings share a number
    #[default]
    Exact,
    /// Targets with the same scheme, host and path share a number
    BaseForm,
}

impl From<bool> for CitationDedup {
    /// `true` enables base-form deduplication.
    fn from(dedupe: bool) -> Self {
        if dedupe {
            CitationDedup::BaseForm
        } else {
            CitationDedup::Exact
        }
    }
}

/// Assigns stable sequence numbers to citation targets
#[derive(Debug)]
pub struct CitationRegistry {
    dedup: CitationDedup,
    numbers: HashMap<String, usize>,
}

impl CitationRegistry {
    /// Create an empty registry using the given matching strategy
    pub fn new(dedup: CitationDedup) -> Self {
        Self {
            dedup,
            numbers: HashMap::new(),
        }
    }

    /// Return the sequence number for `raw_target`, assigning the next one
    /// if its normalized form has not been seen yet.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use citation_markdown_converter::citation::{CitationDedup, CitationRegistry};
    ///
    /// let mut registry = CitationRegistry::new(CitationDedup::BaseForm);
    /// assert_eq!(registry.resolve("https://x.com/a?x=1#y"), 1);
    /// assert_eq!(registry.resolve("https://x.com/b"), 2);
    /// assert_eq!(registry.resolve("https://x.com/a?z=2"), 1);
    /// ```
    pub fn resolve(&mut self, raw_target: &str) -> usize {
        let key = match self.dedup {
            CitationDedup::Exact => raw_target.to_string(),
            CitationDedup::BaseForm => base_form(raw_target),
        };
        let next = self.numbers.len() + 1;
        *self.numbers.entry(key).or_insert(next)
    }

    /// Resolve `raw_target` and render it as a numbered citation link
    ///
    /// The label is the sequence number; the link keeps the original,
    /// non-normalized target so it stays clickable.
    pub fn cite(&mut self, raw_target: &str) -> String {
        let number = self.resolve(raw_target);
        render_citation(number, raw_target)
    }

    /// Number of distinct citations assigned so far
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Whether no citation has been assigned yet
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

/// Render a citation marker: `[[n]](target)`
pub fn render_citation(number: usize, target: &str) -> String {
    format!("[[{}]]({})", number, target)
}

/// Reduce a link target to scheme + host + path
///
/// Absolute URLs are parsed with [`url::Url`]; anything else (relative or
/// malformed targets) is cut at the first `?` or `#`.
///
/// # Examples
///
/// ```rust
/// use citation_markdown_converter::citation::base_form;
///
/// assert_eq!(base_form("https://x.com/a?x=1#y"), "https://x.com/a");
/// assert_eq!(base_form("/docs/page?ref=nav"), "/docs/page");
/// ```
pub fn base_form(raw_target: &str) -> String {
    match Url::parse(raw_target) {
        Ok(mut url) if url.has_host() => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        _ => {
            let end = raw_target.find(['?', '#']).unwrap_or(raw_target.len());
            raw_target[..end].to_string()
        }
    }
}
