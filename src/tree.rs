//! Read-only element tree capability
//!
//! The converter is written against [`DocumentNode`] rather than a concrete
//! DOM type. A tree only has to expose node kind, tag name, attributes, text,
//! children and parent; the ancestor/descendant queries used to detect
//! citation-marker ancestry, nested tables and a marker's inner link are
//! derived from those.
//!
//! An implementation for `markup5ever_rcdom::Handle` is provided, which is
//! what [`crate::parser`] produces.

use markup5ever_rcdom::{Handle, NodeData};

/// Coarse classification of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root; treated as a plain container
    Document,
    /// Element with a tag name, attributes and children
    Element,
    /// Text payload
    Text,
    /// Comments, doctypes, processing instructions; never rendered
    Other,
}

/// Read-only view over a node of an element tree
pub trait DocumentNode: Clone {
    /// Kind of this node
    fn kind(&self) -> NodeKind;

    /// Lowercase tag name for elements, `None` otherwise
    fn tag_name(&self) -> Option<String>;

    /// Value of attribute `name` for elements
    fn attribute(&self, name: &str) -> Option<String>;

    /// Text payload for text nodes
    fn text(&self) -> Option<String>;

    /// Children in document order
    fn children(&self) -> Vec<Self>;

    /// Parent node, if attached
    fn parent(&self) -> Option<Self>;

    /// Whether this node is an element with tag `tag`
    fn is_element(&self, tag: &str) -> bool {
        self.tag_name().is_some_and(|name| name == tag)
    }

    /// Whether the whitespace-separated `class` attribute contains `class`
    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    }

    /// Nearest proper ancestor matching `predicate`
    fn closest_ancestor<F>(&self, predicate: F) -> Option<Self>
    where
        F: Fn(&Self) -> bool,
    {
        let mut current = self.parent();
        while let Some(node) = current {
            if predicate(&node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// First proper descendant in document order matching `predicate`
    fn first_descendant<F>(&self, predicate: F) -> Option<Self>
    where
        F: Fn(&Self) -> bool,
    {
        // Explicit stack, children pushed in reverse to keep pre-order
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if predicate(&node) {
                return Some(node);
            }
            stack.extend(node.children().into_iter().rev());
        }
        None
    }

    /// All proper descendants in document order matching `predicate`
    fn descendants<F>(&self, predicate: F) -> Vec<Self>
    where
        F: Fn(&Self) -> bool,
    {
        let mut found = Vec::new();
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if predicate(&node) {
                found.push(node.clone());
            }
            stack.extend(node.children().into_iter().rev());
        }
        found
    }

    /// Concatenated text of all descendant text nodes, unmodified
    fn text_content(&self) -> String {
        let mut output = String::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            match node.kind() {
                NodeKind::Text => output.push_str(&node.text().unwrap_or_default()),
                NodeKind::Element | NodeKind::Document => {
                    stack.extend(node.children().into_iter().rev());
                }
                NodeKind::Other => {}
            }
        }
        output
    }
}

impl DocumentNode for Handle {
    fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Document => NodeKind::Document,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => NodeKind::Other,
        }
    }

    fn tag_name(&self) -> Option<String> {
        match self.data {
            NodeData::Element { ref name, .. } => Some(name.local.as_ref().to_ascii_lowercase()),
            _ => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match self.data {
            NodeData::Element { ref attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| attr.name.local.as_ref() == name)
                .map(|attr| attr.value.to_string()),
            _ => None,
        }
    }

    fn text(&self) -> Option<String> {
        match self.data {
            NodeData::Text { ref contents } => Some(contents.borrow().to_string()),
            _ => None,
        }
    }

    fn children(&self) -> Vec<Self> {
        self.children.borrow().clone()
    }

    fn parent(&self) -> Option<Self> {
        // rcdom keeps the parent as a Cell<Option<Weak>>; take and restore it
        let weak = self.parent.take();
        let parent = weak.as_ref().and_then(|w| w.upgrade());
        self.parent.set(weak);
        parent
    }
}
