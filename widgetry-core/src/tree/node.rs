//! Tree Node Capability
//!
//! This module defines what a node must expose for widgets to attach to it.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::widget::Widget;

/// Shared handle to a node of the tree being walked.
pub type NodeRef = Arc<dyn TreeNode>;

/// A node of a DOM-like tree that widgets can attach to.
///
/// All methods take `&self`; implementations use interior mutability for the
/// widget slot, status classes and content elements. Widgets update nodes
/// while holding their own lock, so these methods must not call into widgets.
pub trait TreeNode: Send + Sync {
    /// Read an attribute, if present.
    fn attribute(&self, name: &str) -> Option<String>;

    /// The node's children, in document order.
    fn children(&self) -> Vec<NodeRef>;

    /// The widget currently attached to this node, if it is still alive.
    fn widget_instance(&self) -> Option<Arc<dyn Widget>>;

    /// Set or clear the widget back-reference.
    fn set_widget_instance(&self, instance: Option<Weak<dyn Widget>>);

    /// Add a class to the node's class list.
    fn add_class(&self, class: &str);

    /// Remove every class starting with `prefix`.
    fn remove_classes_with_prefix(&self, prefix: &str);

    /// The node's classes, in insertion order.
    fn classes(&self) -> Vec<String>;

    /// Insert a content element before all existing content.
    fn prepend_content(&self, content: Arc<ContentElement>);

    /// Detach a previously prepended content element. Returns `false` if it
    /// was not attached.
    fn remove_content(&self, content: &Arc<ContentElement>) -> bool;
}

/// Whether two handles point at the same node.
pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// The presentation resource a widget owns while it is attached to a node.
///
/// Content is shared as `Arc<ContentElement>` and identified by that handle.
#[derive(Debug)]
pub struct ContentElement {
    tag: &'static str,
    text: Mutex<String>,
}

impl ContentElement {
    /// Create an empty `span` content element.
    pub fn span() -> Self {
        Self::new("span")
    }

    /// Create an empty content element with the given tag.
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            text: Mutex::new(String::new()),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Current text of the element.
    pub fn text(&self) -> String {
        self.text.lock().clone()
    }

    /// Replace the element's text.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock() = text.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_is_empty() {
        let content = ContentElement::span();
        assert_eq!(content.tag(), "span");
        assert_eq!(content.text(), "");
    }

    #[test]
    fn same_node_compares_handles() {
        let a: NodeRef = crate::tree::Element::div().into_shared();
        let b: NodeRef = crate::tree::Element::div().into_shared();
        assert!(same_node(&a, &Arc::clone(&a)));
        assert!(!same_node(&a, &b));
    }

    #[test]
    fn content_text_is_replaced() {
        let content = ContentElement::new("p");
        assert_eq!(content.text(), "");

        content.set_text("loading");
        content.set_text("ready");
        assert_eq!(content.text(), "ready");
    }
}
