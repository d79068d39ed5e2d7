//! In-Memory Elements
//!
//! [`Element`] is a minimal DOM node: a tag, ordered attributes, child
//! elements, a class list and attached content. Structure is fixed once the
//! element is shared; only the widget-facing state is mutable.

use std::sync::{Arc, Weak};

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::node::{ContentElement, NodeRef, TreeNode};
use crate::error::ConfigError;
use crate::widget::Widget;

/// Serializable description of an element tree.
///
/// ```json
/// {"tag": "div", "attributes": {"widget": "X"}, "children": [{"tag": "span"}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSpec {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    fn build(self) -> Element {
        let tag = if self.tag.is_empty() { "div".to_string() } else { self.tag };
        let mut element = Element::new(tag);
        element.attributes = self.attributes;
        element.children = self
            .children
            .into_iter()
            .map(|child| Arc::new(child.build()))
            .collect();
        element
    }
}

/// A node of an in-memory element tree.
pub struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    children: SmallVec<[Arc<Element>; 4]>,
    classes: Mutex<IndexSet<String>>,
    content: Mutex<Vec<Arc<ContentElement>>>,
    widget: Mutex<Option<Weak<dyn Widget>>>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: SmallVec::new(),
            classes: Mutex::new(IndexSet::new()),
            content: Mutex::new(Vec::new()),
            widget: Mutex::new(None),
        }
    }

    /// Shorthand for a `div`.
    pub fn div() -> Self {
        Self::new("div")
    }

    /// Build a shared element tree from its JSON description.
    pub fn from_json(json: &str) -> Result<Arc<Self>, ConfigError> {
        let spec: ElementSpec = serde_json::from_str(json)?;
        Ok(Arc::new(spec.build()))
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the `id` attribute.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attribute("id", id)
    }

    /// Set the `widget` attribute.
    pub fn with_widget(self, type_id: impl Into<String>) -> Self {
        self.with_attribute(crate::config::DEFAULT_TYPE_ATTRIBUTE, type_id)
    }

    /// Append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Share the element so it can be walked.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The `id` attribute, if set.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id").map(String::as_str)
    }

    /// The child element at `index`.
    pub fn child(&self, index: usize) -> Option<&Arc<Element>> {
        self.children.get(index)
    }

    pub fn child_elements(&self) -> &[Arc<Element>] {
        &self.children
    }

    /// Find this element or a descendant by its `id` attribute.
    pub fn find(self: &Arc<Self>, id: &str) -> Option<Arc<Element>> {
        if self.id() == Some(id) {
            return Some(Arc::clone(self));
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Visit this element and every descendant, depth first.
    pub fn for_each(self: &Arc<Self>, visit: &mut dyn FnMut(&Arc<Element>)) {
        visit(self);
        for child in &self.children {
            child.for_each(visit);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.lock().contains(class)
    }

    /// Content elements currently attached, first to last.
    pub fn content(&self) -> Vec<Arc<ContentElement>> {
        self.content.lock().clone()
    }
}

impl TreeNode for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.children
            .iter()
            .map(|child| Arc::clone(child) as NodeRef)
            .collect()
    }

    fn widget_instance(&self) -> Option<Arc<dyn Widget>> {
        self.widget.lock().as_ref().and_then(Weak::upgrade)
    }

    fn set_widget_instance(&self, instance: Option<Weak<dyn Widget>>) {
        *self.widget.lock() = instance;
    }

    fn add_class(&self, class: &str) {
        self.classes.lock().insert(class.to_string());
    }

    fn remove_classes_with_prefix(&self, prefix: &str) {
        self.classes.lock().retain(|class| !class.starts_with(prefix));
    }

    fn classes(&self) -> Vec<String> {
        self.classes.lock().iter().cloned().collect()
    }

    fn prepend_content(&self, content: Arc<ContentElement>) {
        self.content.lock().insert(0, content);
    }

    fn remove_content(&self, content: &Arc<ContentElement>) -> bool {
        let mut attached = self.content.lock();
        match attached.iter().position(|element| Arc::ptr_eq(element, content)) {
            Some(index) => {
                attached.remove(index);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes)
            .field("children", &self.children.len())
            .field("classes", &*self.classes.lock())
            .finish()
    }
}
