//! Widgets
//!
//! A widget is a behavior attached to a tree node. Each widget type has one
//! shared instance, driven through a four-state lifecycle:
//!
//! ```text
//! Uninitialized --init--> Initializing --done--> Initialized
//!                                      \--fail--> Failed
//! ```
//!
//! # Completion
//!
//! `init` only starts initialization. The widget settles later, from whatever
//! code finishes its work, by calling `done` or `fail`. Either way it reports
//! through the [`DoneCallback`] it was handed in `init`; that callback is the
//! manager's only signal that the widget is ready.
//!
//! `destroy` works from any state. If the widget was still initializing, the
//! callback receives a destroy error first so that nobody waits forever.
//!
//! # Writing Widgets
//!
//! Concrete widgets embed a [`WidgetLifecycle`] and layer their presentation on
//! top of it; [`BasicWidget`] is the reference example.

mod basic;
mod lifecycle;
mod state;

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;
use crate::tree::NodeRef;

pub use basic::BasicWidget;
pub use lifecycle::WidgetLifecycle;
pub use state::{WidgetState, STATUS_PREFIX};

/// Callback a widget invokes once when it settles.
///
/// `None` means success; `Some(error)` means failure or destruction.
pub type DoneCallback = Arc<dyn Fn(Option<WidgetError>) + Send + Sync>;

/// Name of a widget type, read from a node attribute.
///
/// Also the key of the widget's singleton instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetTypeId(String);

impl WidgetTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetTypeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WidgetTypeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for WidgetTypeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The contract every widget implements.
pub trait Widget: Send + Sync {
    /// Name of the concrete widget type, used in error messages.
    fn name(&self) -> &str;

    /// Current lifecycle state.
    fn state(&self) -> WidgetState;

    /// Start initializing on `node`.
    ///
    /// Returns `false` without side effects unless the widget is
    /// [`WidgetState::Uninitialized`].
    fn init(self: Arc<Self>, node: &NodeRef, done: DoneCallback) -> bool;

    /// Finish initialization successfully. Returns `false` unless initializing.
    fn done(&self) -> bool;

    /// Finish initialization with a failure. Returns `false` unless initializing.
    fn fail(&self) -> bool;

    /// Detach from the node and return to [`WidgetState::Uninitialized`].
    fn destroy(&self);
}

/// A constructible widget type, as produced by a resolver.
#[derive(Clone)]
pub struct WidgetType {
    name: Arc<str>,
    construct: Arc<dyn Fn() -> Arc<dyn Widget> + Send + Sync>,
}

impl WidgetType {
    /// Create a widget type from a constructor.
    pub fn new<F>(name: impl Into<Arc<str>>, construct: F) -> Self
    where
        F: Fn() -> Arc<dyn Widget> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            construct: Arc::new(construct),
        }
    }

    /// A type whose instances are [`BasicWidget`]s with the given name.
    pub fn basic(name: impl Into<Arc<str>>) -> Self {
        let name = name.into();
        let widget_name = Arc::clone(&name);
        Self::new(name, move || {
            Arc::new(BasicWidget::new(widget_name.to_string())) as Arc<dyn Widget>
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct a fresh instance.
    pub fn construct(&self) -> Arc<dyn Widget> {
        (self.construct)()
    }
}

impl fmt::Debug for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetType").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn type_id_round_trips_strings() {
        let id = WidgetTypeId::from("FirstWidget");
        assert_eq!(id.as_str(), "FirstWidget");
        assert_eq!(id.to_string(), "FirstWidget");
        assert_eq!(id, WidgetTypeId::new(String::from("FirstWidget")));
    }

    #[test]
    fn widget_type_constructs_fresh_instances() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let ty = WidgetType::new("Counted", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(BasicWidget::new("Counted")) as Arc<dyn Widget>
        });

        let a = ty.construct();
        let b = ty.construct();
        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert!(!std::ptr::addr_eq(Arc::as_ptr(&a), Arc::as_ptr(&b)));
        assert_eq!(a.name(), "Counted");
    }

    #[test]
    fn basic_type_names_its_widgets() {
        let ty = WidgetType::basic("NinthWidget");
        assert_eq!(ty.name(), "NinthWidget");
        assert_eq!(ty.construct().name(), "NinthWidget");
        assert_eq!(ty.construct().state(), WidgetState::Uninitialized);
    }
}
