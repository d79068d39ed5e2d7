//! Widget Lifecycle
//!
//! The state machine shared by all widgets. It owns the node association,
//! the content element and the completion callback, and keeps the node's
//! status class in sync with the state.
//!
//! # Locking
//!
//! Node updates happen under the internal lock, so a node's status class
//! always matches the last transition even when `init` and `done` race on
//! different threads. Nodes must not call back into widgets.
//!
//! The completion callback runs with the lock released. It may call back into
//! the widget, and a widget may settle synchronously from inside `init`.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::state::{WidgetState, STATUS_PREFIX};
use super::{DoneCallback, Widget};
use crate::error::WidgetError;
use crate::tree::{ContentElement, NodeRef};

#[derive(Default)]
struct LifecycleInner {
    state: WidgetState,
    target: Option<NodeRef>,
    content: Option<Arc<ContentElement>>,
    done: Option<DoneCallback>,
}

/// Lifecycle state machine embedded by concrete widgets.
pub struct WidgetLifecycle {
    name: String,
    inner: Mutex<LifecycleInner>,
}

impl WidgetLifecycle {
    /// Create an uninitialized lifecycle for a widget type called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(LifecycleInner::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WidgetState {
        self.inner.lock().state
    }

    /// The node this widget was initialized on.
    pub fn target(&self) -> Option<NodeRef> {
        self.inner.lock().target.clone()
    }

    /// The content element owned while attached.
    pub fn content(&self) -> Option<Arc<ContentElement>> {
        self.inner.lock().content.clone()
    }

    /// Attach `widget` to `node` and enter `Initializing`.
    ///
    /// Convenience over [`init`](Self::init) for widgets holding their
    /// lifecycle by value.
    pub fn attach<W>(&self, widget: &Arc<W>, node: &NodeRef, done: DoneCallback) -> bool
    where
        W: Widget + 'static,
    {
        let this: Weak<W> = Arc::downgrade(widget);
        self.init(this, node, done)
    }

    /// Enter `Initializing` on `node`, leaving `this` as the node's widget.
    ///
    /// Returns `false` and changes nothing unless currently uninitialized.
    pub fn init(&self, this: Weak<dyn Widget>, node: &NodeRef, done: DoneCallback) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != WidgetState::Uninitialized {
            return false;
        }
        let content = Arc::new(ContentElement::span());
        inner.state = WidgetState::Initializing;
        inner.target = Some(Arc::clone(node));
        inner.content = Some(Arc::clone(&content));
        inner.done = Some(done);

        node.set_widget_instance(Some(this));
        retag(node, WidgetState::Initializing);
        node.prepend_content(content);
        true
    }

    /// Settle successfully.
    pub fn done(&self) -> bool {
        self.settle(WidgetState::Initialized, None)
    }

    /// Settle with an initialization failure.
    pub fn fail(&self) -> bool {
        let error = WidgetError::Initialization {
            widget: self.name.clone(),
        };
        self.settle(WidgetState::Failed, Some(error))
    }

    fn settle(&self, outcome: WidgetState, error: Option<WidgetError>) -> bool {
        let done = {
            let mut inner = self.inner.lock();
            if inner.state != WidgetState::Initializing {
                return false;
            }
            inner.state = outcome;
            if let Some(node) = &inner.target {
                retag(node, outcome);
            }
            inner.done.clone()
        };

        if let Some(done) = done {
            done(error);
        }
        true
    }

    /// Detach from the node and reset to `Uninitialized`.
    ///
    /// A widget destroyed while initializing reports a destroy error through
    /// its completion callback before anything is torn down.
    pub fn destroy(&self) {
        let interrupted = {
            let inner = self.inner.lock();
            if inner.state == WidgetState::Initializing {
                inner.done.clone()
            } else {
                None
            }
        };
        if let Some(done) = interrupted {
            done(Some(WidgetError::DestroyedDuringInit {
                widget: self.name.clone(),
            }));
        }

        let mut inner = self.inner.lock();
        let detached = std::mem::take(&mut *inner);
        if let Some(node) = detached.target {
            if let Some(content) = &detached.content {
                node.remove_content(content);
            }
            node.remove_classes_with_prefix(STATUS_PREFIX);
            node.set_widget_instance(None);
        }
    }
}

fn retag(node: &NodeRef, state: WidgetState) {
    node.remove_classes_with_prefix(STATUS_PREFIX);
    if let Some(marker) = state.marker() {
        node.add_class(marker);
    }
}

impl std::fmt::Debug for WidgetLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetLifecycle")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Element, TreeNode};
    use crate::widget::BasicWidget;

    type Calls = Arc<Mutex<Vec<Option<WidgetError>>>>;

    fn recorder() -> (DoneCallback, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let done: DoneCallback = Arc::new(move |err| sink.lock().push(err));
        (done, calls)
    }

    fn setup() -> (Arc<BasicWidget>, Arc<Element>, NodeRef) {
        let widget = Arc::new(BasicWidget::new("TestWidget"));
        let element = Element::div().into_shared();
        let node: NodeRef = element.clone();
        (widget, element, node)
    }

    #[test]
    fn init_attaches_to_node() {
        let (widget, element, node) = setup();
        let (done, calls) = recorder();

        assert!(widget.lifecycle().attach(&widget, &node, done));
        assert_eq!(widget.lifecycle().state(), WidgetState::Initializing);
        assert!(element.has_class("widget-initializing"));
        assert_eq!(element.content().len(), 1);
        assert!(element.widget_instance().is_some());
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn init_twice_is_rejected() {
        let (widget, element, node) = setup();
        let (done, _) = recorder();
        let (again, _) = recorder();

        assert!(widget.lifecycle().attach(&widget, &node, done));
        assert!(!widget.lifecycle().attach(&widget, &node, again));
        assert_eq!(element.content().len(), 1);
    }

    #[test]
    fn done_settles_once() {
        let (widget, element, node) = setup();
        let (done, calls) = recorder();
        widget.lifecycle().attach(&widget, &node, done);

        assert!(widget.lifecycle().done());
        assert!(!widget.lifecycle().done());
        assert!(!widget.lifecycle().fail());

        assert_eq!(widget.lifecycle().state(), WidgetState::Initialized);
        assert_eq!(element.classes(), vec!["widget-done".to_string()]);
        assert_eq!(*calls.lock(), vec![None]);
    }

    #[test]
    fn fail_reports_widget_name() {
        let (widget, element, node) = setup();
        let (done, calls) = recorder();
        widget.lifecycle().attach(&widget, &node, done);

        assert!(widget.lifecycle().fail());
        assert_eq!(widget.lifecycle().state(), WidgetState::Failed);
        assert!(element.has_class("widget-failed"));
        assert_eq!(
            *calls.lock(),
            vec![Some(WidgetError::Initialization {
                widget: "TestWidget".into()
            })]
        );
    }

    #[test]
    fn done_before_init_is_noop() {
        let (widget, _, _) = setup();
        assert!(!widget.lifecycle().done());
        assert!(!widget.lifecycle().fail());
        assert_eq!(widget.lifecycle().state(), WidgetState::Uninitialized);
    }

    #[test]
    fn destroy_while_initializing_signals_callback() {
        let (widget, element, node) = setup();
        let (done, calls) = recorder();
        widget.lifecycle().attach(&widget, &node, done);

        widget.lifecycle().destroy();

        assert_eq!(
            *calls.lock(),
            vec![Some(WidgetError::DestroyedDuringInit {
                widget: "TestWidget".into()
            })]
        );
        assert_eq!(widget.lifecycle().state(), WidgetState::Uninitialized);
        assert!(element.classes().is_empty());
        assert!(element.content().is_empty());
        assert!(element.widget_instance().is_none());
        assert!(widget.lifecycle().target().is_none());
    }

    #[test]
    fn destroy_after_settle_is_silent_and_reinitializable() {
        let (widget, element, node) = setup();
        let (done, calls) = recorder();
        widget.lifecycle().attach(&widget, &node, done);
        widget.lifecycle().done();

        widget.lifecycle().destroy();
        assert_eq!(calls.lock().len(), 1);
        assert!(element.widget_instance().is_none());

        let (done, _) = recorder();
        assert!(widget.lifecycle().attach(&widget, &node, done));
        assert_eq!(widget.lifecycle().state(), WidgetState::Initializing);
    }

    #[test]
    fn destroy_uninitialized_is_safe() {
        let (widget, _, _) = setup();
        widget.lifecycle().destroy();
        widget.lifecycle().destroy();
        assert_eq!(widget.lifecycle().state(), WidgetState::Uninitialized);
    }

    #[test]
    fn done_from_another_thread_keeps_done_marker() {
        for _ in 0..200 {
            let (widget, element, node) = setup();
            let (done, calls) = recorder();

            std::thread::scope(|scope| {
                scope.spawn(|| {
                    while !widget.lifecycle().done() {
                        std::hint::spin_loop();
                    }
                });
                assert!(widget.lifecycle().attach(&widget, &node, done));
            });

            assert_eq!(element.classes(), vec!["widget-done".to_string()]);
            assert_eq!(*calls.lock(), vec![None]);
        }
    }

    #[test]
    fn callback_may_reenter_widget() {
        let (widget, _, node) = setup();
        let observer = Arc::clone(&widget);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let done: DoneCallback = Arc::new(move |_| {
            *sink.lock() = Some(observer.lifecycle().state());
        });

        widget.lifecycle().attach(&widget, &node, done);
        widget.lifecycle().done();
        assert_eq!(*seen.lock(), Some(WidgetState::Initialized));
    }
}
