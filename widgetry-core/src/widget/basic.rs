//! A widget whose content text follows its lifecycle.

use std::sync::Arc;

use super::lifecycle::WidgetLifecycle;
use super::state::WidgetState;
use super::{DoneCallback, Widget};
use crate::tree::NodeRef;

/// General-purpose widget that reports its state in its content element.
#[derive(Debug)]
pub struct BasicWidget {
    lifecycle: WidgetLifecycle,
}

impl BasicWidget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            lifecycle: WidgetLifecycle::new(name),
        }
    }

    pub fn lifecycle(&self) -> &WidgetLifecycle {
        &self.lifecycle
    }

    /// Text of the content element, while attached.
    pub fn content_text(&self) -> Option<String> {
        self.lifecycle.content().map(|content| content.text())
    }

    fn show(&self, message: &str) {
        if let Some(content) = self.lifecycle.content() {
            content.set_text(format!("{} {}", self.lifecycle.name(), message));
        }
    }
}

impl Widget for BasicWidget {
    fn name(&self) -> &str {
        self.lifecycle.name()
    }

    fn state(&self) -> WidgetState {
        self.lifecycle.state()
    }

    fn init(self: Arc<Self>, node: &NodeRef, done: DoneCallback) -> bool {
        if !self.lifecycle.attach(&self, node, done) {
            return false;
        }
        self.show("is initializing...");
        true
    }

    fn done(&self) -> bool {
        if !self.lifecycle.done() {
            return false;
        }
        self.show("is initialized.");
        true
    }

    fn fail(&self) -> bool {
        if !self.lifecycle.fail() {
            return false;
        }
        self.show("initialization failed.");
        true
    }

    fn destroy(&self) {
        self.lifecycle.destroy();
    }
}
