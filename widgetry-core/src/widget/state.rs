//! Widget lifecycle states and the status classes they put on nodes.

use serde::{Deserialize, Serialize};

/// Prefix shared by every status class a widget puts on its node.
pub const STATUS_PREFIX: &str = "widget-";

/// Lifecycle state of a widget instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetState {
    /// Not attached to any node.
    #[default]
    Uninitialized,

    /// `init` ran; waiting for the widget to call `done` or `fail`.
    Initializing,

    /// Settled successfully. Terminal until destroyed.
    Initialized,

    /// Settled with a failure. Terminal until destroyed.
    Failed,
}

impl WidgetState {
    /// Class put on the node while the widget is in this state.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            WidgetState::Uninitialized => None,
            WidgetState::Initializing => Some("widget-initializing"),
            WidgetState::Initialized => Some("widget-done"),
            WidgetState::Failed => Some("widget-failed"),
        }
    }
}
