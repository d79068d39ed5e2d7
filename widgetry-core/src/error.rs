//! Error Types
//!
//! Every failure a walk can observe is a [`WidgetError`]. Errors travel through
//! shared settlement futures, so they are `Clone` and carry only owned strings.

use thiserror::Error;

use crate::widget::WidgetTypeId;

/// Failure to map a widget type id onto a constructible widget type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The resolver has no widget type registered under this id.
    #[error("no widget type registered for `{type_id}`")]
    NotFound { type_id: WidgetTypeId },

    /// The resolver found the type but could not load it.
    #[error("failed to load widget type `{type_id}`: {message}")]
    Failed {
        type_id: WidgetTypeId,
        message: String,
    },
}

impl ResolveError {
    /// The type id the resolver was asked for.
    pub fn type_id(&self) -> &WidgetTypeId {
        match self {
            ResolveError::NotFound { type_id } | ResolveError::Failed { type_id, .. } => type_id,
        }
    }
}

/// Errors collected by an initialization walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// The type resolver failed; the node's subtree was pruned.
    #[error("widget type resolution failed: {source}")]
    Resolution {
        type_id: WidgetTypeId,
        #[source]
        source: ResolveError,
    },

    /// The widget signaled failure while initializing.
    #[error("initialization failed for widget {widget}")]
    Initialization { widget: String },

    /// The widget was destroyed before it settled.
    #[error("widget destroy error for widget {widget}")]
    DestroyedDuringInit { widget: String },

    /// The instance refused `init` because something else already drove it.
    #[error("widget `{type_id}` rejected initialization")]
    Rejected { type_id: WidgetTypeId },

    /// The completion callback was dropped without ever being called.
    #[error("widget `{type_id}` was dropped before settling")]
    Abandoned { type_id: WidgetTypeId },
}

impl WidgetError {
    /// Whether this error was synthesized by a `destroy` racing an initialization.
    pub fn is_destroy_signal(&self) -> bool {
        matches!(self, WidgetError::DestroyedDuringInit { .. })
    }
}

impl From<ResolveError> for WidgetError {
    fn from(source: ResolveError) -> Self {
        WidgetError::Resolution {
            type_id: source.type_id().clone(),
            source,
        }
    }
}

/// Errors raised while loading configuration or tree fixtures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
