//! Widget Manager
//!
//! The manager owns one instance per widget type and walks trees to
//! initialize or destroy them.
//!
//! # Initialization Walks
//!
//! A walk visits the tree top down, descending into all children of a node
//! at once. At a node carrying a widget type id it:
//!
//! 1. Gets the type's instance, resolving and constructing it on first use.
//! 2. Skips the whole subtree if the instance failed.
//! 3. Descends immediately if the instance is already initialized.
//! 4. Otherwise starts `init` on the instance, or joins the initialization
//!    another walk already started.
//!
//! Only the visit that started an initialization descends into that node's
//! children, and only after the widget settled successfully. A visit that
//! joins on the same node just waits for the outcome, so overlapping walks do
//! not enter that subtree twice. A visit joining from another node sharing the
//! type id descends its own children once the widget has settled.
//!
//! Errors are collected per walk and never stop sibling branches. When the
//! walk is over its callback fires exactly once with the number of widgets it
//! initialized and the errors it saw.
//!
//! # Destruction
//!
//! `destroy` sweeps a subtree and destroys every registered instance whose
//! type id appears on it. Walks waiting on an instance destroyed mid-flight
//! receive a destroy error.
//!
//! # Concurrency
//!
//! Shared state sits behind a single lock that is never held across an
//! await point or while calling into a widget, node, resolver or hook.

mod registry;
mod resolver;
mod settlement;
mod walker;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::ManagerConfig;
use crate::error::ConfigError;
use crate::tree::NodeRef;
use crate::widget::{Widget, WidgetState, WidgetTypeId};

use registry::Registry;

pub use resolver::{AsyncFnResolver, CatalogResolver, FixedResolver, WidgetResolver};
pub use walker::InitReport;

/// Hook invoked with a node whenever the widget initializing on it settles.
pub type SettleHook = Arc<dyn Fn(&NodeRef) + Send + Sync>;

struct ManagerInner {
    config: ManagerConfig,
    resolver: Arc<dyn WidgetResolver>,
    on_settled: Option<SettleHook>,
    registry: Mutex<Registry>,
}

/// Coordinates lazy widget initialization over trees.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct WidgetManager {
    inner: Arc<ManagerInner>,
}

impl WidgetManager {
    /// Create a manager with default configuration.
    pub fn new(resolver: impl WidgetResolver + 'static) -> Self {
        Self::from_parts(ManagerConfig::default(), Arc::new(resolver), None)
    }

    pub fn builder() -> WidgetManagerBuilder {
        WidgetManagerBuilder::default()
    }

    fn from_parts(
        config: ManagerConfig,
        resolver: Arc<dyn WidgetResolver>,
        on_settled: Option<SettleHook>,
    ) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                config,
                resolver,
                on_settled,
                registry: Mutex::new(Registry::new()),
            }),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.inner.config
    }

    /// The registered instance for `type_id`.
    pub fn widget(&self, type_id: &str) -> Option<Arc<dyn Widget>> {
        self.inner.registry.lock().widget(type_id)
    }

    /// State of the registered instance for `type_id`.
    pub fn state_of(&self, type_id: &str) -> Option<WidgetState> {
        self.widget(type_id).map(|widget| widget.state())
    }

    /// Whether an initialization for `type_id` is waiting to settle.
    pub fn is_pending(&self, type_id: &str) -> bool {
        self.inner.registry.lock().is_pending(type_id)
    }

    /// Registered type ids, oldest first.
    pub fn registered(&self) -> Vec<WidgetTypeId> {
        self.inner.registry.lock().type_ids()
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.inner.registry.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for WidgetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetManager")
            .field("config", &self.inner.config)
            .field("registered", &self.registered())
            .finish()
    }
}

/// Builder for [`WidgetManager`].
#[derive(Default)]
pub struct WidgetManagerBuilder {
    config: ManagerConfig,
    resolver: Option<Arc<dyn WidgetResolver>>,
    on_settled: Option<SettleHook>,
}

impl WidgetManagerBuilder {
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolver(mut self, resolver: impl WidgetResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Call `hook` with the node whenever a widget initialized on it settles.
    pub fn on_widget_settled<F>(mut self, hook: F) -> Self
    where
        F: Fn(&NodeRef) + Send + Sync + 'static,
    {
        self.on_settled = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Result<WidgetManager, ConfigError> {
        self.config.validate()?;
        let resolver = self.resolver.ok_or_else(|| ConfigError::Invalid {
            field: "resolver",
            reason: "a widget resolver is required".into(),
        })?;
        Ok(WidgetManager::from_parts(self.config, resolver, self.on_settled))
    }
}
