//! Widget Registry
//!
//! Bookkeeping shared by every walk of one manager:
//!
//! - `widgets`: the singleton instance per type id, in registration order
//! - `pending`: the settlement of each instance that is still initializing,
//!   with the node it is initializing on
//! - `resolving`: type resolutions still in flight
//!
//! Pending and resolving entries carry a token so that a late callback can
//! only remove the entry it created, never a newer one for the same id.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::{BoxFuture, Shared};
use indexmap::IndexMap;

use super::settlement::Settlement;
use crate::error::WidgetError;
use crate::tree::NodeRef;
use crate::widget::{Widget, WidgetTypeId};

/// Shared future producing the registered instance for a type id.
pub type Resolution = Shared<BoxFuture<'static, Result<Arc<dyn Widget>, WidgetError>>>;

/// An initialization in flight.
#[derive(Clone)]
pub struct Pending {
    pub settlement: Settlement,
    /// The node `init` was called with.
    pub owner: NodeRef,
}

struct Tokened<T> {
    token: u64,
    value: T,
}

#[derive(Default)]
pub struct Registry {
    widgets: IndexMap<WidgetTypeId, Arc<dyn Widget>>,
    pending: HashMap<WidgetTypeId, Tokened<Pending>>,
    resolving: HashMap<WidgetTypeId, Tokened<Resolution>>,
    next_token: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a token for a new pending or resolving entry.
    pub fn next_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    pub fn widget(&self, type_id: &str) -> Option<Arc<dyn Widget>> {
        self.widgets.get(type_id).cloned()
    }

    /// Registered type ids, oldest first.
    pub fn type_ids(&self) -> Vec<WidgetTypeId> {
        self.widgets.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Register `widget` unless an instance already exists.
    ///
    /// Returns whichever instance ends up registered.
    pub fn register(&mut self, type_id: WidgetTypeId, widget: Arc<dyn Widget>) -> Arc<dyn Widget> {
        Arc::clone(self.widgets.entry(type_id).or_insert(widget))
    }

    /// Whether `widget` is the instance registered under `type_id`.
    pub fn holds(&self, type_id: &str, widget: &Arc<dyn Widget>) -> bool {
        self.widgets
            .get(type_id)
            .is_some_and(|current| std::ptr::addr_eq(Arc::as_ptr(current), Arc::as_ptr(widget)))
    }

    /// Remove `widget` if it is still the instance registered under `type_id`.
    pub fn unregister(&mut self, type_id: &str, widget: &Arc<dyn Widget>) -> bool {
        if !self.holds(type_id, widget) {
            return false;
        }
        self.widgets.shift_remove(type_id);
        true
    }

    pub fn pending(&self, type_id: &str) -> Option<Pending> {
        self.pending.get(type_id).map(|entry| entry.value.clone())
    }

    pub fn is_pending(&self, type_id: &str) -> bool {
        self.pending.contains_key(type_id)
    }

    /// Record an initialization on `owner` that is about to start.
    pub fn reserve_pending(&mut self, type_id: WidgetTypeId, settlement: Settlement, owner: NodeRef) -> u64 {
        let token = self.next_token();
        self.pending.insert(
            type_id,
            Tokened {
                token,
                value: Pending { settlement, owner },
            },
        );
        token
    }

    /// Drop the pending entry for `type_id` if it still carries `token`.
    pub fn clear_pending(&mut self, type_id: &str, token: u64) -> bool {
        match self.pending.get(type_id) {
            Some(entry) if entry.token == token => {
                self.pending.remove(type_id);
                true
            }
            _ => false,
        }
    }

    /// Drop the pending entry for `type_id` unconditionally.
    pub fn remove_pending(&mut self, type_id: &str) -> bool {
        self.pending.remove(type_id).is_some()
    }

    pub fn resolving(&self, type_id: &str) -> Option<Resolution> {
        self.resolving.get(type_id).map(|entry| entry.value.clone())
    }

    pub fn reserve_resolution(&mut self, type_id: WidgetTypeId, token: u64, resolution: Resolution) {
        self.resolving.insert(
            type_id,
            Tokened {
                token,
                value: resolution,
            },
        );
    }

    /// Close out the resolution identified by `token`.
    ///
    /// A constructed instance is registered unless one already exists, and the
    /// registered instance is returned.
    pub fn finish_resolution(
        &mut self,
        type_id: &WidgetTypeId,
        token: u64,
        outcome: Result<Arc<dyn Widget>, WidgetError>,
    ) -> Result<Arc<dyn Widget>, WidgetError> {
        if matches!(self.resolving.get(type_id.as_str()), Some(entry) if entry.token == token) {
            self.resolving.remove(type_id.as_str());
        }
        let widget = outcome?;
        Ok(self.register(type_id.clone(), widget))
    }
}
