//! Tree Walks
//!
//! Initialization and destruction walks over a tree.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture, FutureExt};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::registry::Resolution;
use super::settlement::{self, Settlement, Settler};
use super::{ManagerInner, WidgetManager};
use crate::error::WidgetError;
use crate::tree::{same_node, NodeRef};
use crate::widget::{DoneCallback, Widget, WidgetState, WidgetTypeId};

/// Outcome of one initialization walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Widgets this walk initialized, excluding ones it found already
    /// initialized, failed, or being initialized by another walk.
    pub initialized: usize,

    /// Every error the walk ran into, in the order they were observed.
    pub errors: Vec<WidgetError>,
}

impl InitReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The errors, or `None` if there were none.
    pub fn errors(&self) -> Option<&[WidgetError]> {
        if self.errors.is_empty() {
            None
        } else {
            Some(&self.errors)
        }
    }

    /// Split into the count and the errors, `None` when there were none.
    pub fn into_parts(self) -> (usize, Option<Vec<WidgetError>>) {
        let errors = if self.errors.is_empty() {
            None
        } else {
            Some(self.errors)
        };
        (self.initialized, errors)
    }
}

/// State shared by all branches of one walk.
#[derive(Default)]
struct Walk {
    initialized: AtomicUsize,
    errors: Mutex<Vec<WidgetError>>,
}

impl Walk {
    fn record(&self, error: WidgetError) {
        trace!(%error, "walk recorded error");
        self.errors.lock().push(error);
    }

    fn finish(&self) -> InitReport {
        InitReport {
            initialized: self.initialized.load(Ordering::SeqCst),
            errors: std::mem::take(&mut *self.errors.lock()),
        }
    }
}

/// How a visit relates to the initialization of its widget.
enum Begin {
    /// This visit called `init`; it owns the descent into the children.
    Started { settlement: Settlement, token: u64 },
    /// An initialization is already in flight, started on `owner`.
    Joined { settlement: Settlement, owner: NodeRef },
    /// The instance refused `init`.
    Rejected,
    /// The instance was destroyed and unregistered after it was obtained.
    Stale,
}

impl WidgetManager {
    /// Initialize every widget under `root` and report what happened.
    ///
    /// The returned future completes once every reachable widget has settled
    /// or been pruned.
    pub fn init_tree(&self, root: NodeRef) -> impl Future<Output = InitReport> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        async move {
            let walk = Arc::new(Walk::default());
            debug!("initialization walk started");
            inner.visit(root, Arc::clone(&walk)).await;

            let report = walk.finish();
            debug!(
                initialized = report.initialized,
                errors = report.errors.len(),
                "initialization walk finished"
            );
            report
        }
    }

    /// Initialize every widget under `root`, then call `callback` once with
    /// the number of widgets initialized and the errors, if any.
    pub fn init<F>(&self, root: NodeRef, callback: F) -> BoxFuture<'static, ()>
    where
        F: FnOnce(usize, Option<Vec<WidgetError>>) + Send + 'static,
    {
        let walk = self.init_tree(root);
        async move {
            let (initialized, errors) = walk.await.into_parts();
            callback(initialized, errors);
        }
        .boxed()
    }

    /// Run [`init`](Self::init) as a tokio task.
    pub fn spawn_init<F>(&self, root: NodeRef, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(usize, Option<Vec<WidgetError>>) + Send + 'static,
    {
        tokio::spawn(self.init(root, callback))
    }

    /// Destroy every registered widget whose type id appears under `root`.
    ///
    /// Children are swept whatever the state of their ancestors.
    pub fn destroy(&self, root: &NodeRef) {
        if let Some(type_id) = self.inner.type_id_of(root) {
            let widget = self.inner.registry.lock().widget(type_id.as_str());
            if let Some(widget) = widget {
                debug!(%type_id, state = ?widget.state(), "destroying widget");
                widget.destroy();

                let mut registry = self.inner.registry.lock();
                registry.unregister(type_id.as_str(), &widget);
                registry.remove_pending(type_id.as_str());
            }
        }

        for child in root.children() {
            self.destroy(&child);
        }
    }
}

impl ManagerInner {
    fn type_id_of(&self, node: &NodeRef) -> Option<WidgetTypeId> {
        node.attribute(&self.config.type_attribute)
            .map(WidgetTypeId::from)
    }

    fn visit(self: &Arc<Self>, node: NodeRef, walk: Arc<Walk>) -> BoxFuture<'static, ()> {
        let this = Arc::clone(self);
        async move {
            let Some(type_id) = this.type_id_of(&node) else {
                this.descend(&node, &walk).await;
                return;
            };

            let widget = match this.obtain(&type_id).await {
                Ok(widget) => widget,
                Err(error) => {
                    warn!(%type_id, %error, "could not obtain widget");
                    walk.record(error);
                    return;
                }
            };

            match widget.state() {
                WidgetState::Failed => {
                    trace!(%type_id, "widget failed earlier, pruning subtree");
                }
                WidgetState::Initialized => {
                    this.descend(&node, &walk).await;
                }
                WidgetState::Uninitialized | WidgetState::Initializing => {
                    match this.begin(&type_id, &widget, &node) {
                        Begin::Started { settlement, token } => match settlement.await {
                            Ok(()) => {
                                walk.initialized.fetch_add(1, Ordering::SeqCst);
                                this.descend(&node, &walk).await;
                            }
                            Err(error) => {
                                // An abandoned callback never cleared its entry.
                                this.registry.lock().clear_pending(type_id.as_str(), token);
                                walk.record(error);
                            }
                        },
                        Begin::Joined { settlement, owner } => {
                            trace!(%type_id, "joining initialization in flight");
                            match settlement.await {
                                // The starting visit descends its own node.
                                Ok(()) if !same_node(&owner, &node) => {
                                    this.descend(&node, &walk).await;
                                }
                                Ok(()) => {}
                                Err(error) => walk.record(error),
                            }
                        }
                        Begin::Rejected => {
                            if widget.state() == WidgetState::Initialized {
                                this.descend(&node, &walk).await;
                            } else {
                                warn!(%type_id, "widget rejected initialization");
                                walk.record(WidgetError::Rejected { type_id });
                            }
                        }
                        Begin::Stale => {
                            trace!(%type_id, "instance was destroyed, obtaining again");
                            this.visit(node, walk).await;
                        }
                    }
                }
            }
        }
        .boxed()
    }

    fn descend(self: &Arc<Self>, node: &NodeRef, walk: &Arc<Walk>) -> impl Future<Output = ()> + Send + 'static {
        let visits: Vec<_> = node
            .children()
            .into_iter()
            .map(|child| self.visit(child, Arc::clone(walk)))
            .collect();
        join_all(visits).map(|_| ())
    }

    /// The registered instance for `type_id`, resolving it on first use.
    ///
    /// Concurrent callers share a single resolution, so each type is
    /// constructed once.
    fn obtain(self: &Arc<Self>, type_id: &WidgetTypeId) -> Resolution {
        let mut registry = self.registry.lock();
        if let Some(widget) = registry.widget(type_id.as_str()) {
            return futures_util::future::ready(Ok(widget)).boxed().shared();
        }
        if let Some(resolution) = registry.resolving(type_id.as_str()) {
            return resolution;
        }

        let token = registry.next_token();
        let resolution = self.resolution(type_id.clone(), token);
        registry.reserve_resolution(type_id.clone(), token, resolution.clone());
        resolution
    }

    fn resolution(self: &Arc<Self>, type_id: WidgetTypeId, token: u64) -> Resolution {
        let manager = Arc::downgrade(self);
        let resolver = Arc::clone(&self.resolver);
        async move {
            let outcome = resolver
                .resolve(&type_id)
                .await
                .map(|ty| {
                    debug!(%type_id, widget = ty.name(), "constructing widget");
                    ty.construct()
                })
                .map_err(WidgetError::from);

            match manager.upgrade() {
                Some(manager) => manager
                    .registry
                    .lock()
                    .finish_resolution(&type_id, token, outcome),
                None => outcome,
            }
        }
        .boxed()
        .shared()
    }

    /// Start `init` on `widget`, or join the initialization already in flight.
    fn begin(self: &Arc<Self>, type_id: &WidgetTypeId, widget: &Arc<dyn Widget>, node: &NodeRef) -> Begin {
        let (token, settler, settlement) = {
            let mut registry = self.registry.lock();
            if !registry.holds(type_id.as_str(), widget) {
                return Begin::Stale;
            }
            if let Some(pending) = registry.pending(type_id.as_str()) {
                return Begin::Joined {
                    settlement: pending.settlement,
                    owner: pending.owner,
                };
            }
            let (settler, settlement) = settlement::channel(type_id.clone());
            let token = registry.reserve_pending(type_id.clone(), settlement.clone(), Arc::clone(node));
            (token, settler, settlement)
        };

        debug!(%type_id, widget = widget.name(), "initializing widget");
        let done = self.done_callback(type_id.clone(), token, Arc::clone(node), settler);
        if Arc::clone(widget).init(node, done) {
            Begin::Started { settlement, token }
        } else {
            self.registry.lock().clear_pending(type_id.as_str(), token);
            Begin::Rejected
        }
    }

    fn done_callback(
        self: &Arc<Self>,
        type_id: WidgetTypeId,
        token: u64,
        node: NodeRef,
        settler: Settler,
    ) -> DoneCallback {
        let manager = Arc::downgrade(self);
        Arc::new(move |error: Option<WidgetError>| {
            let Some(claim) = settler.claim() else {
                return;
            };
            let manager = manager.upgrade();
            if let Some(manager) = &manager {
                manager.registry.lock().clear_pending(type_id.as_str(), token);
            }

            match &error {
                None => debug!(%type_id, "widget settled"),
                Some(error) => debug!(%type_id, %error, "widget settled with error"),
            }
            claim.deliver(error.map_or(Ok(()), Err));

            if let Some(hook) = manager.as_ref().and_then(|manager| manager.on_settled.as_ref()) {
                hook(&node);
            }
        })
    }
}
