//! One-Shot Settlement
//!
//! A widget settles from code the manager does not control. The manager hands
//! the widget a callback that owns the sending half of a oneshot channel and
//! keeps the receiving half as a [`Settlement`]: a shared future any number of
//! walks can await.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::WidgetError;
use crate::widget::WidgetTypeId;

/// Outcome of a widget's initialization.
pub type SettleResult = Result<(), WidgetError>;

/// Future resolving when a widget settles; clones observe the same outcome.
pub type Settlement = Shared<BoxFuture<'static, SettleResult>>;

/// The sending half. Only the first outcome is delivered.
pub struct Settler {
    tx: Mutex<Option<oneshot::Sender<SettleResult>>>,
}

impl Settler {
    /// Take the right to settle. Returns `None` once already settled.
    pub fn claim(&self) -> Option<Claim> {
        self.tx.lock().take().map(|tx| Claim { tx })
    }
}

/// Exclusive right to deliver the outcome.
pub struct Claim {
    tx: oneshot::Sender<SettleResult>,
}

impl Claim {
    pub fn deliver(self, result: SettleResult) {
        // Every waiter may be gone already; that is not an error.
        let _ = self.tx.send(result);
    }
}

/// Create a settler and the settlement it resolves.
///
/// If the settler is dropped without delivering, the settlement resolves to
/// [`WidgetError::Abandoned`].
pub fn channel(type_id: WidgetTypeId) -> (Settler, Settlement) {
    let (tx, rx) = oneshot::channel();
    let settlement = async move {
        rx.await
            .unwrap_or_else(|_| Err(WidgetError::Abandoned { type_id }))
    }
    .boxed()
    .shared();

    (
        Settler {
            tx: Mutex::new(Some(tx)),
        },
        settlement,
    )
}
