//! Store change notification hook.
//!
//! # Responsibility
//! - Hold registered listeners and fan a committed snapshot out to them.
//!
//! # Invariants
//! - Listeners run synchronously, in registration order, outside any store
//!   lock held by the caller.
//! - A panicking listener does not stop delivery to the remaining listeners.

use crate::model::planner::EventPlanner;
use log::error;
use std::fmt::{Debug, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

/// Callback fired with the committed store snapshot after each mutation.
pub type StoreListener = Arc<dyn Fn(&EventPlanner) + Send + Sync>;

/// Shared listener registry. Clones share the same listeners.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    listeners: Arc<Mutex<Vec<StoreListener>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: StoreListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Delivers `snapshot` to every listener.
    pub fn publish(&self, snapshot: &EventPlanner) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(snapshot))).is_err() {
                error!("event=store_changed module=model status=error error_code=listener_panicked");
            }
        }
    }
}

impl Debug for ChangeNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
