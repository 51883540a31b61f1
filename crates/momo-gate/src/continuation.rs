//! Once-only success continuation.

use std::fmt;
use std::sync::{Mutex, PoisonError};

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Callback invoked when a payment is confirmed.
///
/// Fires at most once. Once fired or discarded, later calls are no-ops.
pub struct Continuation {
    slot: Mutex<Option<Callback>>,
}

impl Continuation {
    /// Wrap a callback.
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self {
            slot: Mutex::new(Some(Box::new(callback))),
        }
    }

    /// Invoke the callback if it is still armed. Returns whether it ran.
    pub fn fire(&self) -> bool {
        let callback = self.take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Drop the callback without running it.
    pub fn discard(&self) {
        drop(self.take());
    }

    /// Whether the callback can still fire.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn take(&self) -> Option<Callback> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("armed", &self.is_armed())
            .finish()
    }
}
