//! Latest-wins callback cells.

use std::sync::Arc;

use parking_lot::RwLock;

/// A single-slot holder for the latest caller-supplied handler.
///
/// The slot is replaced on every reconfiguration but read only at the
/// moment an in-flight operation settles. This intentionally decouples
/// "which handler is current" from "which handler was current when the
/// call started": the latest handler always wins, even for calls that
/// were already in flight when it was supplied.
pub struct CallbackCell<F: ?Sized> {
    slot: RwLock<Option<Arc<F>>>,
}

impl<F: ?Sized> CallbackCell<F> {
    /// Creates an empty cell.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Replaces the handler.
    pub fn set(&self, handler: Arc<F>) {
        *self.slot.write() = Some(handler);
    }

    /// Removes the handler.
    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    /// Returns the handler current right now.
    #[must_use]
    pub fn current(&self) -> Option<Arc<F>> {
        self.slot.read().clone()
    }

    /// Whether a handler is set.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.slot.read().is_some()
    }
}

impl<F: ?Sized> Default for CallbackCell<F> {
    fn default() -> Self {
        Self::empty()
    }
}
