//! Test navigator.

use std::sync::atomic::{AtomicUsize, Ordering};

use questline_core::navigation::Navigator;

/// A navigator that counts handoffs back to character creation.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    returns: AtomicUsize,
}

impl RecordingNavigator {
    /// Number of times control was handed back.
    pub fn return_count(&self) -> usize {
        self.returns.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn return_to_character_creation(&self) {
        self.returns.fetch_add(1, Ordering::SeqCst);
    }
}
