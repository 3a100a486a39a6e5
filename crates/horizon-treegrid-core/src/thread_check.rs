//! Thread confinement checks.
//!
//! Tree-grid state is owned by the UI thread: the backing row array is
//! mutated in place and read synchronously by the same thread that issues
//! render requests. Nothing is locked, so the only protection against
//! accidental cross-thread use is an affinity check.
//!
//! Checks are on by default in debug builds and can be switched at runtime
//! with [`set_thread_checks_enabled`].
//!
//! ```
//! use horizon_treegrid_core::thread_check::ThreadAffinity;
//!
//! struct VisibleCache {
//!     affinity: ThreadAffinity,
//!     rows: Vec<usize>,
//! }
//!
//! impl VisibleCache {
//!     fn replace(&mut self, rows: Vec<usize>) {
//!         self.affinity.debug_assert_same_thread();
//!         self.rows = rows;
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Turns [`ThreadAffinity::debug_assert_same_thread`] on or off globally.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Whether affinity checks currently run.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// The thread a grid was created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Binds to the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            owner: std::thread::current().id(),
        }
    }

    /// Whether the calling thread is the owner.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    /// Panics unless called on the owning thread, regardless of build mode.
    #[inline]
    pub fn assert_same_thread(&self) {
        if !self.is_same_thread() {
            self.wrong_thread();
        }
    }

    /// [`assert_same_thread`](Self::assert_same_thread), gated on
    /// [`are_thread_checks_enabled`]. Called on every grid mutation.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        if are_thread_checks_enabled() {
            self.assert_same_thread();
        }
    }

    #[cold]
    #[inline(never)]
    fn wrong_thread(&self) -> ! {
        let current = std::thread::current();
        panic!(
            "tree-grid accessed from thread \"{}\" ({:?}) but owned by {:?}; \
             rows are mutated in place without locking, so post the call to the owning thread",
            current.name().unwrap_or("<unnamed>"),
            current.id(),
            self.owner
        )
    }
}
