//! Useful synchronization primitives.
//!
//! - [`TimedRwLock`]: readers-writer lock whose acquisitions give up after a timeout.
//! - Re-exports of the standard `Arc`, `LazyLock` and `OnceLock`, and the unbounded `parking_lot` lock.

// -----------------------------------------------------------------------------
// Modules

mod timed_rwlock;

// -----------------------------------------------------------------------------
// Exports

pub use std::sync::{Arc, LazyLock, OnceLock, Weak};

pub use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use timed_rwlock::{DEFAULT_LOCK_TIMEOUT, LockTimeoutError, TimedRwLock};
