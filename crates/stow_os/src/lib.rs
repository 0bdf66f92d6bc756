//! Synchronization primitives used by the `stow` crates.
//!
//! Every lock here waits for a bounded time. A lock that cannot be acquired
//! within its timeout reports a [`LockTimeoutError`](sync::LockTimeoutError)
//! naming the lock, so a potential deadlock becomes an observable error.

// -----------------------------------------------------------------------------
// Modules

pub mod sync;
