use core::fmt;
use core::time::Duration;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Default wait bound of a [`TimedRwLock`].
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

// -----------------------------------------------------------------------------
// LockTimeoutError

/// A [`TimedRwLock`] could not be acquired within its timeout.
///
/// This usually means the current thread already holds the lock
/// (the lock is not reentrant) or another thread never released it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not acquire {mode} lock `{lock}` within {timeout:?}")]
pub struct LockTimeoutError {
    /// Name of the lock, see [`TimedRwLock::name`].
    pub lock: &'static str,
    /// `"read"` or `"write"`.
    pub mode: &'static str,
    pub timeout: Duration,
}

// -----------------------------------------------------------------------------
// TimedRwLock

/// A readers-writer lock with bounded acquisition.
///
/// Built on [`parking_lot::RwLock`], every acquisition waits at most
/// [`timeout`](Self::timeout) and then fails with [`LockTimeoutError`]
/// instead of blocking forever.
///
/// Besides plain guards, the lock offers closure-style helpers and
/// conditional variants that only run the critical section when a
/// predicate over the protected value holds.
///
/// # Examples
///
/// ```
/// use core::time::Duration;
/// use stow_os::sync::TimedRwLock;
///
/// let lock = TimedRwLock::new("counter", Duration::from_millis(50), 0_u32);
///
/// lock.with_write(|v| *v += 1).unwrap();
/// assert_eq!(lock.with_read(|v| *v).unwrap(), 1);
///
/// // Only increments while below the limit.
/// let done = lock.conditional_read_write(|v| *v < 1, |v| *v += 1).unwrap();
/// assert_eq!(done, None);
/// ```
pub struct TimedRwLock<T: ?Sized> {
    name: &'static str,
    timeout: Duration,
    inner: RwLock<T>,
}

impl<T> TimedRwLock<T> {
    /// Creates a lock named `name` that gives up after `timeout`.
    #[inline]
    pub const fn new(name: &'static str, timeout: Duration, value: T) -> Self {
        Self {
            name,
            timeout,
            inner: RwLock::new(value),
        }
    }

    /// Consumes the lock, returning the protected value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ?Sized> TimedRwLock<T> {
    /// The name reported by [`LockTimeoutError::lock`].
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The wait bound of every acquisition.
    #[inline]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[cold]
    fn timed_out(&self, mode: &'static str) -> LockTimeoutError {
        log::warn!(
            "could not acquire {mode} lock `{}` within {:?}",
            self.name,
            self.timeout
        );
        LockTimeoutError {
            lock: self.name,
            mode,
            timeout: self.timeout,
        }
    }

    /// Acquires shared access, waiting at most [`timeout`](Self::timeout).
    pub fn read(&self) -> Result<RwLockReadGuard<'_, T>, LockTimeoutError> {
        self.inner
            .try_read_for(self.timeout)
            .ok_or_else(|| self.timed_out("read"))
    }

    /// Acquires exclusive access, waiting at most [`timeout`](Self::timeout).
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, T>, LockTimeoutError> {
        self.inner
            .try_write_for(self.timeout)
            .ok_or_else(|| self.timed_out("write"))
    }

    /// Runs `f` with shared access.
    #[inline]
    pub fn with_read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, LockTimeoutError> {
        let guard = self.read()?;
        Ok(f(&guard))
    }

    /// Runs `f` with exclusive access.
    #[inline]
    pub fn with_write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, LockTimeoutError> {
        let mut guard = self.write()?;
        Ok(f(&mut guard))
    }

    /// Runs `success` with shared access if `condition` holds.
    ///
    /// Returns `Ok(None)` when the condition is false.
    pub fn conditional_read<R>(
        &self,
        condition: impl FnOnce(&T) -> bool,
        success: impl FnOnce(&T) -> R,
    ) -> Result<Option<R>, LockTimeoutError> {
        let guard = self.read()?;
        if !condition(&guard) {
            return Ok(None);
        }
        Ok(Some(success(&guard)))
    }

    /// Runs `success` with exclusive access if `condition` holds.
    ///
    /// The condition is evaluated while the write lock is held.
    pub fn conditional_write<R>(
        &self,
        condition: impl FnOnce(&T) -> bool,
        success: impl FnOnce(&mut T) -> R,
    ) -> Result<Option<R>, LockTimeoutError> {
        let mut guard = self.write()?;
        if !condition(&guard) {
            return Ok(None);
        }
        Ok(Some(success(&mut guard)))
    }

    /// Checks `condition` under an upgradable read lock and, only if it holds,
    /// upgrades to exclusive access and runs `success`.
    ///
    /// Plain readers are not blocked while the condition is evaluated,
    /// and no writer can slip in between the check and `success`.
    pub fn conditional_read_write<R>(
        &self,
        condition: impl FnOnce(&T) -> bool,
        success: impl FnOnce(&mut T) -> R,
    ) -> Result<Option<R>, LockTimeoutError> {
        let guard = self
            .inner
            .try_upgradable_read_for(self.timeout)
            .ok_or_else(|| self.timed_out("read"))?;
        if !condition(&guard) {
            return Ok(None);
        }
        let mut guard = RwLockUpgradableReadGuard::try_upgrade_for(guard, self.timeout)
            .map_err(|_| self.timed_out("write"))?;
        Ok(Some(success(&mut guard)))
    }
}

impl<T: Default> Default for TimedRwLock<T> {
    fn default() -> Self {
        Self::new("unnamed", DEFAULT_LOCK_TIMEOUT, T::default())
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for TimedRwLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("TimedRwLock");
        d.field("name", &self.name).field("timeout", &self.timeout);
        match self.inner.try_read() {
            Some(guard) => d.field("data", &&*guard),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;
    use std::sync::Barrier;
    use std::thread;

    use super::{LockTimeoutError, TimedRwLock};

    fn short_lock() -> TimedRwLock<Vec<u32>> {
        TimedRwLock::new("test", Duration::from_millis(20), Vec::new())
    }

    #[test]
    fn write_times_out_while_read_is_held() {
        let lock = short_lock();
        let _guard = lock.read().unwrap();
        let err = lock.write().unwrap_err();
        assert_eq!(
            err,
            LockTimeoutError {
                lock: "test",
                mode: "write",
                timeout: Duration::from_millis(20),
            }
        );
        assert!(err.to_string().contains("`test`"));
    }

    #[test]
    fn read_times_out_while_write_is_held_elsewhere() {
        let lock = short_lock();
        let barrier = Barrier::new(2);
        thread::scope(|s| {
            s.spawn(|| {
                let _guard = lock.write().unwrap();
                barrier.wait();
                thread::sleep(Duration::from_millis(100));
            });
            barrier.wait();
            assert!(lock.read().is_err());
        });
        assert!(lock.read().is_ok());
    }

    #[test]
    fn conditional_helpers() {
        let lock = short_lock();
        assert_eq!(lock.conditional_write(|v| v.is_empty(), |v| v.push(1)).unwrap(), Some(()));
        assert_eq!(lock.conditional_write(|v| v.is_empty(), |v| v.push(2)).unwrap(), None);
        assert_eq!(lock.conditional_read(|v| v.len() == 1, |v| v[0]).unwrap(), Some(1));
        assert_eq!(lock.conditional_read(|v| v.len() == 2, |v| v[0]).unwrap(), None);

        let pushed = lock
            .conditional_read_write(|v| !v.contains(&7), |v| v.push(7))
            .unwrap();
        assert!(pushed.is_some());
        let pushed = lock
            .conditional_read_write(|v| !v.contains(&7), |v| v.push(7))
            .unwrap();
        assert!(pushed.is_none());
        assert_eq!(lock.into_inner(), vec![1, 7]);
    }

    #[test]
    fn concurrent_writers_do_not_lose_updates() {
        let lock = TimedRwLock::new("counter", Duration::from_secs(5), 0_usize);
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        lock.with_write(|v| *v += 1).unwrap();
                    }
                });
            }
        });
        assert_eq!(lock.with_read(|v| *v).unwrap(), 800);
    }
}
