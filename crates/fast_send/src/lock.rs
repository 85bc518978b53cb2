//! Per-destination exclusive write lock.
//!
//! One kernel transfer or fallback copy may be in flight per destination at a
//! time; concurrent callers serialize behind this lock in scheduler order.

use std::io;
use std::sync::{Mutex, MutexGuard, TryLockError};

/// Mutual exclusion over a destination's write side.
#[derive(Debug, Default)]
pub struct WriteLock {
    inner: Mutex<()>,
}

/// Holds the write side of a destination; releases on drop.
#[derive(Debug)]
pub struct WriteGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl WriteLock {
    /// Creates an unlocked write lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the write side, blocking until it is free.
    ///
    /// # Errors
    ///
    /// Fails if the lock was poisoned by a panicking holder; the transfer is
    /// not attempted in that case.
    pub fn lock(&self) -> io::Result<WriteGuard<'_>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("destination write lock poisoned"))?;
        Ok(WriteGuard { _guard: guard })
    }

    /// Acquires the write side only if it is free right now.
    pub fn try_lock(&self) -> Option<WriteGuard<'_>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(WriteGuard { _guard: guard }),
            Err(TryLockError::WouldBlock | TryLockError::Poisoned(_)) => None,
        }
    }
}
