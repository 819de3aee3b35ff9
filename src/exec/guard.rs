// src/exec/guard.rs

//! Single-flight execution guard.
//!
//! At most one child process may be in flight per guard. The guard is an
//! owned, cloneable lock object: clones share the same slot, so a launcher
//! and everything cloned from it are serialized against each other. A
//! process-wide instance is available through [`ExecutionGuard::global`] for
//! callers that want the classic "one execution per process" behaviour.
//!
//! Acquisition never waits. A busy guard means re-entry (or a concurrent
//! caller) and is reported as an error by the launcher.
//!
//! Release happens when the [`GuardToken`] is dropped, including during
//! unwinding. There is no auto-reset: a token that is leaked (e.g. through
//! `std::mem::forget`) wedges the guard until the process restarts.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Slot {
    #[default]
    Idle,
    /// Acquired, child not spawned yet.
    Reserved,
    /// Acquired and tracking the given child.
    Tracking(u32),
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionGuard {
    slot: Arc<Mutex<Slot>>,
}

static GLOBAL_GUARD: OnceLock<ExecutionGuard> = OnceLock::new();

impl ExecutionGuard {
    /// A fresh, independent guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide guard shared by every launcher built with
    /// [`Launcher::new`](crate::exec::Launcher::new).
    pub fn global() -> Self {
        GLOBAL_GUARD.get_or_init(ExecutionGuard::new).clone()
    }

    /// Try to take the guard. Returns `None` if it is already held.
    pub fn try_acquire(&self) -> Option<GuardToken> {
        let mut slot = self.lock();
        if *slot != Slot::Idle {
            debug!(state = ?*slot, "execution guard busy");
            return None;
        }
        *slot = Slot::Reserved;
        trace!("execution guard acquired");
        Some(GuardToken {
            slot: Arc::clone(&self.slot),
        })
    }

    pub fn is_busy(&self) -> bool {
        *self.lock() != Slot::Idle
    }

    /// Pid of the tracked child, if the holder has spawned one.
    pub fn tracked_pid(&self) -> Option<u32> {
        match *self.lock() {
            Slot::Tracking(pid) => Some(pid),
            _ => None,
        }
    }

    /// Whether two handles share the same slot.
    pub fn same_as(&self, other: &ExecutionGuard) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // The slot is a plain enum; a panic while holding the lock cannot
        // leave it half-written, so a poisoned lock is still usable.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Proof of holding an [`ExecutionGuard`]. Dropping it releases the guard.
#[derive(Debug)]
pub struct GuardToken {
    slot: Arc<Mutex<Slot>>,
}

impl GuardToken {
    /// Record the spawned child's pid.
    pub fn track(&self, pid: u32) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Slot::Tracking(pid);
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Slot::Idle;
        trace!("execution guard released");
    }
}
