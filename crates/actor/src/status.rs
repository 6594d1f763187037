// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle bookkeeping shared between actor handles and the dispatch loop

use crate::error::ActorError;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

/// Lifecycle phase of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Accepting and executing requests
    Running,
    /// Stop requested; already queued requests may still run
    Draining,
    /// Terminal
    Stopped,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Phase::Running,
            1 => Phase::Draining,
            _ => Phase::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Phase::Running => 0,
            Phase::Draining => 1,
            Phase::Stopped => 2,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Running => write!(f, "running"),
            Phase::Draining => write!(f, "draining"),
            Phase::Stopped => write!(f, "stopped"),
        }
    }
}

/// Advisory snapshot of the request queue. The depth may already be stale
/// when it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub depth: usize,
    pub capacity: usize,
}

impl QueueStatus {
    pub fn is_full(&self) -> bool {
        self.depth >= self.capacity
    }
}

/// State visible to every handle
pub(crate) struct Shared {
    phase: AtomicU8,
    /// First recorded reason for stopping
    cause: OnceLock<ActorError>,
    /// Finalizer output, published once the loop is gone
    terminal: OnceLock<Option<ActorError>>,
    /// Root token: cancelled on stop
    pub(crate) root: CancellationToken,
    /// Latched after the finalizer returned
    pub(crate) done: CancellationToken,
}

impl Shared {
    pub(crate) fn new(root: CancellationToken) -> Self {
        Self {
            phase: AtomicU8::new(Phase::Running.as_u8()),
            cause: OnceLock::new(),
            terminal: OnceLock::new(),
            root,
            done: CancellationToken::new(),
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Move from `Running` to `Draining`. Returns false when another
    /// party already left `Running`.
    pub(crate) fn begin_drain(&self) -> bool {
        self.phase
            .compare_exchange(
                Phase::Running.as_u8(),
                Phase::Draining.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn mark_stopped(&self) {
        self.phase.store(Phase::Stopped.as_u8(), Ordering::Release);
    }

    /// Record why the actor stops. The first writer wins.
    pub(crate) fn record(&self, err: ActorError) -> bool {
        self.cause.set(err).is_ok()
    }

    pub(crate) fn cause(&self) -> Option<ActorError> {
        self.cause.get().cloned()
    }

    /// Publish the finalizer output and release everyone waiting on `done`
    pub(crate) fn finish(&self, terminal: Option<ActorError>) {
        let _ = self.terminal.set(terminal);
        self.done.cancel();
    }

    pub(crate) fn err(&self) -> Option<ActorError> {
        match self.terminal.get() {
            Some(terminal) => terminal.clone(),
            None => self.cause(),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
