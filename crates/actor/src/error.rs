// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the actor

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Boxed error accepted from actions, recoverers and finalizers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by an [`Actor`](crate::Actor)
///
/// The type is `Clone` so that a single outcome can be handed to every
/// reader of the terminal error and to every caller of an
/// [`Awaiter`](crate::Awaiter).
#[derive(Debug, Clone, Error)]
pub enum ActorError {
    /// Invalid configuration, reported before anything is started
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The dispatch loop did not come up
    #[error("actor failed to start: {0}")]
    Startup(String),
    /// The actor is stopping or has stopped
    #[error("actor is shut down")]
    Shutdown,
    /// Enqueueing or waiting for a result took too long
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// A caller supplied cancellation token fired
    #[error("operation canceled")]
    Canceled,
    /// An action panicked
    #[error("action panicked: {0}")]
    Panic(String),
    /// An error produced by an action, recoverer or finalizer
    #[error(transparent)]
    Action(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl ActorError {
    /// Wrap an action-local error
    pub fn action(err: impl Into<BoxError>) -> Self {
        Self::Action(Arc::from(err.into()))
    }

    /// Downcast an [`ActorError::Action`] back to the concrete error the
    /// action returned
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Action(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
