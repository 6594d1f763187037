// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred results of queued actions

use crate::error::ActorError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex, OnceCell};

/// Handle to the outcome of an action queued with
/// [`Actor::execute_async_await`](crate::Actor::execute_async_await).
///
/// The first [`wait`](Self::wait) suspends until the outcome is known and
/// caches it. Every later call, on this handle or any clone, returns the
/// same cached outcome immediately. Never waiting is fine too; the action
/// runs either way.
pub struct Awaiter<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    outcome: OnceCell<Result<T, ActorError>>,
    pending: Mutex<Option<oneshot::Receiver<Result<T, ActorError>>>>,
    timeout: Option<Duration>,
}

impl<T> Clone for Awaiter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Awaiter<T> {
    pub(crate) fn pending(
        outcome: oneshot::Receiver<Result<T, ActorError>>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                outcome: OnceCell::new(),
                pending: Mutex::new(Some(outcome)),
                timeout,
            }),
        }
    }

    pub(crate) fn ready(outcome: Result<T, ActorError>) -> Self {
        Self {
            inner: Arc::new(Inner {
                outcome: OnceCell::new_with(Some(outcome)),
                pending: Mutex::new(None),
                timeout: None,
            }),
        }
    }

    /// Whether the outcome is already cached
    pub fn is_resolved(&self) -> bool {
        self.inner.outcome.initialized()
    }
}

impl<T: Clone> Awaiter<T> {
    /// Outcome of the action, waiting for it on the first call.
    ///
    /// The configured action timeout bounds this first wait and starts when
    /// it begins, not when the action was queued. An awaiter picked up long
    /// after submission therefore still gets the full window.
    pub async fn wait(&self) -> Result<T, ActorError> {
        self.inner
            .outcome
            .get_or_init(|| self.inner.resolve())
            .await
            .clone()
    }
}

impl<T> Inner<T> {
    async fn resolve(&self) -> Result<T, ActorError> {
        let mut pending = self.pending.lock().await;
        let Some(rx) = pending.as_mut() else {
            return Err(ActorError::Shutdown);
        };
        // polled by reference so an abandoned wait can be resumed
        let answer = async { rx.await.unwrap_or(Err(ActorError::Shutdown)) };
        let outcome = match self.timeout {
            Some(after) => tokio::time::timeout(after, answer)
                .await
                .unwrap_or(Err(ActorError::Timeout(after))),
            None => answer.await,
        };
        *pending = None;
        outcome
    }
}

#[cfg(test)]
#[path = "awaiter_tests.rs"]
mod tests;
