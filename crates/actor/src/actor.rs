// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The actor handle and its submission API

use crate::awaiter::Awaiter;
use crate::config::{Config, Settings};
use crate::dispatch::Dispatcher;
use crate::error::{ActorError, BoxError};
use crate::request::Request;
use crate::status::{Phase, QueueStatus, Shared};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a value of type `S` owned by a dedicated dispatch loop.
///
/// Cloning the handle is cheap; every clone addresses the same loop. The
/// owned state is only reachable from inside the closures passed to the
/// submission methods, which run one at a time.
pub struct Actor<S> {
    requests: mpsc::Sender<Request<S>>,
    shared: Arc<Shared>,
    settings: Arc<Settings>,
}

impl<S> Clone for Actor<S> {
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
            shared: Arc::clone(&self.shared),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<S: Send + 'static> Actor<S> {
    /// Validate `config`, move `state` onto a new dispatch thread and wait
    /// until its loop is ready.
    pub fn start(state: S, config: Config) -> Result<Self, ActorError> {
        config.validate()?;

        let settings = config.settings().clone();
        let root = match &config.parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let shared = Arc::new(Shared::new(root));
        let (tx, requests) = mpsc::channel(settings.queue_capacity);
        let dispatcher = Dispatcher {
            state,
            requests,
            shared: Arc::clone(&shared),
            recoverer: config.recoverer(),
            finalizer: config.finalizer(),
            shutdown_timeout: settings.shutdown_timeout(),
        };

        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), String>>();
        std::thread::Builder::new()
            .name("keeper-actor".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                runtime.block_on(dispatcher.run());
            })
            .map_err(|e| ActorError::Startup(e.to_string()))?;

        match ready_rx.recv_timeout(settings.start_timeout) {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => return Err(ActorError::Startup(reason)),
            Err(_) => {
                shared.root.cancel();
                return Err(ActorError::Startup(format!(
                    "dispatch loop not ready after {:?}",
                    settings.start_timeout
                )));
            }
        }

        debug!(capacity = settings.queue_capacity, "actor started");
        Ok(Self {
            requests: tx,
            shared,
            settings: Arc::new(settings),
        })
    }

    /// Run `action` and wait until it has finished
    pub async fn execute<F>(&self, action: F) -> Result<(), ActorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.call(None, self.action_timeout(), move |state| {
            action(state);
            Ok(())
        })
        .await
    }

    /// Like [`execute`](Self::execute), giving up when `token` is cancelled.
    /// A request withdrawn before it was dequeued never runs.
    pub async fn execute_cancellable<F>(
        &self,
        token: &CancellationToken,
        action: F,
    ) -> Result<(), ActorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.call(Some(token), self.action_timeout(), move |state| {
            action(state);
            Ok(())
        })
        .await
    }

    /// Like [`execute`](Self::execute) with a per-call timeout instead of
    /// the configured action timeout
    pub async fn execute_timeout<F>(&self, timeout: Duration, action: F) -> Result<(), ActorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.call(None, Some(timeout), move |state| {
            action(state);
            Ok(())
        })
        .await
    }

    /// Run a fallible action and wait for it. The action's error is
    /// returned as [`ActorError::Action`] and leaves the actor running.
    pub async fn try_execute<F, E>(&self, action: F) -> Result<(), ActorError>
    where
        F: FnOnce(&mut S) -> Result<(), E> + Send + 'static,
        E: Into<BoxError>,
    {
        self.call(None, self.action_timeout(), move |state| {
            action(state).map_err(ActorError::action)
        })
        .await
    }

    /// Read from the state
    pub async fn query<F, R>(&self, reader: F) -> Result<R, ActorError>
    where
        F: FnOnce(&S) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.call(None, self.action_timeout(), move |state| Ok(reader(state)))
            .await
    }

    /// Read, decide and write within one execution slot. An error from
    /// `mutator` is returned as [`ActorError::Action`]; whatever the
    /// mutator changed before failing stays changed.
    pub async fn update<F, R, E>(&self, mutator: F) -> Result<R, ActorError>
    where
        F: FnOnce(&mut S) -> Result<R, E> + Send + 'static,
        R: Send + 'static,
        E: Into<BoxError>,
    {
        self.call(None, self.action_timeout(), move |state| {
            mutator(state).map_err(ActorError::action)
        })
        .await
    }

    /// Queue `action` and return once it is accepted
    pub async fn execute_async<F>(&self, action: F) -> Result<(), ActorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.cast(None, self.action_timeout(), move |state| {
            action(state);
            Ok(())
        })
        .await
    }

    /// Like [`execute_async`](Self::execute_async), waiting at most `timeout`
    /// for queue space instead of the configured action timeout
    pub async fn execute_async_timeout<F>(
        &self,
        timeout: Duration,
        action: F,
    ) -> Result<(), ActorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.cast(None, Some(timeout), move |state| {
            action(state);
            Ok(())
        })
        .await
    }

    /// Like [`execute_async`](Self::execute_async); the request is dropped
    /// unexecuted if `token` is cancelled before it is dequeued
    pub async fn execute_async_cancellable<F>(
        &self,
        token: &CancellationToken,
        action: F,
    ) -> Result<(), ActorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.cast(Some(token), self.action_timeout(), move |state| {
            action(state);
            Ok(())
        })
        .await
    }

    /// Queue a fallible action. Nobody observes its outcome, so an error
    /// stops the actor and becomes its terminal error.
    pub async fn try_execute_async<F, E>(&self, action: F) -> Result<(), ActorError>
    where
        F: FnOnce(&mut S) -> Result<(), E> + Send + 'static,
        E: Into<BoxError>,
    {
        self.cast(None, self.action_timeout(), move |state| {
            action(state).map_err(Into::into)
        })
        .await
    }

    /// Queue `action` now and observe its result later through the
    /// returned [`Awaiter`]. Enqueue failures are reported by the awaiter.
    pub async fn execute_async_await<F, T>(&self, action: F) -> Awaiter<T>
    where
        F: FnOnce(&mut S) -> T + Send + 'static,
        T: Send + 'static,
    {
        let timeout = self.action_timeout();
        if let Err(err) = self.ensure_accepting(None) {
            return Awaiter::ready(Err(err));
        }

        let (reply, outcome) = oneshot::channel();
        let request = Request::reply(move |state: &mut S| Ok(action(state)), reply, None);
        let enqueued = match timeout {
            Some(after) => tokio::time::timeout(after, self.enqueue(request, None))
                .await
                .unwrap_or(Err(ActorError::Timeout(after))),
            None => self.enqueue(request, None).await,
        };
        match enqueued {
            Ok(()) => Awaiter::pending(outcome, timeout),
            Err(err) => Awaiter::ready(Err(err)),
        }
    }

    /// Request a stop. Already queued requests may still run within the
    /// shutdown timeout; new submissions fail with [`ActorError::Shutdown`].
    /// Calling it again has no effect.
    pub fn stop(&self) {
        if self.shared.begin_drain() {
            debug!("actor stop requested");
        }
        self.shared.root.cancel();
    }

    /// Wait until the actor has stopped and its finalizer has returned
    pub async fn done(&self) {
        self.shared.done.cancelled().await;
    }

    /// [`stop`](Self::stop), wait for [`done`](Self::done) and return the
    /// terminal error
    pub async fn shutdown(&self) -> Option<ActorError> {
        self.stop();
        self.done().await;
        self.err()
    }

    /// Terminal error, if any. `None` while running or after a clean stop.
    pub fn err(&self) -> Option<ActorError> {
        self.shared.err()
    }

    pub fn phase(&self) -> Phase {
        self.shared.phase()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running && !self.shared.root.is_cancelled()
    }

    /// Whether the actor has fully stopped and been finalized
    pub fn is_done(&self) -> bool {
        self.shared.done.is_cancelled()
    }

    pub fn queue_status(&self) -> QueueStatus {
        let capacity = self.requests.max_capacity();
        QueueStatus {
            depth: capacity - self.requests.capacity(),
            capacity,
        }
    }

    /// Token cancelled when the actor starts shutting down
    pub(crate) fn stopping(&self) -> &CancellationToken {
        &self.shared.root
    }

    pub(crate) fn action_timeout(&self) -> Option<Duration> {
        self.settings.action_timeout()
    }

    fn ensure_accepting(&self, token: Option<&CancellationToken>) -> Result<(), ActorError> {
        if !self.is_running() {
            return Err(ActorError::Shutdown);
        }
        if token.is_some_and(|t| t.is_cancelled()) {
            return Err(ActorError::Canceled);
        }
        Ok(())
    }

    /// Blocking submission: enqueue with a reply channel and wait for it
    async fn call<T, F>(
        &self,
        token: Option<&CancellationToken>,
        timeout: Option<Duration>,
        action: F,
    ) -> Result<T, ActorError>
    where
        F: FnOnce(&mut S) -> Result<T, ActorError> + Send + 'static,
        T: Send + 'static,
    {
        self.ensure_accepting(token)?;

        // withdrawn when the caller stops waiting before the loop gets to it
        let withdraw = match token {
            Some(t) => t.child_token(),
            None => CancellationToken::new(),
        };
        let (reply, outcome) = oneshot::channel();
        let request = Request::reply(action, reply, Some(withdraw.clone()));

        let exchange = async {
            self.enqueue(request, token).await?;
            receive(outcome, token).await
        };
        let result = match timeout {
            Some(after) => tokio::time::timeout(after, exchange)
                .await
                .unwrap_or(Err(ActorError::Timeout(after))),
            None => exchange.await,
        };
        if result.is_err() {
            withdraw.cancel();
        }
        result
    }

    /// Non-blocking submission: wait for queue space only
    pub(crate) async fn cast<F>(
        &self,
        token: Option<&CancellationToken>,
        timeout: Option<Duration>,
        action: F,
    ) -> Result<(), ActorError>
    where
        F: FnOnce(&mut S) -> Result<(), BoxError> + Send + 'static,
    {
        self.ensure_accepting(token)?;
        let request = Request::fire(action, token.cloned());
        match timeout {
            Some(after) => tokio::time::timeout(after, self.enqueue(request, token))
                .await
                .unwrap_or(Err(ActorError::Timeout(after))),
            None => self.enqueue(request, token).await,
        }
    }

    /// Wait for queue space, the caller's token or the actor stopping,
    /// whichever comes first
    async fn enqueue(
        &self,
        request: Request<S>,
        token: Option<&CancellationToken>,
    ) -> Result<(), ActorError> {
        let caller_gone = async {
            match token {
                Some(t) => t.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = caller_gone => Err(ActorError::Canceled),
            _ = self.shared.root.cancelled() => Err(ActorError::Shutdown),
            sent = self.requests.send(request) => sent.map_err(|_| ActorError::Shutdown),
        }
    }
}

/// Wait for the reply or the caller's token
async fn receive<T>(
    outcome: oneshot::Receiver<Result<T, ActorError>>,
    token: Option<&CancellationToken>,
) -> Result<T, ActorError> {
    let answer = async {
        // a dropped sender means the request was discarded unanswered
        outcome.await.unwrap_or(Err(ActorError::Shutdown))
    };
    match token {
        Some(t) => tokio::select! {
            biased;
            _ = t.cancelled() => Err(ActorError::Canceled),
            result = answer => result,
        },
        None => answer.await,
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
