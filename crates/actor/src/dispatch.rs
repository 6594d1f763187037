// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatch loop
//!
//! Runs on the actor's dedicated thread and is the only code that ever
//! holds the state. Requests are executed strictly one at a time.

use crate::config::{Finalizer, Recoverer};
use crate::error::ActorError;
use crate::request::Request;
use crate::status::Shared;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Why the running loop ended
#[derive(Debug)]
enum Exit {
    /// Stop requested or root token cancelled
    Stopped,
    /// Every handle was dropped
    Detached,
    /// Poisoned by an async action or stopped by the recoverer
    Failed(ActorError),
}

pub(crate) struct Dispatcher<S> {
    pub(crate) state: S,
    pub(crate) requests: mpsc::Receiver<Request<S>>,
    pub(crate) shared: Arc<Shared>,
    pub(crate) recoverer: Recoverer,
    pub(crate) finalizer: Finalizer,
    pub(crate) shutdown_timeout: Option<Duration>,
}

impl<S> Dispatcher<S> {
    /// Run until stopped, then drain and finalize
    pub(crate) async fn run(mut self) {
        let exit = self.serve().await;
        debug!(?exit, "dispatch loop leaving running phase");

        match exit {
            Exit::Stopped | Exit::Detached => {
                self.shared.begin_drain();
                self.drain().await;
            }
            Exit::Failed(err) => {
                self.shared.record(err);
                self.shared.mark_stopped();
                self.shared.root.cancel();
                self.requests.close();
                self.abandon_queued().await;
            }
        }

        self.shared.mark_stopped();
        let cause = self.shared.cause();
        let finalizer = &self.finalizer;
        let terminal = panic::catch_unwind(AssertUnwindSafe(|| finalizer(cause.clone())))
            .unwrap_or_else(|payload| {
                let reason = panic_reason(payload.as_ref());
                error!(%reason, "finalizer panicked, keeping the original error");
                cause
            });
        debug!(error = ?terminal, "actor finalized");
        self.shared.finish(terminal);
    }

    async fn serve(&mut self) -> Exit {
        let root = self.shared.root.clone();
        loop {
            let request = tokio::select! {
                biased;
                _ = root.cancelled() => return Exit::Stopped,
                request = self.requests.recv() => request,
            };
            let Some(request) = request else {
                return Exit::Detached;
            };
            if let Err(err) = self.dispatch(request) {
                return Exit::Failed(err);
            }
        }
    }

    /// Execute one request. `Err` means the actor must stop.
    fn dispatch(&mut self, request: Request<S>) -> Result<(), ActorError> {
        let withdrawn = request.is_withdrawn();
        let mut job = request.into_job();
        if withdrawn {
            job.abandon(ActorError::Canceled);
            return Ok(());
        }

        let state = &mut self.state;
        match panic::catch_unwind(AssertUnwindSafe(|| job.run(state))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                error!(error = %err, "asynchronous action failed, stopping actor");
                Err(err)
            }
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                let recoverer = &self.recoverer;
                let verdict = panic::catch_unwind(AssertUnwindSafe(|| recoverer(&reason)))
                    .unwrap_or_else(|nested| {
                        error!(
                            %reason,
                            nested = %panic_reason(nested.as_ref()),
                            "recoverer panicked"
                        );
                        Some(ActorError::Panic(reason.clone()))
                    });
                match verdict {
                    None => {
                        warn!(%reason, "action panicked, continuing");
                        job.abandon(ActorError::Panic(reason));
                        Ok(())
                    }
                    Some(err) => {
                        error!(%reason, error = %err, "action panicked, stopping actor");
                        job.abandon(err.clone());
                        Err(err)
                    }
                }
            }
        }
    }

    /// Run what is already queued, within the shutdown deadline
    async fn drain(&mut self) {
        // no new requests from here on; buffered ones are still delivered
        self.requests.close();
        let deadline = self.shutdown_timeout.map(|t| Instant::now() + t);
        let mut drained = 0usize;

        while let Some(request) = self.requests.recv().await {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                let mut job = request.into_job();
                job.abandon(ActorError::Shutdown);
                warn!(drained, "shutdown timeout elapsed, abandoning queued requests");
                self.abandon_queued().await;
                return;
            }
            if let Err(err) = self.dispatch(request) {
                self.shared.record(err);
                self.abandon_queued().await;
                return;
            }
            drained += 1;
        }
        debug!(drained, "queue drained");
    }

    /// Answer everything still queued with `Shutdown`. The queue must be
    /// closed already.
    async fn abandon_queued(&mut self) {
        let mut abandoned = 0usize;
        while let Some(request) = self.requests.recv().await {
            request.into_job().abandon(ActorError::Shutdown);
            abandoned += 1;
        }
        if abandoned > 0 {
            warn!(abandoned, "abandoned queued requests");
        }
    }
}

/// Best effort text of a panic payload
pub(crate) fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
