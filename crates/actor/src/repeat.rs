// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic execution on top of the async submission API

use crate::actor::Actor;
use crate::error::ActorError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a repeating action. Stops the ticker when stopped or dropped.
#[derive(Debug)]
pub struct Repeat {
    token: CancellationToken,
}

impl Repeat {
    /// Stop ticking. Ticks already queued but not yet run are skipped.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Repeat {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl<S: Send + 'static> Actor<S> {
    /// Submit `action` asynchronously every `interval`, starting one
    /// interval from now, until the returned handle is stopped or the actor
    /// stops. Must be called within a tokio runtime.
    pub fn repeat<F>(&self, interval: Duration, action: F) -> Result<Repeat, ActorError>
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        self.ticker(None, interval, self.action_timeout(), action)
    }

    /// Like [`repeat`](Self::repeat), also ending when `token` is cancelled
    pub fn repeat_cancellable<F>(
        &self,
        token: &CancellationToken,
        interval: Duration,
        action: F,
    ) -> Result<Repeat, ActorError>
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        self.ticker(Some(token), interval, self.action_timeout(), action)
    }

    /// Like [`repeat`](Self::repeat), waiting at most `timeout` for queue
    /// space on each tick. A tick that cannot be queued in time ends the
    /// ticker.
    pub fn repeat_timeout<F>(
        &self,
        interval: Duration,
        timeout: Duration,
        action: F,
    ) -> Result<Repeat, ActorError>
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        self.ticker(None, interval, Some(timeout), action)
    }

    fn ticker<F>(
        &self,
        token: Option<&CancellationToken>,
        interval: Duration,
        timeout: Option<Duration>,
        action: F,
    ) -> Result<Repeat, ActorError>
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(ActorError::Config(
                "repeat interval must be greater than zero".to_string(),
            ));
        }
        if !self.is_running() {
            return Err(ActorError::Shutdown);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            ActorError::Config(format!("repeat must be called within a tokio runtime: {}", e))
        })?;

        let ticking = match token {
            Some(t) => t.child_token(),
            None => CancellationToken::new(),
        };
        let actor = self.clone();
        let action = Arc::new(action);
        let stop = ticking.clone();

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = 0u64;
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    _ = actor.stopping().cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let action = Arc::clone(&action);
                let submitted = actor
                    .cast(Some(&stop), timeout, move |state| {
                        action(state);
                        Ok(())
                    })
                    .await;
                if let Err(err) = submitted {
                    debug!(error = %err, ticks, "repeat submission failed");
                    break;
                }
                ticks += 1;
            }
            debug!(ticks, "repeat finished");
        });

        Ok(Repeat { token: ticking })
    }
}

#[cfg(test)]
#[path = "repeat_tests.rs"]
mod tests;
