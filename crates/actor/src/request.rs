// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queued units of work
//!
//! A [`Request`] pairs a type-erased [`Job`] with an optional cancellation
//! token. Jobs that expect an answer carry a oneshot sender which is
//! written at most once: by `run` with the action's outcome, or by
//! `abandon` with an engine error when the action cannot run or panicked.

use crate::error::{ActorError, BoxError};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Sender half of a reply channel
pub(crate) type ReplyTx<T> = oneshot::Sender<Result<T, ActorError>>;

pub(crate) trait Job<S>: Send {
    /// Run the action against the state. `Err` poisons the actor.
    fn run(&mut self, state: &mut S) -> Result<(), ActorError>;

    /// Answer the waiting caller, if any, without running the action.
    /// No-op once an answer was delivered.
    fn abandon(&mut self, err: ActorError);
}

pub(crate) struct Request<S> {
    job: Box<dyn Job<S>>,
    cancel: Option<CancellationToken>,
}

impl<S: 'static> Request<S> {
    /// Request whose outcome is sent back to a caller
    pub(crate) fn reply<T, F>(action: F, reply: ReplyTx<T>, cancel: Option<CancellationToken>) -> Self
    where
        F: FnOnce(&mut S) -> Result<T, ActorError> + Send + 'static,
        T: Send + 'static,
    {
        Self {
            job: Box::new(Reply {
                action: Some(action),
                reply: Some(reply),
            }),
            cancel,
        }
    }

    /// Fire-and-forget request; an error returned by the action poisons
    /// the actor
    pub(crate) fn fire<F>(action: F, cancel: Option<CancellationToken>) -> Self
    where
        F: FnOnce(&mut S) -> Result<(), BoxError> + Send + 'static,
    {
        Self {
            job: Box::new(Fire {
                action: Some(action),
            }),
            cancel,
        }
    }
}

impl<S> Request<S> {
    /// Whether the submitter gave up before the request was dequeued
    pub(crate) fn is_withdrawn(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    pub(crate) fn into_job(self) -> Box<dyn Job<S>> {
        self.job
    }
}

struct Reply<F, T> {
    action: Option<F>,
    reply: Option<ReplyTx<T>>,
}

impl<F, T> Reply<F, T> {
    fn deliver(&mut self, outcome: Result<T, ActorError>) {
        if let Some(tx) = self.reply.take() {
            // the caller may have stopped waiting
            let _ = tx.send(outcome);
        }
    }
}

impl<S, F, T> Job<S> for Reply<F, T>
where
    F: FnOnce(&mut S) -> Result<T, ActorError> + Send,
    T: Send,
{
    fn run(&mut self, state: &mut S) -> Result<(), ActorError> {
        if let Some(action) = self.action.take() {
            let outcome = action(state);
            self.deliver(outcome);
        }
        Ok(())
    }

    fn abandon(&mut self, err: ActorError) {
        self.action = None;
        self.deliver(Err(err));
    }
}

struct Fire<F> {
    action: Option<F>,
}

impl<S, F> Job<S> for Fire<F>
where
    F: FnOnce(&mut S) -> Result<(), BoxError> + Send,
{
    fn run(&mut self, state: &mut S) -> Result<(), ActorError> {
        match self.action.take() {
            Some(action) => action(state).map_err(ActorError::action),
            None => Ok(()),
        }
    }

    fn abandon(&mut self, _err: ActorError) {
        self.action = None;
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
