// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keeper: serialized ownership of mutable state
//!
//! An [`Actor`] owns a value of some state type and runs a single dispatch
//! loop on a dedicated thread. Callers never touch the state directly; they
//! submit closures that the loop runs one at a time with exclusive access:
//!
//! - [`Actor::execute`] waits for the action to finish
//! - [`Actor::execute_async`] only waits until the action is queued
//! - [`Actor::execute_async_await`] queues now and hands back an [`Awaiter`]
//! - [`Actor::query`] / [`Actor::update`] read or read-modify-write atomically
//!
//! ```no_run
//! use keeper::{Actor, Config};
//!
//! # async fn demo() -> Result<(), keeper::ActorError> {
//! let counter = Actor::start(0u64, Config::new())?;
//! counter.execute(|n| *n += 1).await?;
//! assert_eq!(counter.query(|n| *n).await?, 1);
//! counter.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod actor;
mod awaiter;
mod config;
mod dispatch;
mod error;
mod repeat;
mod request;
mod status;

pub use actor::Actor;
pub use awaiter::Awaiter;
pub use config::{Config, Finalizer, Recoverer, Settings};
pub use error::{ActorError, BoxError};
pub use repeat::Repeat;
pub use status::{Phase, QueueStatus};

/// Re-exported so callers can build cancellation tokens without a direct
/// dependency on `tokio-util`.
pub use tokio_util::sync::CancellationToken;
