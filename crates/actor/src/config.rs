// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actor configuration
//!
//! [`Settings`] holds the plain knobs and can be loaded from TOML.
//! [`Config`] adds the hooks (recoverer, finalizer, parent token) and is
//! what [`Actor::start`](crate::Actor::start) consumes.

use crate::error::ActorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(5);

/// Decides what happens after an action panicked.
///
/// Receives the panic message. `None` keeps the actor running, `Some`
/// stops it with that error as the terminal error.
pub type Recoverer = Arc<dyn Fn(&str) -> Option<ActorError> + Send + Sync>;

/// Runs once when the dispatch loop has exited. Receives the terminal
/// error so far and returns the one that stays observable.
pub type Finalizer = Arc<dyn Fn(Option<ActorError>) -> Option<ActorError> + Send + Sync>;

/// Serializable actor settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Bound on pending requests
    pub queue_capacity: usize,
    /// How long a caller waits for a single action (and for queue space
    /// on async submissions). `None` waits indefinitely.
    #[serde(with = "humantime_serde")]
    pub action_timeout: Option<Duration>,
    /// How long queued work may keep running after a stop request
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Option<Duration>,
    /// How long `start` waits for the dispatch loop to come up
    #[serde(with = "humantime_serde")]
    pub start_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            action_timeout: None,
            shutdown_timeout: Some(DEFAULT_SHUTDOWN_TIMEOUT),
            start_timeout: DEFAULT_START_TIMEOUT,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ActorError> {
        toml::from_str(source).map_err(|e| ActorError::Config(e.to_string()))
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ActorError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ActorError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Check the settings. A zero action or shutdown timeout is read as
    /// "no timeout".
    pub fn validate(&self) -> Result<(), ActorError> {
        if self.queue_capacity == 0 {
            return Err(ActorError::Config(
                "queue capacity must be positive".to_string(),
            ));
        }
        if self.start_timeout.is_zero() {
            return Err(ActorError::Config(
                "start timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout.filter(|t| !t.is_zero())
    }

    pub(crate) fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout.filter(|t| !t.is_zero())
    }
}

/// Full actor configuration
#[derive(Clone, Default)]
pub struct Config {
    pub(crate) settings: Settings,
    pub(crate) parent: Option<CancellationToken>,
    pub(crate) recoverer: Option<Recoverer>,
    pub(crate) finalizer: Option<Finalizer>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.settings.queue_capacity = capacity;
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.settings.action_timeout = Some(timeout);
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.settings.shutdown_timeout = Some(timeout);
        self
    }

    /// Let queued work drain without a deadline on stop
    pub fn without_shutdown_timeout(mut self) -> Self {
        self.settings.shutdown_timeout = None;
        self
    }

    pub fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.settings.start_timeout = timeout;
        self
    }

    /// Stop the actor when `token` is cancelled
    pub fn with_parent(mut self, token: CancellationToken) -> Self {
        self.parent = Some(token);
        self
    }

    pub fn with_recoverer<F>(mut self, recoverer: F) -> Self
    where
        F: Fn(&str) -> Option<ActorError> + Send + Sync + 'static,
    {
        self.recoverer = Some(Arc::new(recoverer));
        self
    }

    pub fn with_finalizer<F>(mut self, finalizer: F) -> Self
    where
        F: Fn(Option<ActorError>) -> Option<ActorError> + Send + Sync + 'static,
    {
        self.finalizer = Some(Arc::new(finalizer));
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn validate(&self) -> Result<(), ActorError> {
        self.settings.validate()
    }

    /// Recoverer in effect: the configured one, or stop on every panic
    pub(crate) fn recoverer(&self) -> Recoverer {
        self.recoverer
            .clone()
            .unwrap_or_else(|| Arc::new(|reason: &str| Some(ActorError::Panic(reason.to_string()))))
    }

    /// Finalizer in effect: the configured one, or identity
    pub(crate) fn finalizer(&self) -> Finalizer {
        self.finalizer
            .clone()
            .unwrap_or_else(|| Arc::new(|err: Option<ActorError>| err))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("settings", &self.settings)
            .field("parent", &self.parent.is_some())
            .field("recoverer", &self.recoverer.is_some())
            .field("finalizer", &self.finalizer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
