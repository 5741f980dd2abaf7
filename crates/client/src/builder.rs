//! Client builder with dependency injection pattern.

use std::time::Duration;

use anyhow::{Context, Result};
use client_bootstrap::SessionBuilder;

use crate::{Client, Frontend};

/// Builder for constructing a Client with proper validation.
///
/// Both the session builder and the frontend are required; `build` fails fast
/// when either is missing.
pub struct ClientBuilder {
    sessions: Option<SessionBuilder>,
    frontend: Option<Box<dyn Frontend>>,
    retry_interval: Duration,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            sessions: None,
            frontend: None,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session builder (required).
    ///
    /// It owns the ledger and wallet backends and is asked for a fresh session
    /// after every wallet change.
    pub fn sessions(mut self, sessions: SessionBuilder) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Set the frontend (required).
    pub fn frontend(mut self, frontend: impl Frontend + 'static) -> Self {
        self.frontend = Some(Box::new(frontend));
        self
    }

    /// How long to wait before retrying a failed connection when the wallet
    /// stays silent (default 5s).
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn build(self) -> Result<Client> {
        let sessions = self
            .sessions
            .context("Session builder is required. Use .sessions() to set it.")?;

        let frontend = self
            .frontend
            .context("Frontend is required. Use .frontend() to set it.")?;

        Ok(Client {
            sessions,
            frontend,
            retry_interval: self.retry_interval,
        })
    }
}
