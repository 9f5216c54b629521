use std::net::SocketAddr;

use routemeter_core::error::{Result, RouteMeterError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeterConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub recorder: RecorderSection,

    #[serde(default)]
    pub routes: RoutesSection,
}

impl MeterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RouteMeterError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.recorder.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            RouteMeterError::BadConfig(format!("server.listen must be a valid SocketAddr: {e}"))
        })?;
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecorderSection {
    /// Observations queued for the background worker before new ones are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for RecorderSection {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl RecorderSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=1_048_576).contains(&self.queue_capacity) {
            return Err(RouteMeterError::BadConfig(
                "recorder.queue_capacity must be between 1 and 1048576".into(),
            ));
        }
        Ok(())
    }
}

fn default_queue_capacity() -> usize {
    4096
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesSection {
    #[serde(default)]
    pub resolver: ResolverKind,

    /// Pre-register every served route at startup; a duplicate aborts startup.
    #[serde(default = "default_preregister")]
    pub preregister: bool,
}

impl Default for RoutesSection {
    fn default() -> Self {
        Self {
            resolver: ResolverKind::default(),
            preregister: default_preregister(),
        }
    }
}

fn default_preregister() -> bool {
    true
}

/// How requests map to the path half of a route identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// axum route template, e.g. `/widgets/:id`.
    #[default]
    Matched,
    /// Raw request path.
    Raw,
    /// Raw path with numeric and UUID segments collapsed to `:id`.
    Normalized,
}
