//! Shared application state for the routemeter demo server.
//!
//! Builds the registry, manager and recorder once at startup. Errors are
//! returned instead of panicking so `main` decides how to fail.

use std::sync::Arc;

use routemeter_core::error::Result;
use routemeter_core::{MetricsManager, Registry};

use crate::config::MeterConfig;
use crate::meter::{self, HttpMeter};
use crate::router;

#[derive(Clone)]
pub struct AppState {
    meter: HttpMeter,
}

impl AppState {
    /// Build application state. Must run inside a tokio runtime, since it
    /// starts the recorder worker.
    pub fn new(cfg: &MeterConfig) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let resolver = meter::resolver_for(cfg.routes.resolver);
        let manager = Arc::new(MetricsManager::with_resolver(registry, resolver));

        if cfg.routes.preregister {
            for &(method, path) in router::ROUTES {
                manager.record_route(method, path).map_err(|e| {
                    tracing::error!(%method, %path, error = %e, "route pre-registration failed");
                    e
                })?;
            }
            tracing::debug!(routes = router::ROUTES.len(), "routes pre-registered");
        }

        let meter = HttpMeter::spawn(manager, cfg.recorder.queue_capacity);

        Ok(Self { meter })
    }

    pub fn meter(&self) -> &HttpMeter {
        &self.meter
    }
}
