//! HTTP metering: middleware, observing body, background recorder.
//!
//! `track` is an axum `from_fn_with_state` middleware. It resolves the route
//! before the request is handed on, wraps the response body in an
//! `ObservedBody`, and the body reports the finished observation to the
//! `Recorder` once the last frame has been produced (or the body is dropped).

pub mod body;
pub mod middleware;
pub mod recorder;
pub mod resolver;

use std::sync::Arc;

use routemeter_core::{MetricsManager, Registry};

pub use body::ObservedBody;
pub use middleware::track;
pub use recorder::Recorder;
pub use resolver::{resolver_for, MatchedPathResolver};

/// Middleware state: the manager plus its recorder queue.
#[derive(Clone)]
pub struct HttpMeter {
    manager: Arc<MetricsManager>,
    recorder: Recorder,
}

impl HttpMeter {
    /// Start the recorder worker on the current tokio runtime.
    pub fn spawn(manager: Arc<MetricsManager>, queue_capacity: usize) -> Self {
        let recorder = Recorder::spawn(Arc::clone(&manager), queue_capacity);
        Self { manager, recorder }
    }

    pub fn manager(&self) -> &Arc<MetricsManager> {
        &self.manager
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.manager.registry()
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }
}
