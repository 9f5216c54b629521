//! MetricsManager: turns one request observation into series updates.
//!
//! Hot path per name: plain `get`, and only on a miss build a candidate and
//! race it through `register_if_absent`. After warm-up every update is a
//! read-locked lookup plus an atomic add.

use std::sync::Arc;
use std::time::Duration;

use http::Request;

use crate::error::{Result, RouteMeterError};
use crate::keys;
use crate::registry::{Counter, Registry, Series, Timer};
use crate::route::{DefaultRouteResolver, RouteIdentity, RouteResolver};

/// What the response looked like once it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: u16,
    pub bytes_written: u64,
}

impl Default for Outcome {
    fn default() -> Self {
        Self {
            status: 200,
            bytes_written: 0,
        }
    }
}

/// Everything one `record` call needs, owned by value so it can outlive the
/// request and response it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub route: RouteIdentity,
    pub status: u16,
    pub bytes_written: u64,
    pub duration: Duration,
}

impl Observation {
    pub fn new(route: RouteIdentity, outcome: Outcome, duration: Duration) -> Self {
        Self {
            route,
            status: outcome.status,
            bytes_written: outcome.bytes_written,
            duration,
        }
    }
}

pub struct MetricsManager {
    registry: Arc<Registry>,
    resolver: Arc<dyn RouteResolver>,
}

impl MetricsManager {
    /// Manager keyed on raw method and path.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_resolver(registry, Arc::new(DefaultRouteResolver))
    }

    pub fn with_resolver(registry: Arc<Registry>, resolver: Arc<dyn RouteResolver>) -> Self {
        Self { registry, resolver }
    }

    /// Registry handle for exporters.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn resolve<B>(&self, req: &Request<B>) -> RouteIdentity {
        self.resolver.resolve(req.method(), req.uri(), req.extensions())
    }

    /// Pre-register the `path:method` timer and `path:method:Bytes` counter.
    ///
    /// Not idempotent: a name that already exists (from an earlier call or
    /// from traffic) is reported as `DuplicateSeries`. A failed call leaves
    /// the registry as it found it.
    pub fn record_route(&self, method: &str, path: &str) -> Result<()> {
        let route = keys::route_key(method, path);
        let bytes = format!("{route}:{}", keys::BYTES);
        if self.registry.get(&bytes).is_some() {
            return Err(RouteMeterError::DuplicateSeries(bytes));
        }

        self.registry.register(&route, Series::timer())?;
        if let Err(e) = self.registry.register(&bytes, Series::counter()) {
            self.registry.remove(&route);
            return Err(e);
        }
        Ok(())
    }

    /// Resolve `req` and record the outcome synchronously.
    pub fn observe<B>(&self, req: &Request<B>, outcome: Outcome, duration: Duration) -> Result<()> {
        let obs = Observation::new(self.resolve(req), outcome, duration);
        self.record(&obs)
    }

    /// Apply one observation: a sample on each of the four timers, and
    /// `bytes_written` on both byte counters.
    ///
    /// All six series are resolved before any is touched, so a kind mismatch
    /// on any name leaves every series unchanged.
    pub fn record(&self, obs: &Observation) -> Result<()> {
        let RouteIdentity { method, path } = &obs.route;

        let mut timers = Vec::with_capacity(4);
        for name in keys::timer_names(method, path, obs.status) {
            timers.push(self.timer(&name)?);
        }
        let mut counters = Vec::with_capacity(2);
        for name in keys::counter_names(method, path) {
            counters.push(self.counter(&name)?);
        }

        for t in &timers {
            t.update(obs.duration);
        }
        for c in &counters {
            c.inc(obs.bytes_written);
        }
        Ok(())
    }

    fn timer(&self, name: &str) -> Result<Arc<Timer>> {
        let series = match self.registry.get(name) {
            Some(s) => s,
            None => self.registry.register_if_absent(name, Series::timer()),
        };
        series.into_timer(name)
    }

    fn counter(&self, name: &str) -> Result<Arc<Counter>> {
        let series = match self.registry.get(name) {
            Some(s) => s,
            None => self.registry.register_if_absent(name, Series::counter()),
        };
        series.into_counter(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::route::NormalizingRouteResolver;
    use std::thread;

    fn manager() -> MetricsManager {
        MetricsManager::new(Arc::new(Registry::new()))
    }

    fn obs(method: &str, path: &str, status: u16, bytes: u64, ms: u64) -> Observation {
        Observation::new(
            RouteIdentity::new(method, path),
            Outcome { status, bytes_written: bytes },
            Duration::from_millis(ms),
        )
    }

    #[test]
    fn record_updates_four_timers_and_two_counters() {
        let m = manager();
        m.record(&obs("GET", "/widgets/:id", 200, 42, 3)).unwrap();

        let reg = m.registry();
        assert_eq!(reg.len(), 6);
        for name in ["GET", "GET:200", "/widgets/:id:GET", "/widgets/:id:GET:200"] {
            let t = reg.timer(name).unwrap();
            assert_eq!(t.count(), 1, "timer={name}");
            assert_eq!(t.total(), Duration::from_millis(3), "timer={name}");
        }
        assert_eq!(reg.counter("GET:Bytes").unwrap().get(), 42);
        assert_eq!(reg.counter("/widgets/:id:GET:Bytes").unwrap().get(), 42);
    }

    #[test]
    fn method_level_series_aggregate_across_routes() {
        let m = manager();
        m.record(&obs("GET", "/a", 200, 10, 1)).unwrap();
        m.record(&obs("GET", "/b", 404, 5, 1)).unwrap();

        let reg = m.registry();
        assert_eq!(reg.timer("GET").unwrap().count(), 2);
        assert_eq!(reg.timer("GET:200").unwrap().count(), 1);
        assert_eq!(reg.timer("GET:404").unwrap().count(), 1);
        assert_eq!(reg.counter("GET:Bytes").unwrap().get(), 15);
        assert_eq!(reg.counter("/a:GET:Bytes").unwrap().get(), 10);
        assert_eq!(reg.counter("/b:GET:Bytes").unwrap().get(), 5);
    }

    #[test]
    fn observe_resolves_route_from_request() {
        let m = MetricsManager::with_resolver(
            Arc::new(Registry::new()),
            Arc::new(NormalizingRouteResolver),
        );
        let req = Request::builder()
            .method("PUT")
            .uri("/widgets/7")
            .body(())
            .unwrap();

        m.observe(&req, Outcome { status: 204, bytes_written: 0 }, Duration::from_millis(2))
            .unwrap();

        assert_eq!(m.registry().timer("/widgets/:id:PUT:204").unwrap().count(), 1);
        assert_eq!(m.registry().counter("/widgets/:id:PUT:Bytes").unwrap().get(), 0);
    }

    #[test]
    fn concurrent_first_use_creates_one_series_per_name() {
        let m = manager();
        let threads = 16;
        let per_thread = 50;

        thread::scope(|s| {
            for _ in 0..threads {
                s.spawn(|| {
                    for _ in 0..per_thread {
                        m.record(&obs("POST", "/fresh", 201, 3, 1)).unwrap();
                    }
                });
            }
        });

        let total = (threads * per_thread) as u64;
        let reg = m.registry();
        assert_eq!(reg.len(), 6);
        assert_eq!(reg.timer("/fresh:POST:201").unwrap().count(), total);
        assert_eq!(reg.timer("POST").unwrap().count(), total);
        assert_eq!(reg.counter("POST:Bytes").unwrap().get(), total * 3);
        assert_eq!(reg.counter("/fresh:POST:Bytes").unwrap().get(), total * 3);
    }

    #[test]
    fn concurrent_routes_do_not_cross_contaminate() {
        let m = manager();

        thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..100 {
                    m.record(&obs("GET", "/left", 200, 1, 1)).unwrap();
                }
            });
            s.spawn(|| {
                for _ in 0..40 {
                    m.record(&obs("GET", "/right", 500, 7, 1)).unwrap();
                }
            });
        });

        let reg = m.registry();
        assert_eq!(reg.timer("/left:GET").unwrap().count(), 100);
        assert_eq!(reg.timer("/right:GET").unwrap().count(), 40);
        assert!(reg.get("/left:GET:500").is_none());
        assert!(reg.get("/right:GET:200").is_none());
        assert_eq!(reg.counter("/left:GET:Bytes").unwrap().get(), 100);
        assert_eq!(reg.counter("/right:GET:Bytes").unwrap().get(), 280);
        assert_eq!(reg.counter("GET:Bytes").unwrap().get(), 380);
    }

    #[test]
    fn record_route_is_strict() {
        let m = manager();
        m.record_route("GET", "/widgets/:id").unwrap();
        assert!(m.registry().timer("/widgets/:id:GET").is_some());
        assert!(m.registry().counter("/widgets/:id:GET:Bytes").is_some());

        let err = m.record_route("GET", "/widgets/:id").unwrap_err();
        assert!(matches!(err, RouteMeterError::DuplicateSeries(ref n) if n == "/widgets/:id:GET"));
    }

    #[test]
    fn record_route_fails_after_traffic_created_the_series() {
        let m = manager();
        m.record(&obs("GET", "/late", 200, 1, 1)).unwrap();
        assert_eq!(
            m.record_route("GET", "/late").unwrap_err().code().as_str(),
            "DUPLICATE_SERIES"
        );
    }

    #[test]
    fn pre_registered_series_receive_traffic() {
        let m = manager();
        m.record_route("GET", "/warm").unwrap();
        let before = m.registry().get("/warm:GET").unwrap();

        m.record(&obs("GET", "/warm", 200, 9, 1)).unwrap();

        assert!(before.ptr_eq(&m.registry().get("/warm:GET").unwrap()));
        assert_eq!(m.registry().timer("/warm:GET").unwrap().count(), 1);
        assert_eq!(m.registry().counter("/warm:GET:Bytes").unwrap().get(), 9);
    }

    #[test]
    fn kind_mismatch_is_not_coerced() {
        let m = manager();
        m.registry().register("GET", Series::counter()).unwrap();

        let err = m.record(&obs("GET", "/x", 200, 1, 1)).unwrap_err();
        assert_eq!(err.code().as_str(), "KIND_MISMATCH");
        assert_eq!(m.registry().counter("GET").unwrap().get(), 0);
    }

    #[test]
    fn kind_mismatch_on_later_name_applies_nothing() {
        let m = manager();
        m.registry().register("GET:200", Series::counter()).unwrap();

        let err = m.record(&obs("GET", "/x", 200, 5, 1)).unwrap_err();
        assert_eq!(err.code().as_str(), "KIND_MISMATCH");

        let reg = m.registry();
        assert_eq!(reg.timer("GET").map_or(0, |t| t.count()), 0);
        assert_eq!(reg.timer("/x:GET").map_or(0, |t| t.count()), 0);
        assert_eq!(reg.counter("GET:Bytes").map_or(0, |c| c.get()), 0);
        assert_eq!(reg.counter("/x:GET:Bytes").map_or(0, |c| c.get()), 0);
        assert_eq!(reg.counter("GET:200").unwrap().get(), 0);
    }

    #[test]
    fn failed_record_route_leaves_registry_untouched() {
        let m = manager();
        m.registry().register("/a:GET:Bytes", Series::counter()).unwrap();

        let err = m.record_route("GET", "/a").unwrap_err();
        assert!(matches!(err, RouteMeterError::DuplicateSeries(ref n) if n == "/a:GET:Bytes"));
        assert!(m.registry().get("/a:GET").is_none());
        assert_eq!(m.registry().len(), 1);

        m.registry().remove("/a:GET:Bytes");
        m.record_route("GET", "/a").unwrap();
        assert!(m.registry().timer("/a:GET").is_some());
    }
}
