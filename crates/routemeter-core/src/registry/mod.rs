//! Named series registry.
//!
//! One `Registry` is built at startup and shared behind an `Arc`. A name maps
//! to at most one series object at a time: `register_if_absent` is the single
//! serialization point for lazy creation and `register` is the strict variant
//! used for pre-registration.

mod series;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::error::{Result, RouteMeterError};

pub use series::{Counter, Timer, TimerSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Timer,
    Counter,
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKind::Timer => f.write_str("timer"),
            SeriesKind::Counter => f.write_str("counter"),
        }
    }
}

/// A registered series. Cloning clones the handle, not the data.
#[derive(Debug, Clone)]
pub enum Series {
    Timer(Arc<Timer>),
    Counter(Arc<Counter>),
}

impl Series {
    /// Fresh, unregistered timer.
    pub fn timer() -> Self {
        Series::Timer(Arc::new(Timer::new()))
    }

    /// Fresh, unregistered counter.
    pub fn counter() -> Self {
        Series::Counter(Arc::new(Counter::new()))
    }

    pub fn kind(&self) -> SeriesKind {
        match self {
            Series::Timer(_) => SeriesKind::Timer,
            Series::Counter(_) => SeriesKind::Counter,
        }
    }

    /// Unwrap as a timer; `name` is only used for the error.
    pub fn into_timer(self, name: &str) -> Result<Arc<Timer>> {
        match self {
            Series::Timer(t) => Ok(t),
            other => Err(mismatch(name, SeriesKind::Timer, other.kind())),
        }
    }

    /// Unwrap as a counter; `name` is only used for the error.
    pub fn into_counter(self, name: &str) -> Result<Arc<Counter>> {
        match self {
            Series::Counter(c) => Ok(c),
            other => Err(mismatch(name, SeriesKind::Counter, other.kind())),
        }
    }

    /// Whether both handles point at the same series object.
    pub fn ptr_eq(&self, other: &Series) -> bool {
        match (self, other) {
            (Series::Timer(a), Series::Timer(b)) => Arc::ptr_eq(a, b),
            (Series::Counter(a), Series::Counter(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn snapshot(&self) -> SeriesSnapshot {
        match self {
            Series::Timer(t) => SeriesSnapshot::Timer(t.snapshot()),
            Series::Counter(c) => SeriesSnapshot::Counter { value: c.get() },
        }
    }
}

fn mismatch(name: &str, expected: SeriesKind, found: SeriesKind) -> RouteMeterError {
    RouteMeterError::KindMismatch {
        name: name.to_string(),
        expected,
        found,
    }
}

/// Exported view of one series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesSnapshot {
    Timer(TimerSnapshot),
    Counter { value: u64 },
}

#[derive(Debug, Default)]
pub struct Registry {
    series: DashMap<String, Series>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            series: DashMap::new(),
        }
    }

    /// Plain lookup. Cheap; takes a shard read lock only.
    pub fn get(&self, name: &str) -> Option<Series> {
        self.series.get(name).map(|r| r.value().clone())
    }

    /// Insert `candidate` unless `name` is taken; either way return the
    /// series that is live under `name`. A losing candidate is dropped.
    pub fn register_if_absent(&self, name: &str, candidate: Series) -> Series {
        match self.series.entry(name.to_string()) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(e) => {
                tracing::debug!(series = %name, kind = %candidate.kind(), "registered series");
                e.insert(candidate).value().clone()
            }
        }
    }

    /// Strict insert: fails if `name` is already registered.
    pub fn register(&self, name: &str, series: Series) -> Result<()> {
        match self.series.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RouteMeterError::DuplicateSeries(name.to_string())),
            Entry::Vacant(e) => {
                tracing::debug!(series = %name, kind = %series.kind(), "pre-registered series");
                e.insert(series);
                Ok(())
            }
        }
    }

    /// Drop `name` from the registry, returning what was there.
    pub fn remove(&self, name: &str) -> Option<Series> {
        self.series.remove(name).map(|(_, s)| s)
    }

    /// Timer registered under `name`, if any. Returns `None` for a counter.
    pub fn timer(&self, name: &str) -> Option<Arc<Timer>> {
        match self.get(name)? {
            Series::Timer(t) => Some(t),
            Series::Counter(_) => None,
        }
    }

    /// Counter registered under `name`, if any. Returns `None` for a timer.
    pub fn counter(&self, name: &str) -> Option<Arc<Counter>> {
        match self.get(name)? {
            Series::Counter(c) => Some(c),
            Series::Timer(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Sorted copy of every series, for export.
    pub fn snapshot(&self) -> BTreeMap<String, SeriesSnapshot> {
        self.series
            .iter()
            .map(|r| (r.key().clone(), r.value().snapshot()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn register_if_absent_keeps_first_series() {
        let reg = Registry::new();
        let first = reg.register_if_absent("GET", Series::timer());
        let second = reg.register_if_absent("GET", Series::timer());

        assert!(first.ptr_eq(&second));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn register_rejects_existing_name() {
        let reg = Registry::new();
        reg.register("/a:GET", Series::timer()).unwrap();

        let err = reg.register("/a:GET", Series::timer()).unwrap_err();
        assert_eq!(err.code().as_str(), "DUPLICATE_SERIES");
    }

    #[test]
    fn remove_frees_the_name() {
        let reg = Registry::new();
        reg.register("/a:GET", Series::timer()).unwrap();

        assert!(reg.remove("/a:GET").is_some());
        assert!(reg.remove("/a:GET").is_none());
        reg.register("/a:GET", Series::timer()).unwrap();
    }

    #[test]
    fn into_wrong_kind_is_an_error() {
        let err = Series::counter().into_timer("GET").unwrap_err();
        match err {
            RouteMeterError::KindMismatch { name, expected, found } => {
                assert_eq!(name, "GET");
                assert_eq!(expected, SeriesKind::Timer);
                assert_eq!(found, SeriesKind::Counter);
            }
            other => unreachable!("unexpected error: {other}"),
        }
    }

    #[test]
    fn snapshot_serializes_with_kind_tag() {
        let reg = Registry::new();
        reg.register_if_absent("GET:Bytes", Series::counter())
            .into_counter("GET:Bytes")
            .unwrap()
            .inc(7);
        reg.register_if_absent("GET", Series::timer());

        let json = serde_json::to_value(reg.snapshot()).unwrap();
        assert_eq!(json["GET:Bytes"]["kind"], "counter");
        assert_eq!(json["GET:Bytes"]["value"], 7);
        assert_eq!(json["GET"]["kind"], "timer");
        assert_eq!(json["GET"]["count"], 0);
    }
}
