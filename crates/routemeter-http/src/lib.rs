//! routemeter HTTP integration.
//!
//! This crate plugs the routemeter core into axum: a metering middleware with
//! an observing response body and a background recorder, a matched-path
//! route resolver, strict YAML config, and a small demo server. It is
//! intended to be consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod meter;
pub mod ops;
pub mod router;
pub mod services;
