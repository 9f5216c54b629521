//! Config loader (strict parsing).

pub mod schema;

use std::fs;

use routemeter_core::error::{Result, RouteMeterError};

pub use schema::{MeterConfig, RecorderSection, ResolverKind, RoutesSection, ServerSection};

pub fn load_from_file(path: &str) -> Result<MeterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RouteMeterError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<MeterConfig> {
    let cfg: MeterConfig = serde_yaml::from_str(s)
        .map_err(|e| RouteMeterError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
