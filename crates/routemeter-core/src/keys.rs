//! Series naming.
//!
//! Names are colon-joined and must stay byte-for-byte stable, since dashboards
//! key on them:
//!
//! | name                   | kind    |
//! |------------------------|---------|
//! | `method`               | timer   |
//! | `method:status`        | timer   |
//! | `path:method`          | timer   |
//! | `path:method:status`   | timer   |
//! | `method:Bytes`         | counter |
//! | `path:method:Bytes`    | counter |

/// Suffix of the byte counters.
pub const BYTES: &str = "Bytes";

/// `path:method`, the per-route base key.
pub fn route_key(method: &str, path: &str) -> String {
    format!("{path}:{method}")
}

/// The four timer names updated for one observation.
pub fn timer_names(method: &str, path: &str, status: u16) -> [String; 4] {
    let route = route_key(method, path);
    [
        method.to_string(),
        format!("{method}:{status}"),
        format!("{route}:{status}"),
        route,
    ]
}

/// The two byte counter names updated for one observation.
pub fn counter_names(method: &str, path: &str) -> [String; 2] {
    [
        format!("{method}:{BYTES}"),
        format!("{}:{BYTES}", route_key(method, path)),
    ]
}
