//! Top-level facade crate for routemeter.
//!
//! Re-exports the metrics core and the axum integration so users can depend on a single crate.

pub mod core {
    pub use routemeter_core::*;
}

pub mod http {
    pub use routemeter_http::*;
}
