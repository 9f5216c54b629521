//! routemeter demo server
//!
//! - Serves a few sample routes plus `/healthz` and `/metrics`
//! - Every request is metered per route, method and status
//! - Config path: first argument, or `routemeter.yaml`

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use routemeter_http::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "routemeter.yaml".to_string());
    let cfg = config::load_from_file(&path).expect("config load failed");
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(&cfg).expect("app state init failed");
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "routemeter starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    state.meter().recorder().flush().await;
    tracing::info!("routemeter stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed; shutting down");
    }
}
