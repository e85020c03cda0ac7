//! pollpulse server binary.
//!
//! Demo HTTP server for the streaming poll engine:
//! - `/poll`: long-poll (single JSON reply after `timeout` ms)
//! - `/poll?interval=...` and `/sse`: SSE stream, one event per tick
//! - `/`, `/health`: liveness, `/metrics`: Prometheus scrape

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use pollpulse_server::{app_state, config, router};

const CONFIG_ENV: &str = "POLLPULSE_CONFIG";
const CONFIG_DEFAULT_PATH: &str = "pollpulse.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_DEFAULT_PATH.to_string());
    let cfg = config::load_or_default(&path).expect("config load failed");
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg);
    let app = router::build_router(state);

    tracing::info!(%listen, "pollpulse-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
