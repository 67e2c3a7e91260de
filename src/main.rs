//! C4 PlantUML to draw.io conversion service
//!
//! A small HTTP service with three routes:
//!
//! - `GET /` serves an embedded UI for interactive conversion
//! - `GET /health` reports service status and version as JSON
//! - `POST /convert` turns PlantUML C4 text into a draw.io XML download,
//!   with layout options taken from the query string
//!
//! Every response carries CORS headers so browser clients can read error
//! bodies. Requests are independent; the only process-wide state is the
//! configuration loaded at startup.

mod config;
mod convert;
mod handler;
mod http;
mod logger;
mod server;

use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, honoring the configured worker count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg));
    server::run(listener, state).await
}
