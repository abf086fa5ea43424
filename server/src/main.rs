use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::info;
use panelcore::store::{ReadingStore, SqliteStore};
use panelcore::telemetry::MetricsRecorder;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

use config::{Args, ServerConfig};
use http::limit::RateLimiter;

mod config;
mod http;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = ServerConfig::resolve(&args)?;

    // The store must be reachable before any traffic is served.
    let store: Arc<dyn ReadingStore> = Arc::new(
        SqliteStore::open(&config.database)
            .with_context(|| format!("opening reading store at {}", config.database.display()))?,
    );
    store
        .ping()
        .context("reading store unreachable at startup")?;

    let metrics = Arc::new(MetricsRecorder::new());
    let limiter = Arc::new(RateLimiter::default());
    let routes = http::routes::router(
        store.clone(),
        limiter,
        metrics.clone(),
        &config.static_dir,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating server runtime")?;
    runtime.block_on(async {
        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async {
                let _ = signal::ctrl_c().await;
            })
            .with_context(|| format!("binding listener on {}", addr))?;
        info!("listening on {}", bound);
        server.await;
        Ok::<(), anyhow::Error>(())
    })?;

    let (reads, writes, rejections, store_errors) = metrics.snapshot();
    info!(
        "shutting down: {} reads, {} writes, {} rejections, {} store errors",
        reads, writes, rejections, store_errors
    );
    store.close().context("closing reading store")?;
    Ok(())
}
