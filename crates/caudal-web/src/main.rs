mod debounce;
mod handlers;
mod models;
mod state;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use caudal_loader::Loader;

use crate::state::{AppState, Source, ViewHub};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path or http(s) URL of the transactions JSON file
    #[arg(default_value = "transactions.json")]
    source: String,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Quiet window for coalescing rapid filter submissions, in milliseconds
    #[arg(long, default_value_t = debounce::DEFAULT_WINDOW.as_millis() as u64)]
    debounce_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let tera = handlers::templates()?;

    let hub = Arc::new(ViewHub::new(Source::from_arg(&args.source), Loader::new()));

    // A failed initial load is not fatal; the API answers 503 until a
    // reload succeeds.
    if let Err(reason) = hub.reload().await {
        tracing::error!(source = %hub.source, %reason, "initial load failed");
    }

    let state = AppState::new(hub, tera, Duration::from_millis(args.debounce_ms));
    let app = handlers::router(state);

    let host: IpAddr = args.host.parse()?;
    let addr = SocketAddr::new(host, args.port);
    println!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
