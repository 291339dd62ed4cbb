//! Drawguess relay server
//!
//! # Usage
//! ```bash
//! drawguess --port 8765
//! drawguess --words words.txt --snapshot-dir snapshots
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use drawguess_rs::config::{ServerConfig, DEFAULT_OUTBOUND_CAPACITY, DEFAULT_PORT, WS_PATH};
use drawguess_rs::game::{GameState, WordPool};
use drawguess_rs::room::Relay;
use drawguess_rs::{app, AppState};

/// Drawguess - gesture drawing and guessing relay
#[derive(Parser, Debug)]
#[command(name = "drawguess")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "DRAWGUESS_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "DRAWGUESS_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory holding the browser client
    #[arg(long, env = "DRAWGUESS_STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Word list file, one word per line
    #[arg(short, long, env = "DRAWGUESS_WORDS")]
    words: Option<PathBuf>,

    /// Archive each correctly guessed drawing here
    #[arg(long, env = "DRAWGUESS_SNAPSHOT_DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Per-connection outbound queue depth
    #[arg(long, env = "DRAWGUESS_OUTBOUND_CAPACITY", default_value_t = DEFAULT_OUTBOUND_CAPACITY)]
    outbound_capacity: usize,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "drawguess=info,drawguess_rs=info,tower_http=info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            static_dir: self.static_dir,
            words_file: self.words,
            snapshot_dir: self.snapshot_dir,
            outbound_capacity: self.outbound_capacity,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.into_config();

    let words = match &config.words_file {
        Some(path) => WordPool::from_file(path)
            .with_context(|| format!("Failed to load word list from {:?}", path))?,
        None => WordPool::default(),
    };
    tracing::info!("Loaded {} words", words.len());

    let game = GameState::new(words).context("Failed to create game state")?;
    let mut relay = Relay::new(game);
    if let Some(dir) = &config.snapshot_dir {
        relay = relay.with_snapshot_dir(dir);
    }

    let state = AppState::new(relay).with_outbound_capacity(config.outbound_capacity());
    let router = app(state, &config.static_dir);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Drawguess relay running on ws://{}{}", addr, WS_PATH);
    tracing::info!("   Browser client served from {:?}", config.static_dir);

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
