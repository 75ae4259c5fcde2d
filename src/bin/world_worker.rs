//! Elevation worker over stdio
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout:
//!
//! ```text
//! {"command":"generate","seed":42,"width":4,"height":4}
//! {"mapData":[{"x":0,"y":0,"elevation":-0.30,"owner":null}, ...]}
//! ```

use std::path::PathBuf;

use clap::Parser;
use dominion::worldgen::worker::handle_json_line;
use dominion::worldgen::WorldWorker;
use dominion::GameConfig;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "world_worker")]
#[command(about = "Answer elevation requests on stdin with map data on stdout")]
struct Args {
    /// TOML config whose [world.noise] section tunes the generator
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> dominion::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let worker = WorldWorker::spawn(config.world.noise.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    tracing::info!("world worker ready");
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_json_line(&worker, &line).await;
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    worker.shutdown().await;
    Ok(())
}
