//! `quadtile fetch`: load one tile from a live server.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Args;
use quadtile::fetch::HttpFetcher;
use quadtile::scheduler::LocalScheduler;
use quadtile::tile::{AssetTile, LayerContext, LoadState, Tile};
use quadtile::url::UrlTemplate;
use tokio::task::LocalSet;
use tracing::{debug, info};

use super::common::{load_config, parse_quadcode};
use crate::error::CliError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Quadcode of the tile (digits 0-3, empty for the root)
    pub quadcode: String,

    /// URL template with {x}, {y}, {z}, {s} and {quadcode} placeholders
    #[arg(long)]
    pub template: String,

    /// Layer config file (default: ~/.quadtile/layer.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the decoded texture to this PNG file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Give up after this many seconds (default: the configured fetch timeout)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Destroy the tile after this many milliseconds, cancelling the fetch
    #[arg(long)]
    pub destroy_after: Option<u64>,
}

pub fn run(args: FetchArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(secs) = args.timeout {
        config = config.with_fetch_timeout(Duration::from_secs(secs));
    }
    let quadcode = parse_quadcode(&args.quadcode)?;
    let deadline = config.fetch_timeout;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let local = Rc::new(LocalSet::new());
    let fetcher = HttpFetcher::new(Rc::clone(&local), &config).map_err(CliError::HttpClient)?;
    let layer = LayerContext::new(
        config.clone(),
        Rc::new(LocalScheduler::new(Rc::clone(&local))),
        Rc::new(fetcher),
    );
    let path = Rc::new(UrlTemplate::from_config(args.template, &config));
    let tile = AssetTile::new(quadcode, path, &layer);

    info!(quadcode = %tile.quadcode(), url = %tile.url(), "requesting tile");
    tile.request_async();

    let destroy_after = args.destroy_after.map(Duration::from_millis);
    let started = Instant::now();
    runtime.block_on(local.run_until(drive(&tile, destroy_after, deadline)));
    let elapsed = started.elapsed();

    match tile.load_state() {
        LoadState::Attached => {
            let Some(asset) = tile.asset() else {
                return Err(CliError::Load(tile.last_error()));
            };
            println!(
                "Loaded {} ({}x{}) in {:.2?}",
                tile.quadcode(),
                asset.width(),
                asset.height(),
                elapsed
            );
            if let Some(output) = args.output {
                asset
                    .image()
                    .save(&output)
                    .map_err(|error| CliError::FileWrite {
                        path: output.display().to_string(),
                        error,
                    })?;
                println!("Saved texture to {}", output.display());
            }
            Ok(())
        }
        LoadState::Destroyed => {
            println!(
                "Tile {} destroyed after {:.2?}; pending fetch cancelled",
                tile.quadcode(),
                elapsed
            );
            Ok(())
        }
        LoadState::Failed | LoadState::Aborted => Err(CliError::Load(tile.last_error())),
        _ => Err(CliError::Timeout {
            quadcode: tile.quadcode().to_string(),
            secs: deadline.as_secs(),
        }),
    }
}

/// Let the tile progress until it settles, the deadline passes, or it is
/// time to destroy it.
async fn drive(tile: &AssetTile, destroy_after: Option<Duration>, deadline: Duration) {
    let started = Instant::now();

    loop {
        if tile.load_state().is_settled() {
            return;
        }
        if destroy_after.is_some_and(|after| started.elapsed() >= after) {
            debug!(quadcode = %tile.quadcode(), "destroying tile early");
            tile.destroy();
            // Give the cancelled request a turn to unwind.
            tokio::task::yield_now().await;
            return;
        }
        if started.elapsed() >= deadline {
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
