//! `quadtile info`: describe a tile without fetching it.

use std::path::PathBuf;

use clap::Args;
use quadtile::tile::TileBase;
use quadtile::url::{TileUrlBuilder, UrlTemplate};

use super::common::{load_config, parse_quadcode};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Quadcode of the tile (digits 0-3, empty for the root)
    pub quadcode: String,

    /// URL template with {x}, {y}, {z}, {s} and {quadcode} placeholders
    #[arg(long)]
    pub template: Option<String>,

    /// Layer config file (default: ~/.quadtile/layer.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: InfoArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let quadcode = parse_quadcode(&args.quadcode)?;
    let tile = TileBase::new(quadcode.clone(), &config);
    let coord = tile.coord();
    let bounds = tile.bounds();

    println!("Tile {}", if quadcode.as_str().is_empty() { "(root)" } else { quadcode.as_str() });
    println!("  Coordinate: z={} x={} y={}", coord.z, coord.x, coord.y);
    println!(
        "  Bounds:     W {:.6}  S {:.6}  E {:.6}  N {:.6}",
        bounds.west, bounds.south, bounds.east, bounds.north
    );
    if let Some(geometry) = tile.geometry() {
        println!(
            "  Center:     ({:.3}, {:.3}) m",
            geometry.center.x, geometry.center.y
        );
        println!("  Side:       {:.3} m", geometry.side);
    }

    if let Some(template) = args.template {
        let url = UrlTemplate::from_config(template, &config).tile_url(&coord, &quadcode);
        println!("  URL:        {}", url);
    }

    Ok(())
}
