//! Common helpers shared across CLI commands.

use std::path::Path;

use quadtile::config::{config_file_path, LayerConfig};
use quadtile::coord::Quadcode;

use crate::error::CliError;

/// Load the layer config from `path`, or from `~/.quadtile/layer.ini`.
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<LayerConfig, CliError> {
    let config = match path {
        Some(path) => LayerConfig::load_from(path)?,
        None => LayerConfig::load_from(&config_file_path())?,
    };
    Ok(config)
}

/// Parse a quadcode argument.
pub fn parse_quadcode(code: &str) -> Result<Quadcode, CliError> {
    Ok(Quadcode::parse(code)?)
}
