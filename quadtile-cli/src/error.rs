//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use quadtile::config::ConfigFileError;
use quadtile::coord::CoordError;
use quadtile::fetch::FetchError;
use quadtile::tile::TileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// Quadcode argument is malformed
    Quadcode(CoordError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to create the HTTP client
    HttpClient(FetchError),
    /// The tile could not be loaded
    Load(Option<TileError>),
    /// The tile did not settle in time
    Timeout { quadcode: String, secs: u64 },
    /// Failed to write output file
    FileWrite {
        path: String,
        error: image::ImageError,
    },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Load(Some(TileError::FetchFailed { .. })) => {
                eprintln!();
                eprintln!("Check that the template points at a reachable tile server,");
                eprintln!("for example: https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png");
            }
            CliError::Quadcode(_) => {
                eprintln!();
                eprintln!("A quadcode is a string of digits 0-3, one per zoom level.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Quadcode(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Load(Some(e)) => write!(f, "{}", e),
            CliError::Load(None) => write!(f, "Tile load aborted"),
            CliError::Timeout { quadcode, secs } => {
                write!(f, "Tile {} not loaded after {}s", quadcode, secs)
            }
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Quadcode(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Load(Some(e)) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Quadcode(e)
    }
}
