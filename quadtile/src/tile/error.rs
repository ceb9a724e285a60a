//! Failures absorbed by tiles.
//!
//! None of these are returned to the tile's owner. A tile records the last
//! one it absorbed so it can be inspected through `last_error()`.

use thiserror::Error;

use crate::asset::DecodeError;
use crate::coord::Quadcode;
use crate::fetch::FetchError;

/// Why loading a tile's asset failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors a tile can encounter during its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// The placeholder could not be built from the tile's geometry.
    #[error("Tile {quadcode} has no usable geometry")]
    MissingGeometry { quadcode: Quadcode },

    /// The asset could not be fetched or decoded.
    #[error("Failed to load tile {quadcode}: {source}")]
    FetchFailed {
        quadcode: Quadcode,
        #[source]
        source: LoadError,
    },

    /// A fetch completed after the tile or its renderable was released.
    #[error("Stale completion for tile {quadcode}")]
    StaleCompletion { quadcode: Quadcode },
}

impl TileError {
    /// The quadcode of the tile that absorbed this error.
    pub fn quadcode(&self) -> &Quadcode {
        match self {
            TileError::MissingGeometry { quadcode }
            | TileError::FetchFailed { quadcode, .. }
            | TileError::StaleCompletion { quadcode } => quadcode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let quadcode = Quadcode::parse("0123").unwrap();

        let err = TileError::MissingGeometry {
            quadcode: quadcode.clone(),
        };
        assert_eq!(err.to_string(), "Tile 0123 has no usable geometry");

        let err = TileError::FetchFailed {
            quadcode: quadcode.clone(),
            source: LoadError::Fetch(FetchError::Status {
                status: 404,
                url: "http://host/4/5/3.png".to_string(),
            }),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load tile 0123: HTTP 404 from http://host/4/5/3.png"
        );

        let err = TileError::StaleCompletion { quadcode };
        assert_eq!(err.to_string(), "Stale completion for tile 0123");
    }

    #[test]
    fn test_load_error_from() {
        let err: LoadError = DecodeError::Empty.into();
        assert!(matches!(err, LoadError::Decode(DecodeError::Empty)));

        let err: LoadError = FetchError::Cancelled.into();
        assert!(matches!(err, LoadError::Fetch(FetchError::Cancelled)));
    }

    #[test]
    fn test_quadcode_accessor() {
        let quadcode = Quadcode::parse("3").unwrap();
        let err = TileError::StaleCompletion {
            quadcode: quadcode.clone(),
        };
        assert_eq!(err.quadcode(), &quadcode);
    }
}
