//! Identity and lifecycle flags shared by every tile variant.

use std::cell::RefCell;

use tracing::trace;

use super::Tile;
use crate::config::LayerConfig;
use crate::coord::{tile_bounds, tile_geometry, LatLonBounds, Quadcode, TileCoord, TileGeometry};

/// Identity fields and lifecycle flags of a tile.
///
/// Identity is derived once from the quadcode at construction. The
/// `destroyed` flag is a latch: once set it never clears.
#[derive(Debug, Clone)]
pub struct TileBase {
    quadcode: Quadcode,
    coord: TileCoord,
    bounds: LatLonBounds,
    geometry: Option<TileGeometry>,
    ready: bool,
    destroyed: bool,
}

impl TileBase {
    /// Derives the tile's coordinate, bounds and world geometry.
    pub fn new(quadcode: Quadcode, config: &LayerConfig) -> Self {
        let coord = quadcode.to_tile();
        let bounds = tile_bounds(&coord);
        let geometry = Some(tile_geometry(&coord, config.origin));

        Self {
            quadcode,
            coord,
            bounds,
            geometry,
            ready: false,
            destroyed: false,
        }
    }

    pub fn quadcode(&self) -> &Quadcode {
        &self.quadcode
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn bounds(&self) -> LatLonBounds {
        self.bounds
    }

    /// World geometry, released on destroy.
    pub fn geometry(&self) -> Option<&TileGeometry> {
        self.geometry.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn set_ready(&mut self, ready: bool) {
        self.ready = ready && !self.destroyed;
    }

    #[cfg(test)]
    pub(crate) fn clear_geometry(&mut self) {
        self.geometry = None;
    }

    /// Marks the tile destroyed and releases the geometry.
    ///
    /// Returns true only for the call that performed the transition.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.ready = false;
        self.geometry = None;
        trace!(quadcode = %self.quadcode, "tile destroyed");
        true
    }
}

/// A tile with no content of its own.
///
/// `request_async` is a no-op hook; only identity and lifecycle flags are
/// tracked.
#[derive(Debug)]
pub struct BaseTile {
    base: RefCell<TileBase>,
    quadcode: Quadcode,
}

impl BaseTile {
    pub fn new(quadcode: Quadcode, config: &LayerConfig) -> Self {
        Self {
            base: RefCell::new(TileBase::new(quadcode.clone(), config)),
            quadcode,
        }
    }

    /// A snapshot of the tile's identity and flags.
    pub fn base(&self) -> TileBase {
        self.base.borrow().clone()
    }
}

impl Tile for BaseTile {
    fn quadcode(&self) -> &Quadcode {
        &self.quadcode
    }

    fn request_async(&self) {}

    fn destroy(&self) {
        self.base.borrow_mut().destroy();
    }

    fn is_ready(&self) -> bool {
        self.base.borrow().is_ready()
    }

    fn is_destroyed(&self) -> bool {
        self.base.borrow().is_destroyed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_base(code: &str) -> TileBase {
        TileBase::new(Quadcode::parse(code).unwrap(), &LayerConfig::default())
    }

    #[test]
    fn test_identity_derived_from_quadcode() {
        let base = test_base("0123");

        assert_eq!(base.quadcode().as_str(), "0123");
        assert_eq!(base.coord(), TileCoord::new(5, 3, 4).unwrap());
        assert!(base.bounds().west < base.bounds().east);
        assert!(base.bounds().south < base.bounds().north);
        assert!(base.geometry().unwrap().is_valid());
        assert!(!base.is_ready());
        assert!(!base.is_destroyed());
    }

    #[test]
    fn test_destroy_latch() {
        let mut base = test_base("1");
        base.set_ready(true);

        assert!(base.destroy());
        assert!(!base.destroy());
        assert!(base.is_destroyed());
        assert!(!base.is_ready());
        assert!(base.geometry().is_none());
    }

    #[test]
    fn test_ready_cannot_be_set_after_destroy() {
        let mut base = test_base("2");
        base.destroy();
        base.set_ready(true);
        assert!(!base.is_ready());
    }

    #[test]
    fn test_base_tile_request_is_noop() {
        let tile = BaseTile::new(Quadcode::parse("03").unwrap(), &LayerConfig::default());

        tile.request_async();
        tile.request_async();

        assert!(!tile.is_ready());
        assert!(!tile.is_destroyed());
        assert!(tile.base().geometry().is_some());
    }

    #[test]
    fn test_base_tile_destroy_idempotent() {
        let tile = BaseTile::new(Quadcode::parse("03").unwrap(), &LayerConfig::default());

        tile.destroy();
        tile.destroy();

        assert!(tile.is_destroyed());
        assert!(tile.base().geometry().is_none());
    }

    #[test]
    fn test_tile_trait_object() {
        let tiles: Vec<Box<dyn Tile>> = vec![
            Box::new(BaseTile::new(Quadcode::parse("0").unwrap(), &LayerConfig::default())),
            Box::new(BaseTile::new(Quadcode::parse("1").unwrap(), &LayerConfig::default())),
        ];

        for tile in &tiles {
            tile.destroy();
        }

        assert!(tiles.iter().all(|t| t.is_destroyed()));
        assert_eq!(tiles[1].quadcode().as_str(), "1");
    }
}
