//! Quadcode addressing and tile geometry.
//!
//! Converts quadtree paths into XYZ tile coordinates, geographic bounds and
//! the world-space geometry (center and side length) a tile is drawn with.
//!
//! World space uses spherical Mercator metres measured from the layer
//! origin, with `y` pointing south:
//!
//! ```text
//!            -y (north)
//!                ▲
//!    ┌───────────┼───────────┐
//!    │    "0"    │    "1"    │
//! ───┼───────────●───────────┼──► +x (east)
//!    │    "2"    │    "3"    │
//!    └───────────┼───────────┘
//!                ▼
//!            +y (south)
//! ```
//!
//! # Example
//!
//! ```
//! use quadtile::coord::{tile_geometry, LatLon, Quadcode};
//!
//! let quadcode = Quadcode::parse("0123").unwrap();
//! let tile = quadcode.to_tile();
//! assert_eq!((tile.x, tile.y, tile.z), (5, 3, 4));
//!
//! let geometry = tile_geometry(&tile, LatLon::default());
//! assert!(geometry.is_valid());
//! ```

mod types;

pub use types::{
    CoordError, LatLon, LatLonBounds, Quadcode, TileCoord, TileGeometry, WorldBounds, WorldPoint,
    EARTH_RADIUS, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
};

use std::f64::consts::PI;

/// Longitude of the western edge of tile column `x` at zoom `z`.
#[inline]
pub fn tile_to_lon(x: u32, z: u8) -> f64 {
    let n = 2.0_f64.powi(z as i32);
    x as f64 / n * 360.0 - 180.0
}

/// Latitude of the northern edge of tile row `y` at zoom `z`.
#[inline]
pub fn tile_to_lat(y: u32, z: u8) -> f64 {
    let n = 2.0_f64.powi(z as i32);
    let m = PI - 2.0 * PI * y as f64 / n;
    m.sinh().atan().to_degrees()
}

/// Geographic bounds of a tile.
pub fn tile_bounds(tile: &TileCoord) -> LatLonBounds {
    LatLonBounds {
        west: tile_to_lon(tile.x, tile.z),
        south: tile_to_lat(tile.y + 1, tile.z),
        east: tile_to_lon(tile.x + 1, tile.z),
        north: tile_to_lat(tile.y, tile.z),
    }
}

/// Projects a geographic position into world space relative to `origin`.
///
/// Latitudes are clamped to the Web Mercator limits.
pub fn project(point: LatLon, origin: LatLon) -> WorldPoint {
    let (x, y) = mercator(point);
    let (ox, oy) = mercator(origin);
    WorldPoint::new(x - ox, -(y - oy))
}

fn mercator(point: LatLon) -> (f64, f64) {
    let lat = point.lat.clamp(MIN_LAT, MAX_LAT).to_radians();
    let x = EARTH_RADIUS * point.lon.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat / 2.0).tan().ln();
    (x, y)
}

/// Derives the world-space geometry of a tile.
///
/// The center is the midpoint of the projected bounds; the side is the
/// north-south extent measured along the western edge.
pub fn tile_geometry(tile: &TileCoord, origin: LatLon) -> TileGeometry {
    let bounds = tile_bounds(tile);

    let south_west = project(LatLon::new(bounds.south, bounds.west), origin);
    let north_east = project(LatLon::new(bounds.north, bounds.east), origin);

    let center = WorldPoint::new(
        south_west.x + (north_east.x - south_west.x) / 2.0,
        south_west.y + (north_east.y - south_west.y) / 2.0,
    );
    let side = (north_east.y - south_west.y).abs();

    TileGeometry {
        bounds: WorldBounds {
            south_west,
            north_east,
        },
        center,
        side,
    }
}
