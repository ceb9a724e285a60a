//! Coordinate type definitions

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Deepest quadtree level a quadcode may address.
pub const MAX_ZOOM: u8 = 24;

/// Earth radius used by the spherical Mercator projection, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Errors that can occur when parsing or converting tile addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// Quadcode contains characters other than 0-3 or is too deep
    #[error(
        "Invalid quadcode: '{0}' (must contain only digits 0-3 and length <= {})",
        MAX_ZOOM
    )]
    InvalidQuadcode(String),

    /// Zoom level is outside valid range
    #[error("Invalid zoom level: {0} (must be <= {})", MAX_ZOOM)]
    InvalidZoom(u8),

    /// Tile column/row does not exist at its zoom level
    #[error("Invalid tile: x={x}, y={y} does not exist at zoom {z}")]
    InvalidTile { x: u32, y: u32, z: u8 },
}

/// Path of a node in the tile quadtree.
///
/// Each character selects one of the four children of the previous level:
/// `0` north-west, `1` north-east, `2` south-west, `3` south-east. The
/// length of the path is the zoom level; the empty quadcode is the root.
///
/// A `Quadcode` is validated once when parsed, so every tile built from one
/// can derive its geometry without a failure path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quadcode(String);

impl Quadcode {
    /// Parse and validate a quadcode string.
    pub fn parse(code: &str) -> Result<Self, CoordError> {
        if code.len() > MAX_ZOOM as usize || !code.bytes().all(|b| (b'0'..=b'3').contains(&b)) {
            return Err(CoordError::InvalidQuadcode(code.to_string()));
        }
        Ok(Self(code.to_string()))
    }

    /// Returns the quadcode as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Depth of the node in the tree, which is also its zoom level.
    pub fn depth(&self) -> u8 {
        // Bounded by MAX_ZOOM at parse time.
        self.0.len() as u8
    }

    /// Converts the quadcode into XYZ tile coordinates.
    pub fn to_tile(&self) -> TileCoord {
        let z = self.depth();
        let mut x = 0u32;
        let mut y = 0u32;

        for (i, digit) in self.0.bytes().enumerate() {
            let mask = 1u32 << (z as usize - 1 - i);
            match digit {
                b'1' => x |= mask,
                b'2' => y |= mask,
                b'3' => {
                    x |= mask;
                    y |= mask;
                }
                _ => {}
            }
        }

        TileCoord { x, y, z }
    }
}

impl FromStr for Quadcode {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Quadcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Quadcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tile coordinates in the XYZ (slippy map) scheme.
///
/// `x` grows eastward from the antimeridian, `y` grows southward from the
/// northern Mercator limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column (west to east)
    pub x: u32,
    /// Row (north to south)
    pub y: u32,
    /// Zoom level
    pub z: u8,
}

impl TileCoord {
    /// Create tile coordinates, validating them against the zoom level.
    pub fn new(x: u32, y: u32, z: u8) -> Result<Self, CoordError> {
        if z > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(z));
        }
        let n = 1u64 << z;
        if u64::from(x) >= n || u64::from(y) >= n {
            return Err(CoordError::InvalidTile { x, y, z });
        }
        Ok(Self { x, y, z })
    }

    /// Converts the tile back into its quadcode path.
    pub fn to_quadcode(&self) -> Quadcode {
        let mut code = String::with_capacity(self.z as usize);
        for i in (1..=self.z).rev() {
            let mask = 1u32 << (i - 1);
            let mut digit = b'0';
            if self.x & mask != 0 {
                digit += 1;
            }
            if self.y & mask != 0 {
                digit += 2;
            }
            code.push(digit as char);
        }
        Quadcode(code)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Geographic extent of a tile in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLonBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Position in world space, in projected metres relative to the layer origin.
///
/// `y` points south so that the ground plane maps onto a renderer's X/Z axes
/// with Z increasing toward the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Extent of a tile in world space.
///
/// `south_west` and `north_east` keep the geographic corner naming; with a
/// south-pointing `y` axis the south-west corner has the larger `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub south_west: WorldPoint,
    pub north_east: WorldPoint,
}

/// Geometry derived once from a quadcode: where the tile sits and how big it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGeometry {
    pub bounds: WorldBounds,
    pub center: WorldPoint,
    pub side: f64,
}

impl TileGeometry {
    /// Returns true if the geometry can position a renderable.
    pub fn is_valid(&self) -> bool {
        self.center.is_finite() && self.side.is_finite() && self.side > 0.0
    }
}
