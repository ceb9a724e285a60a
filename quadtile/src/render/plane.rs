//! Flat plane placeholder factory.

use std::f64::consts::FRAC_PI_2;

use super::{Material, PlaneGeometry, Renderable, RenderableFactory, RenderError, Transform};
use crate::config::LayerConfig;
use crate::coord::WorldPoint;

/// Builds a square plane lying on the ground at the tile center.
///
/// The plane is rotated -90 degrees about X so its face points up, and
/// placed at `(center.x, 0, center.y)`. The material does not write depth
/// by default so overlapping tiles of different levels blend without
/// z-fighting.
#[derive(Debug, Clone, Copy)]
pub struct PlaneFactory {
    depth_write: bool,
}

impl PlaneFactory {
    pub fn new(depth_write: bool) -> Self {
        Self { depth_write }
    }

    pub fn from_config(config: &LayerConfig) -> Self {
        Self::new(config.depth_write)
    }
}

impl Default for PlaneFactory {
    fn default() -> Self {
        Self::new(false)
    }
}

impl RenderableFactory for PlaneFactory {
    fn create(&self, center: WorldPoint, side: f64) -> Result<Renderable, RenderError> {
        if !center.is_finite() || !side.is_finite() || side <= 0.0 {
            return Err(RenderError::MissingGeometry { side });
        }

        Ok(Renderable::new(
            Transform {
                position: [center.x, 0.0, center.y],
                rotation_x: -FRAC_PI_2,
            },
            PlaneGeometry {
                width: side,
                height: side,
            },
            Material::new(self.depth_write),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_position_and_size() {
        let renderable = PlaneFactory::default()
            .create(WorldPoint::new(100.0, -50.0), 25.0)
            .unwrap();

        assert_eq!(renderable.transform.position, [100.0, 0.0, -50.0]);
        assert_eq!(renderable.transform.rotation_x, -FRAC_PI_2);
        assert_eq!(renderable.geometry.width, 25.0);
        assert_eq!(renderable.geometry.height, 25.0);
        assert!(renderable.has_asset_slot());
        assert!(!renderable.material().unwrap().depth_write);
    }

    #[test]
    fn test_depth_write_from_config() {
        let config = LayerConfig {
            depth_write: true,
            ..LayerConfig::default()
        };
        let renderable = PlaneFactory::from_config(&config)
            .create(WorldPoint::new(0.0, 0.0), 1.0)
            .unwrap();
        assert!(renderable.material().unwrap().depth_write);
    }

    #[test]
    fn test_rejects_invalid_geometry() {
        let factory = PlaneFactory::default();
        assert!(factory.create(WorldPoint::new(0.0, 0.0), 0.0).is_err());
        assert!(factory.create(WorldPoint::new(0.0, 0.0), f64::NAN).is_err());
        assert!(factory
            .create(WorldPoint::new(f64::INFINITY, 0.0), 1.0)
            .is_err());
    }
}
