//! Placeholder renderables and the asset attachment point.
//!
//! A tile's visual is built in two steps. First a [`RenderableFactory`]
//! produces a geometry-only placeholder sized and positioned from the
//! tile's center and side. When the texture arrives it is patched in
//! through [`Renderable::attach_asset`], the single mutable slot the core
//! touches.

mod plane;

pub use plane::PlaneFactory;

use thiserror::Error;

use crate::asset::AssetHandle;
use crate::coord::WorldPoint;

/// Errors raised while building or patching a renderable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// The tile geometry cannot position a renderable.
    #[error("Missing or invalid tile geometry (side = {side})")]
    MissingGeometry { side: f64 },

    /// The renderable has no material to receive an asset.
    #[error("Renderable has no asset slot")]
    MissingAssetSlot,
}

/// Position and orientation of a renderable in world space.
///
/// Positions use renderer axes: X east, Y up, Z south.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: [f64; 3],
    /// Rotation about the X axis, in radians.
    pub rotation_x: f64,
}

/// Flat quad geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGeometry {
    pub width: f64,
    pub height: f64,
}

/// Surface material holding the tile's asset slot.
#[derive(Debug, Clone)]
pub struct Material {
    pub depth_write: bool,
    texture: Option<AssetHandle>,
    version: u32,
}

impl Material {
    /// Creates a material with an empty texture slot.
    pub fn new(depth_write: bool) -> Self {
        Self {
            depth_write,
            texture: None,
            version: 0,
        }
    }

    /// The attached texture, if any.
    pub fn texture(&self) -> Option<&AssetHandle> {
        self.texture.as_ref()
    }

    /// Incremented on every change the renderer must upload.
    pub fn version(&self) -> u32 {
        self.version
    }
}

/// Geometry-only stand-in for a tile, later patched with its texture.
#[derive(Debug, Clone)]
pub struct Renderable {
    pub transform: Transform,
    pub geometry: PlaneGeometry,
    material: Option<Material>,
}

impl Renderable {
    pub fn new(transform: Transform, geometry: PlaneGeometry, material: Material) -> Self {
        Self {
            transform,
            geometry,
            material: Some(material),
        }
    }

    /// Returns true if the renderable can receive an asset.
    pub fn has_asset_slot(&self) -> bool {
        self.material.is_some()
    }

    /// The material, if the renderable still has one.
    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    /// Patch `asset` into the material's texture slot.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::MissingAssetSlot` if the material has been
    /// released; the renderable is left unchanged.
    pub fn attach_asset(&mut self, asset: AssetHandle) -> Result<(), RenderError> {
        let material = self.material.as_mut().ok_or(RenderError::MissingAssetSlot)?;
        material.texture = Some(asset);
        material.version = material.version.wrapping_add(1);
        Ok(())
    }

    /// The attached asset, if any.
    pub fn asset(&self) -> Option<&AssetHandle> {
        self.material.as_ref().and_then(Material::texture)
    }

    /// Drop the material and anything attached to it.
    pub fn release_material(&mut self) {
        self.material = None;
    }
}

/// Builds placeholder renderables.
pub trait RenderableFactory {
    /// Create an empty renderable of `side` x `side` centered on `center`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::MissingGeometry` if the inputs cannot describe
    /// a visible surface.
    fn create(&self, center: WorldPoint, side: f64) -> Result<Renderable, RenderError>;
}
