//! Decoded tile assets.
//!
//! Fetched bytes are turned into a [`Texture`] by an [`AssetDecoder`] and
//! shared with the renderable through an [`AssetHandle`]. The core does not
//! care about the image codec; it only distinguishes a decoded texture from
//! a [`DecodeError`].

mod decoder;

pub use decoder::ImageDecoder;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use image::RgbaImage;
use thiserror::Error;

/// Shared reference to a decoded texture.
pub type AssetHandle = Rc<Texture>;

/// Errors that can occur while decoding fetched content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The response body was empty.
    #[error("Empty asset body")]
    Empty,

    /// The body is not a readable image.
    #[error("Image decode failed: {0}")]
    Image(String),
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
    /// Trilinear filtering across mip levels.
    LinearMipmapLinear,
}

impl FromStr for TextureFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(TextureFilter::Nearest),
            "linear" => Ok(TextureFilter::Linear),
            "linear_mipmap_linear" | "trilinear" => Ok(TextureFilter::LinearMipmapLinear),
            other => Err(format!("unknown texture filter '{}'", other)),
        }
    }
}

impl fmt::Display for TextureFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureFilter::Nearest => "nearest",
            TextureFilter::Linear => "linear",
            TextureFilter::LinearMipmapLinear => "linear_mipmap_linear",
        };
        f.write_str(name)
    }
}

/// How a renderer should sample a tile texture.
///
/// Linear magnification with trilinear minification keeps imagery smooth
/// when the camera is tilted toward the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSampling {
    pub mag_filter: TextureFilter,
    pub min_filter: TextureFilter,
    pub anisotropy: u8,
}

/// A decoded RGBA texture ready to attach to a renderable.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    image: RgbaImage,
    sampling: TextureSampling,
}

impl Texture {
    pub fn new(image: RgbaImage, sampling: TextureSampling) -> Self {
        Self { image, sampling }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn sampling(&self) -> TextureSampling {
        self.sampling
    }
}

/// Turns fetched bytes into a texture.
pub trait AssetDecoder {
    /// Decode `bytes` into a texture.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the content is empty or unreadable. A decode
    /// failure ends the current request for the tile; it is never retried.
    fn decode(&self, bytes: &[u8]) -> Result<Texture, DecodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_str() {
        assert_eq!("nearest".parse(), Ok(TextureFilter::Nearest));
        assert_eq!("LINEAR".parse(), Ok(TextureFilter::Linear));
        assert_eq!("trilinear".parse(), Ok(TextureFilter::LinearMipmapLinear));
        assert!("cubic".parse::<TextureFilter>().is_err());
    }

    #[test]
    fn test_filter_display_parses_back() {
        for filter in [
            TextureFilter::Nearest,
            TextureFilter::Linear,
            TextureFilter::LinearMipmapLinear,
        ] {
            assert_eq!(filter.to_string().parse(), Ok(filter));
        }
    }

    #[test]
    fn test_texture_dimensions() {
        let sampling = TextureSampling {
            mag_filter: TextureFilter::Linear,
            min_filter: TextureFilter::Linear,
            anisotropy: 1,
        };
        let texture = Texture::new(RgbaImage::new(256, 128), sampling);
        assert_eq!(texture.width(), 256);
        assert_eq!(texture.height(), 128);
        assert_eq!(texture.sampling(), sampling);
    }
}
