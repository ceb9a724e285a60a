//! Image decoder backed by the `image` crate.

use super::{AssetDecoder, DecodeError, Texture, TextureSampling};
use crate::config::LayerConfig;

/// Decodes PNG, JPEG and the other formats `image` recognises.
///
/// The format is guessed from the content, so tile servers that send the
/// wrong extension or content type still decode.
#[derive(Debug, Clone, Copy)]
pub struct ImageDecoder {
    sampling: TextureSampling,
}

impl ImageDecoder {
    /// Creates a decoder that stamps `sampling` onto every texture.
    pub fn new(sampling: TextureSampling) -> Self {
        Self { sampling }
    }

    /// Creates a decoder using the layer's sampling settings.
    pub fn from_config(config: &LayerConfig) -> Self {
        Self::new(config.sampling)
    }
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::from_config(&LayerConfig::default())
    }
}

impl AssetDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Texture, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let image = image::load_from_memory(bytes)
            .map_err(|e| DecodeError::Image(e.to_string()))?
            .to_rgba8();

        Ok(Texture::new(image, self.sampling))
    }
}
