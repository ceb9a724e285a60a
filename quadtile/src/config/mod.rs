//! Layer configuration.
//!
//! [`LayerConfig`] carries the settings shared by every tile of a layer:
//! URL subdomains, the world origin, placeholder material and texture
//! sampling options, and HTTP fetch settings. It can be built in code or
//! loaded from an INI file (see [`LayerConfig::load_from`]).
//!
//! # File Format
//!
//! ```ini
//! [layer]
//! subdomains = a,b,c
//! origin_lat = 51.5
//! origin_lon = -0.12
//!
//! [texture]
//! depth_write = false
//! anisotropy = 4
//! mag_filter = linear
//! min_filter = linear_mipmap_linear
//!
//! [fetch]
//! timeout = 30
//! user_agent = quadtile/0.1
//! ```

mod file;

pub use file::ConfigFileError;

use std::path::PathBuf;
use std::time::Duration;

use crate::asset::{TextureFilter, TextureSampling};
use crate::coord::LatLon;

/// Default request timeout for tile fetches, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default anisotropic filtering level applied to tile textures.
pub const DEFAULT_ANISOTROPY: u8 = 4;

/// Default User-Agent for tile requests.
///
/// Some tile servers reject requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("quadtile/", env!("CARGO_PKG_VERSION"));

/// Settings shared by all tiles of one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerConfig {
    /// Subdomains substituted for `{s}` in URL templates.
    pub subdomains: Vec<String>,

    /// Geographic position mapped to the world-space origin.
    pub origin: LatLon,

    /// Whether placeholder materials write to the depth buffer.
    pub depth_write: bool,

    /// Sampling settings stamped on every decoded texture.
    pub sampling: TextureSampling,

    /// Timeout for a single tile request.
    pub fetch_timeout: Duration,

    /// User-Agent header sent with tile requests.
    pub user_agent: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            origin: LatLon::default(),
            depth_write: false,
            sampling: TextureSampling {
                mag_filter: TextureFilter::Linear,
                min_filter: TextureFilter::LinearMipmapLinear,
                anisotropy: DEFAULT_ANISOTROPY,
            },
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl LayerConfig {
    /// Set the URL subdomains.
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// Set the world origin.
    pub fn with_origin(mut self, origin: LatLon) -> Self {
        self.origin = origin;
        self
    }

    /// Set the texture sampling settings.
    pub fn with_sampling(mut self, sampling: TextureSampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Get the path to the config directory (~/.quadtile).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".quadtile")
}

/// Get the path to the layer config file (~/.quadtile/layer.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("layer.ini")
}
