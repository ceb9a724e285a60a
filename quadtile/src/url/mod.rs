//! Tile URL construction.
//!
//! Tiles never format URLs themselves; they ask a [`TileUrlBuilder`] for the
//! fetch key of their coordinate. [`UrlTemplate`] covers the common
//! slippy-map style templates:
//!
//! ```
//! use quadtile::coord::Quadcode;
//! use quadtile::url::{TileUrlBuilder, UrlTemplate};
//!
//! let quadcode = Quadcode::parse("0123").unwrap();
//! let template = UrlTemplate::new("https://tiles.example.com/{z}/{x}/{y}.png");
//! assert_eq!(
//!     template.tile_url(&quadcode.to_tile(), &quadcode),
//!     "https://tiles.example.com/4/5/3.png"
//! );
//! ```

use crate::config::LayerConfig;
use crate::coord::{Quadcode, TileCoord};

/// Builds the fetch key for a tile.
///
/// Implementations must be pure: the same tile always maps to the same URL.
pub trait TileUrlBuilder {
    fn tile_url(&self, tile: &TileCoord, quadcode: &Quadcode) -> String;
}

/// A URL template with `{x}`, `{y}`, `{z}`, `{s}` and `{quadcode}`
/// placeholders.
///
/// `{s}` rotates through the configured subdomains by `(x + y) % n` so
/// neighbouring tiles spread across hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
    subdomains: Vec<String>,
}

impl UrlTemplate {
    /// Creates a template without subdomains. `{s}` is left as-is.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            subdomains: Vec::new(),
        }
    }

    /// Creates a template using the layer's subdomains.
    pub fn from_config(template: impl Into<String>, config: &LayerConfig) -> Self {
        Self::new(template).with_subdomains(config.subdomains.iter().cloned())
    }

    /// Set the subdomains used for `{s}`. Empty entries are ignored.
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.is_empty())
            .collect();
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn subdomain(&self, tile: &TileCoord) -> Option<&str> {
        if self.subdomains.is_empty() {
            return None;
        }
        let index = (u64::from(tile.x) + u64::from(tile.y)) % self.subdomains.len() as u64;
        self.subdomains.get(index as usize).map(String::as_str)
    }
}

impl TileUrlBuilder for UrlTemplate {
    fn tile_url(&self, tile: &TileCoord, quadcode: &Quadcode) -> String {
        let mut url = self
            .template
            .replace("{quadcode}", quadcode.as_str())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{z}", &tile.z.to_string());

        if let Some(subdomain) = self.subdomain(tile) {
            url = url.replace("{s}", subdomain);
        }

        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_for(template: &UrlTemplate, code: &str) -> String {
        let quadcode = Quadcode::parse(code).unwrap();
        template.tile_url(&quadcode.to_tile(), &quadcode)
    }

    #[test]
    fn test_xyz_substitution() {
        let template = UrlTemplate::new("http://host/{z}/{x}/{y}.png");
        assert_eq!(url_for(&template, "0123"), "http://host/4/5/3.png");
    }

    #[test]
    fn test_quadcode_substitution() {
        let template = UrlTemplate::new("http://host/tiles/{quadcode}.jpeg");
        assert_eq!(url_for(&template, "0123"), "http://host/tiles/0123.jpeg");
    }

    #[test]
    fn test_root_tile() {
        let template = UrlTemplate::new("http://host/{z}/{x}/{y}.png?q={quadcode}");
        assert_eq!(url_for(&template, ""), "http://host/0/0/0.png?q=");
    }

    #[test]
    fn test_subdomain_rotation() {
        let template =
            UrlTemplate::new("http://{s}.host/{z}/{x}/{y}.png").with_subdomains(["a", "b", "c"]);

        // "0123" is x=5, y=3: (5 + 3) % 3 = 2
        assert_eq!(url_for(&template, "0123"), "http://c.host/4/5/3.png");
        // "1" is x=1, y=0
        assert_eq!(url_for(&template, "1"), "http://b.host/1/1/0.png");
        assert_eq!(url_for(&template, "0"), "http://a.host/1/0/0.png");
    }

    #[test]
    fn test_subdomains_from_config() {
        let config = LayerConfig::default().with_subdomains(["t0", "", "t1"]);
        let template = UrlTemplate::from_config("http://{s}.host/{quadcode}", &config);
        assert_eq!(url_for(&template, "1"), "http://t1.host/1");
    }

    #[test]
    fn test_no_subdomains_leaves_placeholder() {
        let template = UrlTemplate::new("http://{s}.host/{z}");
        assert_eq!(url_for(&template, "2"), "http://{s}.host/1");
    }

    #[test]
    fn test_deterministic() {
        let template = UrlTemplate::from_config(
            "http://{s}.host/{z}/{x}/{y}",
            &LayerConfig::default(),
        );
        assert_eq!(url_for(&template, "0312"), url_for(&template, "0312"));
    }
}
