//! INI loading for [`LayerConfig`].

use std::path::Path;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::LayerConfig;
use crate::asset::TextureFilter;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFileError {
    fn invalid(section: &str, key: &str, value: &str, reason: &str) -> Self {
        ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl LayerConfig {
    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(text)
            .map_err(|e| ConfigFileError::ReadError(ini::Error::Parse(e)))?;
        parse_ini(&ini)
    }
}

/// Starts from `LayerConfig::default()` and overlays any values found in the INI.
fn parse_ini(ini: &Ini) -> Result<LayerConfig, ConfigFileError> {
    let mut config = LayerConfig::default();

    // [layer] section
    if let Some(section) = ini.section(Some("layer")) {
        if let Some(v) = section.get("subdomains") {
            let subdomains: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if subdomains.is_empty() {
                return Err(ConfigFileError::invalid(
                    "layer",
                    "subdomains",
                    v,
                    "must list at least one subdomain",
                ));
            }
            config.subdomains = subdomains;
        }
        if let Some(v) = section.get("origin_lat") {
            config.origin.lat = parse_f64("layer", "origin_lat", v)?;
        }
        if let Some(v) = section.get("origin_lon") {
            config.origin.lon = parse_f64("layer", "origin_lon", v)?;
        }
    }

    // [texture] section
    if let Some(section) = ini.section(Some("texture")) {
        if let Some(v) = section.get("depth_write") {
            config.depth_write = parse_bool("texture", "depth_write", v)?;
        }
        if let Some(v) = section.get("anisotropy") {
            config.sampling.anisotropy = v.trim().parse::<u8>().map_err(|_| {
                ConfigFileError::invalid("texture", "anisotropy", v, "must be 0-255")
            })?;
        }
        if let Some(v) = section.get("mag_filter") {
            config.sampling.mag_filter = parse_filter("mag_filter", v)?;
        }
        if let Some(v) = section.get("min_filter") {
            config.sampling.min_filter = parse_filter("min_filter", v)?;
        }
    }

    // [fetch] section
    if let Some(section) = ini.section(Some("fetch")) {
        if let Some(v) = section.get("timeout") {
            let secs = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| {
                    ConfigFileError::invalid("fetch", "timeout", v, "must be positive seconds")
                })?;
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = section.get("user_agent") {
            let v = v.trim();
            if !v.is_empty() {
                config.user_agent = v.to_string();
            }
        }
    }

    Ok(config)
}

fn parse_f64(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigFileError::invalid(section, key, value, "must be a number"))
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigFileError::invalid(
            section,
            key,
            value,
            "must be true or false",
        )),
    }
}

fn parse_filter(key: &str, value: &str) -> Result<TextureFilter, ConfigFileError> {
    value.trim().parse::<TextureFilter>().map_err(|_| {
        ConfigFileError::invalid(
            "texture",
            key,
            value,
            "must be one of: nearest, linear, linear_mipmap_linear",
        )
    })
}
