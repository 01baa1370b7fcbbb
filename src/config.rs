use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conversion settings. Defaults match the precision the legacy tool
/// printed and keep curve flattening fine enough for icon-scale art.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum distance between a cubic and its polygonal approximation
    /// when outlines are flattened for the union.
    pub flatten_tolerance: f64,
    /// Decimal places in the output path-data string (trailing zeros are
    /// trimmed).
    pub precision: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flatten_tolerance: 0.1,
            precision: 3,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    flatten_tolerance: Option<f64>,
    precision: Option<usize>,
}

/// Load settings from an optional JSON config file; fields not present
/// keep their defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(v) = parsed.flatten_tolerance {
        config.flatten_tolerance = v;
    }
    if let Some(v) = parsed.precision {
        config.precision = v;
    }
    Ok(config)
}
