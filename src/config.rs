//! Prediction engine configuration.
//!
//! `Config` is plain serde data so it can be loaded from JSON, TOML, or built
//! in code with the `with_*` helpers.

use crate::error::{ForestError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration.
///
/// # Example
///
/// ```rust
/// use reachforest::Config;
///
/// let config = Config::default().with_grid_size(100);
/// assert_eq!(config.grid_size, 100);
///
/// let json = r#"{ "grid_size": 20, "probability_threshold": 0.01 }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.grid_size, 20);
/// assert_eq!(config.bbox_padding_deg, 0.002);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Number of rows and columns of the spatial grid (G in a G×G grid)
    #[serde(default = "Config::default_grid_size")]
    pub grid_size: usize,

    /// Padding in degrees added around every edge's bounding box
    #[serde(default = "Config::default_bbox_padding")]
    pub bbox_padding_deg: f64,

    /// Travel distance budget (km) a reachability tree expands to
    #[serde(default = "Config::default_time_range")]
    pub time_range_km: f64,

    /// Probability a node must exceed to be recorded for an object
    #[serde(default)]
    pub probability_threshold: f64,

    /// Default radius (km) used to collect candidate roots
    #[serde(default = "Config::default_neighbor_radius")]
    pub neighbor_radius_km: f64,
}

impl Config {
    const fn default_grid_size() -> usize {
        50
    }

    const fn default_bbox_padding() -> f64 {
        0.002
    }

    fn default_time_range() -> f64 {
        Self::time_range_for(20.0, 10.0)
    }

    const fn default_neighbor_radius() -> f64 {
        0.2
    }

    /// Distance budget covered at `speed` over a `minutes` horizon.
    ///
    /// Mirrors the experiment parameters: `speed * 2 * minutes / 60 / 1.6`.
    pub fn time_range_for(speed: f64, minutes: f64) -> f64 {
        speed * 2.0 * minutes / 60.0 / 1.6
    }

    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        assert!(grid_size > 0, "Grid size must be greater than zero");
        self.grid_size = grid_size;
        self
    }

    pub fn with_bbox_padding(mut self, padding_deg: f64) -> Self {
        assert!(
            padding_deg.is_finite() && padding_deg >= 0.0,
            "Bounding box padding must be a non-negative number"
        );
        self.bbox_padding_deg = padding_deg;
        self
    }

    pub fn with_time_range(mut self, time_range_km: f64) -> Self {
        assert!(
            time_range_km.is_finite() && time_range_km >= 0.0,
            "Time range must be a non-negative number"
        );
        self.time_range_km = time_range_km;
        self
    }

    pub fn with_probability_threshold(mut self, threshold: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&threshold),
            "Probability threshold must be within [0, 1]"
        );
        self.probability_threshold = threshold;
        self
    }

    pub fn with_neighbor_radius(mut self, radius_km: f64) -> Self {
        assert!(
            radius_km.is_finite() && radius_km >= 0.0,
            "Neighbor radius must be a non-negative number"
        );
        self.neighbor_radius_km = radius_km;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(ForestError::InvalidConfig(
                "grid_size must be greater than zero".to_string(),
            ));
        }

        if self.grid_size > 10_000 {
            log::warn!(
                "Grid size of {} allocates {} cells and may consume significant memory",
                self.grid_size,
                self.grid_size * self.grid_size
            );
        }

        if !self.bbox_padding_deg.is_finite() || self.bbox_padding_deg < 0.0 {
            return Err(ForestError::InvalidConfig(
                "bbox_padding_deg must be a non-negative number".to_string(),
            ));
        }

        if !self.time_range_km.is_finite() || self.time_range_km < 0.0 {
            return Err(ForestError::InvalidConfig(
                "time_range_km must be a non-negative number".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.probability_threshold) {
            return Err(ForestError::InvalidConfig(
                "probability_threshold must be within [0, 1]".to_string(),
            ));
        }

        if !self.neighbor_radius_km.is_finite() || self.neighbor_radius_km < 0.0 {
            return Err(ForestError::InvalidConfig(
                "neighbor_radius_km must be a non-negative number".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a file, choosing the format by extension.
    ///
    /// `.toml` files need the `toml` feature; everything else is read as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            #[cfg(feature = "toml")]
            Some("toml") => Self::from_toml(&contents),
            #[cfg(not(feature = "toml"))]
            Some("toml") => Err(ForestError::InvalidConfig(format!(
                "{} is TOML but the toml feature is disabled",
                path.display()
            ))),
            _ => Self::from_json(&contents),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: Self::default_grid_size(),
            bbox_padding_deg: Self::default_bbox_padding(),
            time_range_km: Self::default_time_range(),
            probability_threshold: 0.0,
            neighbor_radius_km: Self::default_neighbor_radius(),
        }
    }
}
