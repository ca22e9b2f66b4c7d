//! Tunable defaults for the analytics core, loaded from TOML.
//!
//! Every field is optional in the file; missing ones take the built-in
//! defaults.
//!
//! ```toml
//! cache_ttl_secs = 600
//! heat_zone_proximity_meters = 150.0
//! heat_zone_min_reports = 5
//! ```

use std::path::Path;

use chrono::TimeDelta;
use civic_report_analytics_models::{
    DEFAULT_HEAT_ZONE_MIN_REPORTS, DEFAULT_HEAT_ZONE_PROXIMITY_METERS, HeatZoneParams,
};
use civic_report_spatial::{DEFAULT_CLUSTER_PROXIMITY_METERS, DEFAULT_DUPLICATE_RADIUS_METERS};
use serde::{Deserialize, Serialize};

use crate::AnalyticsError;
use crate::cache::{DEFAULT_CACHE_TTL_SECS, ttl_from_secs};

/// Environment variable naming a config file to load.
pub const CONFIG_ENV_VAR: &str = "CIVIC_REPORT_CONFIG";

/// Analytics and spatial search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Lifetime of cached aggregates, in seconds.
    pub cache_ttl_secs: u64,
    /// Radius for location-based duplicate checks.
    pub duplicate_radius_meters: f64,
    /// Radius for map "nearby" searches.
    pub nearby_radius_meters: f64,
    /// Proximity for map clustering.
    pub cluster_proximity_meters: f64,
    /// Proximity for heat zone clustering.
    pub heat_zone_proximity_meters: f64,
    /// Smallest cluster reported as a heat zone.
    pub heat_zone_min_reports: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            duplicate_radius_meters: DEFAULT_DUPLICATE_RADIUS_METERS,
            nearby_radius_meters: DEFAULT_DUPLICATE_RADIUS_METERS,
            cluster_proximity_meters: DEFAULT_CLUSTER_PROXIMITY_METERS,
            heat_zone_proximity_meters: DEFAULT_HEAT_ZONE_PROXIMITY_METERS,
            heat_zone_min_reports: DEFAULT_HEAT_ZONE_MIN_REPORTS,
        }
    }
}

impl AnalyticsConfig {
    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Config`] if the TOML is malformed or a
    /// value is out of range.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, AnalyticsError> {
        let config: Self = toml::de::from_str(toml_str).map_err(|e| AnalyticsError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Config`] if the file cannot be read or
    /// fails [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, AnalyticsError> {
        let contents = std::fs::read_to_string(path).map_err(|e| AnalyticsError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded analytics config from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or the defaults when the
    /// variable is unset.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Config`] if the named file cannot be
    /// loaded.
    pub fn from_env() -> Result<Self, AnalyticsError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    /// Checks that every radius is positive and the TTL is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Config`] naming the first bad field.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.cache_ttl_secs == 0 {
            return Err(AnalyticsError::Config {
                message: "cache_ttl_secs must be greater than 0".to_string(),
            });
        }

        let radii = [
            ("duplicate_radius_meters", self.duplicate_radius_meters),
            ("nearby_radius_meters", self.nearby_radius_meters),
            ("cluster_proximity_meters", self.cluster_proximity_meters),
            ("heat_zone_proximity_meters", self.heat_zone_proximity_meters),
        ];
        for (name, value) in radii {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalyticsError::Config {
                    message: format!("{name} must be a positive number of meters, got {value}"),
                });
            }
        }

        Ok(())
    }

    /// Cache entry lifetime.
    #[must_use]
    pub fn cache_ttl(&self) -> TimeDelta {
        ttl_from_secs(self.cache_ttl_secs)
    }

    /// Heat zone parameters from this config.
    #[must_use]
    pub const fn heat_zone_params(&self) -> HeatZoneParams {
        HeatZoneParams {
            proximity_meters: self.heat_zone_proximity_meters,
            min_reports: self.heat_zone_min_reports,
        }
    }
}
