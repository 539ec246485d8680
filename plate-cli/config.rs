use plate_core::default_thread_count;
use plate_fast::DetectorConfig;
use plate_geometry::{Interpolation, RansacConfig};

use crate::error::{AlignError, AlignResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::path::Path;

/// Everything the registration pipeline can be tuned with
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlignConfig {
    /// Keypoints kept per channel, strongest first
    pub max_features: usize,
    /// Share of matches, best first, passed on to homography estimation
    pub keep_fraction: f32,
    /// Size of the global worker pool
    pub n_threads: usize,
    pub interpolation: Interpolation,
    pub detector: DetectorConfig,
    pub ransac: RansacConfig,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            keep_fraction: 0.1,
            n_threads: default_thread_count(),
            interpolation: Interpolation::Bilinear,
            detector: DetectorConfig::default(),
            ransac: RansacConfig::default(),
        }
    }
}

impl AlignConfig {
    pub fn validate(&self) -> AlignResult<()> {
        if self.max_features == 0 {
            return Err(AlignError::InvalidConfig("max_features must be at least 1".into()));
        }
        if !(self.keep_fraction > 0.0 && self.keep_fraction <= 1.0) {
            return Err(AlignError::InvalidConfig(format!(
                "keep_fraction must be in (0, 1], got {}",
                self.keep_fraction
            )));
        }
        if self.n_threads == 0 {
            return Err(AlignError::InvalidConfig("n_threads must be at least 1".into()));
        }
        self.detector.validate().map_err(|e| AlignError::InvalidConfig(e.to_string()))?;
        self.ransac.validate().map_err(|e| AlignError::InvalidConfig(e.to_string()))?;
        Ok(())
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        format!(
            "max_features={} keep_fraction={} threads={} interpolation={:?} ransac(threshold={}, seed={}) detector[{}]",
            self.max_features,
            self.keep_fraction,
            self.n_threads,
            self.interpolation,
            self.ransac.reproj_threshold,
            self.ransac.seed,
            self.detector.summary()
        )
    }

    /// Load from a `.json` file, or TOML for any other extension
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<Path>>(path: P) -> AlignResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| config_error(path, e))?;
        let config = if is_json(path) { Self::from_json(&content) } else { Self::from_toml(&content) };
        config.map_err(|e| match e {
            AlignError::InvalidConfig(message) => AlignError::Config { path: path.to_path_buf(), message },
            other => other,
        })
    }

    /// Save as JSON or TOML, chosen by extension like `load`
    #[cfg(feature = "serde")]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> AlignResult<()> {
        let path = path.as_ref();
        let text = if is_json(path) {
            self.to_json().map_err(|e| config_error(path, e))?
        } else {
            self.to_toml().map_err(|e| config_error(path, e))?
        };
        std::fs::write(path, text).map_err(|e| config_error(path, e))
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> AlignResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| AlignError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> AlignResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| AlignError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "serde")]
fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(feature = "serde")]
fn config_error(path: &Path, err: impl std::fmt::Display) -> AlignError {
    AlignError::Config { path: path.to_path_buf(), message: err.to_string() }
}
