//! Configuration file support for the BAC tools.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bac/config.toml`.

use crate::{Error, Result, Settings, Sex, WeightBounds};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub profile: ProfileConfig,

    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Starting physiology for each session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_weight_kg")]
    pub weight_kg: f64,

    #[serde(default)]
    pub sex: Sex,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            weight_kg: default_weight_kg(),
            sex: Sex::default(),
        }
    }
}

/// Sanity bounds applied to user-entered weights
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_min_weight_kg")]
    pub min_weight_kg: f64,

    #[serde(default = "default_max_weight_kg")]
    pub max_weight_kg: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_weight_kg: default_min_weight_kg(),
            max_weight_kg: default_max_weight_kg(),
        }
    }
}

// Default value functions
fn default_weight_kg() -> f64 {
    crate::DEFAULT_WEIGHT_KG
}

fn default_min_weight_kg() -> f64 {
    crate::MIN_WEIGHT_KG
}

fn default_max_weight_kg() -> f64 {
    crate::MAX_WEIGHT_KG
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => {
                let home = std::env::var("HOME").map_err(|_| {
                    Error::Config("HOME environment variable not set".into())
                })?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("bac").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check that limits are usable and the profile weight sits inside them
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if !(limits.min_weight_kg.is_finite() && limits.min_weight_kg > 0.0) {
            return Err(Error::Config(format!(
                "min_weight_kg must be positive, got {}",
                limits.min_weight_kg
            )));
        }
        if !(limits.max_weight_kg.is_finite() && limits.max_weight_kg >= limits.min_weight_kg) {
            return Err(Error::Config(format!(
                "max_weight_kg ({}) must be at least min_weight_kg ({})",
                limits.max_weight_kg, limits.min_weight_kg
            )));
        }
        if !self.weight_bounds().contains(self.profile.weight_kg) {
            return Err(Error::Config(format!(
                "profile weight {} kg outside {}..={} kg",
                self.profile.weight_kg, limits.min_weight_kg, limits.max_weight_kg
            )));
        }
        Ok(())
    }

    pub fn weight_bounds(&self) -> WeightBounds {
        WeightBounds {
            min_kg: self.limits.min_weight_kg,
            max_kg: self.limits.max_weight_kg,
        }
    }

    /// Initial engine settings from the profile section
    pub fn engine_settings(&self) -> Settings {
        Settings {
            weight_kg: self.profile.weight_kg,
            sex: self.profile.sex,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.profile.weight_kg, 70.0);
        assert_eq!(config.profile.sex, Sex::Male);
        assert_eq!(config.limits.min_weight_kg, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.profile.sex = Sex::Female;
        config.profile.weight_kg = 61.5;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.profile.sex, Sex::Female);
        assert_eq!(parsed.profile.weight_kg, 61.5);
        assert!(toml_str.contains("sex = \"female\""));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[profile]
sex = "female"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.profile.sex, Sex::Female);
        assert_eq!(config.profile.weight_kg, 70.0); // default
        assert_eq!(config.limits.max_weight_kg, 400.0); // default
    }

    #[test]
    fn test_validate_rejects_weight_outside_limits() {
        let mut config = Config::default();
        config.profile.weight_kg = 0.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_limits() {
        let mut config = Config::default();
        config.limits.min_weight_kg = 100.0;
        config.limits.max_weight_kg = 50.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profile.weight_kg = 90.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.profile.weight_kg, 90.0);
        assert_eq!(loaded.engine_settings().weight_kg, 90.0);
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[profile\nweight_kg = ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Toml(_))));
    }

    #[test]
    fn test_engine_settings_and_bounds() {
        let config = Config::default();
        assert_eq!(config.engine_settings(), Settings::default());
        assert_eq!(config.weight_bounds(), WeightBounds::default());
    }
}
