//! Core domain types for the BAC estimator.
//!
//! This module defines:
//! - Model constants (alcohol density, metabolism, sweet-spot target)
//! - Sex and the per-sex distribution constant
//! - Physiological settings and their accepted bounds
//! - Read-only outputs (sober estimate, engine snapshot)

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Model Constants
// ============================================================================

/// Density of ethanol in g/mL
pub const ALCOHOL_DENSITY_G_PER_ML: f64 = 0.79;

/// BAC percentage points cleared by the liver per hour
pub const METABOLISM_BAC_PER_HOUR: f64 = 0.015;

/// BAC the sweet-spot suggestion aims for
pub const SWEET_SPOT_BAC: f64 = 0.10;

pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const MIN_WEIGHT_KG: f64 = 20.0;
pub const MAX_WEIGHT_KG: f64 = 400.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

// ============================================================================
// Sex
// ============================================================================

/// Biological sex, selecting the body-water distribution constant
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    /// Fraction of body weight alcohol distributes into
    pub fn distribution_constant(self) -> f64 {
        match self {
            Sex::Male => 0.68,
            Sex::Female => 0.55,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("male"),
            Sex::Female => f.write_str("female"),
        }
    }
}

impl FromStr for Sex {
    type Err = Error;

    /// Accepts `male`/`m`/`1` and `female`/`f`/`2`, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "1" => Ok(Sex::Male),
            "female" | "f" | "2" => Ok(Sex::Female),
            other => Err(Error::Input(format!("unknown sex '{}'", other))),
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Accepted range for body weight
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightBounds {
    pub min_kg: f64,
    pub max_kg: f64,
}

impl WeightBounds {
    pub fn contains(&self, weight_kg: f64) -> bool {
        weight_kg.is_finite() && weight_kg >= self.min_kg && weight_kg <= self.max_kg
    }

    /// Positive, finite and ordered; anything else could admit a zero weight
    pub fn is_valid(&self) -> bool {
        self.min_kg.is_finite()
            && self.min_kg > 0.0
            && self.max_kg.is_finite()
            && self.max_kg >= self.min_kg
    }

    /// Pull `weight_kg` into range; unusable bounds leave it unchanged
    pub fn clamp(&self, weight_kg: f64) -> f64 {
        if self.is_valid() {
            weight_kg.clamp(self.min_kg, self.max_kg)
        } else {
            weight_kg
        }
    }
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self {
            min_kg: MIN_WEIGHT_KG,
            max_kg: MAX_WEIGHT_KG,
        }
    }
}

/// User physiology the model depends on
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub weight_kg: f64,
    pub sex: Sex,
}

impl Settings {
    /// Effective distribution volume in grams
    pub fn distribution_weight_grams(&self) -> f64 {
        1000.0 * self.weight_kg * self.sex.distribution_constant()
    }

    /// Grams of alcohol the liver clears per hour
    pub fn metabolic_rate_g_per_h(&self) -> f64 {
        METABOLISM_BAC_PER_HOUR / 100.0 * self.distribution_weight_grams()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weight_kg: DEFAULT_WEIGHT_KG,
            sex: Sex::Male,
        }
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// Estimated time until no alcohol remains
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SoberEstimate {
    SoberNow,
    SoberIn(Duration),
}

impl SoberEstimate {
    pub fn is_sober(&self) -> bool {
        matches!(self, SoberEstimate::SoberNow)
    }

    pub fn as_duration(&self) -> Duration {
        match self {
            SoberEstimate::SoberNow => Duration::ZERO,
            SoberEstimate::SoberIn(d) => *d,
        }
    }
}

impl fmt::Display for SoberEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let remaining = match self {
            SoberEstimate::SoberNow => return f.write_str("sober now"),
            SoberEstimate::SoberIn(d) => d,
        };

        let total_minutes = (remaining.as_secs_f64() / 60.0).round() as u64;
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;

        match (hours, minutes) {
            (0, 0) => f.write_str("<1min"),
            (h, 0) => write!(f, "{}h", h),
            (0, m) => write!(f, "{}min", m),
            (h, m) => write!(f, "{}h {}min", h, m),
        }
    }
}

/// Read-only view of the engine for display and JSON output
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EngineSnapshot {
    pub grams_of_alcohol: f64,
    pub bac: f64,
    pub promille: f64,
    pub weight_kg: f64,
    pub sex: Sex,
    pub distribution_weight_grams: f64,
    pub metabolic_rate_g_per_h: f64,
    pub seconds_until_sober: f64,
}

/// Seconds needed to clear `grams` at `rate_g_per_h`
pub(crate) fn seconds_to_clear(grams: f64, rate_g_per_h: f64) -> f64 {
    grams / rate_g_per_h * SECONDS_PER_HOUR
}

/// Grams cleared at `rate_g_per_h` over `elapsed`
pub(crate) fn grams_cleared(rate_g_per_h: f64, elapsed: Duration) -> f64 {
    rate_g_per_h * elapsed.as_secs_f64() / SECONDS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_weight_default_male() {
        let settings = Settings::default();
        assert!((settings.distribution_weight_grams() - 47_600.0).abs() < 1e-9);
        assert!((settings.metabolic_rate_g_per_h() - 7.14).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_weight_positive_for_valid_settings() {
        let bounds = WeightBounds::default();
        for weight in [bounds.min_kg, 55.5, 70.0, 123.4, bounds.max_kg] {
            for sex in [Sex::Male, Sex::Female] {
                let settings = Settings { weight_kg: weight, sex };
                assert!(settings.distribution_weight_grams() > 0.0);
                assert!(settings.metabolic_rate_g_per_h() > 0.0);
            }
        }
    }

    #[test]
    fn test_sex_from_str() {
        assert_eq!("Male".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!(" f ".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("2".parse::<Sex>().unwrap(), Sex::Female);
        assert!("other".parse::<Sex>().is_err());
    }

    #[test]
    fn test_weight_bounds() {
        let bounds = WeightBounds::default();
        assert!(bounds.contains(70.0));
        assert!(!bounds.contains(0.5));
        assert!(!bounds.contains(-70.0));
        assert!(!bounds.contains(f64::NAN));
        assert!(!bounds.contains(f64::INFINITY));
    }

    #[test]
    fn test_weight_bounds_validity() {
        assert!(WeightBounds::default().is_valid());
        assert!(!WeightBounds { min_kg: 0.0, max_kg: 100.0 }.is_valid());
        assert!(!WeightBounds { min_kg: -5.0, max_kg: 100.0 }.is_valid());
        assert!(!WeightBounds { min_kg: 80.0, max_kg: 40.0 }.is_valid());
        assert!(!WeightBounds { min_kg: f64::NAN, max_kg: 100.0 }.is_valid());

        let bounds = WeightBounds { min_kg: 100.0, max_kg: 150.0 };
        assert_eq!(bounds.clamp(70.0), 100.0);
        assert_eq!(bounds.clamp(200.0), 150.0);
    }

    #[test]
    fn test_sober_estimate_display_saturated() {
        let text = SoberEstimate::SoberIn(Duration::MAX).to_string();
        assert!(text.ends_with('h') || text.contains("min"));
    }

    #[test]
    fn test_sober_estimate_display() {
        assert_eq!(SoberEstimate::SoberNow.to_string(), "sober now");
        assert_eq!(
            SoberEstimate::SoberIn(Duration::from_secs(2 * 3600)).to_string(),
            "2h"
        );
        assert_eq!(
            SoberEstimate::SoberIn(Duration::from_secs(45 * 60)).to_string(),
            "45min"
        );
        assert_eq!(
            SoberEstimate::SoberIn(Duration::from_secs(3600 + 50 * 60 + 40)).to_string(),
            "1h 51min"
        );
        assert_eq!(
            SoberEstimate::SoberIn(Duration::from_secs(20)).to_string(),
            "<1min"
        );
    }

    #[test]
    fn test_sex_serde_lowercase() {
        let json = serde_json::to_string(&Sex::Female).unwrap();
        assert_eq!(json, "\"female\"");
    }
}
