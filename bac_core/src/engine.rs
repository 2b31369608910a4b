//! BAC accumulation engine.
//!
//! The engine tracks grams of alcohol in the body and applies metabolic
//! decay lazily: elapsed time is only charged when `record_drink` or `tick`
//! is called. There is no background timer.

use crate::clock::{Clock, SystemClock};
use crate::types::{grams_cleared, seconds_to_clear};
use crate::{
    EngineSnapshot, Settings, Sex, SoberEstimate, WeightBounds, ALCOHOL_DENSITY_G_PER_ML,
    SWEET_SPOT_BAC,
};
use std::time::{Duration, Instant};

/// Session-scoped BAC state
#[derive(Debug)]
pub struct BacEngine<C: Clock = SystemClock> {
    clock: C,
    grams_of_alcohol: f64,
    settings: Settings,
    bounds: WeightBounds,
    metabolic_rate_g_per_h: f64,
    last_update: Instant,
}

impl BacEngine<SystemClock> {
    /// Create an engine on the system monotonic clock with default settings
    pub fn new() -> Self {
        Self::with_clock(SystemClock, Settings::default(), WeightBounds::default())
    }
}

impl Default for BacEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> BacEngine<C> {
    /// Create an engine with explicit clock, initial settings and weight bounds
    ///
    /// Unusable bounds are replaced by the defaults. An initial weight outside
    /// the bounds falls back to the default weight, clamped into the bounds.
    pub fn with_clock(clock: C, settings: Settings, bounds: WeightBounds) -> Self {
        let bounds = if bounds.is_valid() {
            bounds
        } else {
            tracing::warn!(
                "Invalid weight bounds {}..={} kg, using defaults",
                bounds.min_kg,
                bounds.max_kg
            );
            WeightBounds::default()
        };

        let weight_kg = if bounds.contains(settings.weight_kg) {
            settings.weight_kg
        } else {
            let fallback = bounds.clamp(Settings::default().weight_kg);
            tracing::warn!(
                "Initial weight {} kg outside {}..={} kg, using {} kg",
                settings.weight_kg,
                bounds.min_kg,
                bounds.max_kg,
                fallback
            );
            fallback
        };
        let settings = Settings {
            weight_kg,
            sex: settings.sex,
        };

        let last_update = clock.now();
        Self {
            clock,
            grams_of_alcohol: 0.0,
            settings,
            bounds,
            metabolic_rate_g_per_h: settings.metabolic_rate_g_per_h(),
            last_update,
        }
    }

    /// Log a drink, charging metabolism for the time since the last update
    ///
    /// Negative, non-finite or out-of-range amounts contribute nothing.
    pub fn record_drink(&mut self, volume_ml: f64, abv_percent: f64) {
        let elapsed = self.take_elapsed();
        self.refresh_metabolic_rate();

        let decayed = grams_cleared(self.metabolic_rate_g_per_h, elapsed);
        let added = alcohol_grams(volume_ml, abv_percent);

        self.grams_of_alcohol = (self.grams_of_alcohol + added - decayed).clamp(0.0, f64::MAX);

        tracing::debug!(
            "Drink {} mL @ {}%: +{:.3} g, -{:.3} g over {:?}, now {:.3} g",
            volume_ml,
            abv_percent,
            added,
            decayed,
            elapsed,
            self.grams_of_alcohol
        );
    }

    /// Apply decay for the time since the last update without adding a drink
    pub fn tick(&mut self) {
        let elapsed = self.take_elapsed();
        self.refresh_metabolic_rate();

        let decayed = grams_cleared(self.metabolic_rate_g_per_h, elapsed);
        self.grams_of_alcohol = (self.grams_of_alcohol - decayed).max(0.0);

        tracing::debug!(
            "Tick: -{:.3} g over {:?}, now {:.3} g",
            decayed,
            elapsed,
            self.grams_of_alcohol
        );
    }

    /// Clear all alcohol; weight and sex are kept
    ///
    /// The elapsed-time reference restarts here, so idle time before the
    /// reset is never charged against the next drink.
    pub fn reset(&mut self) {
        self.grams_of_alcohol = 0.0;
        self.last_update = self.clock.now();
        self.refresh_metabolic_rate();
        tracing::info!("Engine reset");
    }

    /// Store whichever settings are provided and valid
    ///
    /// Weights outside the configured bounds are ignored and the previous
    /// weight is kept. Returns the effective settings.
    pub fn update_settings(&mut self, weight_kg: Option<f64>, sex: Option<Sex>) -> Settings {
        if let Some(weight) = weight_kg {
            if self.bounds.contains(weight) {
                self.settings.weight_kg = weight;
                tracing::info!("Weight set to {} kg", weight);
            } else {
                tracing::warn!(
                    "Rejected weight {} kg (allowed {}..={}), keeping {} kg",
                    weight,
                    self.bounds.min_kg,
                    self.bounds.max_kg,
                    self.settings.weight_kg
                );
            }
        }

        if let Some(sex) = sex {
            self.settings.sex = sex;
            tracing::info!("Sex set to {}", sex);
        }

        self.refresh_metabolic_rate();
        self.settings
    }

    /// Current BAC in percent; does not apply decay
    pub fn current_bac(&self) -> f64 {
        self.grams_of_alcohol / self.settings.distribution_weight_grams() * 100.0
    }

    /// Current BAC in promille (‰)
    pub fn current_promille(&self) -> f64 {
        self.current_bac() * 10.0
    }

    pub fn time_until_sober(&self) -> SoberEstimate {
        if self.grams_of_alcohol <= 0.0 {
            return SoberEstimate::SoberNow;
        }

        let secs = seconds_to_clear(self.grams_of_alcohol, self.metabolic_rate_g_per_h);
        SoberEstimate::SoberIn(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }

    /// Additional volume at `abv_percent` that brings BAC to exactly 0.10
    ///
    /// `None` once BAC is at or above the target, or when the strength is
    /// not a positive percentage.
    pub fn sweet_spot_volume_ml(&self, abv_percent: f64) -> Option<f64> {
        let bac = self.current_bac();
        if bac >= SWEET_SPOT_BAC || !valid_abv(abv_percent) || abv_percent == 0.0 {
            return None;
        }

        let top = (SWEET_SPOT_BAC - bac)
            * 10.0
            * self.settings.weight_kg
            * self.settings.sex.distribution_constant();
        let bottom = ALCOHOL_DENSITY_G_PER_ML * (abv_percent / 100.0);
        Some(top / bottom)
    }

    pub fn grams_of_alcohol(&self) -> f64 {
        self.grams_of_alcohol
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn weight_bounds(&self) -> WeightBounds {
        self.bounds
    }

    pub fn metabolic_rate_g_per_h(&self) -> f64 {
        self.metabolic_rate_g_per_h
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            grams_of_alcohol: self.grams_of_alcohol,
            bac: self.current_bac(),
            promille: self.current_promille(),
            weight_kg: self.settings.weight_kg,
            sex: self.settings.sex,
            distribution_weight_grams: self.settings.distribution_weight_grams(),
            metabolic_rate_g_per_h: self.metabolic_rate_g_per_h,
            seconds_until_sober: self.time_until_sober().as_duration().as_secs_f64(),
        }
    }

    fn take_elapsed(&mut self) -> Duration {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last_update);
        self.last_update = now;
        elapsed
    }

    fn refresh_metabolic_rate(&mut self) {
        self.metabolic_rate_g_per_h = self.settings.metabolic_rate_g_per_h();
    }
}

fn valid_abv(abv_percent: f64) -> bool {
    abv_percent.is_finite() && (0.0..=100.0).contains(&abv_percent)
}

/// Grams of ethanol in a drink; nonsensical amounts count as zero
fn alcohol_grams(volume_ml: f64, abv_percent: f64) -> f64 {
    let volume_ml = if volume_ml.is_finite() && volume_ml > 0.0 {
        volume_ml
    } else {
        0.0
    };
    let abv_percent = if valid_abv(abv_percent) {
        abv_percent
    } else {
        tracing::warn!("Ignoring strength {}%", abv_percent);
        0.0
    };

    let grams = ALCOHOL_DENSITY_G_PER_ML * volume_ml * (abv_percent / 100.0);
    grams.min(f64::MAX)
}
