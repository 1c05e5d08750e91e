//! Planner defaults, environment overrides and logging setup

use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub const BOIL_OFF_ENV: &str = "BREWDAY_DEFAULT_BOIL_OFF_L_PER_HOUR";
pub const TRUB_LOSS_ENV: &str = "BREWDAY_DEFAULT_TRUB_LOSS_L";
pub const EFFICIENCY_ENV: &str = "BREWDAY_DEFAULT_EFFICIENCY_PCT";

/// Values the planner falls back to when a batch snapshot or equipment
/// profile leaves them out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerDefaults {
    pub original_gravity: f64,
    pub final_gravity: f64,
    pub efficiency_pct: f64,
    pub boil_off_l_per_hour: f64,
    pub trub_loss_liters: f64,
    pub grain_temp_c: f64,
}

impl Default for PlannerDefaults {
    fn default() -> Self {
        Self {
            original_gravity: 1.050,
            final_gravity: 1.012,
            efficiency_pct: 70.0,
            boil_off_l_per_hour: 3.0,
            trub_loss_liters: 1.0,
            grain_temp_c: 20.0,
        }
    }
}

impl PlannerDefaults {
    /// Defaults with overrides from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults with overrides from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            boil_off_l_per_hour: override_value(&lookup, BOIL_OFF_ENV, defaults.boil_off_l_per_hour),
            trub_loss_liters: override_value(&lookup, TRUB_LOSS_ENV, defaults.trub_loss_liters),
            efficiency_pct: override_value(&lookup, EFFICIENCY_ENV, defaults.efficiency_pct),
            ..defaults
        }
    }
}

fn override_value(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: f64) -> f64 {
    let Some(raw) = lookup(key) else {
        return fallback;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => {
            warn!(key, value = %raw, "ignoring unparsable planner default");
            fallback
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
