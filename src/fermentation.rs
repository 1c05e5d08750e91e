//! Fermentation trend from logged gravity and temperature readings

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{FermentationReading, round_to};

const PLATEAU_WINDOW: f64 = 0.0015;
const PLATEAU_MIN_GRAVITY: f64 = 1.020;
const TEMP_LOW_C: f64 = 16.0;
const TEMP_HIGH_C: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendAlert {
    NoReadings,
    Plateau,
    HighTemperature,
    LowTemperature,
    Stable,
}

impl TrendAlert {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoReadings => "No fermentation readings logged yet.",
            Self::Plateau => {
                "Gravity has flattened recently while still high. Check yeast health and fermentation conditions."
            }
            Self::HighTemperature => "Latest fermentation temperature is high for many ale profiles.",
            Self::LowTemperature => "Latest fermentation temperature is low and may slow yeast activity.",
            Self::Stable => "Fermentation trend appears stable.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FermentationTrend {
    pub batch_id: i64,
    pub reading_count: usize,
    pub first_recorded_at: Option<DateTime<Utc>>,
    pub latest_recorded_at: Option<DateTime<Utc>>,
    pub latest_gravity: Option<f64>,
    pub latest_temp_c: Option<f64>,
    pub latest_ph: Option<f64>,
    pub gravity_drop: Option<f64>,
    pub average_hourly_gravity_drop: Option<f64>,
    pub plateau_risk: bool,
    pub temperature_warning: bool,
    pub alerts: Vec<TrendAlert>,
}

/// Summarize readings for one batch. Readings may arrive in any order.
pub fn analyze(batch_id: i64, readings: &[FermentationReading]) -> FermentationTrend {
    let mut ordered: Vec<&FermentationReading> = readings.iter().collect();
    ordered.sort_by_key(|reading| reading.recorded_at);

    let gravities: Vec<(DateTime<Utc>, f64)> = ordered
        .iter()
        .filter_map(|reading| reading.gravity.map(|g| (reading.recorded_at, g)))
        .collect();

    let (gravity_drop, average_hourly_gravity_drop) = match (gravities.first(), gravities.last()) {
        (Some((first_at, first)), Some((last_at, last))) if gravities.len() >= 2 => {
            let drop = first - last;
            let hours = (*last_at - *first_at).num_seconds() as f64 / 3600.0;
            let rate = (hours > 0.0).then(|| round_to(drop / hours, 5));
            (Some(round_to(drop, 4)), rate)
        }
        _ => (None, None),
    };

    let plateau_risk = match gravities.as_slice() {
        [.., (_, a), (_, b), (_, c)] => {
            let high = a.max(*b).max(*c);
            let low = a.min(*b).min(*c);
            high - low <= PLATEAU_WINDOW && *c > PLATEAU_MIN_GRAVITY
        }
        _ => false,
    };

    let latest = ordered.last();
    let latest_temp = latest.and_then(|reading| reading.temp_c);
    let temperature_warning = latest_temp.is_some_and(|t| !(TEMP_LOW_C..=TEMP_HIGH_C).contains(&t));

    let mut alerts = Vec::new();
    if ordered.is_empty() {
        alerts.push(TrendAlert::NoReadings);
    } else {
        if plateau_risk {
            alerts.push(TrendAlert::Plateau);
        }
        match latest_temp {
            Some(t) if t > TEMP_HIGH_C => alerts.push(TrendAlert::HighTemperature),
            Some(t) if t < TEMP_LOW_C => alerts.push(TrendAlert::LowTemperature),
            _ => {}
        }
        if alerts.is_empty() {
            alerts.push(TrendAlert::Stable);
        }
    }

    FermentationTrend {
        batch_id,
        reading_count: ordered.len(),
        first_recorded_at: ordered.first().map(|reading| reading.recorded_at),
        latest_recorded_at: latest.map(|reading| reading.recorded_at),
        latest_gravity: latest.and_then(|reading| reading.gravity),
        latest_temp_c: latest_temp,
        latest_ph: latest.and_then(|reading| reading.ph),
        gravity_drop,
        average_hourly_gravity_drop,
        plateau_risk,
        temperature_warning,
        alerts,
    }
}

impl std::fmt::Display for FermentationTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Batch {}: {} readings", self.batch_id, self.reading_count)?;
        if let Some(gravity) = self.latest_gravity {
            writeln!(f, "  Latest gravity: {:.3}", gravity)?;
        }
        if let Some(temp) = self.latest_temp_c {
            writeln!(f, "  Latest temperature: {:.1} C", temp)?;
        }
        if let Some(drop) = self.gravity_drop {
            writeln!(f, "  Gravity drop: {:.4}", drop)?;
        }
        if let Some(rate) = self.average_hourly_gravity_drop {
            writeln!(f, "  Average drop per hour: {:.5}", rate)?;
        }
        for alert in &self.alerts {
            writeln!(f, "  ! {}", alert.message())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn reading(hours: i64, gravity: Option<f64>, temp_c: Option<f64>) -> FermentationReading {
        FermentationReading {
            id: hours,
            batch_id: 3,
            recorded_at: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap() + Duration::hours(hours),
            gravity,
            temp_c,
            ph: None,
            notes: String::new(),
        }
    }

    #[test]
    fn no_readings() {
        let trend = analyze(3, &[]);
        assert_eq!(trend.reading_count, 0);
        assert_eq!(trend.alerts, vec![TrendAlert::NoReadings]);
        assert!(!trend.temperature_warning);
    }

    #[test]
    fn drop_and_rate_use_first_and_last_gravity() {
        let readings = vec![
            reading(48, Some(1.020), Some(19.0)),
            reading(0, Some(1.056), Some(18.0)),
            reading(24, None, Some(19.5)),
        ];
        let trend = analyze(3, &readings);

        assert_eq!(trend.gravity_drop, Some(0.036));
        assert_eq!(trend.average_hourly_gravity_drop, Some(0.00075));
        assert_eq!(trend.latest_gravity, Some(1.020));
        assert_eq!(trend.alerts, vec![TrendAlert::Stable]);
    }

    #[test]
    fn flat_high_gravity_is_a_plateau() {
        let readings = vec![
            reading(0, Some(1.060), Some(19.0)),
            reading(24, Some(1.030), Some(19.0)),
            reading(48, Some(1.029), Some(19.0)),
            reading(72, Some(1.029), Some(26.0)),
        ];
        let trend = analyze(3, &readings);

        assert!(trend.plateau_risk);
        assert!(trend.temperature_warning);
        assert_eq!(trend.alerts, vec![TrendAlert::Plateau, TrendAlert::HighTemperature]);
    }

    #[test]
    fn flat_low_gravity_is_finished_not_stuck() {
        let readings = vec![
            reading(0, Some(1.012), Some(14.0)),
            reading(24, Some(1.011), Some(14.0)),
            reading(48, Some(1.011), Some(14.0)),
        ];
        let trend = analyze(3, &readings);

        assert!(!trend.plateau_risk);
        assert_eq!(trend.alerts, vec![TrendAlert::LowTemperature]);
    }
}
