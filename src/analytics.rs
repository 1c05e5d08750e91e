//! Brewery overview: counts, style breakdown and measured averages
//!
//! Measured gravities come from fermentation readings: the first and last
//! gravity logged for a batch stand in for its OG and FG.

use std::collections::HashMap;

use serde::Serialize;

use crate::calculator::{attenuation_pct, estimate_abv};
use crate::models::{Batch, FermentationReading, round_to};

const RECENT_BATCHES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleBatchCount {
    pub style: String,
    pub batch_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentBatch {
    pub id: i64,
    pub name: String,
    pub inventory_consumed: bool,
    pub abv: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_recipes: usize,
    pub total_batches: usize,
    pub consumed_batches: usize,
    pub average_abv: Option<f64>,
    pub average_attenuation_pct: Option<f64>,
    pub style_breakdown: Vec<StyleBatchCount>,
    pub recent_batches: Vec<RecentBatch>,
}

fn average(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| round_to(values.iter().sum::<f64>() / values.len() as f64, 2))
}

/// First and last logged gravity, when they describe a real fermentation
fn measured_gravity(readings: &[&FermentationReading]) -> Option<(f64, f64)> {
    let mut gravities: Vec<_> = readings
        .iter()
        .filter_map(|r| r.gravity.map(|g| (r.recorded_at, g)))
        .collect();
    gravities.sort_by_key(|(at, _)| *at);

    match (gravities.first(), gravities.last()) {
        (Some((_, og)), Some((_, fg))) if gravities.len() >= 2 && og > fg && *og > 1.0 => Some((*og, *fg)),
        _ => None,
    }
}

pub fn overview(total_recipes: usize, batches: &[Batch], readings: &[FermentationReading]) -> Overview {
    let mut by_batch: HashMap<i64, Vec<&FermentationReading>> = HashMap::new();
    for reading in readings {
        by_batch.entry(reading.batch_id).or_default().push(reading);
    }

    let measured: HashMap<i64, (f64, f64)> = batches
        .iter()
        .filter_map(|b| {
            let gravity = measured_gravity(by_batch.get(&b.id).map(Vec::as_slice).unwrap_or_default())?;
            Some((b.id, gravity))
        })
        .collect();

    let abv_values: Vec<f64> = measured.values().map(|(og, fg)| estimate_abv(*og, *fg)).collect();
    let attenuation_values: Vec<f64> = measured.values().map(|(og, fg)| attenuation_pct(*og, *fg)).collect();

    let mut styles: HashMap<String, usize> = HashMap::new();
    for batch in batches {
        let style = batch
            .snapshot
            .style
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown");
        *styles.entry(style.to_string()).or_default() += 1;
    }
    let mut style_breakdown: Vec<StyleBatchCount> = styles
        .into_iter()
        .map(|(style, batch_count)| StyleBatchCount { style, batch_count })
        .collect();
    style_breakdown.sort_by(|a, b| b.batch_count.cmp(&a.batch_count).then_with(|| a.style.cmp(&b.style)));

    let mut recent: Vec<&Batch> = batches.iter().collect();
    recent.sort_by(|a, b| b.id.cmp(&a.id));
    let recent_batches = recent
        .into_iter()
        .take(RECENT_BATCHES)
        .map(|b| RecentBatch {
            id: b.id,
            name: b.name.clone(),
            inventory_consumed: b.inventory_consumed_at.is_some(),
            abv: measured.get(&b.id).map(|(og, fg)| estimate_abv(*og, *fg)),
        })
        .collect();

    Overview {
        total_recipes,
        total_batches: batches.len(),
        consumed_batches: batches.iter().filter(|b| b.inventory_consumed_at.is_some()).count(),
        average_abv: average(&abv_values),
        average_attenuation_pct: average(&attenuation_values),
        style_breakdown,
        recent_batches,
    }
}

impl std::fmt::Display for Overview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let opt = |v: Option<f64>, suffix: &str| v.map(|v| format!("{:.2}{}", v, suffix)).unwrap_or_else(|| "-".to_string());

        writeln!(f, "Recipes: {}", self.total_recipes)?;
        writeln!(f, "Batches: {} ({} consumed)", self.total_batches, self.consumed_batches)?;
        writeln!(f, "Average ABV: {}", opt(self.average_abv, "%"))?;
        writeln!(f, "Average attenuation: {}", opt(self.average_attenuation_pct, "%"))?;

        if !self.style_breakdown.is_empty() {
            writeln!(f)?;
            writeln!(f, "{:<30} {:>8}", "Style", "Batches")?;
            writeln!(f, "{}", "-".repeat(39))?;
            for row in &self.style_breakdown {
                writeln!(f, "{:<30} {:>8}", row.style, row.batch_count)?;
            }
        }

        if !self.recent_batches.is_empty() {
            writeln!(f)?;
            writeln!(f, "{:<5} {:<30} {:<9} {:>6}", "ID", "Recent batch", "Consumed", "ABV")?;
            writeln!(f, "{}", "-".repeat(53))?;
            for b in &self.recent_batches {
                writeln!(
                    f,
                    "{:<5} {:<30} {:<9} {:>6}",
                    b.id,
                    b.name,
                    if b.inventory_consumed { "yes" } else { "no" },
                    opt(b.abv, "")
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::models::RecipeSnapshot;

    fn batch(id: i64, style: Option<&str>, consumed: bool) -> Batch {
        Batch {
            id,
            name: format!("Batch {id}"),
            recipe_id: Some(1),
            volume_liters: 20.0,
            snapshot: RecipeSnapshot {
                name: "Recipe".to_string(),
                style: style.map(str::to_string),
                ..RecipeSnapshot::default()
            },
            inventory_consumed_at: consumed.then(|| Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()),
        }
    }

    fn reading(batch_id: i64, hours: i64, gravity: f64) -> FermentationReading {
        FermentationReading {
            id: 0,
            batch_id,
            recorded_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap() + Duration::hours(hours),
            gravity: Some(gravity),
            temp_c: None,
            ph: None,
            notes: String::new(),
        }
    }

    #[test]
    fn counts_styles_and_measured_averages() {
        let batches = vec![
            batch(1, Some("21A"), true),
            batch(2, Some("21A"), false),
            batch(3, Some("15B"), true),
            batch(4, None, false),
        ];
        let readings = vec![
            reading(1, 96, 1.012),
            reading(1, 0, 1.060),
            reading(3, 0, 1.040),
            reading(3, 72, 1.008),
            // one reading only, no measurement
            reading(2, 0, 1.062),
        ];

        let overview = overview(3, &batches, &readings);
        assert_eq!(overview.total_recipes, 3);
        assert_eq!(overview.total_batches, 4);
        assert_eq!(overview.consumed_batches, 2);

        let styles: Vec<_> = overview
            .style_breakdown
            .iter()
            .map(|s| (s.style.as_str(), s.batch_count))
            .collect();
        assert_eq!(styles, vec![("21A", 2), ("15B", 1), ("Unknown", 1)]);

        // 6.3 and 4.2
        assert_eq!(overview.average_abv, Some(5.25));
        assert_eq!(overview.average_attenuation_pct, Some(80.0));

        let recent_ids: Vec<_> = overview.recent_batches.iter().map(|b| b.id).collect();
        assert_eq!(recent_ids, vec![4, 3, 2, 1]);
        assert_eq!(overview.recent_batches[1].abv, Some(4.2));
        assert_eq!(overview.recent_batches[2].abv, None);
    }

    #[test]
    fn empty_store_has_no_averages() {
        let overview = overview(0, &[], &[]);
        assert_eq!(overview.average_abv, None);
        assert_eq!(overview.average_attenuation_pct, None);
        assert!(overview.style_breakdown.is_empty());
        assert!(overview.to_string().contains("Average ABV: -"));
    }
}
