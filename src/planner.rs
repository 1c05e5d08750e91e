//! Brew-day plan: volumes, gravity, shopping list, hop substitutions, water
//! additions and a timed step list for one batch
//!
//! Everything here is computed fresh from the batch snapshot and the stock
//! snapshot handed in. Nothing is written back.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::calculator::{adjusted_og, carry_attenuation, estimate_abv};
use crate::config::PlannerDefaults;
use crate::display::{DisplayPreferences, DisplayUnits, DisplayVolumes, Language, Message, to_display_units};
use crate::hops;
use crate::inventory::{self, InventoryPreview, MatchResult};
use crate::models::{
    Batch, EquipmentProfile, IngredientCategory, IngredientLine, StockRecord, WaterProfile, round_to,
};
use crate::styles::resolve_style;
use crate::units;
use crate::water::{WaterRecommendation, recommend_water};

const MASH_TUN_FILL_LIMIT: f64 = 0.9;
const GRAIN_ABSORPTION_L_PER_KG: f64 = 0.8;
const SPARGE_TEMP_C: f64 = 76.0;
const BOIL_TEMP_C: f64 = 100.0;
const PITCH_TEMP_C: f64 = 20.0;
const SUBSTITUTES_PER_HOP: usize = 3;

/// Everything the planner needs for one batch
#[derive(Debug, Clone)]
pub struct PlanRequest<'a> {
    pub batch: &'a Batch,
    pub stock: &'a [StockRecord],
    pub equipment: Option<&'a EquipmentProfile>,
    pub water_profile: Option<&'a WaterProfile>,
    pub style_override: Option<&'a str>,
    pub extra_hops: &'a [String], // hops on hand but not in stock records
    pub brew_start: Option<DateTime<Utc>>,
    pub display: DisplayPreferences,
    pub defaults: PlannerDefaults,
}

impl<'a> PlanRequest<'a> {
    pub fn new(batch: &'a Batch, stock: &'a [StockRecord]) -> Self {
        Self {
            batch,
            stock,
            equipment: None,
            water_profile: None,
            style_override: None,
            extra_hops: &[],
            brew_start: None,
            display: DisplayPreferences::default(),
            defaults: PlannerDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrewPlanVolumes {
    pub grain_bill_kg: f64,
    pub mash_water_liters: f64,
    pub sparge_water_liters: f64,
    pub total_water_liters: f64,
    pub pre_boil_volume_liters: f64,
    pub post_boil_volume_liters: f64,
    pub estimated_boil_off_liters: f64,
    pub mash_target_temp_c: f64,
    pub strike_water_temp_c: f64,
    pub mash_rest_minutes: u32,
    pub sparge_minutes: u32,
    pub boil_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrewPlanGravity {
    pub source_target_og: f64,
    pub source_target_fg: f64,
    pub estimated_og: f64,
    pub estimated_fg: f64,
    pub estimated_abv: f64,
    pub fermentable_inventory_coverage_pct: f64,
    pub source_efficiency_pct: f64,
    pub target_efficiency_pct: f64,
}

/// Equipment echoed back with the defaults that were filled in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentSummary {
    pub equipment_profile_id: Option<i64>,
    pub equipment_name: Option<String>,
    pub batch_volume_liters: Option<f64>,
    pub mash_tun_volume_liters: Option<f64>,
    pub boil_kettle_volume_liters: Option<f64>,
    pub boil_off_rate_l_per_hour: f64,
    pub trub_loss_liters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingItem {
    pub name: String,
    pub category: IngredientCategory,
    pub required_amount: f64,
    pub required_unit: String,
    pub available_amount: f64,
    pub shortage_amount: f64,
    pub suggested_substitutions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopCandidate {
    pub name: String,
    pub similarity_score: f64,
    pub recommended_bittering_ratio: f64,
    pub shared_descriptors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopSubstitution {
    pub target_hop_name: String,
    pub missing_amount: f64,
    pub unit: String,
    pub candidates: Vec<HopCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerStep {
    pub step_order: u32,
    pub timer_key: &'static str,
    pub name: &'static str,
    pub duration_minutes: u32,
    pub target_temp_c: Option<f64>,
    pub start_offset_minutes: u32,
    pub planned_start_at: Option<DateTime<Utc>>,
    pub planned_end_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrewPlanResult {
    pub batch_id: i64,
    pub batch_name: String,
    pub volumes: BrewPlanVolumes,
    pub gravity: BrewPlanGravity,
    pub equipment: EquipmentSummary,
    pub shopping_list: Vec<ShoppingItem>,
    pub hop_substitutions: Vec<HopSubstitution>,
    pub water_recommendation: Option<WaterRecommendation>,
    pub timer_plan: Vec<TimerStep>,
    pub notes: Vec<String>,
    pub display_units: DisplayUnits,
    pub display: DisplayVolumes,
}

/// Build the full brew-day plan for one batch
pub fn build_plan(request: &PlanRequest<'_>) -> BrewPlanResult {
    let PlanRequest {
        batch,
        stock,
        equipment,
        defaults,
        ..
    } = *request;
    let language = request.display.language;
    let snapshot = &batch.snapshot;
    let mut notes = Vec::new();

    let style = StyleHints::new(snapshot.style.as_deref());
    let source_og = snapshot.target_og.unwrap_or(defaults.original_gravity);
    let source_fg = snapshot.target_fg.unwrap_or(defaults.final_gravity);
    let source_efficiency = snapshot.efficiency_pct.unwrap_or(defaults.efficiency_pct);
    let target_efficiency = equipment.map_or(source_efficiency, |e| e.brewhouse_efficiency_pct);

    let requirements = inventory::build_requirements(&snapshot.ingredients);
    let preview = inventory::preview(&requirements, stock);

    // Gravity
    let coverage = fermentable_coverage(&preview);
    let estimated_og = adjusted_og(source_og, source_efficiency, target_efficiency, coverage);
    let estimated_fg = carry_attenuation(source_og, source_fg, estimated_og);

    // Mash
    let grain_bill_kg = grain_bill_kg(&snapshot.ingredients);
    let mash_temp_c = style.mash_temp_c();
    let mash_rest_minutes = style.mash_rest_minutes(source_og);
    let mash_ratio = if source_og >= 1.070 { 2.8 } else { 2.7 };
    let mut mash_water = round_to(grain_bill_kg * mash_ratio, 2);
    if let Some(tun) = equipment.and_then(|e| positive(e.mash_tun_volume_liters)) {
        let limit = round_to(tun * MASH_TUN_FILL_LIMIT, 2);
        if mash_water > limit {
            debug!(mash_water, limit, "mash water capped by mash tun");
            notes.push(language.text(Message::MashWaterLimit).to_string());
            mash_water = limit;
        }
    }
    let absorption = round_to(grain_bill_kg * GRAIN_ABSORPTION_L_PER_KG, 2);
    let first_runnings = (mash_water - absorption).max(0.0);

    // Boil
    let boil_minutes = if style.is_lager() { 75 } else { 60 };
    let boil_off_rate = equipment
        .and_then(|e| positive(e.boil_off_rate_l_per_hour))
        .unwrap_or(defaults.boil_off_l_per_hour);
    let trub_loss = equipment
        .and_then(|e| positive(e.trub_loss_liters))
        .unwrap_or(defaults.trub_loss_liters);
    let boil_off = round_to(boil_off_rate * f64::from(boil_minutes) / 60.0, 2);
    let pre_boil = round_to(batch.volume_liters + trub_loss + boil_off, 2);
    let sparge_water = round_to((pre_boil - first_runnings).max(0.0), 2);
    let total_water = round_to(mash_water + sparge_water, 2);

    if let Some(kettle) = equipment.and_then(|e| positive(e.boil_kettle_volume_liters)) {
        if pre_boil > kettle {
            notes.push(language.text(Message::BoilKettleLimit).to_string());
        }
    }

    let strike_temp_c = strike_temp_c(mash_temp_c, mash_ratio, defaults.grain_temp_c);
    let sparge_minutes = minutes_clamped(10.0 + sparge_water * 1.6, 10, 45);

    let volumes = BrewPlanVolumes {
        grain_bill_kg: round_to(grain_bill_kg, 3),
        mash_water_liters: mash_water,
        sparge_water_liters: sparge_water,
        total_water_liters: total_water,
        pre_boil_volume_liters: pre_boil,
        post_boil_volume_liters: round_to(batch.volume_liters, 2),
        estimated_boil_off_liters: boil_off,
        mash_target_temp_c: round_to(mash_temp_c, 1),
        strike_water_temp_c: round_to(strike_temp_c, 1),
        mash_rest_minutes,
        sparge_minutes,
        boil_minutes,
    };

    let timer_plan = build_timer_plan(&volumes, strike_temp_c, request.brew_start, language);

    // Shopping list and substitutes
    let available_hops: Vec<&str> = request
        .extra_hops
        .iter()
        .map(String::as_str)
        .chain(
            stock
                .iter()
                .filter(|record| record.category == IngredientCategory::Hop)
                .map(|record| record.name.as_str()),
        )
        .filter(|name| !name.trim().is_empty())
        .collect();
    let (shopping_list, hop_substitutions) = shopping_and_substitutions(&preview, &available_hops);

    if shopping_list.is_empty() {
        notes.push(language.text(Message::InventoryCoversAll).to_string());
    }
    if hop_substitutions.is_empty() {
        notes.push(language.text(Message::NoHopSubstitutions).to_string());
    }

    // Water
    let water_recommendation = match request.water_profile {
        None => {
            notes.push(language.text(Message::NoWaterProfile).to_string());
            None
        }
        Some(profile) => match request.style_override.or(snapshot.style.as_deref()).and_then(resolve_style) {
            None => {
                notes.push(language.text(Message::WaterStyleUnmapped).to_string());
                None
            }
            Some(target_style) => Some(recommend_water(&profile.ions, target_style, batch.volume_liters, language)),
        },
    };

    let og = round_to(estimated_og, 3);
    let fg = round_to(estimated_fg, 3);
    let gravity = BrewPlanGravity {
        source_target_og: round_to(source_og, 3),
        source_target_fg: round_to(source_fg, 3),
        estimated_og: og,
        estimated_fg: fg,
        estimated_abv: estimate_abv(og, fg),
        fermentable_inventory_coverage_pct: round_to(coverage * 100.0, 2),
        source_efficiency_pct: round_to(source_efficiency, 2),
        target_efficiency_pct: round_to(target_efficiency, 2),
    };

    let (display_units, display) = to_display_units(&request.display, &volumes);

    info!(
        batch_id = batch.id,
        shortages = shopping_list.len(),
        substitutions = hop_substitutions.len(),
        steps = timer_plan.len(),
        "brew day planned"
    );

    BrewPlanResult {
        batch_id: batch.id,
        batch_name: batch.name.clone(),
        volumes,
        gravity,
        equipment: summarize_equipment(equipment, boil_off_rate, trub_loss),
        shopping_list,
        hop_substitutions,
        water_recommendation,
        timer_plan,
        notes,
        display_units,
        display,
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

fn minutes_clamped(minutes: f64, min: i64, max: i64) -> u32 {
    (minutes.round() as i64).clamp(min, max) as u32
}

/// Lower-cased recorded style text, matched by keyword. Codes such as "8A"
/// carry no keywords and fall through to the default rules.
struct StyleHints(String);

impl StyleHints {
    fn new(style: Option<&str>) -> Self {
        Self(style.unwrap_or_default().to_lowercase())
    }

    fn has(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }

    fn is_lager(&self) -> bool {
        self.has("lager")
    }

    fn mash_temp_c(&self) -> f64 {
        if self.has("stout") || self.has("porter") {
            67.5
        } else if self.has("lager") || self.has("pils") {
            65.5
        } else if self.has("hazy") {
            67.0
        } else if self.has("ipa") || self.has("pale") {
            66.0
        } else {
            66.5
        }
    }

    fn mash_rest_minutes(&self, source_og: f64) -> u32 {
        let mut minutes = 60;
        if self.is_lager() {
            minutes += 10;
        }
        if source_og >= 1.070 {
            minutes += 10;
        }
        minutes
    }
}

/// Fermentable mass in kg; lines in non-mass units are skipped
pub fn grain_bill_kg(lines: &[IngredientLine]) -> f64 {
    lines
        .iter()
        .filter(|line| line.category == IngredientCategory::Fermentable)
        .filter(|line| line.amount.is_finite() && line.amount > 0.0)
        .filter_map(|line| units::to_kilograms(line.amount, &line.unit))
        .sum()
}

/// Share of required fermentables that stock covers, in [0, 1]
pub fn fermentable_coverage(preview: &InventoryPreview) -> f64 {
    let fermentables: Vec<&MatchResult> = preview
        .rows
        .iter()
        .filter(|row| row.requirement.category == IngredientCategory::Fermentable)
        .collect();

    let required: f64 = fermentables.iter().map(|row| row.requirement.amount.max(0.0)).sum();
    if required <= 0.0 {
        return 1.0;
    }
    let covered: f64 = fermentables.iter().map(|row| row.covered_amount()).sum();
    (covered / required).clamp(0.0, 1.0)
}

/// Strike water temperature for a mash at `mash_temp_c`
pub fn strike_temp_c(mash_temp_c: f64, mash_ratio_l_per_kg: f64, grain_temp_c: f64) -> f64 {
    let ratio_qt_per_lb = (mash_ratio_l_per_kg / 2.086).max(0.8);
    0.41 / ratio_qt_per_lb * (mash_temp_c - grain_temp_c) + mash_temp_c
}

fn build_timer_plan(
    volumes: &BrewPlanVolumes,
    strike_temp_c: f64,
    brew_start: Option<DateTime<Utc>>,
    language: Language,
) -> Vec<TimerStep> {
    let mash_temp = volumes.mash_target_temp_c;
    let mut steps: Vec<(&'static str, Message, u32, Option<f64>)> = Vec::new();

    if volumes.grain_bill_kg > 0.0 && volumes.mash_water_liters > 0.0 {
        steps.extend([
            (
                "heat_strike",
                Message::StepHeatStrike,
                minutes_clamped(volumes.mash_water_liters * 1.7, 15, 55),
                Some(strike_temp_c),
            ),
            ("mash_in", Message::StepMashIn, 10, Some(mash_temp)),
            ("mash_rest", Message::StepMashRest, volumes.mash_rest_minutes, Some(mash_temp)),
            ("sparge", Message::StepSparge, volumes.sparge_minutes, Some(SPARGE_TEMP_C)),
        ]);
    }

    steps.extend([
        (
            "heat_boil",
            Message::StepHeatBoil,
            minutes_clamped(volumes.pre_boil_volume_liters.max(5.0) * 1.2, 15, 50),
            Some(BOIL_TEMP_C),
        ),
        ("boil", Message::StepBoil, volumes.boil_minutes, Some(BOIL_TEMP_C)),
        ("chill", Message::StepChill, 20, Some(PITCH_TEMP_C)),
        ("transfer_pitch", Message::StepTransferPitch, 15, None),
    ]);

    let mut offset = 0;
    let mut plan = Vec::with_capacity(steps.len());
    for (index, (key, message, duration, target_temp)) in steps.into_iter().enumerate() {
        let at = |minutes: u32| brew_start.map(|start| start + Duration::minutes(i64::from(minutes)));
        plan.push(TimerStep {
            step_order: index as u32 + 1,
            timer_key: key,
            name: language.text(message),
            duration_minutes: duration,
            target_temp_c: target_temp.map(|t| round_to(t, 1)),
            start_offset_minutes: offset,
            planned_start_at: at(offset),
            planned_end_at: at(offset + duration),
        });
        offset += duration;
    }
    plan
}

fn shopping_and_substitutions(preview: &InventoryPreview, available_hops: &[&str]) -> (Vec<ShoppingItem>, Vec<HopSubstitution>) {
    let mut shopping = Vec::new();
    let mut substitutions = Vec::new();

    for row in preview.shortages() {
        let requirement = &row.requirement;
        let candidates: Vec<HopCandidate> = if requirement.category == IngredientCategory::Hop {
            match hops::recommend(&requirement.name, available_hops, SUBSTITUTES_PER_HOP) {
                Ok(result) => result
                    .substitutions
                    .into_iter()
                    .map(|candidate| HopCandidate {
                        name: candidate.name,
                        similarity_score: candidate.similarity_score,
                        recommended_bittering_ratio: candidate.recommended_bittering_ratio,
                        shared_descriptors: candidate.shared_descriptors,
                    })
                    .collect(),
                Err(err) => {
                    debug!(hop = %requirement.name, %err, "no substitutes for short hop");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        shopping.push(ShoppingItem {
            name: requirement.name.clone(),
            category: requirement.category,
            required_amount: requirement.amount,
            required_unit: requirement.unit.clone(),
            available_amount: row.available_amount,
            shortage_amount: row.shortage_amount,
            suggested_substitutions: candidates.iter().map(|c| c.name.clone()).collect(),
        });

        if !candidates.is_empty() {
            substitutions.push(HopSubstitution {
                target_hop_name: requirement.name.clone(),
                missing_amount: row.shortage_amount,
                unit: requirement.unit.clone(),
                candidates,
            });
        }
    }

    (shopping, substitutions)
}

fn summarize_equipment(equipment: Option<&EquipmentProfile>, boil_off_rate: f64, trub_loss: f64) -> EquipmentSummary {
    EquipmentSummary {
        equipment_profile_id: equipment.map(|e| e.id),
        equipment_name: equipment.map(|e| e.name.clone()),
        batch_volume_liters: equipment.map(|e| round_to(e.batch_volume_liters, 2)),
        mash_tun_volume_liters: equipment
            .and_then(|e| positive(e.mash_tun_volume_liters))
            .map(|v| round_to(v, 2)),
        boil_kettle_volume_liters: equipment
            .and_then(|e| positive(e.boil_kettle_volume_liters))
            .map(|v| round_to(v, 2)),
        boil_off_rate_l_per_hour: round_to(boil_off_rate, 2),
        trub_loss_liters: round_to(trub_loss, 2),
    }
}

impl std::fmt::Display for BrewPlanResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = &self.display_units;
        let temp = match units.temperature_unit {
            crate::display::TemperatureUnit::C => "C",
            crate::display::TemperatureUnit::F => "F",
        };

        writeln!(f, "=== Brew Day: {} (batch {}) ===", self.batch_name, self.batch_id)?;
        writeln!(f)?;
        writeln!(f, "Volumes:")?;
        writeln!(f, "  {:<24} {:>10.2} {}", "Grain bill", self.display.grain_bill, units.grain_unit)?;
        writeln!(f, "  {:<24} {:>10.2} {}", "Mash water", self.display.mash_water, units.volume_unit)?;
        writeln!(f, "  {:<24} {:>10.2} {}", "Sparge water", self.display.sparge_water, units.volume_unit)?;
        writeln!(f, "  {:<24} {:>10.2} {}", "Total water", self.display.total_water, units.volume_unit)?;
        writeln!(f, "  {:<24} {:>10.2} {}", "Pre-boil volume", self.display.pre_boil_volume, units.volume_unit)?;
        writeln!(f, "  {:<24} {:>10.2} {}", "Post-boil volume", self.display.post_boil_volume, units.volume_unit)?;
        writeln!(f, "  {:<24} {:>10.1} {}", "Mash temperature", self.display.mash_target_temp, temp)?;
        writeln!(f, "  {:<24} {:>10.1} {}", "Strike temperature", self.display.strike_water_temp, temp)?;
        writeln!(f)?;
        writeln!(
            f,
            "Gravity: OG {:.3} -> {:.3}  FG {:.3}  ABV {:.2}%  (fermentables {:.0}% on hand)",
            self.gravity.source_target_og,
            self.gravity.estimated_og,
            self.gravity.estimated_fg,
            self.gravity.estimated_abv,
            self.gravity.fermentable_inventory_coverage_pct
        )?;

        if !self.shopping_list.is_empty() {
            writeln!(f)?;
            writeln!(f, "Shopping list:")?;
            for item in &self.shopping_list {
                write!(f, "  {:<28} {:>10.2} {:<4}", item.name, item.shortage_amount, item.required_unit)?;
                if item.suggested_substitutions.is_empty() {
                    writeln!(f)?;
                } else {
                    writeln!(f, " (try {})", item.suggested_substitutions.join(", "))?;
                }
            }
        }

        if let Some(water) = &self.water_recommendation {
            writeln!(f)?;
            writeln!(f, "Water for {} {}:", water.style_code, water.style_name)?;
            for addition in &water.additions {
                writeln!(
                    f,
                    "  {:<28} {:>7.2} g  ({:.3} g/L)",
                    addition.mineral_name, addition.grams_total, addition.grams_per_liter
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "{:<4} {:<28} {:>6} {:>8} {:>8}", "#", "Step", "Min", "Start", "Temp")?;
        writeln!(f, "{}", "-".repeat(58))?;
        for step in &self.timer_plan {
            let target = step
                .target_temp_c
                .map(|t| format!("{:.1}", units.temperature_unit.from_celsius(t)))
                .unwrap_or_default();
            writeln!(
                f,
                "{:<4} {:<28} {:>6} {:>8} {:>8}",
                step.step_order,
                step.name,
                step.duration_minutes,
                format!("+{}", step.start_offset_minutes),
                target
            )?;
        }

        if !self.notes.is_empty() {
            writeln!(f)?;
            for note in &self.notes {
                writeln!(f, "* {}", note)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::display::{TemperatureUnit, UnitSystem};
    use crate::models::{RecipeSnapshot, WaterIonProfile};

    fn line(name: &str, category: IngredientCategory, amount: f64, unit: &str) -> IngredientLine {
        IngredientLine::new(name, category, amount, unit)
    }

    fn stock(id: i64, name: &str, category: IngredientCategory, quantity: f64, unit: &str) -> StockRecord {
        StockRecord {
            id,
            name: name.to_string(),
            category,
            quantity,
            unit: unit.to_string(),
        }
    }

    fn ipa_batch() -> Batch {
        Batch {
            id: 1,
            name: "IPA #1".to_string(),
            recipe_id: Some(1),
            volume_liters: 20.0,
            snapshot: RecipeSnapshot {
                name: "West Coast IPA".to_string(),
                style: Some("American IPA".to_string()),
                target_og: Some(1.060),
                target_fg: Some(1.012),
                efficiency_pct: Some(72.0),
                ingredients: vec![
                    line("Pale Malt", IngredientCategory::Fermentable, 4.3, "kg"),
                    line("Citra", IngredientCategory::Hop, 40.0, "g"),
                    line("US-05", IngredientCategory::Yeast, 1.0, "pack"),
                ],
            },
            inventory_consumed_at: None,
        }
    }

    fn short_stock() -> Vec<StockRecord> {
        vec![
            stock(1, "Pale Malt", IngredientCategory::Fermentable, 2.0, "kg"),
            stock(2, "Mosaic", IngredientCategory::Hop, 80.0, "g"),
            stock(3, "US-05", IngredientCategory::Yeast, 1.0, "pack"),
        ]
    }

    fn full_stock() -> Vec<StockRecord> {
        vec![
            stock(1, "Pale Malt", IngredientCategory::Fermentable, 10.0, "kg"),
            stock(2, "Citra", IngredientCategory::Hop, 100.0, "g"),
            stock(3, "US-05", IngredientCategory::Yeast, 2.0, "pack"),
        ]
    }

    #[test]
    fn short_grain_and_missing_hop_end_to_end() {
        let batch = ipa_batch();
        let stock = short_stock();
        let plan = build_plan(&PlanRequest::new(&batch, &stock));

        let grain = plan.shopping_list.iter().find(|i| i.name == "Pale Malt").unwrap();
        assert!((grain.shortage_amount - 2.3).abs() < 1e-9);
        assert!(grain.suggested_substitutions.is_empty());

        let citra = plan.shopping_list.iter().find(|i| i.name == "Citra").unwrap();
        assert_eq!(citra.shortage_amount, 40.0);
        assert_eq!(citra.suggested_substitutions, vec!["Mosaic".to_string()]);

        assert_eq!(plan.hop_substitutions.len(), 1);
        assert_eq!(plan.hop_substitutions[0].target_hop_name, "Citra");
        assert_eq!(plan.hop_substitutions[0].missing_amount, 40.0);

        // 2.0 of 4.3 kg on hand
        assert_eq!(plan.gravity.fermentable_inventory_coverage_pct, 46.51);
        assert!(plan.gravity.estimated_og < plan.gravity.source_target_og);
    }

    #[test]
    fn uncatalogued_short_hop_still_plans() {
        let mut batch = ipa_batch();
        batch
            .snapshot
            .ingredients
            .push(line("Galaxy", IngredientCategory::Hop, 30.0, "g"));
        let stock = full_stock();
        let plan = build_plan(&PlanRequest::new(&batch, &stock));

        assert_eq!(plan.shopping_list.len(), 1);
        let galaxy = &plan.shopping_list[0];
        assert_eq!(galaxy.name, "Galaxy");
        assert_eq!(galaxy.shortage_amount, 30.0);
        assert!(galaxy.suggested_substitutions.is_empty());
        assert!(plan.hop_substitutions.iter().all(|s| s.target_hop_name != "Galaxy"));
        assert!(plan.hop_substitutions.is_empty());
        assert!(plan.notes.contains(&Language::En.text(Message::NoHopSubstitutions).to_string()));

        assert_eq!(plan.volumes.grain_bill_kg, 4.3);
        assert_eq!(plan.timer_plan.len(), 8);
        assert_eq!(plan.gravity.estimated_og, 1.060);
    }

    #[test]
    fn fully_stocked_batch_keeps_recipe_gravity() {
        let batch = ipa_batch();
        let stock = full_stock();
        let plan = build_plan(&PlanRequest::new(&batch, &stock));

        assert!(plan.shopping_list.is_empty());
        assert_eq!(plan.gravity.estimated_og, 1.060);
        assert_eq!(plan.gravity.estimated_fg, 1.012);
        assert_eq!(plan.gravity.estimated_abv, 6.3);
        assert_eq!(
            plan.notes,
            vec![
                Message::InventoryCoversAll,
                Message::NoHopSubstitutions,
                Message::NoWaterProfile
            ]
            .into_iter()
            .map(|m| Language::En.text(m).to_string())
            .collect::<Vec<_>>()
        );
    }

    #[test]
    fn volumes_follow_mash_and_boil_rules() {
        let batch = ipa_batch();
        let stock = full_stock();
        let plan = build_plan(&PlanRequest::new(&batch, &stock));
        let v = &plan.volumes;

        assert_eq!(v.grain_bill_kg, 4.3);
        assert_eq!(v.mash_target_temp_c, 66.0);
        assert_eq!(v.mash_rest_minutes, 60);
        assert_eq!(v.mash_water_liters, 11.61); // 4.3 * 2.7
        assert_eq!(v.boil_minutes, 60);
        assert_eq!(v.estimated_boil_off_liters, 3.0);
        assert_eq!(v.pre_boil_volume_liters, 24.0);
        // first runnings 11.61 - 3.44
        assert_eq!(v.sparge_water_liters, 15.83);
        assert_eq!(v.total_water_liters, 27.44);
        assert_eq!(v.sparge_minutes, 35);
        assert!(v.strike_water_temp_c > v.mash_target_temp_c);
    }

    #[test]
    fn timer_offsets_are_running_sums() {
        let batch = ipa_batch();
        let stock = full_stock();
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap();
        let plan = build_plan(&PlanRequest {
            brew_start: Some(start),
            ..PlanRequest::new(&batch, &stock)
        });

        let keys: Vec<_> = plan.timer_plan.iter().map(|s| s.timer_key).collect();
        assert_eq!(
            keys,
            vec!["heat_strike", "mash_in", "mash_rest", "sparge", "heat_boil", "boil", "chill", "transfer_pitch"]
        );

        let mut expected = 0;
        for (index, step) in plan.timer_plan.iter().enumerate() {
            assert_eq!(step.step_order as usize, index + 1);
            assert_eq!(step.start_offset_minutes, expected);
            assert_eq!(
                step.planned_start_at,
                Some(start + Duration::minutes(i64::from(expected)))
            );
            expected += step.duration_minutes;
            assert_eq!(step.planned_end_at, Some(start + Duration::minutes(i64::from(expected))));
        }
        assert_eq!(plan.timer_plan[0].duration_minutes, 20); // 11.61 L * 1.7
        assert_eq!(plan.timer_plan.last().unwrap().target_temp_c, None);
    }

    #[test]
    fn extract_batch_skips_mash_steps() {
        let mut batch = ipa_batch();
        batch.snapshot.ingredients = vec![line("Light DME", IngredientCategory::Fermentable, 3.0, "l")];
        let plan = build_plan(&PlanRequest::new(&batch, &[]));

        assert_eq!(plan.volumes.grain_bill_kg, 0.0);
        assert_eq!(plan.timer_plan[0].timer_key, "heat_boil");
        assert!(plan.timer_plan.iter().all(|s| s.planned_start_at.is_none()));
    }

    #[test]
    fn small_equipment_adds_capacity_notes() {
        let batch = ipa_batch();
        let stock = full_stock();
        let equipment = EquipmentProfile {
            id: 4,
            name: "Pot".to_string(),
            batch_volume_liters: 19.0,
            mash_tun_volume_liters: Some(10.0),
            boil_kettle_volume_liters: Some(20.0),
            brewhouse_efficiency_pct: 72.0,
            boil_off_rate_l_per_hour: Some(4.0),
            trub_loss_liters: None,
            notes: String::new(),
        };
        let plan = build_plan(&PlanRequest {
            equipment: Some(&equipment),
            ..PlanRequest::new(&batch, &stock)
        });

        assert_eq!(plan.volumes.mash_water_liters, 9.0);
        assert!(plan.notes.contains(&Language::En.text(Message::MashWaterLimit).to_string()));
        assert!(plan.notes.contains(&Language::En.text(Message::BoilKettleLimit).to_string()));
        assert_eq!(plan.equipment.boil_off_rate_l_per_hour, 4.0);
        assert_eq!(plan.equipment.trub_loss_liters, 1.0);
    }

    #[test]
    fn water_needs_profile_and_known_style() {
        let mut batch = ipa_batch();
        let stock = full_stock();
        let water = WaterProfile {
            id: 1,
            name: "Tap".to_string(),
            ions: WaterIonProfile {
                calcium_ppm: 20.0,
                magnesium_ppm: 5.0,
                sodium_ppm: 10.0,
                chloride_ppm: 20.0,
                sulfate_ppm: 30.0,
                bicarbonate_ppm: 50.0,
            },
            notes: String::new(),
        };

        let plan = build_plan(&PlanRequest {
            water_profile: Some(&water),
            ..PlanRequest::new(&batch, &stock)
        });
        let rec = plan.water_recommendation.unwrap();
        assert_eq!(rec.style_code, "21A");
        assert_eq!(rec.additions[0].mineral_name, "Gypsum (CaSO4)");

        batch.snapshot.style = Some("Gose".to_string());
        let plan = build_plan(&PlanRequest {
            water_profile: Some(&water),
            ..PlanRequest::new(&batch, &stock)
        });
        assert!(plan.water_recommendation.is_none());
        assert!(plan.notes.contains(&Language::En.text(Message::WaterStyleUnmapped).to_string()));

        let plan = build_plan(&PlanRequest {
            water_profile: Some(&water),
            style_override: Some("15B"),
            ..PlanRequest::new(&batch, &stock)
        });
        assert_eq!(plan.water_recommendation.unwrap().style_name, "Irish Stout");
    }

    #[test]
    fn style_rules_read_only_the_recorded_text() {
        for style in ["8A", "Munich Helles"] {
            let mut batch = ipa_batch();
            batch.snapshot.style = Some(style.to_string());
            let plan = build_plan(&PlanRequest::new(&batch, &full_stock()));

            assert_eq!(plan.volumes.mash_target_temp_c, 66.5, "{style}");
            assert_eq!(plan.volumes.boil_minutes, 60, "{style}");
            assert_eq!(plan.volumes.mash_rest_minutes, 60, "{style}");
        }

        let mut batch = ipa_batch();
        batch.snapshot.style = Some("Vienna Lager".to_string());
        let plan = build_plan(&PlanRequest::new(&batch, &full_stock()));
        assert_eq!(plan.volumes.mash_target_temp_c, 65.5);
        assert_eq!(plan.volumes.boil_minutes, 75);
        assert_eq!(plan.volumes.mash_rest_minutes, 70);
    }

    #[test]
    fn imperial_spanish_display() {
        let batch = ipa_batch();
        let stock = full_stock();
        let plan = build_plan(&PlanRequest {
            display: DisplayPreferences {
                unit_system: UnitSystem::Imperial,
                temperature_unit: TemperatureUnit::F,
                language: Language::Es,
            },
            ..PlanRequest::new(&batch, &stock)
        });

        assert_eq!(plan.display_units.grain_unit, "lb");
        assert_eq!(plan.display.grain_bill, 9.48);
        assert_eq!(plan.display.mash_target_temp, 150.8);
        assert_eq!(plan.timer_plan[5].name, "Hervor");
    }

    #[test]
    fn missing_snapshot_values_use_defaults() {
        let mut batch = ipa_batch();
        batch.snapshot.target_og = None;
        batch.snapshot.target_fg = None;
        batch.snapshot.efficiency_pct = None;
        let plan = build_plan(&PlanRequest::new(&batch, &full_stock()));

        assert_eq!(plan.gravity.source_target_og, 1.050);
        assert_eq!(plan.gravity.source_target_fg, 1.012);
        assert_eq!(plan.gravity.source_efficiency_pct, 70.0);
    }
}
