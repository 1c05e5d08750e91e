//! Data models for recipes, batches, stock and brewing equipment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad ingredient family, used for grouping and for deciding which lines
/// count toward the grain bill or get hop substitutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Fermentable,
    Hop,
    Yeast,
    Other,
}

impl IngredientCategory {
    /// Parse a free-text category label ("grain", "Hops", "extract", ...)
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "fermentable" | "grain" | "extract" | "sugar" | "adjunct" => Self::Fermentable,
            "hop" | "hops" => Self::Hop,
            "yeast" => Self::Yeast,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fermentable => "fermentable",
            Self::Hop => "hop",
            Self::Yeast => "yeast",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One ingredient line of a recipe (or of a batch's recipe snapshot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub name: String,
    pub category: IngredientCategory,
    pub amount: f64,
    pub unit: String,
    #[serde(default)]
    pub stage: String, // mash, boil, whirlpool, fermentation, ...
    #[serde(default)]
    pub minute_added: i32,
}

impl IngredientLine {
    pub fn new(name: &str, category: IngredientCategory, amount: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            category,
            amount,
            unit: unit.to_string(),
            stage: String::new(),
            minute_added: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub style: Option<String>, // style code ("21A") or name
    pub target_og: f64,
    pub target_fg: f64,
    pub target_ibu: Option<f64>,
    pub target_srm: Option<f64>,
    pub efficiency_pct: f64,
    pub batch_volume_liters: f64,
    pub notes: String,
    pub ingredients: Vec<IngredientLine>,
}

impl Recipe {
    /// Freeze the parts of the recipe a batch depends on
    pub fn snapshot(&self) -> RecipeSnapshot {
        RecipeSnapshot {
            name: self.name.clone(),
            style: self.style.clone(),
            target_og: Some(self.target_og),
            target_fg: Some(self.target_fg),
            efficiency_pct: Some(self.efficiency_pct),
            ingredients: self.ingredients.clone(),
        }
    }
}

/// Recipe values captured when a batch is created, so later recipe edits
/// never change what a planned batch needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeSnapshot {
    pub name: String,
    pub style: Option<String>,
    pub target_og: Option<f64>,
    pub target_fg: Option<f64>,
    pub efficiency_pct: Option<f64>,
    pub ingredients: Vec<IngredientLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: i64,
    pub name: String,
    pub recipe_id: Option<i64>,
    pub volume_liters: f64,
    pub snapshot: RecipeSnapshot,
    pub inventory_consumed_at: Option<DateTime<Utc>>,
}

/// On-hand stock of one ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: i64,
    pub name: String,
    pub category: IngredientCategory,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentProfile {
    pub id: i64,
    pub name: String,
    pub batch_volume_liters: f64,
    pub mash_tun_volume_liters: Option<f64>,
    pub boil_kettle_volume_liters: Option<f64>,
    pub brewhouse_efficiency_pct: f64,
    pub boil_off_rate_l_per_hour: Option<f64>,
    pub trub_loss_liters: Option<f64>,
    pub notes: String,
}

/// Ions tracked for brewing water, in the order profiles list them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ion {
    Calcium,
    Magnesium,
    Sodium,
    Chloride,
    Sulfate,
    Bicarbonate,
}

impl Ion {
    pub const ALL: [Ion; 6] = [
        Ion::Calcium,
        Ion::Magnesium,
        Ion::Sodium,
        Ion::Chloride,
        Ion::Sulfate,
        Ion::Bicarbonate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Ion::Calcium => "calcium",
            Ion::Magnesium => "magnesium",
            Ion::Sodium => "sodium",
            Ion::Chloride => "chloride",
            Ion::Sulfate => "sulfate",
            Ion::Bicarbonate => "bicarbonate",
        }
    }
}

/// Ion concentrations in ppm
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterIonProfile {
    pub calcium_ppm: f64,
    pub magnesium_ppm: f64,
    pub sodium_ppm: f64,
    pub chloride_ppm: f64,
    pub sulfate_ppm: f64,
    pub bicarbonate_ppm: f64,
}

impl WaterIonProfile {
    pub fn get(&self, ion: Ion) -> f64 {
        match ion {
            Ion::Calcium => self.calcium_ppm,
            Ion::Magnesium => self.magnesium_ppm,
            Ion::Sodium => self.sodium_ppm,
            Ion::Chloride => self.chloride_ppm,
            Ion::Sulfate => self.sulfate_ppm,
            Ion::Bicarbonate => self.bicarbonate_ppm,
        }
    }

    /// Copy of this profile with one ion replaced
    pub fn with(mut self, ion: Ion, ppm: f64) -> Self {
        match ion {
            Ion::Calcium => self.calcium_ppm = ppm,
            Ion::Magnesium => self.magnesium_ppm = ppm,
            Ion::Sodium => self.sodium_ppm = ppm,
            Ion::Chloride => self.chloride_ppm = ppm,
            Ion::Sulfate => self.sulfate_ppm = ppm,
            Ion::Bicarbonate => self.bicarbonate_ppm = ppm,
        }
        self
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Ion::ALL
            .iter()
            .fold(self, |profile, ion| profile.with(*ion, f(profile.get(*ion))))
    }
}

/// A named source-water report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterProfile {
    pub id: i64,
    pub name: String,
    pub ions: WaterIonProfile,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FermentationReading {
    pub id: i64,
    pub batch_id: i64,
    pub recorded_at: DateTime<Utc>,
    pub gravity: Option<f64>,
    pub temp_c: Option<f64>,
    pub ph: Option<f64>,
    pub notes: String,
}

/// Round to a fixed number of decimal places for reporting
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels() {
        assert_eq!(IngredientCategory::from_label("Grain"), IngredientCategory::Fermentable);
        assert_eq!(IngredientCategory::from_label(" extract "), IngredientCategory::Fermentable);
        assert_eq!(IngredientCategory::from_label("hops"), IngredientCategory::Hop);
        assert_eq!(IngredientCategory::from_label("finings"), IngredientCategory::Other);
    }

    #[test]
    fn ion_profile_with_and_map() {
        let profile = WaterIonProfile::default().with(Ion::Sulfate, 120.0);
        assert_eq!(profile.get(Ion::Sulfate), 120.0);
        assert_eq!(profile.get(Ion::Chloride), 0.0);

        let doubled = profile.map(|ppm| ppm * 2.0);
        assert_eq!(doubled.sulfate_ppm, 240.0);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(2.0, 2), 2.0);
    }
}
