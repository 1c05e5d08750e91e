//! Gravity, attenuation and recipe scaling calculations

use serde::Serialize;

use crate::error::{PlanError, PlanResult};
use crate::models::{IngredientCategory, Recipe, round_to};

/// Standard ABV approximation from original and final gravity
pub fn estimate_abv(og: f64, fg: f64) -> f64 {
    round_to((og - fg) * 131.25, 2)
}

/// Apparent attenuation in percent
pub fn attenuation_pct(og: f64, fg: f64) -> f64 {
    if og <= 1.0 {
        return 0.0;
    }
    round_to((og - fg) / (og - 1.0) * 100.0, 2)
}

/// Target over source efficiency; 1.0 when the source efficiency is unknown
pub fn efficiency_ratio(source_efficiency_pct: f64, target_efficiency_pct: f64) -> f64 {
    if source_efficiency_pct > 0.0 {
        target_efficiency_pct / source_efficiency_pct
    } else {
        1.0
    }
}

/// OG after correcting for brewhouse efficiency and the share of the
/// fermentables actually on hand (`coverage` in [0, 1])
pub fn adjusted_og(source_og: f64, source_efficiency_pct: f64, target_efficiency_pct: f64, coverage: f64) -> f64 {
    let source_points = ((source_og - 1.0) * 1000.0).max(1.0);
    let points = source_points * efficiency_ratio(source_efficiency_pct, target_efficiency_pct) * coverage;
    1.0 + points / 1000.0
}

/// FG for `new_og` assuming the recipe's attenuation holds
pub fn carry_attenuation(source_og: f64, source_fg: f64, new_og: f64) -> f64 {
    let source_points = ((source_og - 1.0) * 1000.0).max(0.0001);
    let attenuation = ((source_og - source_fg) * 1000.0 / source_points).clamp(0.0, 1.0);
    new_og - attenuation * (new_og - 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledIngredient {
    pub name: String,
    pub category: IngredientCategory,
    pub original_amount: f64,
    pub scaled_amount: f64,
    pub unit: String,
    pub stage: String,
    pub minute_added: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledRecipe {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub style: Option<String>,
    pub source_batch_volume_liters: f64,
    pub target_batch_volume_liters: f64,
    pub scale_factor: f64,
    pub source_efficiency_pct: f64,
    pub target_efficiency_pct: f64,
    pub estimated_og: f64,
    pub estimated_fg: f64,
    pub estimated_abv: f64,
    pub target_ibu: Option<f64>,
    pub target_srm: Option<f64>,
    pub ingredients: Vec<ScaledIngredient>,
}

/// Scale a recipe to a new batch volume and brewhouse efficiency
pub fn scale_recipe(
    recipe: &Recipe,
    source_volume_liters: f64,
    target_volume_liters: f64,
    target_efficiency_pct: f64,
) -> PlanResult<ScaledRecipe> {
    if !(source_volume_liters > 0.0) || !(target_volume_liters > 0.0) {
        return Err(PlanError::InvalidInput(format!(
            "batch volumes must be positive (source {source_volume_liters}, target {target_volume_liters})"
        )));
    }
    if !target_efficiency_pct.is_finite() || target_efficiency_pct < 0.0 {
        return Err(PlanError::InvalidInput(format!(
            "target efficiency must be a non-negative percentage, got {target_efficiency_pct}"
        )));
    }

    let scale_factor = target_volume_liters / source_volume_liters;

    // Scaling keeps the grist proportional, so only efficiency moves the OG
    let og_points = ((recipe.target_og - 1.0) * 1000.0).max(0.0);
    let estimated_og = 1.0 + og_points * efficiency_ratio(recipe.efficiency_pct, target_efficiency_pct) / 1000.0;
    let estimated_fg = carry_attenuation(recipe.target_og, recipe.target_fg, estimated_og);

    let ingredients = recipe
        .ingredients
        .iter()
        .map(|line| ScaledIngredient {
            name: line.name.clone(),
            category: line.category,
            original_amount: round_to(line.amount, 4),
            scaled_amount: round_to(line.amount * scale_factor, 4),
            unit: line.unit.clone(),
            stage: line.stage.clone(),
            minute_added: line.minute_added,
        })
        .collect();

    let og = round_to(estimated_og, 3);
    let fg = round_to(estimated_fg, 3);

    Ok(ScaledRecipe {
        recipe_id: recipe.id,
        recipe_name: recipe.name.clone(),
        style: recipe.style.clone(),
        source_batch_volume_liters: round_to(source_volume_liters, 4),
        target_batch_volume_liters: round_to(target_volume_liters, 4),
        scale_factor: round_to(scale_factor, 4),
        source_efficiency_pct: round_to(recipe.efficiency_pct, 2),
        target_efficiency_pct: round_to(target_efficiency_pct, 2),
        estimated_og: og,
        estimated_fg: fg,
        estimated_abv: estimate_abv(og, fg),
        target_ibu: recipe.target_ibu.map(|ibu| round_to(ibu, 2)),
        target_srm: recipe.target_srm.map(|srm| round_to(srm, 2)),
        ingredients,
    })
}

impl std::fmt::Display for ScaledRecipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== {} ===", self.recipe_name)?;
        writeln!(
            f,
            "Volume: {:.1} L -> {:.1} L (x{:.4})",
            self.source_batch_volume_liters, self.target_batch_volume_liters, self.scale_factor
        )?;
        writeln!(
            f,
            "Efficiency: {:.1}% -> {:.1}%",
            self.source_efficiency_pct, self.target_efficiency_pct
        )?;
        writeln!(
            f,
            "Estimated OG {:.3}  FG {:.3}  ABV {:.2}%",
            self.estimated_og, self.estimated_fg, self.estimated_abv
        )?;
        writeln!(f)?;
        writeln!(f, "{:<30} {:>12} {:>12} {:<6}", "Ingredient", "Original", "Scaled", "Unit")?;
        writeln!(f, "{}", "-".repeat(64))?;
        for line in &self.ingredients {
            writeln!(
                f,
                "{:<30} {:>12.3} {:>12.3} {:<6}",
                line.name, line.original_amount, line.scaled_amount, line.unit
            )?;
        }
        Ok(())
    }
}
