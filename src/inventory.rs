//! Matching recipe requirements against on-hand stock
//!
//! Requirements are aggregated from a recipe snapshot, looked up in stock by
//! name, and converted into the requirement's unit. Consumption converts back
//! into each stock record's own unit and is all-or-nothing: every deduction
//! is planned before any quantity changes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Batch, IngredientCategory, IngredientLine, StockRecord, round_to};
use crate::units;

/// Shortages at or below this are rounding noise
pub const SHORTAGE_TOLERANCE: f64 = 1e-4;

/// Total amount of one ingredient a recipe needs, in one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementLine {
    pub name: String,
    pub category: IngredientCategory,
    pub amount: f64,
    pub unit: String,
}

/// Aggregate recipe lines into requirements.
///
/// Lines are grouped by (name, category, unit), case-insensitively. The same
/// malt listed once in kg and once in lb stays as two requirements.
pub fn build_requirements(lines: &[IngredientLine]) -> Vec<RequirementLine> {
    let mut requirements: Vec<RequirementLine> = Vec::new();
    let mut by_key: HashMap<(String, IngredientCategory, String), usize> = HashMap::new();

    for line in lines {
        let name = line.name.trim();
        let unit = line.unit.trim();
        if name.is_empty() || unit.is_empty() {
            continue;
        }
        if !line.amount.is_finite() || line.amount <= 0.0 {
            debug!(ingredient = name, amount = line.amount, "dropping ingredient line with unusable amount");
            continue;
        }

        let key = (name.to_lowercase(), line.category, unit.to_lowercase());
        match by_key.get(&key) {
            Some(&index) => requirements[index].amount += line.amount,
            None => {
                by_key.insert(key, requirements.len());
                requirements.push(RequirementLine {
                    name: name.to_string(),
                    category: line.category,
                    amount: line.amount,
                    unit: unit.to_string(),
                });
            }
        }
    }

    requirements.sort_by(|a, b| {
        (a.name.to_lowercase(), a.unit.to_lowercase()).cmp(&(b.name.to_lowercase(), b.unit.to_lowercase()))
    });
    requirements
}

/// One requirement checked against stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub requirement: RequirementLine,
    pub available_amount: f64, // in the requirement's unit
    pub shortage_amount: f64,
    pub enough_stock: bool,
    pub stock_id: Option<i64>,
    pub stock_unit: Option<String>,
}

impl MatchResult {
    /// Required amount that stock actually covers
    pub fn covered_amount(&self) -> f64 {
        self.available_amount.max(0.0).min(self.requirement.amount.max(0.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPreview {
    pub can_consume: bool,
    pub shortage_count: usize,
    pub rows: Vec<MatchResult>,
}

impl InventoryPreview {
    pub fn shortages(&self) -> impl Iterator<Item = &MatchResult> {
        self.rows.iter().filter(|row| !row.enough_stock)
    }
}

fn stock_by_name(stock: &[StockRecord]) -> HashMap<String, &StockRecord> {
    stock
        .iter()
        .map(|record| (record.name.trim().to_lowercase(), record))
        .collect()
}

/// Check every requirement against stock.
///
/// A missing stock record and a stock record in an inconvertible unit both
/// count as zero available; `stock_id` tells the two apart.
pub fn preview(requirements: &[RequirementLine], stock: &[StockRecord]) -> InventoryPreview {
    let by_name = stock_by_name(stock);
    let mut rows = Vec::with_capacity(requirements.len());

    for requirement in requirements {
        let matched = by_name.get(&requirement.name.trim().to_lowercase());
        let mut available = 0.0;
        let mut shortage = requirement.amount;
        let mut enough_stock = false;

        if let Some(record) = matched {
            match units::convert(record.quantity, &record.unit, &requirement.unit) {
                Some(converted) => {
                    available = converted;
                    shortage = (requirement.amount - converted).max(0.0);
                    enough_stock = shortage <= SHORTAGE_TOLERANCE;
                }
                None => debug!(
                    ingredient = %requirement.name,
                    stock_unit = %record.unit,
                    required_unit = %requirement.unit,
                    "stock unit cannot be converted, treating as unavailable"
                ),
            }
        }

        rows.push(MatchResult {
            requirement: RequirementLine {
                amount: round_to(requirement.amount, 4),
                ..requirement.clone()
            },
            available_amount: round_to(available, 4),
            shortage_amount: round_to(shortage, 4),
            enough_stock,
            stock_id: matched.map(|record| record.id),
            stock_unit: matched.map(|record| record.unit.clone()),
        });
    }

    let shortage_count = rows.iter().filter(|row| !row.enough_stock).count();
    InventoryPreview {
        can_consume: !rows.is_empty() && shortage_count == 0,
        shortage_count,
        rows,
    }
}

/// Why a consumption request was refused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ConsumeFailure {
    AlreadyConsumed { consumed_at: DateTime<Utc> },
    NoIngredients,
    InsufficientInventory { shortage_count: usize },
    MissingStockMapping { ingredient: String },
    IncompatibleUnits { ingredient: String },
}

impl ConsumeFailure {
    /// Stable machine-readable reason
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyConsumed { .. } => "already_consumed",
            Self::NoIngredients => "no_ingredients",
            Self::InsufficientInventory { .. } => "insufficient_inventory",
            Self::MissingStockMapping { .. } => "missing_stock_mapping",
            Self::IncompatibleUnits { .. } => "incompatible_units",
        }
    }
}

impl std::fmt::Display for ConsumeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyConsumed { consumed_at } => {
                write!(f, "inventory already consumed for this batch at {}", consumed_at.to_rfc3339())
            }
            Self::NoIngredients => write!(f, "no snapshot ingredients available for this batch"),
            Self::InsufficientInventory { shortage_count } => {
                write!(f, "insufficient inventory to consume this batch ({} short)", shortage_count)
            }
            Self::MissingStockMapping { ingredient } => {
                write!(f, "no stock record mapped for '{}'", ingredient)
            }
            Self::IncompatibleUnits { ingredient } => {
                write!(f, "incompatible units while deducting '{}'", ingredient)
            }
        }
    }
}

/// Stock movement for one requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumedItem {
    pub stock_id: i64,
    pub name: String,
    pub consumed_amount: f64,
    pub consumed_unit: String,
    pub quantity_before: f64,
    pub quantity_after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConsumeOutcome {
    Consumed {
        consumed_at: DateTime<Utc>,
        items: Vec<ConsumedItem>,
    },
    Rejected {
        reason: ConsumeFailure,
        shortages: Vec<MatchResult>,
    },
}

impl ConsumeOutcome {
    fn rejected(reason: ConsumeFailure) -> Self {
        Self::Rejected {
            reason,
            shortages: Vec::new(),
        }
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed { .. })
    }
}

/// Plan the stock deductions for a batch.
///
/// Nothing is mutated here: the caller applies `items` (each carries the
/// final quantity) and marks the batch with `consumed_at` as a single unit.
pub fn consume(batch: &Batch, stock: &[StockRecord], now: DateTime<Utc>) -> ConsumeOutcome {
    if let Some(consumed_at) = batch.inventory_consumed_at {
        return ConsumeOutcome::rejected(ConsumeFailure::AlreadyConsumed { consumed_at });
    }

    let requirements = build_requirements(&batch.snapshot.ingredients);
    if requirements.is_empty() {
        return ConsumeOutcome::rejected(ConsumeFailure::NoIngredients);
    }

    let preview = preview(&requirements, stock);
    if preview.shortage_count > 0 {
        return ConsumeOutcome::Rejected {
            reason: ConsumeFailure::InsufficientInventory {
                shortage_count: preview.shortage_count,
            },
            shortages: preview.shortages().cloned().collect(),
        };
    }

    let by_id: HashMap<i64, &StockRecord> = stock.iter().map(|record| (record.id, record)).collect();
    let mut planned: Vec<(&MatchResult, &StockRecord, f64)> = Vec::with_capacity(preview.rows.len());

    for row in &preview.rows {
        let ingredient = row.requirement.name.clone();
        let Some(record) = row.stock_id.and_then(|id| by_id.get(&id)) else {
            return ConsumeOutcome::rejected(ConsumeFailure::MissingStockMapping { ingredient });
        };
        let Some(deduction) = units::convert(row.requirement.amount, &row.requirement.unit, &record.unit) else {
            return ConsumeOutcome::rejected(ConsumeFailure::IncompatibleUnits { ingredient });
        };
        planned.push((row, record, deduction));
    }

    // Two requirement lines can point at the same stock record (same malt in
    // kg and lb), so deductions chain through a running quantity per record.
    let mut running: HashMap<i64, f64> = HashMap::new();
    let mut items = Vec::with_capacity(planned.len());
    for (row, record, deduction) in planned {
        let before = *running.get(&record.id).unwrap_or(&record.quantity);
        let mut after = before - deduction;
        if after < 0.0 && after.abs() <= SHORTAGE_TOLERANCE {
            after = 0.0;
        }
        if after < 0.0 {
            let shortage = units::convert(-after, &record.unit, &row.requirement.unit).unwrap_or(-after);
            return ConsumeOutcome::Rejected {
                reason: ConsumeFailure::InsufficientInventory { shortage_count: 1 },
                shortages: vec![MatchResult {
                    shortage_amount: round_to(shortage, 4),
                    enough_stock: false,
                    ..row.clone()
                }],
            };
        }
        let after = round_to(after, 6);
        running.insert(record.id, after);
        debug!(stock = %record.name, before, after, "planned deduction");

        items.push(ConsumedItem {
            stock_id: record.id,
            name: record.name.clone(),
            consumed_amount: round_to(deduction, 4),
            consumed_unit: record.unit.clone(),
            quantity_before: round_to(before, 6),
            quantity_after: after,
        });
    }

    info!(batch_id = batch.id, items = items.len(), "inventory consumption planned");
    ConsumeOutcome::Consumed {
        consumed_at: now,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeSnapshot;

    fn stock(id: i64, name: &str, category: IngredientCategory, quantity: f64, unit: &str) -> StockRecord {
        StockRecord {
            id,
            name: name.to_string(),
            category,
            quantity,
            unit: unit.to_string(),
        }
    }

    fn batch_with(lines: Vec<IngredientLine>) -> Batch {
        Batch {
            id: 7,
            name: "Test batch".to_string(),
            recipe_id: None,
            volume_liters: 20.0,
            snapshot: RecipeSnapshot {
                name: "Test".to_string(),
                ingredients: lines,
                ..Default::default()
            },
            inventory_consumed_at: None,
        }
    }

    #[test]
    fn aggregation_sums_same_unit_and_keeps_units_apart() {
        let lines = vec![
            IngredientLine::new("Cascade", IngredientCategory::Hop, 20.0, "g"),
            IngredientLine::new("cascade", IngredientCategory::Hop, 25.0, "G"),
            IngredientLine::new("Cascade", IngredientCategory::Hop, 1.0, "oz"),
            IngredientLine::new("Pale Malt", IngredientCategory::Fermentable, 4.5, "kg"),
            IngredientLine::new("Broken", IngredientCategory::Other, 0.0, "g"),
            IngredientLine::new("NaN", IngredientCategory::Other, f64::NAN, "g"),
        ];

        let requirements = build_requirements(&lines);
        assert_eq!(requirements.len(), 3);
        assert_eq!(requirements[0].name, "Cascade");
        assert_eq!(requirements[0].unit, "g");
        assert_eq!(requirements[0].amount, 45.0);
        assert_eq!(requirements[1].unit, "oz");
        assert_eq!(requirements[2].name, "Pale Malt");
    }

    #[test]
    fn preview_converts_stock_units() {
        let requirements = build_requirements(&[
            IngredientLine::new("Pale Malt", IngredientCategory::Fermentable, 4.3, "kg"),
            IngredientLine::new("US-05", IngredientCategory::Yeast, 1.0, "pack"),
        ]);
        let stock = vec![
            stock(1, "pale malt", IngredientCategory::Fermentable, 2000.0, "g"),
            stock(2, "US-05", IngredientCategory::Yeast, 1.0, "each"),
        ];

        let preview = preview(&requirements, &stock);
        assert_eq!(preview.shortage_count, 1);
        assert!(!preview.can_consume);

        let malt = &preview.rows[0];
        assert_eq!(malt.available_amount, 2.0);
        assert_eq!(malt.shortage_amount, 2.3);
        assert_eq!(malt.stock_id, Some(1));
        assert!(preview.rows[1].enough_stock);
    }

    #[test]
    fn inconvertible_stock_counts_as_zero_but_keeps_link() {
        let requirements = build_requirements(&[IngredientLine::new(
            "Lactose",
            IngredientCategory::Other,
            250.0,
            "g",
        )]);
        let stock = vec![stock(3, "Lactose", IngredientCategory::Other, 1.0, "l")];

        let preview = preview(&requirements, &stock);
        let row = &preview.rows[0];
        assert_eq!(row.available_amount, 0.0);
        assert_eq!(row.shortage_amount, 250.0);
        assert_eq!(row.stock_id, Some(3));
    }

    #[test]
    fn empty_requirements_cannot_be_consumed() {
        let preview = preview(&[], &[]);
        assert!(!preview.can_consume);
        assert_eq!(preview.shortage_count, 0);
    }

    #[test]
    fn consume_deducts_in_stock_units() {
        let batch = batch_with(vec![IngredientLine::new(
            "Pale Malt",
            IngredientCategory::Fermentable,
            4300.0,
            "g",
        )]);
        let stock = vec![stock(1, "Pale Malt", IngredientCategory::Fermentable, 5000.0, "g")];

        match consume(&batch, &stock, Utc::now()) {
            ConsumeOutcome::Consumed { items, .. } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].quantity_before, 5000.0);
                assert_eq!(items[0].quantity_after, 700.0);
            }
            other => panic!("expected consumption, got {:?}", other),
        }
    }

    #[test]
    fn consume_clamps_rounding_noise_to_zero() {
        let batch = batch_with(vec![IngredientLine::new(
            "Pale Malt",
            IngredientCategory::Fermentable,
            1.0,
            "lb",
        )]);
        let stock = vec![stock(1, "Pale Malt", IngredientCategory::Fermentable, 0.45359, "kg")];

        match consume(&batch, &stock, Utc::now()) {
            ConsumeOutcome::Consumed { items, .. } => assert_eq!(items[0].quantity_after, 0.0),
            other => panic!("expected consumption, got {:?}", other),
        }
    }

    #[test]
    fn consume_rejections() {
        let stock = vec![stock(1, "Pale Malt", IngredientCategory::Fermentable, 1.0, "kg")];

        let empty = batch_with(vec![]);
        match consume(&empty, &stock, Utc::now()) {
            ConsumeOutcome::Rejected { reason, .. } => assert_eq!(reason.code(), "no_ingredients"),
            other => panic!("unexpected {:?}", other),
        }

        let short = batch_with(vec![IngredientLine::new(
            "Pale Malt",
            IngredientCategory::Fermentable,
            2.0,
            "kg",
        )]);
        match consume(&short, &stock, Utc::now()) {
            ConsumeOutcome::Rejected { reason, shortages } => {
                assert_eq!(reason.code(), "insufficient_inventory");
                assert_eq!(shortages.len(), 1);
                assert_eq!(shortages[0].shortage_amount, 1.0);
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut done = short.clone();
        done.inventory_consumed_at = Some(Utc::now());
        match consume(&done, &stock, Utc::now()) {
            ConsumeOutcome::Rejected { reason, .. } => assert_eq!(reason.code(), "already_consumed"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn split_units_deduct_from_the_same_record() {
        let batch = batch_with(vec![
            IngredientLine::new("Pale Malt", IngredientCategory::Fermentable, 1.0, "kg"),
            IngredientLine::new("Pale Malt", IngredientCategory::Fermentable, 500.0, "g"),
        ]);
        let stock = vec![stock(1, "Pale Malt", IngredientCategory::Fermentable, 2.0, "kg")];

        match consume(&batch, &stock, Utc::now()) {
            ConsumeOutcome::Consumed { items, .. } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items.last().map(|item| item.quantity_after), Some(0.5));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn split_units_never_overdraw_a_record() {
        let batch = batch_with(vec![
            IngredientLine::new("Pale Malt", IngredientCategory::Fermentable, 1.5, "kg"),
            IngredientLine::new("Pale Malt", IngredientCategory::Fermentable, 1000.0, "g"),
        ]);
        let stock = vec![stock(1, "Pale Malt", IngredientCategory::Fermentable, 2.0, "kg")];

        match consume(&batch, &stock, Utc::now()) {
            ConsumeOutcome::Rejected { reason, shortages } => {
                assert_eq!(reason.code(), "insufficient_inventory");
                assert_eq!(shortages[0].shortage_amount, 0.5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
