//! Unit conversion within a single physical dimension
//!
//! Recipes and stock records are entered by hand, so the same quantity can
//! show up as "kg", "Kilograms" or "lbs". Everything here normalizes the
//! unit string first and then converts through the dimension's base unit
//! (gram, milliliter, or a single count).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Mass,
    Volume,
    Count,
}

/// Canonical unit -> (dimension, factor to base unit)
const UNIT_TABLE: &[(&str, Dimension, f64)] = &[
    ("g", Dimension::Mass, 1.0),
    ("kg", Dimension::Mass, 1000.0),
    ("oz", Dimension::Mass, 28.3495),
    ("lb", Dimension::Mass, 453.592),
    ("ml", Dimension::Volume, 1.0),
    ("l", Dimension::Volume, 1000.0),
    ("floz", Dimension::Volume, 29.5735),
    ("qt", Dimension::Volume, 946.353),
    ("gal", Dimension::Volume, 3785.41),
    ("pack", Dimension::Count, 1.0),
    ("each", Dimension::Count, 1.0),
    ("unit", Dimension::Count, 1.0),
];

const UNIT_ALIASES: &[(&str, &str)] = &[
    ("gram", "g"),
    ("grams", "g"),
    ("kgs", "kg"),
    ("kilogram", "kg"),
    ("kilograms", "kg"),
    ("ounce", "oz"),
    ("ounces", "oz"),
    ("pound", "lb"),
    ("pounds", "lb"),
    ("lbs", "lb"),
    ("liter", "l"),
    ("liters", "l"),
    ("litre", "l"),
    ("litres", "l"),
    ("fl oz", "floz"),
    ("fluid ounce", "floz"),
    ("fluid ounces", "floz"),
    ("quart", "qt"),
    ("quarts", "qt"),
    ("gallon", "gal"),
    ("gallons", "gal"),
    ("milliliter", "ml"),
    ("milliliters", "ml"),
    ("millilitre", "ml"),
    ("millilitres", "ml"),
    ("packs", "pack"),
    ("units", "unit"),
];

/// Normalize a unit string to its canonical spelling.
///
/// Unknown units are returned lower-cased and trimmed so that two identical
/// unknown units still compare equal.
pub fn canonical_unit(unit: &str) -> String {
    let lowered = unit.trim().to_lowercase();
    UNIT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lowered)
}

fn lookup(canonical: &str) -> Option<(Dimension, f64)> {
    UNIT_TABLE
        .iter()
        .find(|(name, _, _)| *name == canonical)
        .map(|(_, dimension, factor)| (*dimension, *factor))
}

/// Dimension of a unit, if the unit is recognized
pub fn dimension_of(unit: &str) -> Option<Dimension> {
    lookup(&canonical_unit(unit)).map(|(dimension, _)| dimension)
}

/// Convert `amount` from one unit to another.
///
/// Returns `None` when either unit is unknown or the units measure different
/// things (grams to milliliters). `None` means "cannot determine", never zero.
pub fn convert(amount: f64, from_unit: &str, to_unit: &str) -> Option<f64> {
    let from = canonical_unit(from_unit);
    let to = canonical_unit(to_unit);

    if from == to {
        return Some(amount);
    }

    let (from_dimension, from_factor) = lookup(&from)?;
    let (to_dimension, to_factor) = lookup(&to)?;
    if from_dimension != to_dimension {
        return None;
    }

    Some(amount * from_factor / to_factor)
}

/// Convert a mass to kilograms
pub fn to_kilograms(amount: f64, unit: &str) -> Option<f64> {
    convert(amount, unit, "kg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_for_every_known_unit() {
        for (unit, _, _) in UNIT_TABLE {
            assert_eq!(convert(12.5, unit, unit), Some(12.5));
        }
    }

    #[test]
    fn aliases_resolve_before_conversion() {
        let kg = convert(2500.0, "Grams", "kilograms").unwrap();
        assert!((kg - 2.5).abs() < 1e-9);

        let ml = convert(1.0, "fl oz", "ml").unwrap();
        assert!((ml - 29.5735).abs() < 1e-9);
    }

    #[test]
    fn cross_dimension_is_rejected() {
        assert_eq!(convert(100.0, "g", "ml"), None);
        assert_eq!(convert(1.0, "pack", "kg"), None);
    }

    #[test]
    fn unknown_units_only_match_themselves() {
        assert_eq!(convert(3.0, "sachet", "Sachet "), Some(3.0));
        assert_eq!(convert(3.0, "sachet", "pack"), None);
    }

    #[test]
    fn count_units_are_interchangeable() {
        assert_eq!(convert(2.0, "packs", "each"), Some(2.0));
        assert_eq!(dimension_of("Unit"), Some(Dimension::Count));
    }

    #[test]
    fn pounds_to_kilograms() {
        let kg = to_kilograms(10.0, "lbs").unwrap();
        assert!((kg - 4.53592).abs() < 1e-9);
    }
}
