//! Mineral additions that move source water toward a style's ion targets
//!
//! One forward pass over sulfate, chloride, magnesium and bicarbonate, in that
//! order. Each salt also raises a second ion (gypsum adds calcium as well as
//! sulfate), so every step sees the profile projected by the steps before it.

use serde::Serialize;
use tracing::debug;

use crate::display::{Language, Message};
use crate::error::{PlanError, PlanResult};
use crate::models::{Ion, WaterIonProfile, round_to};
use crate::styles::{StyleProfile, resolve_style};

/// A brewing salt and the ppm it adds per gram per liter
#[derive(Debug)]
pub struct Salt {
    pub name: &'static str,
    pub contributions: &'static [(Ion, f64)],
}

pub const GYPSUM: Salt = Salt {
    name: "Gypsum (CaSO4)",
    contributions: &[(Ion::Calcium, 61.5), (Ion::Sulfate, 147.4)],
};

pub const CALCIUM_CHLORIDE: Salt = Salt {
    name: "Calcium Chloride (CaCl2)",
    contributions: &[(Ion::Calcium, 72.0), (Ion::Chloride, 127.0)],
};

pub const EPSOM_SALT: Salt = Salt {
    name: "Epsom Salt (MgSO4)",
    contributions: &[(Ion::Magnesium, 26.0), (Ion::Sulfate, 103.0)],
};

pub const BAKING_SODA: Salt = Salt {
    name: "Baking Soda (NaHCO3)",
    contributions: &[(Ion::Sodium, 72.0), (Ion::Bicarbonate, 191.7)],
};

impl Salt {
    fn contribution(&self, ion: Ion) -> f64 {
        self.contributions
            .iter()
            .find(|(contributed, _)| *contributed == ion)
            .map(|(_, ppm)| *ppm)
            .unwrap_or(0.0)
    }

    fn apply(&self, profile: WaterIonProfile, grams_per_liter: f64) -> WaterIonProfile {
        self.contributions.iter().fold(profile, |projected, (ion, ppm)| {
            projected.with(*ion, projected.get(*ion) + grams_per_liter * ppm)
        })
    }
}

/// One step of the adjustment pass
struct Adjustment {
    ion: Ion,
    threshold_ppm: f64, // gaps at or below this are left alone
    salt: &'static Salt,
    max_grams_per_liter: f64,
    reason: Message,
}

const ADJUSTMENTS: [Adjustment; 4] = [
    Adjustment {
        ion: Ion::Sulfate,
        threshold_ppm: 5.0,
        salt: &GYPSUM,
        max_grams_per_liter: 1.5,
        reason: Message::AddSulfate,
    },
    Adjustment {
        ion: Ion::Chloride,
        threshold_ppm: 5.0,
        salt: &CALCIUM_CHLORIDE,
        max_grams_per_liter: 1.5,
        reason: Message::AddChloride,
    },
    Adjustment {
        ion: Ion::Magnesium,
        threshold_ppm: 3.0,
        salt: &EPSOM_SALT,
        max_grams_per_liter: 0.6,
        reason: Message::AddMagnesium,
    },
    Adjustment {
        ion: Ion::Bicarbonate,
        threshold_ppm: 10.0,
        salt: &BAKING_SODA,
        max_grams_per_liter: 0.5,
        reason: Message::AddBicarbonate,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MineralAddition {
    pub mineral_name: String,
    pub grams_per_liter: f64,
    pub grams_total: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterRecommendation {
    pub style_code: String,
    pub style_name: String,
    pub batch_volume_liters: f64,
    pub source_profile: WaterIonProfile,
    pub target_profile: WaterIonProfile,
    pub projected_profile: WaterIonProfile,
    pub additions: Vec<MineralAddition>,
    pub notes: Vec<String>,
}

/// Compute salt additions for `source` water brewed as `style`.
pub fn recommend_water(
    source: &WaterIonProfile,
    style: &StyleProfile,
    batch_volume_liters: f64,
    language: Language,
) -> WaterRecommendation {
    let target = style.target_profile();

    let (projected, additions) = ADJUSTMENTS.iter().fold(
        (*source, Vec::new()),
        |(projected, mut additions), step| {
            let gap = target.get(step.ion) - projected.get(step.ion);
            if gap <= step.threshold_ppm {
                return (projected, additions);
            }

            let dose = (gap / step.salt.contribution(step.ion)).min(step.max_grams_per_liter);
            if !dose.is_finite() || dose <= 0.0 {
                return (projected, additions);
            }

            debug!(ion = step.ion.label(), gap, dose, salt = step.salt.name, "water addition");
            additions.push(MineralAddition {
                mineral_name: step.salt.name.to_string(),
                grams_per_liter: round_to(dose, 3),
                grams_total: round_to(dose * batch_volume_liters, 2),
                reason: language.text(step.reason).replace("{style}", style.name),
            });
            (step.salt.apply(projected, dose), additions)
        },
    );

    let mut notes = Vec::new();
    if projected.calcium_ppm > style.calcium.max_ppm + 40.0 {
        notes.push(language.text(Message::HighCalcium).to_string());
    }
    if projected.sulfate_ppm > style.sulfate.max_ppm + 50.0 {
        notes.push(language.text(Message::HighSulfate).to_string());
    }
    if projected.chloride_ppm > style.chloride.max_ppm + 40.0 {
        notes.push(language.text(Message::HighChloride).to_string());
    }
    if source.bicarbonate_ppm > style.bicarbonate.max_ppm + 50.0 {
        notes.push(language.text(Message::HighBicarbonateStart).to_string());
    }
    if additions.is_empty() {
        notes.push(language.text(Message::WaterClose).to_string());
    }

    WaterRecommendation {
        style_code: style.code.to_string(),
        style_name: style.name.to_string(),
        batch_volume_liters,
        source_profile: source.map(|ppm| round_to(ppm, 2)),
        target_profile: target.map(|ppm| round_to(ppm, 2)),
        projected_profile: projected.map(|ppm| round_to(ppm, 2)),
        additions,
        notes,
    }
}

/// Look up `style` by code or name, then recommend additions for it
pub fn recommend_for_style(
    source: &WaterIonProfile,
    style: &str,
    batch_volume_liters: f64,
    language: Language,
) -> PlanResult<WaterRecommendation> {
    let profile = resolve_style(style).ok_or_else(|| PlanError::UnknownStyle(style.to_string()))?;
    if !(batch_volume_liters > 0.0) {
        return Err(PlanError::InvalidInput(format!(
            "batch volume must be positive, got {batch_volume_liters}"
        )));
    }
    Ok(recommend_water(source, profile, batch_volume_liters, language))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soft_water() -> WaterIonProfile {
        WaterIonProfile {
            calcium_ppm: 10.0,
            magnesium_ppm: 2.0,
            sodium_ppm: 5.0,
            chloride_ppm: 10.0,
            sulfate_ppm: 10.0,
            bicarbonate_ppm: 40.0,
        }
    }

    #[test]
    fn ipa_gets_gypsum_first_and_epsom_sees_the_new_sulfate() {
        let ipa = resolve_style("21A").unwrap();
        let rec = recommend_water(&soft_water(), ipa, 20.0, Language::En);

        let names: Vec<_> = rec.additions.iter().map(|a| a.mineral_name.as_str()).collect();
        assert_eq!(names, vec!["Gypsum (CaSO4)", "Calcium Chloride (CaCl2)", "Epsom Salt (MgSO4)"]);

        // 240 ppm gap / 147.4 caps at 1.5 g/L
        let gypsum = &rec.additions[0];
        assert_eq!(gypsum.grams_per_liter, 1.5);
        assert_eq!(gypsum.grams_total, 30.0);

        // sulfate: 10 + 1.5*147.4 + epsom dose*103
        let epsom_dose = (15.0 - 2.0) / 26.0;
        let expected_sulfate = round_to(10.0 + 1.5 * 147.4 + epsom_dose * 103.0, 2);
        assert!((rec.projected_profile.sulfate_ppm - expected_sulfate).abs() < 0.01);
        assert!(rec.additions.iter().all(|a| a.grams_per_liter > 0.0));
    }

    #[test]
    fn addition_reasons_follow_language() {
        let ipa = resolve_style("21A").unwrap();
        let en = recommend_water(&soft_water(), ipa, 20.0, Language::En);
        let es = recommend_water(&soft_water(), ipa, 20.0, Language::Es);

        assert_eq!(en.additions[0].reason, "Increase sulfate to sharpen bitterness for American IPA.");
        assert_eq!(es.additions[0].reason, "Aumenta sulfato para resaltar el amargor en American IPA.");
        assert_eq!(es.additions[2].reason, Language::Es.text(Message::AddMagnesium));
        assert_eq!(en.additions.len(), es.additions.len());
    }

    #[test]
    fn stout_raises_bicarbonate_with_baking_soda() {
        let stout = resolve_style("15B").unwrap();
        let rec = recommend_water(&soft_water(), stout, 10.0, Language::En);

        let soda = rec
            .additions
            .iter()
            .find(|a| a.mineral_name.starts_with("Baking Soda"))
            .unwrap();
        assert_eq!(soda.grams_per_liter, 0.5);
        assert_eq!(soda.grams_total, 5.0);
    }

    #[test]
    fn water_at_target_needs_nothing() {
        let helles = resolve_style("8A").unwrap();
        let at_max = WaterIonProfile {
            calcium_ppm: 60.0,
            magnesium_ppm: 15.0,
            sodium_ppm: 30.0,
            chloride_ppm: 90.0,
            sulfate_ppm: 80.0,
            bicarbonate_ppm: 80.0,
        };

        let rec = recommend_water(&at_max, helles, 20.0, Language::En);
        assert!(rec.additions.is_empty());
        assert_eq!(rec.notes, vec![Language::En.text(Message::WaterClose).to_string()]);
        assert_eq!(rec.projected_profile, at_max);
    }

    #[test]
    fn high_source_bicarbonate_is_flagged() {
        let ipa = resolve_style("21A").unwrap();
        let hard = WaterIonProfile {
            bicarbonate_ppm: 300.0,
            ..soft_water()
        };

        let rec = recommend_water(&hard, ipa, 20.0, Language::En);
        assert!(rec.notes.contains(&Language::En.text(Message::HighBicarbonateStart).to_string()));
    }

    #[test]
    fn style_lookup_failures_are_errors() {
        assert_eq!(
            recommend_for_style(&soft_water(), "Gose", 20.0, Language::En).unwrap_err(),
            PlanError::UnknownStyle("Gose".to_string())
        );
        assert!(matches!(
            recommend_for_style(&soft_water(), "21A", 0.0, Language::En),
            Err(PlanError::InvalidInput(_))
        ));
        let rec = recommend_for_style(&soft_water(), "american ipa", 20.0, Language::En).unwrap();
        assert_eq!(rec.style_code, "21A");
    }

    #[test]
    fn small_gaps_are_ignored() {
        let helles = resolve_style("8A").unwrap();
        let near = helles.target_profile().with(Ion::Sulfate, 46.0).with(Ion::Magnesium, 8.5);

        let rec = recommend_water(&near, helles, 20.0, Language::En);
        assert!(rec.additions.is_empty());
    }
}
