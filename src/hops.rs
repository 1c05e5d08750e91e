//! Hop flavor catalog and substitution ranking
//!
//! Every catalog hop carries a flavor vector over the same eleven aroma axes
//! (see [`FLAVOR_AXES`]). Candidates are ranked by cosine similarity of those
//! vectors, blended with descriptor overlap, alpha-acid closeness and a small
//! bonus for matching usage.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{PlanError, PlanResult};
use crate::models::round_to;

pub const FLAVOR_AXES: [&str; 11] = [
    "citrus",
    "tropical",
    "pine",
    "resin",
    "floral",
    "herbal",
    "spicy",
    "earthy",
    "berry",
    "stone-fruit",
    "dank",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HopUsage {
    Bittering,
    Aroma,
    DualPurpose,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopProfile {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub alpha_acid_min_pct: f64,
    pub alpha_acid_max_pct: f64,
    pub descriptors: &'static [&'static str],
    pub flavor_vector: [f64; 11],
    pub usage: HopUsage,
}

impl HopProfile {
    pub fn alpha_midpoint(&self) -> f64 {
        (self.alpha_acid_min_pct + self.alpha_acid_max_pct) / 2.0
    }
}

pub static HOP_CATALOG: &[HopProfile] = &[
    HopProfile {
        name: "Amarillo",
        aliases: &["amarillo"],
        alpha_acid_min_pct: 8.0,
        alpha_acid_max_pct: 11.0,
        descriptors: &["citrus", "floral", "orange", "tropical"],
        flavor_vector: [4.1, 3.4, 0.8, 1.0, 2.3, 0.8, 0.3, 0.2, 1.6, 0.3, 0.5],
        usage: HopUsage::DualPurpose,
    },
    HopProfile {
        name: "Cascade",
        aliases: &["cascade"],
        alpha_acid_min_pct: 4.5,
        alpha_acid_max_pct: 7.0,
        descriptors: &["citrus", "floral", "grapefruit", "spicy"],
        flavor_vector: [4.0, 1.2, 1.0, 0.7, 2.4, 1.2, 1.0, 0.4, 0.5, 0.2, 0.2],
        usage: HopUsage::DualPurpose,
    },
    HopProfile {
        name: "Centennial",
        aliases: &["centennial"],
        alpha_acid_min_pct: 9.5,
        alpha_acid_max_pct: 11.5,
        descriptors: &["citrus", "floral", "pine"],
        flavor_vector: [4.0, 1.5, 2.1, 1.2, 1.9, 0.9, 0.4, 0.2, 0.6, 0.1, 0.4],
        usage: HopUsage::DualPurpose,
    },
    HopProfile {
        name: "Chinook",
        aliases: &["chinook"],
        alpha_acid_min_pct: 12.0,
        alpha_acid_max_pct: 14.0,
        descriptors: &["grapefruit", "pine", "resin", "spicy"],
        flavor_vector: [2.7, 0.9, 3.8, 3.6, 0.8, 1.0, 1.8, 0.5, 0.3, 0.1, 1.6],
        usage: HopUsage::DualPurpose,
    },
    HopProfile {
        name: "Citra",
        aliases: &["citra"],
        alpha_acid_min_pct: 11.0,
        alpha_acid_max_pct: 14.0,
        descriptors: &["citrus", "tropical", "stone fruit"],
        flavor_vector: [4.8, 4.7, 0.5, 0.9, 0.9, 0.3, 0.1, 0.1, 3.3, 0.4, 1.0],
        usage: HopUsage::Aroma,
    },
    HopProfile {
        name: "Columbus",
        aliases: &["columbus", "ctz", "tomahawk", "zeus"],
        alpha_acid_min_pct: 14.0,
        alpha_acid_max_pct: 18.0,
        descriptors: &["citrus", "dank", "resin", "spicy"],
        flavor_vector: [2.5, 0.9, 2.0, 3.9, 0.5, 0.7, 1.1, 0.4, 0.2, 0.3, 3.9],
        usage: HopUsage::Bittering,
    },
    HopProfile {
        name: "Crystal",
        aliases: &["crystal"],
        alpha_acid_min_pct: 3.0,
        alpha_acid_max_pct: 6.0,
        descriptors: &["citrus", "floral", "spicy"],
        flavor_vector: [2.2, 0.8, 0.4, 0.4, 2.0, 1.4, 1.3, 0.7, 0.2, 0.1, 0.2],
        usage: HopUsage::Aroma,
    },
    HopProfile {
        name: "East Kent Goldings",
        aliases: &["east kent goldings", "ekg"],
        alpha_acid_min_pct: 4.0,
        alpha_acid_max_pct: 6.0,
        descriptors: &["earthy", "floral", "honey", "spicy"],
        flavor_vector: [0.4, 0.2, 0.3, 0.2, 2.6, 1.7, 1.7, 3.1, 0.2, 0.1, 0.2],
        usage: HopUsage::Aroma,
    },
    HopProfile {
        name: "Fuggle",
        aliases: &["fuggle", "fuggles"],
        alpha_acid_min_pct: 3.5,
        alpha_acid_max_pct: 5.5,
        descriptors: &["earthy", "herbal", "woody"],
        flavor_vector: [0.3, 0.2, 0.2, 0.2, 1.4, 2.6, 0.8, 3.7, 0.1, 0.1, 0.1],
        usage: HopUsage::Aroma,
    },
    HopProfile {
        name: "Hallertau Mittelfruh",
        aliases: &["hallertau mittelfruh", "hallertau"],
        alpha_acid_min_pct: 3.0,
        alpha_acid_max_pct: 5.5,
        descriptors: &["floral", "herbal", "spicy"],
        flavor_vector: [0.3, 0.1, 0.2, 0.1, 2.8, 2.1, 1.7, 1.9, 0.1, 0.1, 0.1],
        usage: HopUsage::Aroma,
    },
    HopProfile {
        name: "Magnum",
        aliases: &["magnum"],
        alpha_acid_min_pct: 12.0,
        alpha_acid_max_pct: 15.0,
        descriptors: &["clean", "herbal", "light citrus"],
        flavor_vector: [1.1, 0.2, 0.7, 0.8, 0.4, 1.6, 0.4, 0.5, 0.1, 0.1, 0.2],
        usage: HopUsage::Bittering,
    },
    HopProfile {
        name: "Mosaic",
        aliases: &["mosaic"],
        alpha_acid_min_pct: 10.5,
        alpha_acid_max_pct: 13.5,
        descriptors: &["berry", "citrus", "dank", "tropical"],
        flavor_vector: [4.1, 4.4, 1.3, 2.2, 0.9, 0.5, 0.2, 0.2, 2.2, 3.8, 2.8],
        usage: HopUsage::Aroma,
    },
    HopProfile {
        name: "Nugget",
        aliases: &["nugget"],
        alpha_acid_min_pct: 11.0,
        alpha_acid_max_pct: 14.0,
        descriptors: &["herbal", "resin", "spicy"],
        flavor_vector: [1.4, 0.4, 1.9, 2.9, 0.5, 2.1, 1.7, 0.6, 0.2, 0.1, 0.8],
        usage: HopUsage::Bittering,
    },
    HopProfile {
        name: "Saaz",
        aliases: &["saaz"],
        alpha_acid_min_pct: 2.5,
        alpha_acid_max_pct: 4.5,
        descriptors: &["floral", "herbal", "spicy"],
        flavor_vector: [0.2, 0.1, 0.1, 0.1, 2.2, 2.5, 2.0, 1.7, 0.1, 0.1, 0.1],
        usage: HopUsage::Aroma,
    },
    HopProfile {
        name: "Simcoe",
        aliases: &["simcoe"],
        alpha_acid_min_pct: 12.0,
        alpha_acid_max_pct: 14.0,
        descriptors: &["berry", "citrus", "dank", "pine", "resin"],
        flavor_vector: [3.1, 2.2, 3.8, 3.4, 0.7, 0.7, 0.4, 0.2, 1.0, 1.6, 2.6],
        usage: HopUsage::DualPurpose,
    },
    HopProfile {
        name: "Warrior",
        aliases: &["warrior"],
        alpha_acid_min_pct: 14.0,
        alpha_acid_max_pct: 17.0,
        descriptors: &["citrus", "clean", "resin"],
        flavor_vector: [1.5, 0.4, 1.5, 2.3, 0.3, 0.8, 0.5, 0.3, 0.2, 0.1, 0.8],
        usage: HopUsage::Bittering,
    },
];

const NOISE_TOKENS: &[&str] = &[
    "hop", "hops", "pellet", "pellets", "t90", "whole", "leaf", "cryo", "wholecone",
];

static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("separator pattern is valid"));

static HOPS_BY_ALIAS: LazyLock<HashMap<String, &'static HopProfile>> = LazyLock::new(|| {
    let mut by_alias = HashMap::new();
    for hop in HOP_CATALOG {
        by_alias.insert(normalize_hop_name(hop.name), hop);
        for alias in hop.aliases {
            by_alias.insert(normalize_hop_name(alias), hop);
        }
    }
    by_alias
});

/// Reduce a free-text hop name to its lookup key.
///
/// "Citra T90 Pellets" and "citra-hops" both become "citra".
pub fn normalize_hop_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    SEPARATOR
        .split(&lowered)
        .filter(|token| !token.is_empty() && !NOISE_TOKENS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn resolve_hop(name: &str) -> Option<&'static HopProfile> {
    let normalized = normalize_hop_name(name);
    if normalized.is_empty() {
        return None;
    }
    HOPS_BY_ALIAS.get(&normalized).copied()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstitutionCandidate {
    pub name: String,
    pub alpha_acid_min_pct: f64,
    pub alpha_acid_max_pct: f64,
    pub flavor_similarity: f64,
    pub descriptor_overlap: f64,
    pub alpha_closeness: f64,
    pub similarity_score: f64,
    pub recommended_bittering_ratio: f64, // multiply the substitute's charge by this
    pub shared_descriptors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopSubstitutionResult {
    pub target: &'static HopProfile,
    pub substitutions: Vec<SubstitutionCandidate>,
    pub unresolved: Vec<String>,
    pub recognized_candidate_count: usize,
}

/// Rank `candidates` as replacements for `target`, best first.
pub fn recommend<S: AsRef<str>>(target: &str, candidates: &[S], top_k: usize) -> PlanResult<HopSubstitutionResult> {
    let target_hop = resolve_hop(target).ok_or_else(|| PlanError::UnrecognizedHop(target.to_string()))?;

    let mut unresolved = Vec::new();
    let mut scored = Vec::new();
    let mut seen = HashSet::new();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let normalized = normalize_hop_name(candidate);
        if normalized.is_empty() || !seen.insert(normalized) {
            continue;
        }

        match resolve_hop(candidate) {
            None => unresolved.push(candidate.to_string()),
            Some(hop) if hop.name == target_hop.name => {}
            Some(hop) => scored.push(score_candidate(target_hop, hop)),
        }
    }

    scored.sort_by(|a, b| {
        b.similarity_score
            .total_cmp(&a.similarity_score)
            .then_with(|| a.name.cmp(&b.name))
    });
    let recognized_candidate_count = scored.len();
    scored.truncate(top_k);

    Ok(HopSubstitutionResult {
        target: target_hop,
        substitutions: scored,
        unresolved,
        recognized_candidate_count,
    })
}

fn score_candidate(target: &HopProfile, candidate: &HopProfile) -> SubstitutionCandidate {
    let flavor_similarity = cosine_similarity(&target.flavor_vector, &candidate.flavor_vector);

    let target_descriptors: HashSet<&str> = target.descriptors.iter().copied().collect();
    let mut shared: Vec<String> = candidate
        .descriptors
        .iter()
        .filter(|descriptor| target_descriptors.contains(*descriptor))
        .map(|descriptor| descriptor.to_string())
        .collect();
    shared.sort();
    shared.dedup();
    let descriptor_overlap = if target_descriptors.is_empty() {
        0.0
    } else {
        shared.len() as f64 / target_descriptors.len() as f64
    };

    let target_mid = target.alpha_midpoint();
    let candidate_mid = candidate.alpha_midpoint();
    let gap_ratio = (candidate_mid - target_mid).abs() / target_mid.max(0.1);
    let alpha_closeness = (1.0 - gap_ratio.min(1.0)).max(0.0);

    let usage_bonus = if target.usage == candidate.usage { 0.05 } else { 0.0 };
    let similarity =
        (0.65 * flavor_similarity + 0.20 * descriptor_overlap + 0.15 * alpha_closeness + usage_bonus).clamp(0.0, 1.0);

    SubstitutionCandidate {
        name: candidate.name.to_string(),
        alpha_acid_min_pct: candidate.alpha_acid_min_pct,
        alpha_acid_max_pct: candidate.alpha_acid_max_pct,
        flavor_similarity: round_to(flavor_similarity, 3),
        descriptor_overlap: round_to(descriptor_overlap, 3),
        alpha_closeness: round_to(alpha_closeness, 3),
        similarity_score: round_to(similarity, 3),
        recommended_bittering_ratio: round_to(target_mid / candidate_mid.max(0.1), 3),
        shared_descriptors: shared,
    }
}

fn cosine_similarity(left: &[f64], right: &[f64]) -> f64 {
    let dot: f64 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm = left.iter().map(|v| v * v).sum::<f64>().sqrt();
    let right_norm = right.iter().map(|v| v * v).sum::<f64>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm * right_norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_drops_noise_tokens() {
        assert_eq!(normalize_hop_name("Citra T90 Pellets"), "citra");
        assert_eq!(normalize_hop_name("  East-Kent   Goldings (whole leaf) "), "east kent goldings");
        assert_eq!(normalize_hop_name("Hops"), "");
    }

    #[test]
    fn aliases_resolve_to_canonical_profile() {
        assert_eq!(resolve_hop("CTZ").map(|hop| hop.name), Some("Columbus"));
        assert_eq!(resolve_hop("Zeus pellets").map(|hop| hop.name), Some("Columbus"));
        assert_eq!(resolve_hop("EKG").map(|hop| hop.name), Some("East Kent Goldings"));
        assert!(resolve_hop("Galaxy").is_none());
        assert!(resolve_hop("   ").is_none());
    }

    #[test]
    fn every_vector_has_the_shared_axes() {
        for hop in HOP_CATALOG {
            assert_eq!(hop.flavor_vector.len(), FLAVOR_AXES.len());
            assert!(hop.alpha_acid_min_pct <= hop.alpha_acid_max_pct);
        }
    }

    #[test]
    fn citra_prefers_mosaic_over_amarillo() {
        let result = recommend("Citra", &["Mosaic", "Amarillo", "Unknown Hop"], 3).unwrap();

        assert_eq!(result.target.name, "Citra");
        assert_eq!(result.recognized_candidate_count, 2);
        assert_eq!(result.unresolved, vec!["Unknown Hop".to_string()]);

        let names: Vec<_> = result.substitutions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mosaic", "Amarillo"]);

        let mosaic = &result.substitutions[0];
        assert!(mosaic.similarity_score > 0.8);
        assert!(mosaic.shared_descriptors.contains(&"citrus".to_string()));
        assert!(result.substitutions[1].similarity_score > 0.8);
    }

    #[test]
    fn bittering_ratio_preserves_alpha_contribution() {
        let result = recommend("Cascade", &["Warrior"], 5).unwrap();
        let warrior = &result.substitutions[0];
        // Cascade mid 5.75, Warrior mid 15.5
        assert!((warrior.recommended_bittering_ratio - 0.371).abs() < 1e-9);
    }

    #[test]
    fn target_and_duplicates_are_skipped() {
        let result = recommend("Simcoe", &["simcoe pellets", "Mosaic", "mosaic hops", "", "Citra"], 1).unwrap();
        assert_eq!(result.recognized_candidate_count, 2);
        assert_eq!(result.substitutions.len(), 1);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn unknown_target_is_an_error() {
        let err = recommend("Galaxy", &["Citra"], 3).unwrap_err();
        assert_eq!(err, PlanError::UnrecognizedHop("Galaxy".to_string()));
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let names: Vec<&str> = HOP_CATALOG.iter().map(|hop| hop.name).collect();
        for hop in HOP_CATALOG {
            let result = recommend(hop.name, &names, names.len()).unwrap();
            assert_eq!(result.recognized_candidate_count, HOP_CATALOG.len() - 1);
            for candidate in &result.substitutions {
                assert!((0.0..=1.0).contains(&candidate.similarity_score));
            }
            for pair in result.substitutions.windows(2) {
                assert!(pair[0].similarity_score >= pair[1].similarity_score);
            }
        }
    }
}
