//! Beer style catalog with target water ion ranges

use serde::Serialize;

use crate::models::{Ion, WaterIonProfile};

/// Acceptable concentration band for one ion, in ppm
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IonRange {
    pub min_ppm: f64,
    pub max_ppm: f64,
}

impl IonRange {
    const fn new(min_ppm: f64, max_ppm: f64) -> Self {
        Self { min_ppm, max_ppm }
    }

    pub fn target_ppm(&self) -> f64 {
        (self.min_ppm + self.max_ppm) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleProfile {
    pub code: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub impression: &'static str,
    pub examples: &'static [&'static str],
    pub calcium: IonRange,
    pub magnesium: IonRange,
    pub sodium: IonRange,
    pub chloride: IonRange,
    pub sulfate: IonRange,
    pub bicarbonate: IonRange,
}

impl StyleProfile {
    pub fn range(&self, ion: Ion) -> IonRange {
        match ion {
            Ion::Calcium => self.calcium,
            Ion::Magnesium => self.magnesium,
            Ion::Sodium => self.sodium,
            Ion::Chloride => self.chloride,
            Ion::Sulfate => self.sulfate,
            Ion::Bicarbonate => self.bicarbonate,
        }
    }

    /// Midpoint of every ion range
    pub fn target_profile(&self) -> WaterIonProfile {
        Ion::ALL
            .iter()
            .fold(WaterIonProfile::default(), |profile, ion| {
                profile.with(*ion, self.range(*ion).target_ppm())
            })
    }
}

pub static STYLE_CATALOG: &[StyleProfile] = &[
    StyleProfile {
        code: "8A",
        name: "Munich Helles",
        category: "German Lager",
        impression: "Pale, smooth lager with restrained bitterness and soft malt balance.",
        examples: &["Augustiner Lagerbier Hell", "Weihenstephaner Original"],
        calcium: IonRange::new(30.0, 60.0),
        magnesium: IonRange::new(5.0, 15.0),
        sodium: IonRange::new(0.0, 30.0),
        chloride: IonRange::new(40.0, 90.0),
        sulfate: IonRange::new(20.0, 80.0),
        bicarbonate: IonRange::new(0.0, 80.0),
    },
    StyleProfile {
        code: "15B",
        name: "Irish Stout",
        category: "Irish Beer",
        impression: "Dry, roasty stout with moderate bitterness and dark grain character.",
        examples: &["Guinness Draught", "Murphy's Irish Stout"],
        calcium: IonRange::new(70.0, 130.0),
        magnesium: IonRange::new(10.0, 25.0),
        sodium: IonRange::new(10.0, 60.0),
        chloride: IonRange::new(40.0, 90.0),
        sulfate: IonRange::new(50.0, 150.0),
        bicarbonate: IonRange::new(150.0, 260.0),
    },
    StyleProfile {
        code: "18B",
        name: "American Pale Ale",
        category: "Pale American Ale",
        impression: "Hop-forward pale ale with clean fermentation and balanced malt support.",
        examples: &["Sierra Nevada Pale Ale", "Dale's Pale Ale"],
        calcium: IonRange::new(60.0, 130.0),
        magnesium: IonRange::new(5.0, 20.0),
        sodium: IonRange::new(0.0, 40.0),
        chloride: IonRange::new(40.0, 90.0),
        sulfate: IonRange::new(120.0, 240.0),
        bicarbonate: IonRange::new(0.0, 120.0),
    },
    StyleProfile {
        code: "20A",
        name: "American Porter",
        category: "American Porter and Stout",
        impression: "Assertive porter with roast, dark chocolate, and often hop character.",
        examples: &["Anchor Porter", "Deschutes Black Butte Porter"],
        calcium: IonRange::new(70.0, 140.0),
        magnesium: IonRange::new(8.0, 24.0),
        sodium: IonRange::new(10.0, 60.0),
        chloride: IonRange::new(50.0, 130.0),
        sulfate: IonRange::new(50.0, 140.0),
        bicarbonate: IonRange::new(120.0, 240.0),
    },
    StyleProfile {
        code: "21A",
        name: "American IPA",
        category: "IPA",
        impression: "Decisively hoppy, bitter, and dry with expressive American/New World hops.",
        examples: &["Sierra Nevada Torpedo", "Stone IPA"],
        calcium: IonRange::new(80.0, 150.0),
        magnesium: IonRange::new(8.0, 22.0),
        sodium: IonRange::new(0.0, 40.0),
        chloride: IonRange::new(40.0, 100.0),
        sulfate: IonRange::new(180.0, 320.0),
        bicarbonate: IonRange::new(0.0, 90.0),
    },
    StyleProfile {
        code: "21B",
        name: "Specialty IPA",
        category: "IPA",
        impression: "IPA family variants that retain hop-forward character with subtype-specific traits.",
        examples: &["Black IPA examples", "Red IPA examples"],
        calcium: IonRange::new(80.0, 150.0),
        magnesium: IonRange::new(8.0, 22.0),
        sodium: IonRange::new(0.0, 45.0),
        chloride: IonRange::new(50.0, 120.0),
        sulfate: IonRange::new(140.0, 280.0),
        bicarbonate: IonRange::new(0.0, 140.0),
    },
    StyleProfile {
        code: "21C",
        name: "Hazy IPA",
        category: "IPA",
        impression: "Juicy IPA with saturated hop aroma and softer perceived bitterness.",
        examples: &["Julius", "Hazy Little Thing"],
        calcium: IonRange::new(70.0, 140.0),
        magnesium: IonRange::new(8.0, 20.0),
        sodium: IonRange::new(0.0, 50.0),
        chloride: IonRange::new(120.0, 220.0),
        sulfate: IonRange::new(60.0, 150.0),
        bicarbonate: IonRange::new(0.0, 120.0),
    },
    StyleProfile {
        code: "24A",
        name: "Witbier",
        category: "Belgian Ale",
        impression: "Light, hazy wheat ale with citrus-spice expression and low bitterness.",
        examples: &["Hoegaarden", "Allagash White"],
        calcium: IonRange::new(40.0, 90.0),
        magnesium: IonRange::new(5.0, 15.0),
        sodium: IonRange::new(0.0, 35.0),
        chloride: IonRange::new(60.0, 130.0),
        sulfate: IonRange::new(30.0, 90.0),
        bicarbonate: IonRange::new(0.0, 110.0),
    },
];

/// Find a style by code ("21a") or by full name ("american ipa")
pub fn resolve_style(identifier: &str) -> Option<&'static StyleProfile> {
    let token = identifier.trim();
    if token.is_empty() {
        return None;
    }

    STYLE_CATALOG
        .iter()
        .find(|style| style.code.eq_ignore_ascii_case(token))
        .or_else(|| {
            STYLE_CATALOG
                .iter()
                .find(|style| style.name.to_lowercase() == token.to_lowercase())
        })
}

/// Styles sorted by code, optionally filtered by a substring of code, name or category
pub fn list_styles(search: Option<&str>) -> Vec<&'static StyleProfile> {
    let mut styles: Vec<&'static StyleProfile> = STYLE_CATALOG.iter().collect();
    styles.sort_by(|a, b| a.code.cmp(b.code));

    match search.map(|query| query.trim().to_lowercase()) {
        Some(query) if !query.is_empty() => styles
            .into_iter()
            .filter(|style| {
                style.code.to_lowercase().contains(&query)
                    || style.name.to_lowercase().contains(&query)
                    || style.category.to_lowercase().contains(&query)
            })
            .collect(),
        _ => styles,
    }
}
