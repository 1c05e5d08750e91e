//! Display preferences: language, unit system and temperature scale
//!
//! The planner always computes in metric and Celsius. This module decides how
//! results are shown and carries the localized note and step text.

use serde::{Deserialize, Serialize};

use crate::models::round_to;
use crate::planner::BrewPlanVolumes;

const KG_TO_LB: f64 = 2.20462262;
const L_TO_GAL: f64 = 0.264172052;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    /// Resolve an explicit choice, then a stored preference, then English
    pub fn resolve(override_value: Option<&str>, preferred: Option<&str>) -> Self {
        match override_value.or(preferred).map(|v| v.trim().to_lowercase()).as_deref() {
            Some("es") => Self::Es,
            _ => Self::En,
        }
    }

    pub fn text(self, message: Message) -> &'static str {
        match self {
            Self::En => english(message),
            Self::Es => spanish(message),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn resolve(override_value: Option<&str>, preferred: Option<&str>) -> Self {
        match override_value.or(preferred).map(|v| v.trim().to_lowercase()).as_deref() {
            Some("imperial") => Self::Imperial,
            _ => Self::Metric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    C,
    F,
}

impl TemperatureUnit {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "C" => Some(Self::C),
            "F" => Some(Self::F),
            _ => None,
        }
    }

    /// Explicit choice wins, then preference, then the unit system's native scale
    pub fn resolve(override_value: Option<&str>, preferred: Option<&str>, system: UnitSystem) -> Self {
        override_value
            .and_then(Self::parse)
            .or_else(|| preferred.and_then(Self::parse))
            .unwrap_or(match system {
                UnitSystem::Imperial => Self::F,
                UnitSystem::Metric => Self::C,
            })
    }

    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            Self::C => celsius,
            Self::F => round_to(celsius * 9.0 / 5.0 + 32.0, 2),
        }
    }
}

/// Every user-facing sentence the planner can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    NoWaterProfile,
    WaterStyleUnmapped,
    InventoryCoversAll,
    NoHopSubstitutions,
    HighCalcium,
    HighSulfate,
    HighChloride,
    HighBicarbonateStart,
    WaterClose,
    // salt addition reasons; "{style}" is replaced with the style name
    AddSulfate,
    AddChloride,
    AddMagnesium,
    AddBicarbonate,
    MashWaterLimit,
    BoilKettleLimit,
    StepHeatStrike,
    StepMashIn,
    StepMashRest,
    StepSparge,
    StepHeatBoil,
    StepBoil,
    StepChill,
    StepTransferPitch,
}

fn english(message: Message) -> &'static str {
    match message {
        Message::NoWaterProfile => "No water profile selected; water chemistry recommendation not included.",
        Message::WaterStyleUnmapped => {
            "Water recommendation skipped because the batch style is not mapped to the style catalog."
        }
        Message::InventoryCoversAll => "Inventory can cover all planned ingredients for this brew day.",
        Message::NoHopSubstitutions => "No hop substitutions were needed.",
        Message::HighCalcium => "Projected calcium is well above target range; consider dilution with RO water.",
        Message::HighSulfate => "Projected sulfate exceeds target range; reduce gypsum or blend water.",
        Message::HighChloride => "Projected chloride exceeds target range; reduce calcium chloride.",
        Message::HighBicarbonateStart => {
            "Starting bicarbonate is high for this style; acidification or dilution may be required."
        }
        Message::WaterClose => "Base water is already close to target profile; only minor adjustments may be needed.",
        Message::AddSulfate => "Increase sulfate to sharpen bitterness for {style}.",
        Message::AddChloride => "Increase chloride for rounder malt balance in {style}.",
        Message::AddMagnesium => "Increase magnesium while contributing sulfate.",
        Message::AddBicarbonate => "Raise alkalinity for mash pH support in darker beers.",
        Message::MashWaterLimit => "Mash water exceeds mash tun practical limit; mash water was reduced.",
        Message::BoilKettleLimit => "Pre-boil volume exceeds boil kettle capacity; split boil or reduce batch size.",
        Message::StepHeatStrike => "Heat strike water",
        Message::StepMashIn => "Mash in",
        Message::StepMashRest => "Mash rest",
        Message::StepSparge => "Vorlauf and sparge",
        Message::StepHeatBoil => "Bring wort to boil",
        Message::StepBoil => "Boil",
        Message::StepChill => "Chill wort",
        Message::StepTransferPitch => "Transfer and pitch yeast",
    }
}

fn spanish(message: Message) -> &'static str {
    match message {
        Message::NoWaterProfile => "No se selecciono perfil de agua; no se incluyo recomendacion de quimica del agua.",
        Message::WaterStyleUnmapped => "Se omitio recomendacion de agua porque el estilo no esta en el catalogo.",
        Message::InventoryCoversAll => "El inventario cubre todos los ingredientes planificados para este dia de coccion.",
        Message::NoHopSubstitutions => "No se necesitaron sustituciones de lupulo.",
        Message::HighCalcium => "El calcio proyectado esta muy por encima del rango; considera dilucion con agua RO.",
        Message::HighSulfate => "El sulfato proyectado excede el rango; reduce el yeso o mezcla agua.",
        Message::HighChloride => "El cloruro proyectado excede el rango; reduce cloruro de calcio.",
        Message::HighBicarbonateStart => {
            "El bicarbonato inicial es alto para este estilo; podria requerir acidificacion o dilucion."
        }
        Message::WaterClose => "El agua base ya esta cerca del perfil objetivo; solo ajustes menores son necesarios.",
        Message::AddSulfate => "Aumenta sulfato para resaltar el amargor en {style}.",
        Message::AddChloride => "Aumenta cloruro para un balance de malta mas redondo en {style}.",
        Message::AddMagnesium => "Aumenta magnesio mientras aporta sulfato.",
        Message::AddBicarbonate => "Aumenta alcalinidad para apoyar el pH de macerado en cervezas oscuras.",
        Message::MashWaterLimit => "El agua de macerado excede el limite practico del macerador; se redujo el volumen.",
        Message::BoilKettleLimit => "El volumen pre-hervor excede la capacidad de la olla; divide el hervor o reduce el lote.",
        Message::StepHeatStrike => "Calentar agua de macerado",
        Message::StepMashIn => "Entrada de macerado",
        Message::StepMashRest => "Descanso de macerado",
        Message::StepSparge => "Recirculado y lavado",
        Message::StepHeatBoil => "Llevar mosto a hervor",
        Message::StepBoil => "Hervor",
        Message::StepChill => "Enfriar mosto",
        Message::StepTransferPitch => "Transferir e inocular levadura",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPreferences {
    pub unit_system: UnitSystem,
    pub temperature_unit: TemperatureUnit,
    pub language: Language,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            unit_system: UnitSystem::Metric,
            temperature_unit: TemperatureUnit::C,
            language: Language::En,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayUnits {
    pub unit_system: UnitSystem,
    pub language: Language,
    pub grain_unit: &'static str,
    pub volume_unit: &'static str,
    pub temperature_unit: TemperatureUnit,
}

/// Plan volumes converted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayVolumes {
    pub grain_bill: f64,
    pub mash_water: f64,
    pub sparge_water: f64,
    pub total_water: f64,
    pub pre_boil_volume: f64,
    pub post_boil_volume: f64,
    pub boil_off: f64,
    pub mash_target_temp: f64,
    pub strike_water_temp: f64,
}

pub fn to_display_units(prefs: &DisplayPreferences, volumes: &BrewPlanVolumes) -> (DisplayUnits, DisplayVolumes) {
    let temp = prefs.temperature_unit;
    let (grain_unit, volume_unit, mass, volume): (&str, &str, f64, f64) = match prefs.unit_system {
        UnitSystem::Imperial => ("lb", "gal", KG_TO_LB, L_TO_GAL),
        UnitSystem::Metric => ("kg", "L", 1.0, 1.0),
    };
    let convert = |value: f64, factor: f64| {
        if factor == 1.0 { value } else { round_to(value * factor, 3) }
    };

    (
        DisplayUnits {
            unit_system: prefs.unit_system,
            language: prefs.language,
            grain_unit,
            volume_unit,
            temperature_unit: temp,
        },
        DisplayVolumes {
            grain_bill: convert(volumes.grain_bill_kg, mass),
            mash_water: convert(volumes.mash_water_liters, volume),
            sparge_water: convert(volumes.sparge_water_liters, volume),
            total_water: convert(volumes.total_water_liters, volume),
            pre_boil_volume: convert(volumes.pre_boil_volume_liters, volume),
            post_boil_volume: convert(volumes.post_boil_volume_liters, volume),
            boil_off: convert(volumes.estimated_boil_off_liters, volume),
            mash_target_temp: temp.from_celsius(volumes.mash_target_temp_c),
            strike_water_temp: temp.from_celsius(volumes.strike_water_temp_c),
        },
    )
}
