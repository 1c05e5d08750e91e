//! BeerXML recipe and equipment import
//!
//! Scans a directory tree for BeerXML exports and loads every RECIPE and
//! EQUIPMENT record into the database. Files that fail to parse are counted
//! and skipped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, PoisonError};

use anyhow::{Context, Result};
use regex::Regex;
use rusqlite::Connection;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::PlannerDefaults;
use crate::db;
use crate::models::{EquipmentProfile, IngredientCategory, IngredientLine, Recipe};
use crate::styles::resolve_style;

/// Records parsed from one BeerXML document
#[derive(Debug, Default)]
pub struct ParsedDocument {
    pub recipes: Vec<Recipe>,
    pub equipment: Vec<EquipmentProfile>,
}

/// Find all *.xml files that look like BeerXML
pub fn find_beerxml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml")) {
            let content = fs::read_to_string(path).unwrap_or_default().to_uppercase();
            if content.contains("<RECIPE>") || content.contains("<EQUIPMENT>") {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("number pattern is valid"));

/// Compiled `<TAG>(...)</TAG>` patterns, one per tag name
static ELEMENT_PATTERNS: LazyLock<Mutex<HashMap<String, Regex>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

fn element(tag: &str) -> Result<Regex> {
    let mut patterns = ELEMENT_PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = patterns.get(tag) {
        return Ok(re.clone());
    }
    let re = Regex::new(&format!(r"(?is)<{tag}>(.*?)</{tag}>"))?;
    patterns.insert(tag.to_string(), re.clone());
    Ok(re)
}

fn blocks(content: &str, tag: &str) -> Result<Vec<String>> {
    Ok(element(tag)?
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .collect())
}

fn without_blocks(content: &str, tags: &[&str]) -> Result<String> {
    let mut stripped = content.to_string();
    for tag in tags {
        stripped = element(tag)?.replace_all(&stripped, "").into_owned();
    }
    Ok(stripped)
}

/// Text of the first `<tag>` in `block`, trimmed; None when absent or empty
fn text(block: &str, tag: &str) -> Result<Option<String>> {
    Ok(element(tag)?
        .captures(block)
        .map(|cap| unescape(cap[1].trim()))
        .filter(|value| !value.is_empty()))
}

/// Leading number of a field ("12.5 SRM" -> 12.5)
fn number(block: &str, tag: &str) -> Result<Option<f64>> {
    Ok(text(block, tag)?.and_then(|value| {
        LEADING_NUMBER
            .find(&value)
            .and_then(|m| m.as_str().parse::<f64>().ok())
    }))
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Style as stored on the recipe: the catalog code when the BJCP number and
/// letter resolve, otherwise the style name
fn parse_style(recipe_block: &str) -> Result<Option<String>> {
    let Some(style_block) = blocks(recipe_block, "STYLE")?.into_iter().next() else {
        return Ok(None);
    };
    let name = text(&style_block, "NAME")?;
    let code = match (text(&style_block, "CATEGORY_NUMBER")?, text(&style_block, "STYLE_LETTER")?) {
        (Some(number), Some(letter)) => Some(format!("{number}{letter}").to_uppercase()),
        _ => None,
    };

    Ok(code.filter(|code| resolve_style(code).is_some()).or(name))
}

fn parse_ingredients(recipe_block: &str) -> Result<Vec<IngredientLine>> {
    let mut lines = Vec::new();

    for block in blocks(recipe_block, "FERMENTABLE")? {
        if let (Some(name), Some(kg)) = (text(&block, "NAME")?, number(&block, "AMOUNT")?) {
            let mut line = IngredientLine::new(&name, IngredientCategory::Fermentable, kg, "kg");
            line.stage = "mash".to_string();
            lines.push(line);
        }
    }

    for block in blocks(recipe_block, "HOP")? {
        if let (Some(name), Some(kg)) = (text(&block, "NAME")?, number(&block, "AMOUNT")?) {
            let mut line = IngredientLine::new(&name, IngredientCategory::Hop, kg * 1000.0, "g");
            line.stage = text(&block, "USE")?.unwrap_or_else(|| "boil".to_string()).to_lowercase();
            line.minute_added = number(&block, "TIME")?.map_or(0, |minutes| minutes.round() as i32);
            lines.push(line);
        }
    }

    for block in blocks(recipe_block, "YEAST")? {
        if let Some(name) = text(&block, "NAME")? {
            let mut line = IngredientLine::new(&name, IngredientCategory::Yeast, 1.0, "pack");
            line.stage = "fermentation".to_string();
            lines.push(line);
        }
    }

    for block in blocks(recipe_block, "MISC")? {
        if let (Some(name), Some(amount)) = (text(&block, "NAME")?, number(&block, "AMOUNT")?) {
            let by_weight = text(&block, "AMOUNT_IS_WEIGHT")?.is_some_and(|flag| flag.eq_ignore_ascii_case("true"));
            let unit = if by_weight { "g" } else { "ml" };
            let mut line = IngredientLine::new(&name, IngredientCategory::Other, amount * 1000.0, unit);
            line.stage = text(&block, "USE")?.unwrap_or_default().to_lowercase();
            line.minute_added = number(&block, "TIME")?.map_or(0, |minutes| minutes.round() as i32);
            lines.push(line);
        }
    }

    Ok(lines)
}

fn parse_recipe(block: &str, defaults: &PlannerDefaults) -> Result<Option<Recipe>> {
    let top_level = without_blocks(
        block,
        &["STYLE", "EQUIPMENT", "FERMENTABLES", "HOPS", "YEASTS", "MISCS", "WATERS", "MASH"],
    )?;
    let Some(name) = text(&top_level, "NAME")? else {
        return Ok(None);
    };

    let target_og = match number(&top_level, "OG")? {
        Some(og) => og,
        None => number(&top_level, "EST_OG")?.unwrap_or(defaults.original_gravity),
    };
    let target_fg = match number(&top_level, "FG")? {
        Some(fg) => fg,
        None => number(&top_level, "EST_FG")?.unwrap_or(defaults.final_gravity),
    };
    let target_ibu = match number(&top_level, "IBU")? {
        Some(ibu) => Some(ibu),
        None => number(&top_level, "EST_IBU")?,
    };

    Ok(Some(Recipe {
        id: 0,
        name,
        style: parse_style(block)?,
        target_og,
        target_fg,
        target_ibu,
        target_srm: number(&top_level, "EST_COLOR")?,
        efficiency_pct: number(&top_level, "EFFICIENCY")?.unwrap_or(defaults.efficiency_pct),
        batch_volume_liters: number(&top_level, "BATCH_SIZE")?.unwrap_or(20.0),
        notes: text(&top_level, "NOTES")?.unwrap_or_default(),
        ingredients: parse_ingredients(block)?,
    }))
}

fn parse_equipment(block: &str, defaults: &PlannerDefaults) -> Result<Option<EquipmentProfile>> {
    let (Some(name), Some(batch_volume)) = (text(block, "NAME")?, number(block, "BATCH_SIZE")?) else {
        return Ok(None);
    };

    // EVAP_RATE is percent of the boil volume per hour
    let boil_off = match (number(block, "EVAP_RATE")?, number(block, "BOIL_SIZE")?) {
        (Some(pct), Some(boil_size)) => Some(pct * boil_size / 100.0),
        _ => None,
    };

    Ok(Some(EquipmentProfile {
        id: 0,
        name,
        batch_volume_liters: batch_volume,
        mash_tun_volume_liters: number(block, "TUN_VOLUME")?,
        boil_kettle_volume_liters: None,
        brewhouse_efficiency_pct: defaults.efficiency_pct,
        boil_off_rate_l_per_hour: boil_off,
        trub_loss_liters: number(block, "TRUB_CHILLER_LOSS")?,
        notes: text(block, "NOTES")?.unwrap_or_default(),
    }))
}

/// Parse every RECIPE and EQUIPMENT record in a BeerXML document
pub fn parse_beerxml(content: &str, defaults: &PlannerDefaults) -> Result<ParsedDocument> {
    let mut document = ParsedDocument::default();

    for block in blocks(content, "RECIPE")? {
        if let Some(recipe) = parse_recipe(&block, defaults)? {
            document.recipes.push(recipe);
        }
    }
    for block in blocks(content, "EQUIPMENT")? {
        if let Some(equipment) = parse_equipment(&block, defaults)? {
            document.equipment.push(equipment);
        }
    }

    Ok(document)
}

fn parse_beerxml_file(path: &Path, defaults: &PlannerDefaults) -> Result<ParsedDocument> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_beerxml(&content, defaults)
}

/// Import every BeerXML file under `dir` into the database
pub fn import_directory(conn: &Connection, dir: &Path, defaults: &PlannerDefaults) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    let files = find_beerxml_files(dir)?;
    info!(dir = %dir.display(), files = files.len(), "scanning for BeerXML");

    for path in &files {
        stats.files += 1;
        match parse_beerxml_file(path, defaults) {
            Ok(document) if document.recipes.is_empty() && document.equipment.is_empty() => {
                stats.skipped += 1;
            }
            Ok(document) => {
                for recipe in &document.recipes {
                    db::insert_recipe(conn, recipe)?;
                    debug!(recipe = %recipe.name, ingredients = recipe.ingredients.len(), "imported recipe");
                    stats.recipes += 1;
                    stats.ingredients += recipe.ingredients.len();
                }
                for equipment in &document.equipment {
                    db::insert_equipment(conn, equipment)?;
                    stats.equipment += 1;
                }
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to parse BeerXML");
                stats.errors += 1;
            }
        }
    }

    info!(%stats, "import finished");
    Ok(stats)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportStats {
    pub files: usize,
    pub recipes: usize,
    pub ingredients: usize,
    pub equipment: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} recipes ({} ingredients) and {} equipment profiles from {} files. Skipped: {}, Errors: {}",
            self.recipes, self.ingredients, self.equipment, self.files, self.skipped, self.errors
        )
    }
}
