//! Database schema and operations

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::info;

use crate::inventory::{self, ConsumeOutcome};
use crate::models::{
    Batch, EquipmentProfile, FermentationReading, IngredientCategory, IngredientLine, Recipe, RecipeSnapshot,
    StockRecord, WaterIonProfile, WaterProfile,
};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- On-hand ingredient stock
        CREATE TABLE IF NOT EXISTS stock_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            style TEXT,
            target_og REAL NOT NULL,
            target_fg REAL NOT NULL,
            target_ibu REAL,
            target_srm REAL,
            efficiency_pct REAL NOT NULL,
            batch_volume_liters REAL NOT NULL,
            notes TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS recipe_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id),
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            unit TEXT NOT NULL,
            stage TEXT NOT NULL DEFAULT '',
            minute_added INTEGER NOT NULL DEFAULT 0
        );

        -- Batches keep a JSON snapshot of the recipe as it was when planned
        CREATE TABLE IF NOT EXISTS batches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            recipe_id INTEGER REFERENCES recipes(id),
            volume_liters REAL NOT NULL,
            snapshot_json TEXT NOT NULL,
            inventory_consumed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS equipment_profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            batch_volume_liters REAL NOT NULL,
            mash_tun_volume_liters REAL,
            boil_kettle_volume_liters REAL,
            brewhouse_efficiency_pct REAL NOT NULL,
            boil_off_rate_l_per_hour REAL,
            trub_loss_liters REAL,
            notes TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS water_profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            calcium_ppm REAL NOT NULL,
            magnesium_ppm REAL NOT NULL,
            sodium_ppm REAL NOT NULL,
            chloride_ppm REAL NOT NULL,
            sulfate_ppm REAL NOT NULL,
            bicarbonate_ppm REAL NOT NULL,
            notes TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS fermentation_readings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id INTEGER NOT NULL REFERENCES batches(id),
            recorded_at TEXT NOT NULL,
            gravity REAL,
            temp_c REAL,
            ph REAL,
            notes TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_stock_name ON stock_items(name);
        CREATE INDEX IF NOT EXISTS idx_ingredients_recipe ON recipe_ingredients(recipe_id);
        CREATE INDEX IF NOT EXISTS idx_readings_batch ON fermentation_readings(batch_id);
        "#,
    )?;
    Ok(())
}

// Stock

pub fn insert_stock(conn: &Connection, name: &str, category: IngredientCategory, quantity: f64, unit: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO stock_items (name, category, quantity, unit) VALUES (?1, ?2, ?3, ?4)",
        params![name, category.as_str(), quantity, unit],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite a stock quantity. Returns false if the record does not exist.
pub fn set_stock_quantity(conn: &Connection, stock_id: i64, quantity: f64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE stock_items SET quantity = ?1 WHERE id = ?2",
        params![quantity, stock_id],
    )?;
    Ok(changed > 0)
}

pub fn list_stock(conn: &Connection) -> Result<Vec<StockRecord>> {
    let mut stmt = conn.prepare("SELECT id, name, category, quantity, unit FROM stock_items ORDER BY name, id")?;

    let rows = stmt.query_map([], |row| {
        Ok(StockRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            category: IngredientCategory::from_label(&row.get::<_, String>(2)?),
            quantity: row.get(3)?,
            unit: row.get(4)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

// Recipes

/// Insert a recipe and its ingredient lines; the recipe's own id is ignored
pub fn insert_recipe(conn: &Connection, recipe: &Recipe) -> Result<i64> {
    conn.execute(
        "INSERT INTO recipes (name, style, target_og, target_fg, target_ibu, target_srm, efficiency_pct, batch_volume_liters, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            recipe.name,
            recipe.style,
            recipe.target_og,
            recipe.target_fg,
            recipe.target_ibu,
            recipe.target_srm,
            recipe.efficiency_pct,
            recipe.batch_volume_liters,
            recipe.notes,
        ],
    )?;
    let recipe_id = conn.last_insert_rowid();

    for line in &recipe.ingredients {
        conn.execute(
            "INSERT INTO recipe_ingredients (recipe_id, name, category, amount, unit, stage, minute_added)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                recipe_id,
                line.name,
                line.category.as_str(),
                line.amount,
                line.unit,
                line.stage,
                line.minute_added,
            ],
        )?;
    }
    Ok(recipe_id)
}

fn recipe_ingredients(conn: &Connection, recipe_id: i64) -> Result<Vec<IngredientLine>> {
    let mut stmt = conn.prepare(
        "SELECT name, category, amount, unit, stage, minute_added
         FROM recipe_ingredients
         WHERE recipe_id = ?1
         ORDER BY id",
    )?;

    let rows = stmt.query_map([recipe_id], |row| {
        Ok(IngredientLine {
            name: row.get(0)?,
            category: IngredientCategory::from_label(&row.get::<_, String>(1)?),
            amount: row.get(2)?,
            unit: row.get(3)?,
            stage: row.get(4)?,
            minute_added: row.get(5)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

const RECIPE_COLUMNS: &str =
    "id, name, style, target_og, target_fg, target_ibu, target_srm, efficiency_pct, batch_volume_liters, notes";

fn recipe_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipe> {
    Ok(Recipe {
        id: row.get(0)?,
        name: row.get(1)?,
        style: row.get(2)?,
        target_og: row.get(3)?,
        target_fg: row.get(4)?,
        target_ibu: row.get(5)?,
        target_srm: row.get(6)?,
        efficiency_pct: row.get(7)?,
        batch_volume_liters: row.get(8)?,
        notes: row.get(9)?,
        ingredients: Vec::new(),
    })
}

pub fn get_recipe(conn: &Connection, recipe_id: i64) -> Result<Option<Recipe>> {
    let recipe = conn
        .query_row(
            &format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?1"),
            [recipe_id],
            recipe_from_row,
        )
        .optional()?;

    match recipe {
        Some(mut recipe) => {
            recipe.ingredients = recipe_ingredients(conn, recipe.id)?;
            Ok(Some(recipe))
        }
        None => Ok(None),
    }
}

/// List all recipes, ingredients included
pub fn list_recipes(conn: &Connection) -> Result<Vec<Recipe>> {
    let mut stmt = conn.prepare(&format!("SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY name, id"))?;
    let rows = stmt.query_map([], recipe_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        let mut recipe = row?;
        recipe.ingredients = recipe_ingredients(conn, recipe.id)?;
        results.push(recipe);
    }
    Ok(results)
}

// Batches

/// Create a batch from a recipe, freezing the recipe into the batch snapshot
pub fn create_batch(conn: &Connection, recipe_id: i64, name: Option<&str>, volume_liters: Option<f64>) -> Result<Batch> {
    let recipe = get_recipe(conn, recipe_id)?.ok_or_else(|| anyhow!("recipe {recipe_id} not found"))?;
    let volume_liters = volume_liters.unwrap_or(recipe.batch_volume_liters);
    if !(volume_liters > 0.0) {
        bail!("batch volume must be positive, got {volume_liters}");
    }
    let name = name.map_or_else(|| recipe.name.clone(), str::to_string);
    let snapshot = recipe.snapshot();
    let snapshot_json = serde_json::to_string(&snapshot)?;

    conn.execute(
        "INSERT INTO batches (name, recipe_id, volume_liters, snapshot_json) VALUES (?1, ?2, ?3, ?4)",
        params![name, recipe_id, volume_liters, snapshot_json],
    )?;

    Ok(Batch {
        id: conn.last_insert_rowid(),
        name,
        recipe_id: Some(recipe_id),
        volume_liters,
        snapshot,
        inventory_consumed_at: None,
    })
}

type BatchRow = (i64, String, Option<i64>, f64, String, Option<DateTime<Utc>>);

fn batch_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BatchRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
}

fn into_batch((id, name, recipe_id, volume_liters, snapshot_json, consumed_at): BatchRow) -> Result<Batch> {
    let snapshot: RecipeSnapshot =
        serde_json::from_str(&snapshot_json).with_context(|| format!("Corrupt recipe snapshot on batch {id}"))?;
    Ok(Batch {
        id,
        name,
        recipe_id,
        volume_liters,
        snapshot,
        inventory_consumed_at: consumed_at,
    })
}

pub fn get_batch(conn: &Connection, batch_id: i64) -> Result<Option<Batch>> {
    conn.query_row(
        "SELECT id, name, recipe_id, volume_liters, snapshot_json, inventory_consumed_at FROM batches WHERE id = ?1",
        [batch_id],
        batch_from_row,
    )
    .optional()?
    .map(into_batch)
    .transpose()
}

pub fn list_batches(conn: &Connection) -> Result<Vec<Batch>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, recipe_id, volume_liters, snapshot_json, inventory_consumed_at FROM batches ORDER BY id",
    )?;
    let rows = stmt.query_map([], batch_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(into_batch(row?)?);
    }
    Ok(results)
}

/// Deduct a batch's ingredients from stock exactly once.
///
/// Reads, deductions and the consumed-at marker all happen inside one
/// IMMEDIATE transaction, so two concurrent calls for the same batch
/// serialize and the second sees the marker. Rejections write nothing.
pub fn consume_batch_inventory(conn: &mut Connection, batch_id: i64, now: DateTime<Utc>) -> Result<ConsumeOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let batch = get_batch(&tx, batch_id)?.ok_or_else(|| anyhow!("batch {batch_id} not found"))?;
    let stock = list_stock(&tx)?;
    let outcome = inventory::consume(&batch, &stock, now);

    if let ConsumeOutcome::Consumed { consumed_at, items } = &outcome {
        let marked = tx.execute(
            "UPDATE batches SET inventory_consumed_at = ?1 WHERE id = ?2 AND inventory_consumed_at IS NULL",
            params![consumed_at, batch_id],
        )?;
        if marked != 1 {
            bail!("batch {batch_id} changed while its inventory was being consumed");
        }
        for item in items {
            tx.execute(
                "UPDATE stock_items SET quantity = ?1 WHERE id = ?2",
                params![item.quantity_after, item.stock_id],
            )?;
        }
        tx.commit()?;
        info!(batch_id, items = items.len(), "batch inventory consumed");
    }

    Ok(outcome)
}

// Equipment

pub fn insert_equipment(conn: &Connection, profile: &EquipmentProfile) -> Result<i64> {
    conn.execute(
        "INSERT INTO equipment_profiles
            (name, batch_volume_liters, mash_tun_volume_liters, boil_kettle_volume_liters,
             brewhouse_efficiency_pct, boil_off_rate_l_per_hour, trub_loss_liters, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            profile.name,
            profile.batch_volume_liters,
            profile.mash_tun_volume_liters,
            profile.boil_kettle_volume_liters,
            profile.brewhouse_efficiency_pct,
            profile.boil_off_rate_l_per_hour,
            profile.trub_loss_liters,
            profile.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const EQUIPMENT_COLUMNS: &str = "id, name, batch_volume_liters, mash_tun_volume_liters, boil_kettle_volume_liters,
     brewhouse_efficiency_pct, boil_off_rate_l_per_hour, trub_loss_liters, notes";

fn equipment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EquipmentProfile> {
    Ok(EquipmentProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        batch_volume_liters: row.get(2)?,
        mash_tun_volume_liters: row.get(3)?,
        boil_kettle_volume_liters: row.get(4)?,
        brewhouse_efficiency_pct: row.get(5)?,
        boil_off_rate_l_per_hour: row.get(6)?,
        trub_loss_liters: row.get(7)?,
        notes: row.get(8)?,
    })
}

pub fn get_equipment(conn: &Connection, equipment_id: i64) -> Result<Option<EquipmentProfile>> {
    Ok(conn
        .query_row(
            &format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment_profiles WHERE id = ?1"),
            [equipment_id],
            equipment_from_row,
        )
        .optional()?)
}

pub fn list_equipment(conn: &Connection) -> Result<Vec<EquipmentProfile>> {
    let mut stmt = conn.prepare(&format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment_profiles ORDER BY name, id"))?;
    let rows = stmt.query_map([], equipment_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

// Water profiles

pub fn insert_water_profile(conn: &Connection, name: &str, ions: &WaterIonProfile, notes: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO water_profiles
            (name, calcium_ppm, magnesium_ppm, sodium_ppm, chloride_ppm, sulfate_ppm, bicarbonate_ppm, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            name,
            ions.calcium_ppm,
            ions.magnesium_ppm,
            ions.sodium_ppm,
            ions.chloride_ppm,
            ions.sulfate_ppm,
            ions.bicarbonate_ppm,
            notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const WATER_COLUMNS: &str =
    "id, name, calcium_ppm, magnesium_ppm, sodium_ppm, chloride_ppm, sulfate_ppm, bicarbonate_ppm, notes";

fn water_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WaterProfile> {
    Ok(WaterProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        ions: WaterIonProfile {
            calcium_ppm: row.get(2)?,
            magnesium_ppm: row.get(3)?,
            sodium_ppm: row.get(4)?,
            chloride_ppm: row.get(5)?,
            sulfate_ppm: row.get(6)?,
            bicarbonate_ppm: row.get(7)?,
        },
        notes: row.get(8)?,
    })
}

pub fn get_water_profile(conn: &Connection, profile_id: i64) -> Result<Option<WaterProfile>> {
    Ok(conn
        .query_row(
            &format!("SELECT {WATER_COLUMNS} FROM water_profiles WHERE id = ?1"),
            [profile_id],
            water_from_row,
        )
        .optional()?)
}

pub fn list_water_profiles(conn: &Connection) -> Result<Vec<WaterProfile>> {
    let mut stmt = conn.prepare(&format!("SELECT {WATER_COLUMNS} FROM water_profiles ORDER BY name, id"))?;
    let rows = stmt.query_map([], water_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

// Fermentation readings

pub fn insert_reading(
    conn: &Connection,
    batch_id: i64,
    recorded_at: DateTime<Utc>,
    gravity: Option<f64>,
    temp_c: Option<f64>,
    ph: Option<f64>,
    notes: &str,
) -> Result<i64> {
    if get_batch(conn, batch_id)?.is_none() {
        bail!("batch {batch_id} not found");
    }
    conn.execute(
        "INSERT INTO fermentation_readings (batch_id, recorded_at, gravity, temp_c, ph, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![batch_id, recorded_at, gravity, temp_c, ph, notes],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_readings(conn: &Connection, batch_id: i64) -> Result<Vec<FermentationReading>> {
    let mut stmt = conn.prepare(
        "SELECT id, batch_id, recorded_at, gravity, temp_c, ph, notes
         FROM fermentation_readings
         WHERE batch_id = ?1
         ORDER BY recorded_at, id",
    )?;

    let rows = stmt.query_map([batch_id], |row| {
        Ok(FermentationReading {
            id: row.get(0)?,
            batch_id: row.get(1)?,
            recorded_at: row.get(2)?,
            gravity: row.get(3)?,
            temp_c: row.get(4)?,
            ph: row.get(5)?,
            notes: row.get(6)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}
