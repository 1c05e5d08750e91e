//! Brew-day planner
//!
//! Command-line front end for planning homebrew batches against a local
//! SQLite store of recipes, stock and equipment.

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;

use brewday_planner::config::{self, PlannerDefaults};
use brewday_planner::display::{DisplayPreferences, Language, TemperatureUnit, UnitSystem};
use brewday_planner::models::{EquipmentProfile, IngredientCategory, IngredientLine, Recipe, WaterIonProfile};
use brewday_planner::planner::{self, PlanRequest};
use brewday_planner::{analytics, calculator, db, fermentation, hops, import, inventory, styles, water};

#[derive(Parser)]
#[command(name = "brewday")]
#[command(about = "Brew-day planning and recommendation engine for homebrewers")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, env = "BREWDAY_DATABASE", default_value = "brewday.db")]
    database: PathBuf,

    /// Log filter for stderr output (e.g. "info", "brewday_planner=debug")
    #[arg(long, env = "BREWDAY_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Load sample recipes, stock, equipment and water profiles
    LoadSample,

    /// Import recipes and equipment from a directory of BeerXML files
    Import {
        /// Directory to scan recursively
        dir: PathBuf,
    },

    /// Manage ingredient stock
    Stock {
        #[command(subcommand)]
        command: StockCommands,
    },

    /// List all recipes
    Recipes,

    /// Show one recipe with its ingredients
    Recipe {
        /// Recipe ID
        id: i64,
    },

    /// Scale a recipe to a new batch volume and efficiency
    Scale {
        /// Recipe ID
        recipe: i64,

        /// Target batch volume in liters
        #[arg(short, long)]
        volume: f64,

        /// Target brewhouse efficiency in percent (default: equipment, then recipe)
        #[arg(short, long)]
        efficiency: Option<f64>,

        /// Equipment profile supplying the target efficiency
        #[arg(long)]
        equipment: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Manage batches
    Batch {
        #[command(subcommand)]
        command: BatchCommands,
    },

    /// Check a batch's ingredients against stock
    Preview {
        /// Batch ID
        batch: i64,

        #[arg(long)]
        json: bool,
    },

    /// Deduct a batch's ingredients from stock (once per batch)
    Consume {
        /// Batch ID
        batch: i64,

        #[arg(long)]
        json: bool,
    },

    /// Build the brew-day plan for a batch
    Plan {
        /// Batch ID
        batch: i64,

        /// Equipment profile ID
        #[arg(long)]
        equipment: Option<i64>,

        /// Source water profile ID
        #[arg(long)]
        water: Option<i64>,

        /// Style code or name for water targets (default: the batch's style)
        #[arg(long)]
        style: Option<String>,

        /// Extra hops on hand that are not in stock records
        #[arg(long = "hop")]
        hops: Vec<String>,

        /// Brew start time (RFC 3339) for absolute step times
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        /// metric or imperial
        #[arg(long, env = "BREWDAY_UNITS")]
        units: Option<String>,

        /// C or F
        #[arg(long, env = "BREWDAY_TEMP_UNIT")]
        temp: Option<String>,

        /// en or es
        #[arg(long, env = "BREWDAY_LANG")]
        lang: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Rank substitutes for a hop
    Substitute {
        /// Hop to replace
        hop: String,

        /// Candidate hop (repeatable)
        #[arg(short, long = "candidate", required = true)]
        candidates: Vec<String>,

        /// Number of substitutes to show
        #[arg(short, long, default_value = "3")]
        top: usize,

        #[arg(long)]
        json: bool,
    },

    /// Recommend brewing salt additions for a water profile and style
    Water {
        /// Source water profile ID
        #[arg(short, long)]
        profile: i64,

        /// Style code or name
        #[arg(short, long)]
        style: String,

        /// Batch volume in liters
        #[arg(short, long, default_value = "20.0")]
        volume: f64,

        /// en or es
        #[arg(long, env = "BREWDAY_LANG")]
        lang: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List the style catalog
    Styles {
        /// Filter by code, name or category
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Manage equipment profiles
    Equipment {
        #[command(subcommand)]
        command: EquipmentCommands,
    },

    /// Manage source water profiles
    WaterProfile {
        #[command(subcommand)]
        command: WaterProfileCommands,
    },

    /// Log fermentation readings
    Reading {
        #[command(subcommand)]
        command: ReadingCommands,
    },

    /// Overview of recipes, batches and measured results
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Summarize fermentation progress for a batch
    Trend {
        /// Batch ID
        batch: i64,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum StockCommands {
    /// List all stock
    List,

    /// Add a stock record
    Add {
        name: String,
        /// grain, hop, yeast, other, ...
        category: String,
        quantity: f64,
        unit: String,
    },

    /// Set the on-hand quantity of a stock record
    Set { id: i64, quantity: f64 },
}

#[derive(Subcommand)]
enum BatchCommands {
    /// Create a batch from a recipe
    Create {
        /// Recipe ID
        recipe: i64,

        #[arg(short, long)]
        name: Option<String>,

        /// Batch volume in liters (default: the recipe's)
        #[arg(short, long)]
        volume: Option<f64>,
    },

    /// List all batches
    List,
}

#[derive(Subcommand)]
enum EquipmentCommands {
    /// List equipment profiles
    List,

    /// Add an equipment profile
    Add {
        name: String,

        #[arg(long)]
        batch_volume: f64,

        #[arg(long)]
        mash_tun: Option<f64>,

        #[arg(long)]
        kettle: Option<f64>,

        #[arg(long, default_value = "70.0")]
        efficiency: f64,

        /// Boil-off in liters per hour
        #[arg(long)]
        boil_off: Option<f64>,

        /// Trub and chiller loss in liters
        #[arg(long)]
        trub: Option<f64>,

        #[arg(long, default_value = "")]
        notes: String,
    },
}

#[derive(Subcommand)]
enum WaterProfileCommands {
    /// List water profiles
    List,

    /// Add a water profile (ion concentrations in ppm)
    Add {
        name: String,
        #[arg(long, default_value = "0")]
        calcium: f64,
        #[arg(long, default_value = "0")]
        magnesium: f64,
        #[arg(long, default_value = "0")]
        sodium: f64,
        #[arg(long, default_value = "0")]
        chloride: f64,
        #[arg(long, default_value = "0")]
        sulfate: f64,
        #[arg(long, default_value = "0")]
        bicarbonate: f64,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

#[derive(Subcommand)]
enum ReadingCommands {
    /// Add a reading for a batch
    Add {
        batch: i64,

        #[arg(short, long)]
        gravity: Option<f64>,

        /// Temperature in Celsius
        #[arg(short, long)]
        temp: Option<f64>,

        #[arg(long)]
        ph: Option<f64>,

        /// Time of the reading (RFC 3339, default: now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        #[arg(long, default_value = "")]
        notes: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_logging(&cli.log_level);

    let mut conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;
    let defaults = PlannerDefaults::from_env();

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            load_sample_data(&conn)?;
            println!("Sample data loaded successfully!");
        }

        Commands::Import { dir } => {
            let stats = import::import_directory(&conn, &dir, &defaults)?;
            println!("{}", stats);
        }

        Commands::Stock { command } => match command {
            StockCommands::List => {
                let stock = db::list_stock(&conn)?;
                if stock.is_empty() {
                    println!("No stock in database. Run 'stock add' or 'load-sample' first.");
                } else {
                    println!("{:<5} {:<30} {:<12} {:>12} {:<6}", "ID", "Name", "Category", "Quantity", "Unit");
                    println!("{}", "-".repeat(69));
                    for s in stock {
                        println!(
                            "{:<5} {:<30} {:<12} {:>12.3} {:<6}",
                            s.id, s.name, s.category, s.quantity, s.unit
                        );
                    }
                }
            }
            StockCommands::Add {
                name,
                category,
                quantity,
                unit,
            } => {
                if !(quantity >= 0.0) {
                    bail!("quantity must be zero or more, got {quantity}");
                }
                let id = db::insert_stock(&conn, &name, IngredientCategory::from_label(&category), quantity, &unit)?;
                println!("Added stock {} ({})", id, name);
            }
            StockCommands::Set { id, quantity } => {
                if !(quantity >= 0.0) {
                    bail!("quantity must be zero or more, got {quantity}");
                }
                if !db::set_stock_quantity(&conn, id, quantity)? {
                    bail!("stock record {id} not found");
                }
                println!("Stock {} set to {}", id, quantity);
            }
        },

        Commands::Recipes => {
            let recipes = db::list_recipes(&conn)?;
            if recipes.is_empty() {
                println!("No recipes in database. Run 'import' or 'load-sample' first.");
            } else {
                println!("{:<5} {:<40} {:<8} {:>7} {:>7} {:>8}", "ID", "Recipe", "Style", "OG", "FG", "Vol (L)");
                println!("{}", "-".repeat(80));
                for r in recipes {
                    println!(
                        "{:<5} {:<40} {:<8} {:>7.3} {:>7.3} {:>8.1}",
                        r.id,
                        r.name,
                        r.style.as_deref().unwrap_or("-"),
                        r.target_og,
                        r.target_fg,
                        r.batch_volume_liters
                    );
                }
            }
        }

        Commands::Recipe { id } => {
            let Some(r) = db::get_recipe(&conn, id)? else {
                bail!("recipe {id} not found");
            };
            println!("Recipe: {}", r.name);
            println!("  Style: {}", r.style.as_deref().unwrap_or("-"));
            println!(
                "  OG {:.3}  FG {:.3}  ABV {:.2}%  Attenuation {:.1}%",
                r.target_og,
                r.target_fg,
                calculator::estimate_abv(r.target_og, r.target_fg),
                calculator::attenuation_pct(r.target_og, r.target_fg)
            );
            println!("  Batch: {:.1} L at {:.0}% efficiency", r.batch_volume_liters, r.efficiency_pct);
            println!("  Ingredients:");
            for line in &r.ingredients {
                println!(
                    "    {:<30} {:<12} {:>10.3} {:<6} {}",
                    line.name, line.category, line.amount, line.unit, line.stage
                );
            }
        }

        Commands::Scale {
            recipe,
            volume,
            efficiency,
            equipment,
            json,
        } => {
            let r = db::get_recipe(&conn, recipe)?.ok_or_else(|| anyhow!("recipe {recipe} not found"))?;
            let equipment_efficiency = match equipment {
                Some(id) => Some(
                    db::get_equipment(&conn, id)?
                        .ok_or_else(|| anyhow!("equipment profile {id} not found"))?
                        .brewhouse_efficiency_pct,
                ),
                None => None,
            };
            let target_efficiency = efficiency.or(equipment_efficiency).unwrap_or(r.efficiency_pct);
            let scaled = calculator::scale_recipe(&r, r.batch_volume_liters, volume, target_efficiency)?;
            if json {
                print_json(&scaled)?;
            } else {
                print!("{}", scaled);
            }
        }

        Commands::Batch { command } => match command {
            BatchCommands::Create { recipe, name, volume } => {
                let batch = db::create_batch(&conn, recipe, name.as_deref(), volume)?;
                println!("Created batch {} ({}, {:.1} L)", batch.id, batch.name, batch.volume_liters);
            }
            BatchCommands::List => {
                let batches = db::list_batches(&conn)?;
                if batches.is_empty() {
                    println!("No batches in database. Run 'batch create' first.");
                } else {
                    println!("{:<5} {:<30} {:<30} {:>8} {:<25}", "ID", "Batch", "Recipe", "Vol (L)", "Consumed");
                    println!("{}", "-".repeat(102));
                    for b in batches {
                        println!(
                            "{:<5} {:<30} {:<30} {:>8.1} {:<25}",
                            b.id,
                            b.name,
                            b.snapshot.name,
                            b.volume_liters,
                            b.inventory_consumed_at.map(|at| at.to_rfc3339()).unwrap_or_default()
                        );
                    }
                }
            }
        },

        Commands::Preview { batch, json } => {
            let b = db::get_batch(&conn, batch)?.ok_or_else(|| anyhow!("batch {batch} not found"))?;
            let stock = db::list_stock(&conn)?;
            let preview = inventory::preview(&inventory::build_requirements(&b.snapshot.ingredients), &stock);
            if json {
                print_json(&preview)?;
            } else {
                println!(
                    "{:<30} {:>10} {:>10} {:>10} {:<6}",
                    "Ingredient", "Required", "On hand", "Short", "Unit"
                );
                println!("{}", "-".repeat(70));
                for row in &preview.rows {
                    println!(
                        "{:<30} {:>10.3} {:>10.3} {:>10.3} {:<6}{}",
                        row.requirement.name,
                        row.requirement.amount,
                        row.available_amount,
                        row.shortage_amount,
                        row.requirement.unit,
                        if row.stock_id.is_none() { " (not stocked)" } else { "" }
                    );
                }
                println!();
                if preview.can_consume {
                    println!("Stock covers this batch.");
                } else {
                    println!("{} ingredient(s) short.", preview.shortage_count);
                }
            }
        }

        Commands::Consume { batch, json } => {
            let outcome = db::consume_batch_inventory(&mut conn, batch, Utc::now())?;
            if json {
                print_json(&outcome)?;
            }
            match outcome {
                inventory::ConsumeOutcome::Consumed { items, .. } => {
                    if !json {
                        for item in items {
                            println!(
                                "{:<30} -{:>10.3} {:<6} ({:.3} -> {:.3})",
                                item.name, item.consumed_amount, item.consumed_unit, item.quantity_before, item.quantity_after
                            );
                        }
                    }
                }
                inventory::ConsumeOutcome::Rejected { reason, shortages } => {
                    if !json {
                        for row in shortages {
                            println!(
                                "  short {:<28} {:>10.3} {}",
                                row.requirement.name, row.shortage_amount, row.requirement.unit
                            );
                        }
                    }
                    bail!("{} ({})", reason, reason.code());
                }
            }
        }

        Commands::Plan {
            batch,
            equipment,
            water,
            style,
            hops,
            start,
            units,
            temp,
            lang,
            json,
        } => {
            let b = db::get_batch(&conn, batch)?.ok_or_else(|| anyhow!("batch {batch} not found"))?;
            let stock = db::list_stock(&conn)?;
            let equipment = match equipment {
                Some(id) => Some(db::get_equipment(&conn, id)?.ok_or_else(|| anyhow!("equipment profile {id} not found"))?),
                None => None,
            };
            let water_profile = match water {
                Some(id) => Some(db::get_water_profile(&conn, id)?.ok_or_else(|| anyhow!("water profile {id} not found"))?),
                None => None,
            };

            let unit_system = UnitSystem::resolve(units.as_deref(), None);
            let display = DisplayPreferences {
                unit_system,
                temperature_unit: TemperatureUnit::resolve(temp.as_deref(), None, unit_system),
                language: Language::resolve(lang.as_deref(), None),
            };

            let plan = planner::build_plan(&PlanRequest {
                equipment: equipment.as_ref(),
                water_profile: water_profile.as_ref(),
                style_override: style.as_deref(),
                extra_hops: &hops,
                brew_start: start,
                display,
                defaults,
                ..PlanRequest::new(&b, &stock)
            });

            if json {
                print_json(&plan)?;
            } else {
                print!("{}", plan);
            }
        }

        Commands::Substitute {
            hop,
            candidates,
            top,
            json,
        } => {
            let result = hops::recommend(&hop, &candidates, top)?;
            if json {
                print_json(&result)?;
            } else {
                println!("Substitutes for {}:", result.target.name);
                println!(
                    "{:<20} {:>8} {:>8} {:>8} {:>8} {:>8}",
                    "Hop", "Score", "Flavor", "Desc", "Alpha", "Ratio"
                );
                println!("{}", "-".repeat(65));
                for c in &result.substitutions {
                    println!(
                        "{:<20} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3}",
                        c.name,
                        c.similarity_score,
                        c.flavor_similarity,
                        c.descriptor_overlap,
                        c.alpha_closeness,
                        c.recommended_bittering_ratio
                    );
                }
                if !result.unresolved.is_empty() {
                    println!("\nUnrecognized: {}", result.unresolved.join(", "));
                }
            }
        }

        Commands::Water {
            profile,
            style,
            volume,
            lang,
            json,
        } => {
            let source = db::get_water_profile(&conn, profile)?.ok_or_else(|| anyhow!("water profile {profile} not found"))?;
            let rec = water::recommend_for_style(&source.ions, &style, volume, Language::resolve(lang.as_deref(), None))?;
            if json {
                print_json(&rec)?;
            } else {
                println!("{} {} from '{}' ({:.1} L)", rec.style_code, rec.style_name, source.name, volume);
                println!();
                println!("{:<12} {:>10} {:>10} {:>10}", "Ion (ppm)", "Source", "Target", "Projected");
                println!("{}", "-".repeat(45));
                for ion in brewday_planner::models::Ion::ALL {
                    println!(
                        "{:<12} {:>10.1} {:>10.1} {:>10.1}",
                        ion.label(),
                        rec.source_profile.get(ion),
                        rec.target_profile.get(ion),
                        rec.projected_profile.get(ion)
                    );
                }
                if !rec.additions.is_empty() {
                    println!();
                    for a in &rec.additions {
                        println!("{:<28} {:>8.2} g ({:.3} g/L)  {}", a.mineral_name, a.grams_total, a.grams_per_liter, a.reason);
                    }
                }
                for note in &rec.notes {
                    println!("* {}", note);
                }
            }
        }

        Commands::Styles { search } => {
            println!("{:<6} {:<24} {:<28}", "Code", "Style", "Category");
            println!("{}", "-".repeat(58));
            for s in styles::list_styles(search.as_deref()) {
                println!("{:<6} {:<24} {:<28}", s.code, s.name, s.category);
            }
        }

        Commands::Equipment { command } => match command {
            EquipmentCommands::List => {
                let profiles = db::list_equipment(&conn)?;
                if profiles.is_empty() {
                    println!("No equipment profiles. Run 'equipment add' or 'load-sample' first.");
                } else {
                    println!(
                        "{:<5} {:<30} {:>8} {:>8} {:>8} {:>6}",
                        "ID", "Equipment", "Batch L", "Tun L", "Kettle L", "Eff %"
                    );
                    println!("{}", "-".repeat(70));
                    for e in profiles {
                        let opt = |v: Option<f64>| v.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string());
                        println!(
                            "{:<5} {:<30} {:>8.1} {:>8} {:>8} {:>6.1}",
                            e.id,
                            e.name,
                            e.batch_volume_liters,
                            opt(e.mash_tun_volume_liters),
                            opt(e.boil_kettle_volume_liters),
                            e.brewhouse_efficiency_pct
                        );
                    }
                }
            }
            EquipmentCommands::Add {
                name,
                batch_volume,
                mash_tun,
                kettle,
                efficiency,
                boil_off,
                trub,
                notes,
            } => {
                if !(batch_volume > 0.0) {
                    bail!("batch volume must be positive, got {batch_volume}");
                }
                let id = db::insert_equipment(
                    &conn,
                    &EquipmentProfile {
                        id: 0,
                        name: name.clone(),
                        batch_volume_liters: batch_volume,
                        mash_tun_volume_liters: mash_tun,
                        boil_kettle_volume_liters: kettle,
                        brewhouse_efficiency_pct: efficiency,
                        boil_off_rate_l_per_hour: boil_off,
                        trub_loss_liters: trub,
                        notes,
                    },
                )?;
                println!("Added equipment profile {} ({})", id, name);
            }
        },

        Commands::WaterProfile { command } => match command {
            WaterProfileCommands::List => {
                let profiles = db::list_water_profiles(&conn)?;
                if profiles.is_empty() {
                    println!("No water profiles. Run 'water-profile add' or 'load-sample' first.");
                } else {
                    println!(
                        "{:<5} {:<24} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
                        "ID", "Profile", "Ca", "Mg", "Na", "Cl", "SO4", "HCO3"
                    );
                    println!("{}", "-".repeat(72));
                    for w in profiles {
                        let i = w.ions;
                        println!(
                            "{:<5} {:<24} {:>6.0} {:>6.0} {:>6.0} {:>6.0} {:>6.0} {:>6.0}",
                            w.id,
                            w.name,
                            i.calcium_ppm,
                            i.magnesium_ppm,
                            i.sodium_ppm,
                            i.chloride_ppm,
                            i.sulfate_ppm,
                            i.bicarbonate_ppm
                        );
                    }
                }
            }
            WaterProfileCommands::Add {
                name,
                calcium,
                magnesium,
                sodium,
                chloride,
                sulfate,
                bicarbonate,
                notes,
            } => {
                let ions = WaterIonProfile {
                    calcium_ppm: calcium,
                    magnesium_ppm: magnesium,
                    sodium_ppm: sodium,
                    chloride_ppm: chloride,
                    sulfate_ppm: sulfate,
                    bicarbonate_ppm: bicarbonate,
                };
                if brewday_planner::models::Ion::ALL.iter().any(|ion| !(ions.get(*ion) >= 0.0)) {
                    bail!("ion concentrations must be zero or more");
                }
                let id = db::insert_water_profile(&conn, &name, &ions, &notes)?;
                println!("Added water profile {} ({})", id, name);
            }
        },

        Commands::Reading { command } => match command {
            ReadingCommands::Add {
                batch,
                gravity,
                temp,
                ph,
                at,
                notes,
            } => {
                let id = db::insert_reading(&conn, batch, at.unwrap_or_else(Utc::now), gravity, temp, ph, &notes)?;
                println!("Added reading {} for batch {}", id, batch);
            }
        },

        Commands::Stats { json } => {
            let recipes = db::list_recipes(&conn)?;
            let batches = db::list_batches(&conn)?;
            let mut readings = Vec::new();
            for b in &batches {
                readings.extend(db::list_readings(&conn, b.id)?);
            }
            let overview = analytics::overview(recipes.len(), &batches, &readings);
            if json {
                print_json(&overview)?;
            } else {
                print!("{}", overview);
            }
        }

        Commands::Trend { batch, json } => {
            let readings = db::list_readings(&conn, batch)?;
            let trend = fermentation::analyze(batch, &readings);
            if json {
                print_json(&trend)?;
            } else {
                print!("{}", trend);
            }
        }
    }

    Ok(())
}

fn sample_recipe(
    name: &str,
    style: &str,
    (target_og, target_fg): (f64, f64),
    (target_ibu, target_srm): (f64, f64),
    efficiency_pct: f64,
    notes: &str,
    ingredients: &[(&str, IngredientCategory, f64, &str, &str, i32)],
) -> Recipe {
    Recipe {
        id: 0,
        name: name.to_string(),
        style: Some(style.to_string()),
        target_og,
        target_fg,
        target_ibu: Some(target_ibu),
        target_srm: Some(target_srm),
        efficiency_pct,
        batch_volume_liters: 20.0,
        notes: notes.to_string(),
        ingredients: ingredients
            .iter()
            .map(|&(name, category, amount, unit, stage, minute)| IngredientLine {
                stage: stage.to_string(),
                minute_added: minute,
                ..IngredientLine::new(name, category, amount, unit)
            })
            .collect(),
    }
}

/// Load a small brewery's worth of sample data
fn load_sample_data(conn: &Connection) -> Result<()> {
    use IngredientCategory::{Fermentable, Hop, Yeast};

    let recipes = [
        sample_recipe(
            "Sierra Nevada Pale Ale Clone",
            "18B",
            (1.052, 1.011),
            (38.0, 9.0),
            74.0,
            "Classic US pale ale profile with late cascade additions.",
            &[
                ("Pale Malt", Fermentable, 4.5, "kg", "mash", 0),
                ("Crystal 60", Fermentable, 0.35, "kg", "mash", 0),
                ("Cascade", Hop, 20.0, "g", "boil", 60),
                ("Cascade", Hop, 25.0, "g", "boil", 10),
                ("US-05", Yeast, 1.0, "pack", "fermentation", 0),
            ],
        ),
        sample_recipe(
            "Dry Irish Stout",
            "15B",
            (1.044, 1.010),
            (35.0, 35.0),
            72.0,
            "Roasty session stout with firm bitterness.",
            &[
                ("Pale Malt", Fermentable, 3.4, "kg", "mash", 0),
                ("Flaked Barley", Fermentable, 0.45, "kg", "mash", 0),
                ("Roasted Barley", Fermentable, 0.35, "kg", "mash", 0),
                ("East Kent Goldings", Hop, 35.0, "g", "boil", 60),
                ("S-04", Yeast, 1.0, "pack", "fermentation", 0),
            ],
        ),
        sample_recipe(
            "West Coast IPA",
            "21A",
            (1.062, 1.010),
            (62.0, 7.0),
            75.0,
            "Dry, bitter IPA with whirlpool hops.",
            &[
                ("Pale Malt", Fermentable, 5.2, "kg", "mash", 0),
                ("Munich Malt", Fermentable, 0.4, "kg", "mash", 0),
                ("Columbus", Hop, 20.0, "g", "boil", 60),
                ("Citra", Hop, 60.0, "g", "boil", 10),
                ("US-05", Yeast, 1.0, "pack", "fermentation", 0),
            ],
        ),
    ];
    for recipe in &recipes {
        db::insert_recipe(conn, recipe)?;
    }

    let stock = [
        ("Pale Malt", Fermentable, 8000.0, "g"),
        ("Crystal 60", Fermentable, 1.0, "kg"),
        ("Munich Malt", Fermentable, 1.0, "lb"),
        ("Roasted Barley", Fermentable, 0.5, "kg"),
        ("Cascade", Hop, 100.0, "g"),
        ("Columbus", Hop, 2.0, "oz"),
        ("Mosaic", Hop, 80.0, "g"),
        ("Amarillo", Hop, 50.0, "g"),
        ("US-05", Yeast, 2.0, "pack"),
    ];
    for (name, category, quantity, unit) in stock {
        db::insert_stock(conn, name, category, quantity, unit)?;
    }

    let equipment = [
        EquipmentProfile {
            id: 0,
            name: "All-Grain 20L Cooler Setup".to_string(),
            batch_volume_liters: 20.0,
            mash_tun_volume_liters: Some(28.0),
            boil_kettle_volume_liters: Some(35.0),
            brewhouse_efficiency_pct: 72.0,
            boil_off_rate_l_per_hour: Some(3.2),
            trub_loss_liters: Some(1.2),
            notes: "Single-infusion cooler mash tun with propane boil kettle.".to_string(),
        },
        EquipmentProfile {
            id: 0,
            name: "Electric BIAB 35L".to_string(),
            batch_volume_liters: 23.0,
            mash_tun_volume_liters: Some(35.0),
            boil_kettle_volume_liters: Some(35.0),
            brewhouse_efficiency_pct: 70.0,
            boil_off_rate_l_per_hour: Some(2.8),
            trub_loss_liters: Some(1.0),
            notes: "Single-vessel BIAB profile for compact electric systems.".to_string(),
        },
    ];
    for profile in &equipment {
        db::insert_equipment(conn, profile)?;
    }

    let water_profiles = [
        (
            "Soft Tap",
            WaterIonProfile {
                calcium_ppm: 15.0,
                magnesium_ppm: 3.0,
                sodium_ppm: 8.0,
                chloride_ppm: 12.0,
                sulfate_ppm: 10.0,
                bicarbonate_ppm: 35.0,
            },
        ),
        (
            "Hard Well",
            WaterIonProfile {
                calcium_ppm: 95.0,
                magnesium_ppm: 20.0,
                sodium_ppm: 25.0,
                chloride_ppm: 40.0,
                sulfate_ppm: 60.0,
                bicarbonate_ppm: 260.0,
            },
        ),
    ];
    for (name, ions) in &water_profiles {
        db::insert_water_profile(conn, name, ions, "")?;
    }

    println!(
        "Loaded {} recipes, {} stock items, {} equipment profiles, {} water profiles",
        recipes.len(),
        stock.len(),
        equipment.len(),
        water_profiles.len()
    );
    Ok(())
}
