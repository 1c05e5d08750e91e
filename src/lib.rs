//! Brew-day planning and recommendation engine
//!
//! Plans a batch against on-hand stock: mash and boil volumes, adjusted
//! gravity, a shopping list with hop substitutes, water salt additions and
//! a timed brew-day schedule. A small SQLite store backs the `brewday` CLI.

pub mod analytics;
pub mod calculator;
pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod fermentation;
pub mod hops;
pub mod import;
pub mod inventory;
pub mod models;
pub mod planner;
pub mod styles;
pub mod units;
pub mod water;

pub use error::{PlanError, PlanResult};
