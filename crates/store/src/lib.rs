//! `plantnet-store`: SQLite persistence for the census.
//!
//! Implements [`plantnet_census::EquipmentRegistry`] and
//! [`plantnet_census::CensusHistory`] over a single connection. Every query
//! is scoped by organization id.

mod error;
mod history;
mod inventory;
mod model;
mod schema;

pub use error::StoreError;
pub use inventory::SqliteStore;
pub use model::{Equipment, Location, LocationKind};
