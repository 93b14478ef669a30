//! `plantnet-census`: RFID census reconciliation.
//!
//! Pure engine crate: receives the equipment registered at a location and the
//! tags a handheld reader picked up, returns a discrepancy report. Persistence
//! sits behind the `registry` and `history` traits.

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod registry;
pub mod request;
pub mod service;

pub use config::{CensusPolicy, TagCase, UnregisteredScope};
pub use engine::reconcile;
pub use error::CensusError;
pub use history::{CensusHistory, CensusRecord, NewCensus};
pub use model::{
    Discrepancy, DiscrepancyKind, DiscrepancyReport, EquipmentTag, MisplacedTag, RegisteredTag,
};
pub use registry::EquipmentRegistry;
pub use request::CensusRequest;
pub use service::{CensusOutcome, CensusService};
