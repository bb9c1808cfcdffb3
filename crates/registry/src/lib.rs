//! Machine installation registry for GlobalD
//!
//! This crate stores machines together with their optional sub-records
//! and exposes free-text search and create/update operations over them.
//!
//! # Features
//!
//! - Normalized schema: one `machines` table plus eight 1:1 child tables
//! - Free-text search across machine and child columns
//! - Create and update with per-child upsert keyed on the machine id
//! - Sample data seeding for demos and tests
//!
//! # Feature Flags
//!
//! - `api` - Enable HTTP API (enabled by default)

pub mod types;
pub mod error;
pub mod validation;
pub mod search;
pub mod schema;
pub mod seed;
pub mod store;
pub mod manager;

#[cfg(feature = "api")]
pub mod api;

// Re-export commonly used types
pub use types::{
    Contract, Dealer, EndUser, Installation, Machine, MachineDetail, MachineInput,
    MachineSummary, NcUnit, Sale, ServiceBase, Shipment,
};
pub use error::{RegistryError, Result};
pub use manager::MachineManager;

// Store exports
pub use store::traits::MachineStore;
pub use store::sqlite::{connect, SqliteMachineStore};
