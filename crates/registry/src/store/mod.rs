//! Store module exports

pub mod traits;
pub mod sqlite;
