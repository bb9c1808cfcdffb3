//! MachineStore trait definition

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{MachineDetail, MachineInput, MachineSummary};

/// MachineStore trait - defines the interface for machine persistence
///
/// Implementations receive input that has already been validated.
#[async_trait]
pub trait MachineStore: Send + Sync {
    /// Insert a machine and every provided child block
    ///
    /// # Returns
    /// The id of the new machine
    ///
    /// # Errors
    /// `Duplicate` when the machine number is already taken
    async fn create(&self, input: &MachineInput) -> Result<i64>;

    /// Update a machine and upsert every provided child block
    ///
    /// Child blocks that are `None` in `input` are left as they are.
    ///
    /// # Errors
    /// `NotFound` when no machine has this id
    async fn update(&self, id: i64, input: &MachineInput) -> Result<()>;

    /// Get a machine with all of its child records
    ///
    /// # Returns
    /// The machine if found, None otherwise
    async fn get(&self, id: i64) -> Result<Option<MachineDetail>>;

    /// Search machines with a prepared LIKE pattern
    ///
    /// # Arguments
    /// * `pattern` - escaped `%term%` pattern, see [`crate::search::prepare_pattern`]
    async fn search(&self, pattern: &str) -> Result<Vec<MachineSummary>>;

    /// Number of machines in the store
    async fn count(&self) -> Result<u64>;
}
