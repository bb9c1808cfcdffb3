//! Machine Manager - business rules in front of the store

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{RegistryError, Result};
use crate::search::prepare_pattern;
use crate::seed::seed_sample_data;
use crate::store::traits::MachineStore;
use crate::types::{MachineDetail, MachineInput, MachineSummary};
use crate::validation::{normalize_machine_input, validate_machine_input};

/// Machine Manager - validates input and drives the store
pub struct MachineManager {
    store: Arc<dyn MachineStore>,
}

impl MachineManager {
    /// Create a new MachineManager
    pub fn new(store: Arc<dyn MachineStore>) -> Self {
        Self { store }
    }

    /// Free-text search across machine and child columns
    ///
    /// The query is sanitized first; nothing usable left is a validation
    /// error and the store is never queried.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<MachineSummary>> {
        let pattern = prepare_pattern(raw_query).map_err(|e| {
            warn!(query = raw_query, "Rejected search query");
            e
        })?;
        self.store.search(&pattern).await
    }

    /// Fetch a machine with all child records
    pub async fn get_machine(&self, id: i64) -> Result<MachineDetail> {
        self.store
            .get(id)
            .await?
            .ok_or(RegistryError::NotFound(id))
    }

    /// Create a machine and its child records
    ///
    /// # Returns
    /// The id of the new machine
    pub async fn create_machine(&self, mut input: MachineInput) -> Result<i64> {
        normalize_machine_input(&mut input);
        validate_machine_input(&input)?;

        let id = self.store.create(&input).await?;
        info!(id, machine_number = %input.machine_number, "Created machine");
        Ok(id)
    }

    /// Update a machine, upserting every provided child block
    pub async fn update_machine(&self, id: i64, mut input: MachineInput) -> Result<MachineDetail> {
        normalize_machine_input(&mut input);
        validate_machine_input(&input)?;

        self.store.update(id, &input).await?;
        info!(id, machine_number = %input.machine_number, "Updated machine");
        self.get_machine(id).await
    }

    /// Number of registered machines
    pub async fn machine_count(&self) -> Result<u64> {
        self.store.count().await
    }

    /// Insert the sample machines if the store is empty
    pub async fn seed_sample_data(&self) -> Result<usize> {
        seed_sample_data(self.store.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::SqliteMachineStore;
    use crate::types::{Contract, Dealer};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Seeded in-memory store that counts search calls
    struct CountingStore {
        inner: SqliteMachineStore,
        searches: AtomicUsize,
    }

    impl CountingStore {
        async fn new() -> Self {
            let inner = SqliteMachineStore::in_memory().await.unwrap();
            seed_sample_data(&inner).await.unwrap();
            Self {
                inner,
                searches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MachineStore for CountingStore {
        async fn create(&self, input: &MachineInput) -> Result<i64> {
            self.inner.create(input).await
        }

        async fn update(&self, id: i64, input: &MachineInput) -> Result<()> {
            self.inner.update(id, input).await
        }

        async fn get(&self, id: i64) -> Result<Option<MachineDetail>> {
            self.inner.get(id).await
        }

        async fn search(&self, pattern: &str) -> Result<Vec<MachineSummary>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            self.inner.search(pattern).await
        }

        async fn count(&self) -> Result<u64> {
            self.inner.count().await
        }
    }

    async fn create_manager() -> MachineManager {
        let store = SqliteMachineStore::in_memory().await.unwrap();
        MachineManager::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_search_seeded() {
        let manager = create_manager().await;
        manager.seed_sample_data().await.unwrap();

        let results = manager.search("Makino").await.unwrap();
        assert_eq!(results.len(), 2);

        let results = manager.search("  Japan  ").await.unwrap();
        assert_eq!(results.len(), 3);

        let results = manager.search("nonexistent").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_empty_query_without_touching_store() {
        let store = Arc::new(CountingStore::new().await);
        let manager = MachineManager::new(store.clone());

        for raw in ["", "   ", "%';", "%%%"] {
            assert!(matches!(
                manager.search(raw).await,
                Err(RegistryError::Validation(_))
            ));
        }
        assert_eq!(store.searches.load(Ordering::SeqCst), 0);

        manager.search("Makino").await.unwrap();
        assert_eq!(store.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_long_memo() {
        let manager = create_manager().await;

        let mut input = MachineInput::new("GD-9005");
        input.contract = Some(Contract {
            memo: Some("m".repeat(301)),
            ..Default::default()
        });
        let err = manager.create_machine(input).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert_eq!(manager.machine_count().await.unwrap(), 0);

        let mut input = MachineInput::new("GD-9005");
        input.contract = Some(Contract {
            memo: Some("m".repeat(300)),
            ..Default::default()
        });
        assert!(manager.create_machine(input).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_stores_trimmed_date_and_country() {
        let manager = create_manager().await;

        let mut input = MachineInput::new("GD-9006");
        input.contract = Some(Contract {
            contract_date: Some(" 2024/01/01 ".to_string()),
            ..Default::default()
        });
        input.dealer = Some(Dealer {
            country: Some(" Germany ".to_string()),
            ..Default::default()
        });
        let id = manager.create_machine(input).await.unwrap();

        let detail = manager.get_machine(id).await.unwrap();
        assert_eq!(
            detail.contract.unwrap().contract_date.as_deref(),
            Some("2024/01/01")
        );
        assert_eq!(detail.dealer.unwrap().country.as_deref(), Some("Germany"));
    }

    #[tokio::test]
    async fn test_wildcards_are_not_injected() {
        let manager = create_manager().await;
        manager.seed_sample_data().await.unwrap();

        // `%` is stripped and `_` is matched literally
        assert!(manager.search("%").await.is_err());
        assert!(manager.search("_").await.unwrap().is_empty());
        assert!(manager.search("SN_2024").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_contract_date() {
        let manager = create_manager().await;

        let mut input = MachineInput::new("GD-9001");
        input.contract = Some(Contract {
            contract_date: Some("2023/02/30".to_string()),
            ..Default::default()
        });

        let err = manager.create_machine(input).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert_eq!(manager.machine_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_number() {
        let manager = create_manager().await;

        let first = manager.create_machine(MachineInput::new("GD-9002")).await.unwrap();
        let err = manager
            .create_machine(MachineInput::new("GD-9002"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::Duplicate(_)));
        assert_eq!(
            manager.get_machine(first).await.unwrap().machine.machine_number,
            "GD-9002"
        );
    }

    #[tokio::test]
    async fn test_get_unknown_machine() {
        let manager = create_manager().await;
        assert!(matches!(
            manager.get_machine(404).await,
            Err(RegistryError::NotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_update_returns_detail() {
        let manager = create_manager().await;
        let id = manager.create_machine(MachineInput::new("GD-9003")).await.unwrap();

        let mut input = MachineInput::new("GD-9003");
        input.dealer = Some(Dealer {
            name: Some("Nordic Machines".to_string()),
            country: Some("Sweden".to_string()),
            ..Default::default()
        });
        let detail = manager.update_machine(id, input).await.unwrap();

        assert_eq!(detail.dealer.unwrap().country.as_deref(), Some("Sweden"));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_country() {
        let manager = create_manager().await;
        let id = manager.create_machine(MachineInput::new("GD-9004")).await.unwrap();

        let mut input = MachineInput::new("GD-9004");
        input.dealer = Some(Dealer {
            country: Some("S3".to_string()),
            ..Default::default()
        });

        assert!(matches!(
            manager.update_machine(id, input).await,
            Err(RegistryError::Validation(_))
        ));
        assert!(manager.get_machine(id).await.unwrap().dealer.is_none());
    }
}
