//! SQLite machine store implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info, instrument};

use crate::error::{RegistryError, Result};
use crate::schema::{self, ChildRecord, ColumnValue};
use crate::search::{search_sql, SEARCH_COLUMNS};
use crate::store::traits::MachineStore;
use crate::types::{
    Contract, Dealer, EndUser, Installation, Machine, MachineDetail, MachineInput,
    MachineSummary, NcUnit, Sale, ServiceBase, Shipment,
};

/// URL of a private in-memory database
pub const MEMORY_URL: &str = "sqlite::memory:";

/// Open a connection pool for the given SQLite URL.
///
/// In-memory databases live and die with their connection, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| RegistryError::Storage(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections.max(1))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| RegistryError::Storage(format!("Failed to connect to database: {}", e)))?;

    info!(in_memory, "Connected to SQLite database");
    Ok(pool)
}

/// SQLite-backed machine store
#[derive(Debug, Clone)]
pub struct SqliteMachineStore {
    pool: SqlitePool,
    search_sql: String,
}

impl SqliteMachineStore {
    /// Create a store over an existing connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            search_sql: search_sql(),
        }
    }

    /// Create an isolated in-memory store with the schema already in place
    pub async fn in_memory() -> Result<Self> {
        let store = Self::new(connect(MEMORY_URL, 1).await?);
        store.init_schema().await?;
        Ok(store)
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist
    pub async fn init_schema(&self) -> Result<()> {
        schema::init_schema(&self.pool).await
    }
}

async fn upsert_child<T: ChildRecord>(
    conn: &mut SqliteConnection,
    machine_id: i64,
    record: &T,
) -> Result<()> {
    let sql = T::upsert_sql();
    let mut query = sqlx::query(&sql).bind(machine_id);
    for value in record.values() {
        query = match value {
            ColumnValue::Text(v) => query.bind(v),
            ColumnValue::Real(v) => query.bind(v),
        };
    }
    query.execute(&mut *conn).await?;
    debug!(table = T::TABLE, machine_id, "Upserted child record");
    Ok(())
}

async fn fetch_child<T: ChildRecord>(
    conn: &mut SqliteConnection,
    machine_id: i64,
) -> Result<Option<T>> {
    let sql = T::select_sql();
    let row = sqlx::query_as::<_, T>(&sql)
        .bind(machine_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

async fn write_children(
    conn: &mut SqliteConnection,
    machine_id: i64,
    input: &MachineInput,
) -> Result<()> {
    if let Some(nc_unit) = &input.nc_unit {
        upsert_child(conn, machine_id, nc_unit).await?;
    }
    if let Some(contract) = &input.contract {
        upsert_child(conn, machine_id, contract).await?;
    }
    if let Some(sale) = &input.sale {
        upsert_child(conn, machine_id, sale).await?;
    }
    if let Some(dealer) = &input.dealer {
        upsert_child(conn, machine_id, dealer).await?;
    }
    if let Some(shipment) = &input.shipment {
        upsert_child(conn, machine_id, shipment).await?;
    }
    if let Some(installation) = &input.installation {
        upsert_child(conn, machine_id, installation).await?;
    }
    if let Some(end_user) = &input.end_user {
        upsert_child(conn, machine_id, end_user).await?;
    }
    if let Some(service_base) = &input.service_base {
        upsert_child(conn, machine_id, service_base).await?;
    }
    Ok(())
}

#[async_trait]
impl MachineStore for SqliteMachineStore {
    #[instrument(skip(self, input), fields(machine_number = %input.machine_number))]
    async fn create(&self, input: &MachineInput) -> Result<i64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO machines (
                machine_number, maker, model, serial_number, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(input.machine_number.trim())
        .bind(&input.maker)
        .bind(&input.model)
        .bind(&input.serial_number)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        write_children(&mut tx, id, input).await?;
        tx.commit().await?;

        debug!(id, "Inserted machine");
        Ok(id)
    }

    #[instrument(skip(self, input), fields(machine_number = %input.machine_number))]
    async fn update(&self, id: i64, input: &MachineInput) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE machines SET
                machine_number = ?,
                maker = ?,
                model = ?,
                serial_number = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(input.machine_number.trim())
        .bind(&input.maker)
        .bind(&input.model)
        .bind(&input.serial_number)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::NotFound(id));
        }

        write_children(&mut tx, id, input).await?;
        tx.commit().await?;

        debug!(id, "Updated machine");
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<MachineDetail>> {
        let mut conn = self.pool.acquire().await?;

        let machine = sqlx::query_as::<_, Machine>(
            r#"
            SELECT id, machine_number, maker, model, serial_number, created_at, updated_at
            FROM machines WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(machine) = machine else {
            return Ok(None);
        };

        Ok(Some(MachineDetail {
            machine,
            nc_unit: fetch_child::<NcUnit>(&mut conn, id).await?,
            contract: fetch_child::<Contract>(&mut conn, id).await?,
            sale: fetch_child::<Sale>(&mut conn, id).await?,
            dealer: fetch_child::<Dealer>(&mut conn, id).await?,
            shipment: fetch_child::<Shipment>(&mut conn, id).await?,
            installation: fetch_child::<Installation>(&mut conn, id).await?,
            end_user: fetch_child::<EndUser>(&mut conn, id).await?,
            service_base: fetch_child::<ServiceBase>(&mut conn, id).await?,
        }))
    }

    async fn search(&self, pattern: &str) -> Result<Vec<MachineSummary>> {
        let mut query = sqlx::query_as::<_, MachineSummary>(&self.search_sql);
        for _ in SEARCH_COLUMNS {
            query = query.bind(pattern);
        }
        let rows = query.fetch_all(&self.pool).await?;
        debug!(pattern, matches = rows.len(), "Search executed");
        Ok(rows)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM machines")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_sample_data;

    fn sample_input(number: &str) -> MachineInput {
        let mut input = MachineInput::new(number);
        input.maker = Some("Okuma".to_string());
        input.model = Some("MB-5000H".to_string());
        input.serial_number = Some(format!("SER-{}", number));
        input.nc_unit = Some(NcUnit {
            maker: Some("Okuma".to_string()),
            model: Some("OSP-P300MA".to_string()),
            serial: Some("NC-77".to_string()),
        });
        input
    }

    async fn child_rows(store: &SqliteMachineStore, table: &str, machine_id: i64) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE machine_id = ?", table))
            .bind(machine_id)
            .fetch_one(store.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SqliteMachineStore::in_memory().await.unwrap();

        let id = store.create(&sample_input("M-100")).await.unwrap();
        let detail = store.get(id).await.unwrap().unwrap();

        assert_eq!(detail.machine.machine_number, "M-100");
        assert_eq!(detail.machine.created_at, detail.machine.updated_at);
        assert_eq!(detail.nc_unit.unwrap().model.as_deref(), Some("OSP-P300MA"));
        assert!(detail.contract.is_none());
        assert!(detail.service_base.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let store = SqliteMachineStore::in_memory().await.unwrap();
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_machine_number() {
        let store = SqliteMachineStore::in_memory().await.unwrap();

        let first = store.create(&sample_input("M-200")).await.unwrap();
        let mut second = sample_input("M-200");
        second.model = Some("other".to_string());

        let err = store.create(&second).await.unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(_)));

        // First machine is untouched and no orphan children were written
        let detail = store.get(first).await.unwrap().unwrap();
        assert_eq!(detail.machine.model.as_deref(), Some("MB-5000H"));
        assert_eq!(store.count().await.unwrap(), 1);
        let nc_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nc_units")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(nc_total, 1);
    }

    #[tokio::test]
    async fn test_update_inserts_missing_child() {
        let store = SqliteMachineStore::in_memory().await.unwrap();
        let id = store.create(&sample_input("M-300")).await.unwrap();
        assert_eq!(child_rows(&store, "contracts", id).await, 0);

        let mut input = sample_input("M-300");
        input.contract = Some(Contract {
            contract_number: Some("CT-9".to_string()),
            contract_date: Some("2024/05/01".to_string()),
            ..Default::default()
        });
        store.update(id, &input).await.unwrap();

        assert_eq!(child_rows(&store, "contracts", id).await, 1);
        let detail = store.get(id).await.unwrap().unwrap();
        assert_eq!(detail.contract.unwrap().contract_number.as_deref(), Some("CT-9"));
    }

    #[tokio::test]
    async fn test_update_changes_existing_child_in_place() {
        let store = SqliteMachineStore::in_memory().await.unwrap();
        let id = store.create(&sample_input("M-400")).await.unwrap();

        let row_id_before: i64 = sqlx::query_scalar("SELECT id FROM nc_units WHERE machine_id = ?")
            .bind(id)
            .fetch_one(store.pool())
            .await
            .unwrap();

        let mut input = sample_input("M-400");
        input.nc_unit = Some(NcUnit {
            maker: Some("FANUC".to_string()),
            model: Some("0i-F".to_string()),
            serial: None,
        });
        store.update(id, &input).await.unwrap();

        assert_eq!(child_rows(&store, "nc_units", id).await, 1);
        let row_id_after: i64 = sqlx::query_scalar("SELECT id FROM nc_units WHERE machine_id = ?")
            .bind(id)
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(row_id_before, row_id_after);

        let nc = store.get(id).await.unwrap().unwrap().nc_unit.unwrap();
        assert_eq!(nc.maker.as_deref(), Some("FANUC"));
        assert_eq!(nc.serial, None);
    }

    #[tokio::test]
    async fn test_update_refreshes_only_updated_at() {
        let store = SqliteMachineStore::in_memory().await.unwrap();
        let id = store.create(&sample_input("M-500")).await.unwrap();
        let before = store.get(id).await.unwrap().unwrap().machine;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.update(id, &sample_input("M-500")).await.unwrap();
        let after = store.get(id).await.unwrap().unwrap().machine;

        assert_eq!(before.created_at, after.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_machine() {
        let store = SqliteMachineStore::in_memory().await.unwrap();
        let err = store.update(7, &sample_input("M-600")).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(7)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_to_taken_machine_number() {
        let store = SqliteMachineStore::in_memory().await.unwrap();
        store.create(&sample_input("M-700")).await.unwrap();
        let id = store.create(&sample_input("M-701")).await.unwrap();

        let err = store.update(id, &sample_input("M-700")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_search_seeded_data() {
        let store = SqliteMachineStore::in_memory().await.unwrap();
        seed_sample_data(&store).await.unwrap();

        let makino = store.search("%Makino%").await.unwrap();
        assert_eq!(makino.len(), 2);
        assert!(makino.iter().all(|m| m.maker.as_deref() == Some("Makino")));

        let japan = store.search("%Japan%").await.unwrap();
        assert_eq!(japan.len(), 3);
        assert!(japan.iter().all(|m| m.install_country.as_deref() == Some("Japan")));

        let serial = store.search("%SN-2024-001%").await.unwrap();
        assert_eq!(serial.len(), 1);
        assert_eq!(serial[0].machine_serial.as_deref(), Some("SN-2024-001"));

        let fanuc = store.search("%FANUC%").await.unwrap();
        assert_eq!(fanuc.len(), 4);

        assert!(store.search("%nonexistent%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_child_columns_without_duplicates() {
        let store = SqliteMachineStore::in_memory().await.unwrap();
        let mut input = sample_input("M-800");
        input.dealer = Some(Dealer {
            name: Some("Zephyr Tools".to_string()),
            country: Some("Canada".to_string()),
            ..Default::default()
        });
        input.end_user = Some(EndUser {
            company_name: Some("Zephyr Aerospace".to_string()),
            ..Default::default()
        });
        let id = store.create(&input).await.unwrap();

        let rows = store.search("%Zephyr%").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].end_user.as_deref(), Some("Zephyr Aerospace"));
    }
}
