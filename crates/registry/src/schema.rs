//! Table definitions and child-record persistence mapping

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::error::{RegistryError, Result};
use crate::types::{Contract, Dealer, EndUser, Installation, NcUnit, Sale, ServiceBase, Shipment};

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// Create all tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await
        .map_err(|e| RegistryError::Storage(format!("Schema initialization failed: {}", e)))?;
    info!("Database schema initialized");
    Ok(())
}

/// A value bound into a child-table column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(Option<String>),
    Real(Option<f64>),
}

/// A 1:1 child table keyed by a unique `machine_id` column.
///
/// `COLUMNS` and `values()` must line up index for index.
pub trait ChildRecord: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn values(&self) -> Vec<ColumnValue>;

    /// Insert the row, or overwrite the existing row for the same machine in place.
    fn upsert_sql() -> String {
        let placeholders = vec!["?"; Self::COLUMNS.len()].join(", ");
        let updates: Vec<String> = Self::COLUMNS
            .iter()
            .map(|col| format!("{col} = excluded.{col}"))
            .collect();
        format!(
            "INSERT INTO {} (machine_id, {}) VALUES (?, {}) \
             ON CONFLICT (machine_id) DO UPDATE SET {}",
            Self::TABLE,
            Self::COLUMNS.join(", "),
            placeholders,
            updates.join(", ")
        )
    }

    fn select_sql() -> String {
        format!(
            "SELECT {} FROM {} WHERE machine_id = ?",
            Self::COLUMNS.join(", "),
            Self::TABLE
        )
    }
}

fn text(value: &Option<String>) -> ColumnValue {
    ColumnValue::Text(value.clone())
}

impl ChildRecord for NcUnit {
    const TABLE: &'static str = "nc_units";
    const COLUMNS: &'static [&'static str] = &["maker", "model", "serial"];

    fn values(&self) -> Vec<ColumnValue> {
        vec![text(&self.maker), text(&self.model), text(&self.serial)]
    }
}

impl ChildRecord for Contract {
    const TABLE: &'static str = "contracts";
    const COLUMNS: &'static [&'static str] =
        &["contract_number", "contract_date", "contract_type", "memo"];

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            text(&self.contract_number),
            text(&self.contract_date),
            text(&self.contract_type),
            text(&self.memo),
        ]
    }
}

impl ChildRecord for Sale {
    const TABLE: &'static str = "sales";
    const COLUMNS: &'static [&'static str] = &["sale_date", "salesperson", "amount", "memo"];

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            text(&self.sale_date),
            text(&self.salesperson),
            ColumnValue::Real(self.amount),
            text(&self.memo),
        ]
    }
}

impl ChildRecord for Dealer {
    const TABLE: &'static str = "dealers";
    const COLUMNS: &'static [&'static str] = &["name", "country", "contact", "phone", "email"];

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            text(&self.name),
            text(&self.country),
            text(&self.contact),
            text(&self.phone),
            text(&self.email),
        ]
    }
}

impl ChildRecord for Shipment {
    const TABLE: &'static str = "shipments";
    const COLUMNS: &'static [&'static str] =
        &["ship_date", "method", "tracking_number", "destination", "memo"];

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            text(&self.ship_date),
            text(&self.method),
            text(&self.tracking_number),
            text(&self.destination),
            text(&self.memo),
        ]
    }
}

impl ChildRecord for Installation {
    const TABLE: &'static str = "installations";
    const COLUMNS: &'static [&'static str] =
        &["install_date", "installer", "location", "country", "memo"];

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            text(&self.install_date),
            text(&self.installer),
            text(&self.location),
            text(&self.country),
            text(&self.memo),
        ]
    }
}

impl ChildRecord for EndUser {
    const TABLE: &'static str = "end_users";
    const COLUMNS: &'static [&'static str] =
        &["company_name", "country", "contact", "phone", "email", "address"];

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            text(&self.company_name),
            text(&self.country),
            text(&self.contact),
            text(&self.phone),
            text(&self.email),
            text(&self.address),
        ]
    }
}

impl ChildRecord for ServiceBase {
    const TABLE: &'static str = "service_bases";
    const COLUMNS: &'static [&'static str] = &["name", "country", "contact", "phone", "email"];

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            text(&self.name),
            text(&self.country),
            text(&self.contact),
            text(&self.phone),
            text(&self.email),
        ]
    }
}
