//! Core types for the machine registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A machine row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Machine {
    pub id: i64,
    pub machine_number: String,
    pub maker: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Numerical-control unit fitted to a machine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NcUnit {
    #[serde(default)]
    pub maker: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
}

/// Service or purchase contract
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Contract {
    #[serde(default)]
    pub contract_number: Option<String>,
    /// `YYYY/MM/DD`
    #[serde(default)]
    pub contract_date: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Sale {
    #[serde(default)]
    pub sale_date: Option<String>,
    #[serde(default)]
    pub salesperson: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Dealer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Shipment {
    #[serde(default)]
    pub ship_date: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// Where and by whom the machine was installed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Installation {
    #[serde(default)]
    pub install_date: Option<String>,
    #[serde(default)]
    pub installer: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EndUser {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ServiceBase {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of a create or update request
///
/// Child blocks that are `None` are not written. On update they are left
/// untouched rather than cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineInput {
    pub machine_number: String,
    #[serde(default)]
    pub maker: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub nc_unit: Option<NcUnit>,
    #[serde(default)]
    pub contract: Option<Contract>,
    #[serde(default)]
    pub sale: Option<Sale>,
    #[serde(default)]
    pub dealer: Option<Dealer>,
    #[serde(default)]
    pub shipment: Option<Shipment>,
    #[serde(default)]
    pub installation: Option<Installation>,
    #[serde(default)]
    pub end_user: Option<EndUser>,
    #[serde(default)]
    pub service_base: Option<ServiceBase>,
}

impl MachineInput {
    pub fn new(machine_number: impl Into<String>) -> Self {
        Self {
            machine_number: machine_number.into(),
            ..Default::default()
        }
    }
}

/// A machine with every child record nested, `null` where absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDetail {
    #[serde(flatten)]
    pub machine: Machine,
    pub nc_unit: Option<NcUnit>,
    pub contract: Option<Contract>,
    pub sale: Option<Sale>,
    pub dealer: Option<Dealer>,
    pub shipment: Option<Shipment>,
    pub installation: Option<Installation>,
    pub end_user: Option<EndUser>,
    pub service_base: Option<ServiceBase>,
}

/// Flattened search result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MachineSummary {
    pub id: i64,
    pub machine_number: String,
    pub maker: Option<String>,
    pub machine_model: Option<String>,
    pub machine_serial: Option<String>,
    pub nc_maker: Option<String>,
    pub nc_model: Option<String>,
    pub contract_number: Option<String>,
    pub end_user: Option<String>,
    pub install_country: Option<String>,
    pub service_base: Option<String>,
}
