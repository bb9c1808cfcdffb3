//! Field validation for machine input
//!
//! Every check here runs before anything is written to the store.

use chrono::NaiveDate;

use crate::error::{RegistryError, Result};
use crate::types::MachineInput;

/// Maximum memo length in characters
pub const MAX_MEMO_CHARS: usize = 300;

/// Minimum country length in characters
pub const MIN_COUNTRY_CHARS: usize = 3;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Validate an optional `YYYY/MM/DD` date field
pub fn validate_date(field: &str, value: &Option<String>) -> Result<()> {
    if is_blank(value) {
        return Ok(());
    }
    let raw = value.as_deref().unwrap_or_default().trim();

    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'/',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(RegistryError::validation(format!(
            "{} must be in YYYY/MM/DD format, got '{}'",
            field, raw
        )));
    }

    NaiveDate::parse_from_str(raw, "%Y/%m/%d").map_err(|_| {
        RegistryError::validation(format!("{} is not a valid calendar date: '{}'", field, raw))
    })?;
    Ok(())
}

/// Validate an optional free-text country field
pub fn validate_country(field: &str, value: &Option<String>) -> Result<()> {
    if is_blank(value) {
        return Ok(());
    }
    let raw = value.as_deref().unwrap_or_default().trim();

    if raw.chars().count() < MIN_COUNTRY_CHARS {
        return Err(RegistryError::validation(format!(
            "{} must be at least {} characters",
            field, MIN_COUNTRY_CHARS
        )));
    }
    if raw.chars().any(|c| c.is_ascii_digit()) {
        return Err(RegistryError::validation(format!(
            "{} must not contain digits",
            field
        )));
    }
    Ok(())
}

/// Validate an optional memo field
pub fn validate_memo(field: &str, value: &Option<String>) -> Result<()> {
    match value {
        Some(memo) if memo.chars().count() > MAX_MEMO_CHARS => Err(RegistryError::validation(
            format!("{} must be at most {} characters", field, MAX_MEMO_CHARS),
        )),
        _ => Ok(()),
    }
}

fn trim_in_place(value: &mut Option<String>) {
    if let Some(v) = value {
        let trimmed = v.trim();
        if trimmed.len() != v.len() {
            *v = trimmed.to_string();
        }
    }
}

/// Trim the fields whose checks ignore surrounding whitespace, so the value
/// written is the value that was validated.
pub fn normalize_machine_input(input: &mut MachineInput) {
    input.machine_number = input.machine_number.trim().to_string();

    if let Some(contract) = &mut input.contract {
        trim_in_place(&mut contract.contract_date);
    }
    if let Some(sale) = &mut input.sale {
        trim_in_place(&mut sale.sale_date);
    }
    if let Some(dealer) = &mut input.dealer {
        trim_in_place(&mut dealer.country);
    }
    if let Some(shipment) = &mut input.shipment {
        trim_in_place(&mut shipment.ship_date);
    }
    if let Some(installation) = &mut input.installation {
        trim_in_place(&mut installation.install_date);
        trim_in_place(&mut installation.country);
    }
    if let Some(end_user) = &mut input.end_user {
        trim_in_place(&mut end_user.country);
    }
    if let Some(service_base) = &mut input.service_base {
        trim_in_place(&mut service_base.country);
    }
}

/// Validate a full create/update body
pub fn validate_machine_input(input: &MachineInput) -> Result<()> {
    if input.machine_number.trim().is_empty() {
        return Err(RegistryError::validation("machine_number is required"));
    }

    if let Some(contract) = &input.contract {
        validate_date("contract.contract_date", &contract.contract_date)?;
        validate_memo("contract.memo", &contract.memo)?;
    }
    if let Some(sale) = &input.sale {
        validate_date("sale.sale_date", &sale.sale_date)?;
        validate_memo("sale.memo", &sale.memo)?;
    }
    if let Some(dealer) = &input.dealer {
        validate_country("dealer.country", &dealer.country)?;
    }
    if let Some(shipment) = &input.shipment {
        validate_date("shipment.ship_date", &shipment.ship_date)?;
        validate_memo("shipment.memo", &shipment.memo)?;
    }
    if let Some(installation) = &input.installation {
        validate_date("installation.install_date", &installation.install_date)?;
        validate_country("installation.country", &installation.country)?;
        validate_memo("installation.memo", &installation.memo)?;
    }
    if let Some(end_user) = &input.end_user {
        validate_country("end_user.country", &end_user.country)?;
    }
    if let Some(service_base) = &input.service_base {
        validate_country("service_base.country", &service_base.country)?;
    }

    Ok(())
}
