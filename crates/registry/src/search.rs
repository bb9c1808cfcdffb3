//! Free-text search input handling and SQL construction

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{RegistryError, Result};

/// Maximum search term length in characters, after stripping
pub const MAX_QUERY_CHARS: usize = 100;

/// Columns matched by free-text search, qualified by join alias
pub const SEARCH_COLUMNS: &[&str] = &[
    "m.machine_number",
    "m.maker",
    "m.model",
    "m.serial_number",
    "n.maker",
    "n.model",
    "n.serial",
    "c.contract_number",
    "c.contract_type",
    "s.salesperson",
    "d.name",
    "d.country",
    "sh.tracking_number",
    "sh.destination",
    "i.installer",
    "i.location",
    "i.country",
    "e.company_name",
    "e.country",
    "sb.name",
    "sb.country",
];

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w \-.,@#]").expect("search allow-list pattern is valid"))
}

/// Strip characters outside the allow-list, trim, and cap the length.
///
/// Allowed: word characters, space, `-`, `.`, `,`, `@`, `#`.
pub fn sanitize_query(raw: &str) -> String {
    let stripped = disallowed_chars().replace_all(raw, "");
    stripped.trim().chars().take(MAX_QUERY_CHARS).collect()
}

/// Build the `LIKE` pattern for a sanitized term.
///
/// `_` survives sanitization but is a LIKE wildcard, so it is escaped.
pub fn like_pattern(term: &str) -> String {
    format!("%{}%", term.replace('_', "\\_"))
}

/// Sanitize a raw query and turn it into a LIKE pattern.
///
/// Fails when nothing is left after sanitization.
pub fn prepare_pattern(raw: &str) -> Result<String> {
    let term = sanitize_query(raw);
    if term.is_empty() {
        return Err(RegistryError::validation("Invalid search query"));
    }
    Ok(like_pattern(&term))
}

/// SQL for the search query; bind the pattern once per entry in [`SEARCH_COLUMNS`].
pub fn search_sql() -> String {
    let predicates: Vec<String> = SEARCH_COLUMNS
        .iter()
        .map(|col| format!("{} LIKE ? ESCAPE '\\'", col))
        .collect();

    format!(
        r#"
        SELECT DISTINCT
            m.id AS id,
            m.machine_number AS machine_number,
            m.maker AS maker,
            m.model AS machine_model,
            m.serial_number AS machine_serial,
            n.maker AS nc_maker,
            n.model AS nc_model,
            c.contract_number AS contract_number,
            e.company_name AS end_user,
            i.country AS install_country,
            sb.name AS service_base
        FROM machines m
        LEFT JOIN nc_units n ON n.machine_id = m.id
        LEFT JOIN contracts c ON c.machine_id = m.id
        LEFT JOIN sales s ON s.machine_id = m.id
        LEFT JOIN dealers d ON d.machine_id = m.id
        LEFT JOIN shipments sh ON sh.machine_id = m.id
        LEFT JOIN installations i ON i.machine_id = m.id
        LEFT JOIN end_users e ON e.machine_id = m.id
        LEFT JOIN service_bases sb ON sb.machine_id = m.id
        WHERE {}
        ORDER BY m.id
        "#,
        predicates.join("\n           OR ")
    )
}
