//! Field validators.
//!
//! Every validator is a pure function from a raw (already trimmed) field to
//! either its normalized value or a [`RowError`] carrying the message that
//! lands in the error artifact. Optional identifiers validate to `None` when
//! blank so the query builder can skip them.

use caseflow_protocol::defaults::DEFAULT_MONITOR_MONTHS;
use caseflow_protocol::{DrcAction, SourceType};
use std::fmt;

/// Why a row was rejected. `message` is the human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub field: &'static str,
    pub message: String,
}

impl RowError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RowError {}

/// `Ok(normalized)` is Valid, `Err(RowError)` is Invalid.
pub type Validation<T> = Result<T, RowError>;

pub fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Optional case id: all digits when present.
pub fn case_id(raw: &str) -> Validation<Option<i64>> {
    if raw.is_empty() {
        return Ok(None);
    }
    if !is_digits(raw) {
        return Err(RowError::new("case_id", "Invalid case ID"));
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| RowError::new("case_id", "Invalid case ID"))
}

/// Optional account number: exactly 10 digits when present.
pub fn account_number(raw: &str) -> Validation<Option<i64>> {
    if raw.is_empty() {
        return Ok(None);
    }
    if !is_ten_digit_account(raw) {
        return Err(RowError::new("account_no", "Invalid account number"));
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| RowError::new("account_no", "Invalid account number"))
}

/// Optional telephone number: 9 to 12 digits when present. Kept as text,
/// leading zeros are significant.
pub fn telephone_number(raw: &str) -> Validation<Option<String>> {
    if raw.is_empty() {
        return Ok(None);
    }
    if !is_digits(raw) || !(9..=12).contains(&raw.len()) {
        return Err(RowError::new("telephone_no", "Invalid telephone number"));
    }
    Ok(Some(raw.to_string()))
}

/// Required account number for the incident flows, kept as text.
pub fn required_account(raw: &str, message: &str) -> Validation<String> {
    if !is_ten_digit_account(raw) {
        return Err(RowError::new("account_no", message));
    }
    Ok(raw.to_string())
}

fn is_ten_digit_account(raw: &str) -> bool {
    is_digits(raw) && raw.len() == 10
}

/// Required free text such as a discard or reject reason.
pub fn required_text(raw: &str, field: &'static str, message: &str) -> Validation<String> {
    if raw.is_empty() {
        return Err(RowError::new(field, message));
    }
    Ok(raw.to_string())
}

/// Non-digit or zero month counts fall back to the business default.
fn months_or_default(raw: &str) -> u32 {
    if !is_digits(raw) {
        return DEFAULT_MONITOR_MONTHS;
    }
    match raw.parse::<u32>() {
        Ok(0) => DEFAULT_MONITOR_MONTHS,
        Ok(months) => months,
        // More digits than fit: certainly above any ceiling.
        Err(_) => u32::MAX,
    }
}

/// Months requested by a validity period extension row.
pub fn requested_months(raw: &str) -> Validation<u32> {
    if raw.is_empty() {
        return Err(RowError::new("months", "No of months missing"));
    }
    Ok(months_or_default(raw))
}

/// `requested + existing` must not exceed `ceiling`. Returns the new total.
pub fn within_ceiling(requested: u32, existing: u32, ceiling: u32) -> Validation<u32> {
    let total = requested.saturating_add(existing);
    if total > ceiling {
        return Err(RowError::new("months", format!("Exceeds {} months", ceiling)));
    }
    Ok(total)
}

/// Monitor months for a new incident.
pub fn incident_monitor_months(raw: &str, max: u32) -> Validation<u32> {
    let months = months_or_default(raw);
    if months > max {
        return Err(RowError::new(
            "monitor_months",
            format!("Monitor Months cannot be greater than {}", max),
        ));
    }
    Ok(months)
}

pub fn drc_action(raw: &str, accepted: &[DrcAction]) -> Validation<DrcAction> {
    raw.parse::<DrcAction>()
        .ok()
        .filter(|action| accepted.contains(action))
        .ok_or_else(|| RowError::new("drc_action", "Invalid DRC Action"))
}

pub fn source_type(raw: &str, accepted: &[SourceType]) -> Validation<SourceType> {
    raw.parse::<SourceType>()
        .ok()
        .filter(|source| accepted.contains(source))
        .ok_or_else(|| RowError::new("source_type", "Invalid Source Type"))
}

/// Contact number demanded by actions that collect equipment.
pub fn contact_number_for(action: DrcAction, contact: Option<&str>) -> Validation<Option<String>> {
    if !action.requires_contact_number() {
        return Ok(None);
    }
    match contact.map(str::trim).filter(|c| !c.is_empty()) {
        Some(contact) => Ok(Some(contact.to_string())),
        None => Err(RowError::new(
            "contact_number",
            format!("Contact number is required for {}", action),
        )),
    }
}
