//! # Validation Module
//!
//! Identifier normalization and request field checks.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler                                                 │
//! │  ├── JSON deserialization                                              │
//! │  └── THIS MODULE: amount / currency / identifier checks                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY on devices.device_id (COLLATE NOCASE)                 │
//! │  └── PRIMARY KEY on terminal_sequences.store_code                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Device identifiers are normalized on every write AND every read, so the
//! stored key is always the canonical spelling.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a device identifier.
pub const MAX_DEVICE_ID_LEN: usize = 64;

/// Maximum length of a currency code.
pub const MAX_CURRENCY_LEN: usize = 8;

// =============================================================================
// Identifiers
// =============================================================================

/// Canonical form of a device identifier: trimmed, ASCII upper-case.
///
/// Returns `None` for a blank identifier, which callers treat as "no device".
///
/// ## Example
/// ```rust
/// use tappay_core::validation::normalize_device_id;
///
/// assert_eq!(normalize_device_id(" aa:bb:cc "), Some("AA:BB:CC".to_string()));
/// assert_eq!(normalize_device_id("   "), None);
/// ```
pub fn normalize_device_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_uppercase())
    }
}

/// Trims an optional store code, treating blank as absent.
pub fn normalize_store_code(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validates a device identifier supplied by an operator.
pub fn validate_device_id(raw: &str) -> ValidationResult<String> {
    let id = normalize_device_id(raw).ok_or_else(|| ValidationError::required("deviceId"))?;

    if id.len() > MAX_DEVICE_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "deviceId".to_string(),
            max: MAX_DEVICE_ID_LEN,
        });
    }

    Ok(id)
}

// =============================================================================
// Money Fields
// =============================================================================

/// Coerces a configured or submitted amount to minor units.
///
/// Integers are taken as-is; finite decimals are rounded; anything else
/// yields `None`.
pub fn coerce_amount(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n.round() as i64)
}

/// Coerces a JSON amount: a number, or a string holding one.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use tappay_core::validation::amount_from_json;
///
/// assert_eq!(amount_from_json(&json!(1250)), Some(1250));
/// assert_eq!(amount_from_json(&json!("12.6")), Some(13));
/// assert_eq!(amount_from_json(&json!(null)), None);
/// ```
pub fn amount_from_json(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        serde_json::Value::String(s) => coerce_amount(s),
        _ => None,
    }
}

/// Validates an amount in minor units.
pub fn validate_amount(amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::Negative {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates and trims a currency code.
pub fn validate_currency(raw: &str) -> ValidationResult<String> {
    let currency = raw.trim();

    if currency.is_empty() {
        return Err(ValidationError::required("currency"));
    }

    if currency.len() > MAX_CURRENCY_LEN {
        return Err(ValidationError::TooLong {
            field: "currency".to_string(),
            max: MAX_CURRENCY_LEN,
        });
    }

    if !currency.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(currency.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_normalization_is_case_insensitive() {
        assert_eq!(normalize_device_id("aa:bb:cc"), normalize_device_id("AA:BB:CC"));
        assert_eq!(normalize_device_id(""), None);
    }

    #[test]
    fn test_store_code_normalization() {
        assert_eq!(normalize_store_code(Some(" STORE02 ")), Some("STORE02".to_string()));
        assert_eq!(normalize_store_code(Some("  ")), None);
        assert_eq!(normalize_store_code(None), None);
    }

    #[test]
    fn test_validate_device_id() {
        assert_eq!(validate_device_id("ab12").unwrap(), "AB12");
        assert!(validate_device_id(" ").is_err());
        assert!(validate_device_id(&"A".repeat(65)).is_err());
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount("1200"), Some(1200));
        assert_eq!(coerce_amount(" 15 "), Some(15));
        assert_eq!(coerce_amount("9.6"), Some(10));
        assert_eq!(coerce_amount("abc"), None);
        assert_eq!(coerce_amount("inf"), None);
        assert_eq!(coerce_amount("NaN"), None);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0).is_ok());
        assert!(validate_amount(-1).is_err());
    }

    #[test]
    fn test_validate_currency() {
        assert_eq!(validate_currency(" EUR ").unwrap(), "EUR");
        assert!(validate_currency("").is_err());
        assert!(validate_currency("US D").is_err());
        assert!(validate_currency("ABCDEFGHI").is_err());
    }
}
