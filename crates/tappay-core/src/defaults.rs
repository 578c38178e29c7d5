//! # Charge Defaults
//!
//! Fallback terminal, amount, currency and store used when no device-specific
//! data exists.
//!
//! Reading configuration never fails: every key degrades to a literal.
//!
//! | Key                   | Fallback   |
//! |-----------------------|------------|
//! | `DEFAULT_TERMINAL_ID` | `""`       |
//! | `DEFAULT_AMOUNT`      | `0`        |
//! | `DEFAULT_CURRENCY`    | `USD`      |
//!
//! A configured currency that would fail a session's currency check also
//! falls back to `USD`.
//! | `DEFAULT_STORE_CODE`  | `STORE01`  |

use serde::{Deserialize, Serialize};

use crate::types::ResolvedConfig;
use crate::validation::{coerce_amount, validate_currency};
use crate::{FALLBACK_CURRENCY, FALLBACK_STORE_CODE};

pub const KEY_DEFAULT_TERMINAL_ID: &str = "DEFAULT_TERMINAL_ID";
pub const KEY_DEFAULT_AMOUNT: &str = "DEFAULT_AMOUNT";
pub const KEY_DEFAULT_CURRENCY: &str = "DEFAULT_CURRENCY";
pub const KEY_DEFAULT_STORE_CODE: &str = "DEFAULT_STORE_CODE";

/// Deployment-wide fallback charge parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeDefaults {
    pub terminal_id: String,
    pub amount: i64,
    pub currency: String,
    pub store_code: String,
}

impl ChargeDefaults {
    /// Builds the defaults from a key lookup (usually the environment).
    ///
    /// ## Example
    /// ```rust
    /// use tappay_core::ChargeDefaults;
    ///
    /// let defaults = ChargeDefaults::from_lookup(|key| match key {
    ///     "DEFAULT_AMOUNT" => Some("not-a-number".to_string()),
    ///     "DEFAULT_CURRENCY" => Some("".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(defaults.amount, 0);
    /// assert_eq!(defaults.currency, "USD");
    /// assert_eq!(defaults.store_code, "STORE01");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        ChargeDefaults {
            terminal_id: non_empty(KEY_DEFAULT_TERMINAL_ID).unwrap_or_default(),
            amount: non_empty(KEY_DEFAULT_AMOUNT)
                .and_then(|raw| coerce_amount(&raw))
                .unwrap_or(0),
            currency: non_empty(KEY_DEFAULT_CURRENCY)
                .and_then(|raw| validate_currency(&raw).ok())
                .unwrap_or_else(|| FALLBACK_CURRENCY.to_string()),
            store_code: non_empty(KEY_DEFAULT_STORE_CODE)
                .unwrap_or_else(|| FALLBACK_STORE_CODE.to_string()),
        }
    }

    /// The config handed out when no device is involved.
    pub fn to_resolved(&self) -> ResolvedConfig {
        ResolvedConfig {
            device_id: None,
            store_code: self.store_code.clone(),
            terminal_id: self.terminal_id.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            auto_enrolled: false,
        }
    }
}

impl Default for ChargeDefaults {
    fn default() -> Self {
        ChargeDefaults::from_lookup(|_| None)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_literal_fallbacks() {
        let defaults = ChargeDefaults::default();
        assert_eq!(defaults.terminal_id, "");
        assert_eq!(defaults.amount, 0);
        assert_eq!(defaults.currency, "USD");
        assert_eq!(defaults.store_code, "STORE01");
    }

    #[test]
    fn test_configured_values() {
        let defaults = ChargeDefaults::from_lookup(lookup_from(&[
            (KEY_DEFAULT_TERMINAL_ID, "LOBBY"),
            (KEY_DEFAULT_AMOUNT, "250"),
            (KEY_DEFAULT_CURRENCY, "EUR"),
            (KEY_DEFAULT_STORE_CODE, "STORE07"),
        ]));
        assert_eq!(defaults.terminal_id, "LOBBY");
        assert_eq!(defaults.amount, 250);
        assert_eq!(defaults.currency, "EUR");
        assert_eq!(defaults.store_code, "STORE07");
    }

    #[test]
    fn test_misconfiguration_degrades() {
        let defaults = ChargeDefaults::from_lookup(lookup_from(&[
            (KEY_DEFAULT_AMOUNT, "ten"),
            (KEY_DEFAULT_CURRENCY, "   "),
            (KEY_DEFAULT_STORE_CODE, ""),
        ]));
        assert_eq!(defaults.amount, 0);
        assert_eq!(defaults.currency, "USD");
        assert_eq!(defaults.store_code, "STORE01");
    }

    #[test]
    fn test_invalid_currency_falls_back() {
        for raw in ["US Dollar", "EURO-ZONE", "ABCDEFGHIJ"] {
            let defaults = ChargeDefaults::from_lookup(lookup_from(&[(KEY_DEFAULT_CURRENCY, raw)]));
            assert_eq!(defaults.currency, "USD", "currency {raw:?}");
        }

        let padded = ChargeDefaults::from_lookup(lookup_from(&[(KEY_DEFAULT_CURRENCY, " PKR ")]));
        assert_eq!(padded.currency, "PKR");
    }

    #[test]
    fn test_to_resolved_has_no_device() {
        let conf = ChargeDefaults::default().to_resolved();
        assert_eq!(conf.device_id, None);
        assert!(!conf.auto_enrolled);
        assert_eq!(conf.store_code, "STORE01");
    }
}
