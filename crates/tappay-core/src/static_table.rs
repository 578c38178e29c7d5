//! # Static Device Table
//!
//! A fixed device → config list supplied as configuration data
//! (`DEVICE_CONFIG_JSON`), for deployments that run without a device registry.
//!
//! ```json
//! [
//!   { "deviceId": "a4:cf:12:00:00:01", "terminalId": "FRONT-1", "amount": 500, "currency": "USD" },
//!   { "deviceId": "a4:cf:12:00:00:02", "terminalId": "BAR-1", "amount": "750" }
//! ]
//! ```
//!
//! Lookups compare device identifiers case-insensitively. Nothing here
//! allocates terminal codes or writes anywhere.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::validation::{amount_from_json, normalize_device_id};

/// One configured device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticDeviceEntry {
    pub device_id: String,
    pub terminal_id: String,

    /// Minor units. Accepts a JSON number or numeric string.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<i64>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub store_code: Option<String>,
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(amount_from_json))
}

/// Parsed static device table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDeviceTable {
    entries: Vec<StaticDeviceEntry>,
}

impl StaticDeviceTable {
    /// Builds a table from already-parsed entries.
    pub fn new(entries: Vec<StaticDeviceEntry>) -> Self {
        StaticDeviceTable { entries }
    }

    /// Parses the serialized table. Blank input is an empty table.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        if raw.trim().is_empty() {
            return Ok(StaticDeviceTable::default());
        }

        let entries: Vec<StaticDeviceEntry> = serde_json::from_str(raw)
            .map_err(|e| CoreError::InvalidDeviceTable(e.to_string()))?;

        Ok(StaticDeviceTable { entries })
    }

    /// Finds the entry for a device, ignoring case and surrounding whitespace.
    pub fn lookup(&self, device_id: &str) -> Option<&StaticDeviceEntry> {
        let wanted = normalize_device_id(device_id)?;
        self.entries
            .iter()
            .find(|e| normalize_device_id(&e.device_id).as_deref() == Some(wanted.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
