//! # Static Table Resolver
//!
//! Resolves devices from a fixed table loaded at startup. Never writes.

use async_trait::async_trait;
use tracing::{info, warn};

use tappay_core::validation::normalize_store_code;
use tappay_core::{ChargeDefaults, ResolvedConfig, StaticDeviceTable};

use crate::config::ResolverMode;
use crate::error::ResolveResult;
use crate::{requested_device, DeviceResolver};

/// Resolver backed by `DEVICE_CONFIG_JSON`.
#[derive(Debug, Clone)]
pub struct StaticTableResolver {
    table: StaticDeviceTable,
    defaults: ChargeDefaults,
}

impl StaticTableResolver {
    pub fn new(table: StaticDeviceTable, defaults: ChargeDefaults) -> Self {
        StaticTableResolver { table, defaults }
    }

    /// Parses the raw table. A malformed table is logged and treated as
    /// empty so every device falls back to the defaults.
    pub fn from_raw(raw: Option<&str>, defaults: ChargeDefaults) -> Self {
        let table = match raw.map(StaticDeviceTable::parse).transpose() {
            Ok(table) => table.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed device table");
                StaticDeviceTable::default()
            }
        };

        info!(devices = table.len(), "Static device table loaded");
        StaticTableResolver::new(table, defaults)
    }

    pub fn table(&self) -> &StaticDeviceTable {
        &self.table
    }
}

#[async_trait]
impl DeviceResolver for StaticTableResolver {
    async fn resolve(
        &self,
        device_id: Option<&str>,
        store_hint: Option<&str>,
    ) -> ResolveResult<ResolvedConfig> {
        let Some(device_id) = requested_device(device_id)? else {
            return Ok(self.defaults.to_resolved());
        };

        let Some(entry) = self.table.lookup(&device_id) else {
            return Ok(ResolvedConfig {
                device_id: Some(device_id),
                ..self.defaults.to_resolved()
            });
        };

        let store_code = normalize_store_code(entry.store_code.as_deref())
            .or_else(|| normalize_store_code(store_hint))
            .unwrap_or_else(|| self.defaults.store_code.clone());

        let currency = entry
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.defaults.currency.clone());

        Ok(ResolvedConfig {
            device_id: Some(device_id),
            store_code,
            terminal_id: entry.terminal_id.clone(),
            amount: entry.amount.unwrap_or(self.defaults.amount),
            currency,
            auto_enrolled: false,
        })
    }

    fn defaults(&self) -> &ChargeDefaults {
        &self.defaults
    }

    fn mode(&self) -> ResolverMode {
        ResolverMode::Static
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    const TABLE: &str = r#"[
        {"deviceId": "aa:bb:cc", "terminalId": "FRONT-1", "amount": 700, "currency": "EUR", "storeCode": "STORE03"},
        {"deviceId": "DD:EE:FF", "terminalId": "BACK-2"}
    ]"#;

    fn resolver(raw: Option<&str>) -> StaticTableResolver {
        StaticTableResolver::from_raw(raw, ChargeDefaults::default())
    }

    #[tokio::test]
    async fn test_configured_device() {
        let r = resolver(Some(TABLE));

        let config = r.resolve(Some("AA:BB:CC"), Some("STORE09")).await.unwrap();
        assert_eq!(config.terminal_id, "FRONT-1");
        assert_eq!(config.amount, 700);
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.store_code, "STORE03");
        assert!(!config.auto_enrolled);
    }

    #[tokio::test]
    async fn test_partial_entry_fills_from_defaults_and_hint() {
        let r = resolver(Some(TABLE));

        let config = r.resolve(Some("dd:ee:ff"), Some("STORE02")).await.unwrap();
        assert_eq!(config.terminal_id, "BACK-2");
        assert_eq!(config.amount, 0);
        assert_eq!(config.currency, "USD");
        assert_eq!(config.store_code, "STORE02");
    }

    #[tokio::test]
    async fn test_unknown_device_gets_defaults() {
        let r = resolver(Some(TABLE));

        let config = r.resolve(Some("11:22:33"), Some("STORE02")).await.unwrap();
        assert_eq!(config.device_id.as_deref(), Some("11:22:33"));
        assert_eq!(config.terminal_id, "");
        assert_eq!(config.store_code, "STORE01");
        assert!(!config.auto_enrolled);

        let absent = r.resolve(None, None).await.unwrap();
        assert_eq!(absent, ChargeDefaults::default().to_resolved());
    }

    #[tokio::test]
    async fn test_oversized_device_id_is_rejected() {
        let r = resolver(Some(TABLE));

        let err = r.resolve(Some(&"A".repeat(65)), None).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidDevice(_)));
    }

    #[tokio::test]
    async fn test_malformed_table_degrades_to_defaults() {
        let r = resolver(Some("{not json"));
        assert!(r.table().is_empty());

        let config = r.resolve(Some("AA:BB:CC"), None).await.unwrap();
        assert_eq!(config.terminal_id, "");
        assert_eq!(r.mode(), ResolverMode::Static);
    }
}
