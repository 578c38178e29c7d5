//! # Registry Resolver
//!
//! Resolves devices against the database registry and enrolls unknown ones.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  device_id absent/blank ─────────────────────────► defaults (no I/O)   │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  devices.find(id) ── hit ────────────────────────► record, enrolled=no │
//! │          │ miss                                                         │
//! │          ▼                                                              │
//! │  store = hint or DEFAULT_STORE_CODE                                     │
//! │  seq   = sequences.allocate(store)          (atomic, never reused)     │
//! │  code  = format(store, seq)                                             │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  devices.create(id, code, defaults) ── ok ──────► record, enrolled=yes │
//! │          │ duplicate (another request won)                              │
//! │          ▼                                                              │
//! │  devices.find(id) ──────────────────────────────► winner, enrolled=no  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The losing request of an enrollment race burns its sequence number. That
//! leaves a gap in the store's terminal codes, never a duplicate.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use tappay_core::validation::normalize_store_code;
use tappay_core::{ChargeDefaults, DeviceRecord, ResolvedConfig, TerminalCodeFormat};
use tappay_db::{Database, DbResult, DeviceRepository, NewDevice, SequenceRepository};

use crate::config::ResolverMode;
use crate::error::{ResolveError, ResolveResult};
use crate::{requested_device, DeviceResolver};

// =============================================================================
// Terminal Allocator
// =============================================================================

/// Hands out fresh terminal codes for a store.
///
/// Shared by auto-enrollment and the operator's "assign next code" action so
/// both draw from the same counter.
#[derive(Debug, Clone)]
pub struct TerminalAllocator {
    sequences: SequenceRepository,
    format: TerminalCodeFormat,
}

impl TerminalAllocator {
    pub fn new(sequences: SequenceRepository, format: TerminalCodeFormat) -> Self {
        TerminalAllocator { sequences, format }
    }

    /// Allocates the next number for `store_code` and formats it.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // counter for STORE02 was at 6
    /// let code = allocator.next_code("STORE02").await?;
    /// assert_eq!(code, "STORE02-0007");
    /// ```
    pub async fn next_code(&self, store_code: &str) -> DbResult<String> {
        let sequence = self.sequences.allocate(store_code).await?;
        let code = self.format.format(Some(store_code), sequence);
        debug!(store_code = %store_code, sequence, terminal_id = %code, "Terminal code allocated");
        Ok(code)
    }
}

// =============================================================================
// Registry Resolver
// =============================================================================

/// Database-backed resolver with auto-enrollment.
#[derive(Debug, Clone)]
pub struct RegistryResolver {
    devices: DeviceRepository,
    allocator: TerminalAllocator,
    defaults: ChargeDefaults,
}

impl RegistryResolver {
    pub fn new(db: &Database, defaults: ChargeDefaults, format: TerminalCodeFormat) -> Self {
        RegistryResolver {
            devices: db.devices(),
            allocator: TerminalAllocator::new(db.sequences(), format),
            defaults,
        }
    }

    pub fn allocator(&self) -> &TerminalAllocator {
        &self.allocator
    }

    async fn enroll(&self, device_id: &str, store_code: &str) -> ResolveResult<ResolvedConfig> {
        let terminal_id = self.allocator.next_code(store_code).await?;

        let new_device = NewDevice {
            device_id: device_id.to_string(),
            store_code: store_code.to_string(),
            terminal_id,
            amount: self.defaults.amount,
            currency: self.defaults.currency.clone(),
            status: None,
        };

        let created = self.devices.create(new_device).await;
        self.settle(device_id, created).await
    }

    /// Turns the outcome of an enrollment insert into a resolved config.
    ///
    /// A duplicate means another request enrolled the device first; its
    /// record is re-read and returned as not auto-enrolled.
    async fn settle(
        &self,
        device_id: &str,
        created: DbResult<DeviceRecord>,
    ) -> ResolveResult<ResolvedConfig> {
        match created {
            Ok(record) => {
                info!(
                    device_id = %record.device_id,
                    terminal_id = %record.terminal_id,
                    store_code = %record.store_code,
                    "Device auto-enrolled"
                );
                Ok(ResolvedConfig::from_record(&record, true))
            }
            Err(e) if e.is_unique_violation() => {
                debug!(device_id = %device_id, "Lost enrollment race, reading winner");
                let winner = self
                    .devices
                    .find(device_id)
                    .await?
                    .ok_or_else(|| ResolveError::DeviceVanished(device_id.to_string()))?;
                Ok(ResolvedConfig::from_record(&winner, false))
            }
            Err(e) => {
                warn!(device_id = %device_id, error = %e, "Auto-enrollment failed");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl DeviceResolver for RegistryResolver {
    async fn resolve(
        &self,
        device_id: Option<&str>,
        store_hint: Option<&str>,
    ) -> ResolveResult<ResolvedConfig> {
        let Some(device_id) = requested_device(device_id)? else {
            return Ok(self.defaults.to_resolved());
        };

        if let Some(record) = self.devices.find(&device_id).await? {
            return Ok(ResolvedConfig::from_record(&record, false));
        }

        let store_code =
            normalize_store_code(store_hint).unwrap_or_else(|| self.defaults.store_code.clone());

        self.enroll(&device_id, &store_code).await
    }

    fn defaults(&self) -> &ChargeDefaults {
        &self.defaults
    }

    fn mode(&self) -> ResolverMode {
        ResolverMode::Registry
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tappay_core::validation::{validate_device_id, MAX_DEVICE_ID_LEN};
    use tappay_db::{DbConfig, DbError};

    fn defaults() -> ChargeDefaults {
        ChargeDefaults {
            terminal_id: "DEFAULT-T".to_string(),
            amount: 1500,
            currency: "USD".to_string(),
            store_code: "STORE01".to_string(),
        }
    }

    async fn resolver() -> (Database, RegistryResolver) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let resolver = RegistryResolver::new(&db, defaults(), TerminalCodeFormat::default());
        (db, resolver)
    }

    #[tokio::test]
    async fn test_absent_device_returns_defaults_without_writes() {
        let (db, resolver) = resolver().await;

        for id in [None, Some(""), Some("   ")] {
            let config = resolver.resolve(id, Some("STORE02")).await.unwrap();
            assert_eq!(config, defaults().to_resolved());
        }

        assert_eq!(db.devices().count().await.unwrap(), 0);
        assert!(db.sequences().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_contact_enrolls_under_hinted_store() {
        let (db, resolver) = resolver().await;
        for _ in 0..6 {
            db.sequences().allocate("STORE02").await.unwrap();
        }

        let config = resolver.resolve(Some("aa:bb:cc"), Some("STORE02")).await.unwrap();
        assert_eq!(config.device_id.as_deref(), Some("AA:BB:CC"));
        assert_eq!(config.terminal_id, "STORE02-0007");
        assert_eq!(config.store_code, "STORE02");
        assert_eq!(config.amount, 1500);
        assert_eq!(config.currency, "USD");
        assert!(config.auto_enrolled);

        let again = resolver.resolve(Some("AA:BB:CC"), Some("STORE09")).await.unwrap();
        assert_eq!(again.terminal_id, "STORE02-0007");
        assert!(!again.auto_enrolled);
        assert_eq!(db.sequences().current("STORE02").await.unwrap(), Some(7));
        assert_eq!(db.sequences().current("STORE09").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_miss_without_hint_uses_default_store() {
        let (_db, resolver) = resolver().await;

        let config = resolver.resolve(Some("DEV-1"), None).await.unwrap();
        assert_eq!(config.terminal_id, "STORE01-0001");
        assert!(config.auto_enrolled);

        let blank_hint = resolver.resolve(Some("DEV-2"), Some("  ")).await.unwrap();
        assert_eq!(blank_hint.terminal_id, "STORE01-0002");
    }

    #[tokio::test]
    async fn test_operator_upsert_wins_over_enrollment() {
        let (db, resolver) = resolver().await;

        resolver.resolve(Some("DEV-1"), None).await.unwrap();
        db.devices()
            .upsert(NewDevice {
                device_id: "dev-1".to_string(),
                store_code: "STORE01".to_string(),
                terminal_id: "COUNTER-A".to_string(),
                amount: 250,
                currency: "EUR".to_string(),
                status: None,
            })
            .await
            .unwrap();

        let config = resolver.resolve(Some("DEV-1"), None).await.unwrap();
        assert_eq!(config.terminal_id, "COUNTER-A");
        assert_eq!(config.amount, 250);
        assert_eq!(config.currency, "EUR");
        assert!(!config.auto_enrolled);
    }

    #[tokio::test]
    async fn test_deleted_device_re_enrolls_with_fresh_code() {
        let (db, resolver) = resolver().await;

        let first = resolver.resolve(Some("DEV-1"), None).await.unwrap();
        db.devices().delete("DEV-1").await.unwrap();
        let second = resolver.resolve(Some("DEV-1"), None).await.unwrap();

        assert!(second.auto_enrolled);
        assert_ne!(first.terminal_id, second.terminal_id);
        assert_eq!(second.terminal_id, "STORE01-0002");
    }

    #[tokio::test]
    async fn test_concurrent_first_contact_enrolls_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("race.db")).max_connections(8))
            .await
            .unwrap();
        let resolver = Arc::new(RegistryResolver::new(
            &db,
            defaults(),
            TerminalCodeFormat::default(),
        ));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move {
                resolver.resolve(Some("RACE-DEVICE"), Some("STORE05")).await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        let enrolled = results.iter().filter(|c| c.auto_enrolled).count();
        assert_eq!(enrolled, 1);

        let stored = db.devices().find("RACE-DEVICE").await.unwrap().unwrap();
        assert!(results.iter().all(|c| c.terminal_id == stored.terminal_id));
        assert_eq!(db.devices().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_distinct_devices_get_distinct_codes() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("fleet.db")).max_connections(8))
            .await
            .unwrap();
        let resolver = Arc::new(RegistryResolver::new(
            &db,
            defaults(),
            TerminalCodeFormat::default(),
        ));

        let mut handles = Vec::new();
        for i in 0..20 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move {
                let device_id = format!("DEV-{i}");
                resolver.resolve(Some(device_id.as_str()), None).await
            }));
        }

        let mut codes = Vec::new();
        for handle in handles {
            codes.push(handle.await.unwrap().unwrap().terminal_id);
        }
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 20);
    }

    #[tokio::test]
    async fn test_allocator_shares_counter_with_enrollment() {
        let (_db, resolver) = resolver().await;

        let manual = resolver.allocator().next_code("STORE01").await.unwrap();
        assert_eq!(manual, "STORE01-0001");

        let enrolled = resolver.resolve(Some("DEV-1"), None).await.unwrap();
        assert_eq!(enrolled.terminal_id, "STORE01-0002");
    }

    #[tokio::test]
    async fn test_oversized_device_id_is_rejected_without_writes() {
        let (db, resolver) = resolver().await;

        let oversized = "A".repeat(MAX_DEVICE_ID_LEN + 1);
        let err = resolver.resolve(Some(oversized.as_str()), None).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidDevice(_)));
        assert!(!err.is_transient());

        assert_eq!(db.devices().count().await.unwrap(), 0);
        assert!(db.sequences().list().await.unwrap().is_empty());

        let longest = "b".repeat(MAX_DEVICE_ID_LEN);
        let config = resolver.resolve(Some(longest.as_str()), None).await.unwrap();
        assert!(config.auto_enrolled);
        assert_eq!(config.device_id, validate_device_id(&longest).ok());
    }

    #[tokio::test]
    async fn test_duplicate_insert_returns_existing_winner() {
        let (_db, resolver) = resolver().await;
        let winner = resolver.resolve(Some("DEV-1"), None).await.unwrap();

        let config = resolver
            .settle("DEV-1", Err(DbError::duplicate("device_id", "DEV-1")))
            .await
            .unwrap();
        assert_eq!(config.terminal_id, winner.terminal_id);
        assert!(!config.auto_enrolled);
    }

    #[tokio::test]
    async fn test_winner_deleted_before_reread_is_transient() {
        let (db, resolver) = resolver().await;
        resolver.resolve(Some("DEV-1"), None).await.unwrap();
        db.devices().delete("DEV-1").await.unwrap();

        let err = resolver
            .settle("DEV-1", Err(DbError::duplicate("device_id", "DEV-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::DeviceVanished(ref id) if id == "DEV-1"));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let (db, resolver) = resolver().await;
        db.close().await;

        let err = resolver.resolve(Some("DEV-1"), None).await.unwrap_err();
        assert!(matches!(err, ResolveError::Storage(_)));
        assert!(err.is_transient());
    }
}
