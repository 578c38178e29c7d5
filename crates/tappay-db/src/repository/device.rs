//! # Device Repository
//!
//! The device registry: physical device identifier → terminal code, store and
//! default charge parameters.
//!
//! ## Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create()  ── plain INSERT ──► PRIMARY KEY violation? ──► UniqueViolation│
//! │               (auto-enrollment; first writer wins, the loser re-reads) │
//! │                                                                         │
//! │  upsert()  ── INSERT ... ON CONFLICT DO UPDATE ──► always succeeds     │
//! │               (operator override; may replace the terminal code)       │
//! │                                                                         │
//! │  delete()  ── DELETE ──► absent row is fine                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entry point normalizes the identifier before it reaches SQL, so a
//! lower-case lookup finds an upper-case enrollment and vice versa.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tappay_core::validation::normalize_device_id;
use tappay_core::{DeviceRecord, DEVICE_STATUS_NEW};

const DEVICE_COLUMNS: &str =
    "device_id, store_code, terminal_id, amount, currency, status, created_at, updated_at";

/// Fields for creating or overwriting a device record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub device_id: String,
    pub store_code: String,
    pub terminal_id: String,
    pub amount: i64,
    pub currency: String,
    /// `None` means `new` on insert and "keep current" on upsert.
    pub status: Option<String>,
}

/// Repository for device registry operations.
#[derive(Debug, Clone)]
pub struct DeviceRepository {
    pool: SqlitePool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DeviceRepository { pool }
    }

    /// Looks up a device by identifier (case-insensitive).
    pub async fn find(&self, device_id: &str) -> DbResult<Option<DeviceRecord>> {
        let Some(device_id) = normalize_device_id(device_id) else {
            return Ok(None);
        };

        let sql = format!("SELECT {DEVICE_COLUMNS} FROM devices WHERE device_id = ?1");
        let record = sqlx::query_as::<_, DeviceRecord>(&sql)
            .bind(&device_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Creates a device record.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` if the identifier is already registered.
    ///   The existing row is never modified.
    pub async fn create(&self, device: NewDevice) -> DbResult<DeviceRecord> {
        let device_id = require_device_id(&device.device_id)?;
        let now = Utc::now();

        let record = DeviceRecord {
            device_id,
            store_code: device.store_code,
            terminal_id: device.terminal_id,
            amount: device.amount,
            currency: device.currency,
            status: device
                .status
                .unwrap_or_else(|| DEVICE_STATUS_NEW.to_string()),
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO devices (
                device_id, store_code, terminal_id, amount, currency,
                status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.device_id)
        .bind(&record.store_code)
        .bind(&record.terminal_id)
        .bind(record.amount)
        .bind(&record.currency)
        .bind(&record.status)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(
                    device_id = %record.device_id,
                    terminal_id = %record.terminal_id,
                    store_code = %record.store_code,
                    "Device registered"
                );
                Ok(record)
            }
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { .. } => {
                    debug!(device_id = %record.device_id, "Device already registered");
                    Err(DbError::duplicate("device_id", record.device_id))
                }
                other => Err(other),
            },
        }
    }

    /// Creates or overwrites a device record (operator path).
    ///
    /// All given fields replace the stored ones, including the terminal code.
    /// The creation timestamp of an existing record is preserved.
    pub async fn upsert(&self, device: NewDevice) -> DbResult<DeviceRecord> {
        let device_id = require_device_id(&device.device_id)?;
        let now = Utc::now();

        let sql = format!(
            r#"
            INSERT INTO devices (
                device_id, store_code, terminal_id, amount, currency,
                status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, '{DEVICE_STATUS_NEW}'), ?7, ?7)
            ON CONFLICT (device_id) DO UPDATE SET
                store_code = excluded.store_code,
                terminal_id = excluded.terminal_id,
                amount = excluded.amount,
                currency = excluded.currency,
                status = COALESCE(?6, devices.status),
                updated_at = excluded.updated_at
            RETURNING {DEVICE_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<_, DeviceRecord>(&sql)
            .bind(&device_id)
            .bind(&device.store_code)
            .bind(&device.terminal_id)
            .bind(device.amount)
            .bind(&device.currency)
            .bind(device.status.as_deref())
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        info!(
            device_id = %record.device_id,
            terminal_id = %record.terminal_id,
            "Device upserted"
        );
        Ok(record)
    }

    /// Deletes a device record.
    ///
    /// Returns whether a row was removed; deleting an unknown device is not
    /// an error.
    pub async fn delete(&self, device_id: &str) -> DbResult<bool> {
        let Some(device_id) = normalize_device_id(device_id) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM devices WHERE device_id = ?1")
            .bind(&device_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        debug!(device_id = %device_id, deleted, "Device delete");
        Ok(deleted)
    }

    /// Lists devices, most recently registered first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<DeviceRecord>> {
        // rowid follows insertion order; upserts keep the original rowid
        let sql = format!("SELECT {DEVICE_COLUMNS} FROM devices ORDER BY rowid DESC LIMIT ?1");
        let records = sqlx::query_as::<_, DeviceRecord>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Counts registered devices.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM devices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn require_device_id(raw: &str) -> DbResult<String> {
    normalize_device_id(raw).ok_or_else(|| DbError::InvalidInput {
        field: "device_id".to_string(),
        reason: "must not be blank".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn new_device(id: &str, terminal: &str) -> NewDevice {
        NewDevice {
            device_id: id.to_string(),
            store_code: "STORE01".to_string(),
            terminal_id: terminal.to_string(),
            amount: 500,
            currency: "USD".to_string(),
            status: None,
        }
    }

    async fn repo() -> DeviceRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().devices()
    }

    #[tokio::test]
    async fn test_create_then_find_any_case() {
        let repo = repo().await;

        let created = repo.create(new_device("aa:bb:cc", "STORE01-0001")).await.unwrap();
        assert_eq!(created.device_id, "AA:BB:CC");
        assert_eq!(created.status, "new");

        let found = repo.find("AA:bb:CC").await.unwrap().unwrap();
        assert_eq!(found.terminal_id, "STORE01-0001");
        assert_eq!(found.amount, 500);

        assert!(repo.find("dd:ee:ff").await.unwrap().is_none());
        assert!(repo.find("  ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create_keeps_first_writer() {
        let repo = repo().await;

        repo.create(new_device("AA:BB:CC", "STORE01-0001")).await.unwrap();
        let err = repo
            .create(new_device("aa:bb:cc", "STORE01-0002"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        let found = repo.find("AA:BB:CC").await.unwrap().unwrap();
        assert_eq!(found.terminal_id, "STORE01-0001");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_blank_device_id_is_rejected() {
        let repo = repo().await;
        let err = repo.create(new_device("   ", "X")).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_upsert_creates_then_overwrites_terminal() {
        let repo = repo().await;

        let created = repo.upsert(new_device("AA:BB:CC", "STORE01-0001")).await.unwrap();
        assert_eq!(created.status, "new");

        let mut update = new_device("aa:bb:cc", "MANUAL-9");
        update.amount = 900;
        update.currency = "EUR".to_string();
        update.status = Some("active".to_string());
        let updated = repo.upsert(update).await.unwrap();

        assert_eq!(updated.device_id, "AA:BB:CC");
        assert_eq!(updated.terminal_id, "MANUAL-9");
        assert_eq!(updated.amount, 900);
        assert_eq!(updated.currency, "EUR");
        assert_eq!(updated.status, "active");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_without_status_keeps_current() {
        let repo = repo().await;

        let mut first = new_device("AA:BB:CC", "T1");
        first.status = Some("disabled".to_string());
        repo.upsert(first).await.unwrap();

        let again = repo.upsert(new_device("AA:BB:CC", "T2")).await.unwrap();
        assert_eq!(again.status, "disabled");
        assert_eq!(again.terminal_id, "T2");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = repo().await;

        repo.create(new_device("AA:BB:CC", "T1")).await.unwrap();
        assert!(repo.delete("aa:bb:cc").await.unwrap());
        assert!(!repo.delete("AA:BB:CC").await.unwrap());
        assert!(!repo.delete("never-seen").await.unwrap());
        assert!(repo.find("AA:BB:CC").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = repo().await;

        repo.create(new_device("D1", "T1")).await.unwrap();
        repo.create(new_device("D2", "T2")).await.unwrap();
        repo.create(new_device("D3", "T3")).await.unwrap();

        let ids: Vec<String> = repo
            .list(2)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.device_id)
            .collect();
        assert_eq!(ids, vec!["D3".to_string(), "D2".to_string()]);
    }
}
