//! # Terminal Sequence Repository
//!
//! Per-store counters behind terminal code allocation.
//!
//! ## Atomic Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 ONE STATEMENT, ONE WRITE LOCK                           │
//! │                                                                         │
//! │  INSERT INTO terminal_sequences (store_code, last_value, ...)          │
//! │  VALUES (?1, 1, ...)                         ← first sight: row = 1    │
//! │  ON CONFLICT (store_code) DO UPDATE                                    │
//! │      SET last_value = last_value + 1         ← otherwise increment     │
//! │  RETURNING last_value                        ← read what WE wrote      │
//! │                                                                         │
//! │  Caller A ──┐                                                           │
//! │             ├──► SQLite write lock ──► A gets 7, then B gets 8         │
//! │  Caller B ──┘    (busy timeout queues B)                                │
//! │                                                                         │
//! │  There is no SELECT-then-UPDATE anywhere: a read followed by a write   │
//! │  would let two callers observe the same value.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A number handed to a caller that later fails is simply never used; gaps
//! are acceptable, duplicates are not.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tappay_core::SequenceCounter;

/// Repository for terminal sequence counters.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    /// Creates a new SequenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// Issues the next sequence number for a store.
    ///
    /// The first call for an unseen store code returns 1. The empty string
    /// is a valid store code.
    ///
    /// ## Errors
    /// Storage failures propagate; no number is ever invented.
    pub async fn allocate(&self, store_code: &str) -> DbResult<i64> {
        let now = Utc::now();

        let next: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO terminal_sequences (store_code, last_value, updated_at)
            VALUES (?1, 1, ?2)
            ON CONFLICT (store_code) DO UPDATE SET
                last_value = terminal_sequences.last_value + 1,
                updated_at = excluded.updated_at
            RETURNING last_value
            "#,
        )
        .bind(store_code)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(store_code = %store_code, sequence = next, "Allocated terminal sequence");
        Ok(next)
    }

    /// Returns the last issued number for a store without touching it.
    pub async fn current(&self, store_code: &str) -> DbResult<Option<i64>> {
        let last: Option<i64> =
            sqlx::query_scalar("SELECT last_value FROM terminal_sequences WHERE store_code = ?1")
                .bind(store_code)
                .fetch_optional(&self.pool)
                .await?;

        Ok(last)
    }

    /// Lists every counter, ordered by store code.
    pub async fn list(&self) -> DbResult<Vec<SequenceCounter>> {
        let counters = sqlx::query_as::<_, SequenceCounter>(
            r#"
            SELECT store_code, last_value, updated_at
            FROM terminal_sequences
            ORDER BY store_code ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counters)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_first_allocation_is_one_then_increments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sequences();

        assert_eq!(repo.current("STORE01").await.unwrap(), None);
        assert_eq!(repo.allocate("STORE01").await.unwrap(), 1);
        assert_eq!(repo.allocate("STORE01").await.unwrap(), 2);
        assert_eq!(repo.allocate("STORE01").await.unwrap(), 3);
        assert_eq!(repo.current("STORE01").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_stores_are_independent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sequences();

        assert_eq!(repo.allocate("STORE01").await.unwrap(), 1);
        assert_eq!(repo.allocate("STORE02").await.unwrap(), 1);
        assert_eq!(repo.allocate("STORE01").await.unwrap(), 2);

        let counters = repo.list().await.unwrap();
        let pairs: Vec<(String, i64)> = counters
            .into_iter()
            .map(|c| (c.store_code, c.last_value))
            .collect();
        assert_eq!(
            pairs,
            vec![("STORE01".to_string(), 2), ("STORE02".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_empty_store_code_is_a_key() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sequences();

        assert_eq!(repo.allocate("").await.unwrap(), 1);
        assert_eq!(repo.allocate("").await.unwrap(), 2);
        assert_eq!(repo.current("").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_concurrent_allocations_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("seq.db")).max_connections(8))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..64 {
            let repo = db.sequences();
            handles.push(tokio::spawn(async move { repo.allocate("STORE01").await }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            let n = handle.await.unwrap().unwrap();
            assert!(seen.insert(n), "sequence {} issued twice", n);
        }

        let expected: HashSet<i64> = (1..=64).collect();
        assert_eq!(seen, expected);
        assert_eq!(db.sequences().current("STORE01").await.unwrap(), Some(64));
    }

    #[tokio::test]
    async fn test_closed_pool_fails_instead_of_fabricating() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sequences();
        db.close().await;

        let err = repo.allocate("STORE01").await.unwrap_err();
        assert!(err.is_transient());
    }
}
