//! # Session Repository
//!
//! Payment sessions opened by terminals and approved from the checkout page.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  terminal POST /sessions ──► create() ──► status = pending             │
//! │                                               │                         │
//! │  customer taps ──► latest_pending_for_terminal()                       │
//! │                                               │                         │
//! │  approve (sandbox) ──► mark_paid() ──► status = paid                   │
//! │                                               │                         │
//! │  terminal polls ──► get() ◄───────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use tappay_core::{Session, SessionStatus};

const SESSION_COLUMNS: &str = "id, terminal_id, amount, currency, status, created_at, updated_at";

/// Repository for payment session operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Opens a pending session.
    pub async fn create(&self, terminal_id: &str, amount: i64, currency: &str) -> DbResult<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            terminal_id: terminal_id.to_string(),
            amount,
            currency: currency.to_string(),
            status: SessionStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sessions (id, terminal_id, amount, currency, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&session.id)
        .bind(&session.terminal_id)
        .bind(session.amount)
        .bind(&session.currency)
        .bind(session.status.as_str())
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        info!(
            session_id = %session.id,
            terminal_id = %session.terminal_id,
            amount = session.amount,
            currency = %session.currency,
            "Session created"
        );
        Ok(session)
    }

    /// Gets a session by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Lists sessions, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions ORDER BY rowid DESC LIMIT ?1");
        let sessions = sqlx::query_as::<_, Session>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sessions)
    }

    /// The most recent pending session for a terminal, if any.
    pub async fn latest_pending_for_terminal(&self, terminal_id: &str) -> DbResult<Option<Session>> {
        let sql = format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE terminal_id = ?1 AND status = 'pending'
            ORDER BY rowid DESC
            LIMIT 1
            "#
        );
        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(terminal_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Marks a session paid. Returns `None` when the session doesn't exist.
    ///
    /// Paying an already paid session leaves it paid.
    pub async fn mark_paid(&self, id: &str) -> DbResult<Option<Session>> {
        let now = Utc::now();
        let sql = format!(
            r#"
            UPDATE sessions SET
                status = 'paid',
                updated_at = ?2
            WHERE id = ?1
            RETURNING {SESSION_COLUMNS}
            "#
        );

        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        debug!(session_id = %id, found = session.is_some(), "Mark paid");
        Ok(session)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
