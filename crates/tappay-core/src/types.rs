//! # Domain Types
//!
//! Core domain types used throughout the broker.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DeviceRecord   │   │ SequenceCounter │   │    Session      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  device_id (PK) │   │  store_code(PK) │   │  id (UUID)      │       │
//! │  │  store_code ────┼──►│  last_value     │   │  terminal_id    │       │
//! │  │  terminal_id    │   └─────────────────┘   │  amount         │       │
//! │  │  amount         │                         │  status         │       │
//! │  │  currency       │   ┌─────────────────┐   └─────────────────┘       │
//! │  │  status         │   │ ResolvedConfig  │                             │
//! │  └─────────────────┘   │ (ephemeral)     │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are integers in minor currency units (cents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Device Record
// =============================================================================

/// A physical terminal device and the terminal code assigned to it.
///
/// `device_id` is stored normalized (see [`crate::validation::normalize_device_id`]),
/// so two records can never differ only by letter case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeviceRecord {
    /// Normalized device identifier (e.g. a hex MAC).
    pub device_id: String,

    /// Store the device belongs to.
    pub store_code: String,

    /// Terminal code used in checkout URLs.
    pub terminal_id: String,

    /// Default charge amount in minor units.
    pub amount: i64,

    /// Default currency code.
    pub currency: String,

    /// Lifecycle status: `new` on enrollment, operator-defined afterwards.
    pub status: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sequence Counter
// =============================================================================

/// Last terminal sequence number issued for a store.
///
/// The empty store code is a valid key meaning "no store".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SequenceCounter {
    pub store_code: String,
    pub last_value: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Resolved Config
// =============================================================================

/// The configuration a device should use, produced per resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResolvedConfig {
    /// Device this config was resolved for, if any.
    pub device_id: Option<String>,

    pub store_code: String,
    pub terminal_id: String,
    pub amount: i64,
    pub currency: String,

    /// True only for the call that created the device record.
    pub auto_enrolled: bool,
}

impl ResolvedConfig {
    /// Builds the config for an existing device record.
    pub fn from_record(record: &DeviceRecord, auto_enrolled: bool) -> Self {
        ResolvedConfig {
            device_id: Some(record.device_id.clone()),
            store_code: record.store_code.clone(),
            terminal_id: record.terminal_id.clone(),
            amount: record.amount,
            currency: record.currency.clone(),
            auto_enrolled,
        }
    }
}

// =============================================================================
// Session Status
// =============================================================================

/// The status of a payment session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SessionStatus {
    /// Waiting for the customer to approve.
    #[default]
    Pending,
    /// Approved in the sandbox.
    Paid,
}

impl SessionStatus {
    /// Returns the stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Session
// =============================================================================

/// A payment session opened by a terminal and polled until paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub terminal_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: SessionStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Checks if the session has been paid.
    #[inline]
    pub fn is_paid(&self) -> bool {
        self.status == SessionStatus::Paid
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
