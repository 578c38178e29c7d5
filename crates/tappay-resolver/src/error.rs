//! # Resolver Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storage                          │  Race                               │
//! │  ───────                          │  ────                               │
//! │  Storage(DbError)                 │  DeviceVanished                     │
//! │  surfaced unchanged,              │  winner deleted before the          │
//! │  never retried here               │  loser could re-read it             │
//! │                                   │                                     │
//! │  Input                            │                                     │
//! │  ─────                            │                                     │
//! │  InvalidDevice                    │                                     │
//! │  id fails the registry's rules    │                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A duplicate-device error from the registry never appears here: the
//! registry resolver recovers it by re-reading the winner. A malformed
//! configuration never appears either; it degrades to the defaults.

use tappay_core::ValidationError;
use tappay_db::DbError;
use thiserror::Error;

/// Result type alias for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Sequence or registry storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// Another request enrolled the device and it was deleted before this
    /// request could read it back.
    #[error("Device {0} disappeared during enrollment")]
    DeviceVanished(String),

    /// The device id breaks the same rules an operator's upsert is held to.
    #[error("Invalid device: {0}")]
    InvalidDevice(#[from] ValidationError),
}

impl ResolveError {
    /// True when the failure is worth retrying from scratch.
    pub fn is_transient(&self) -> bool {
        match self {
            ResolveError::Storage(e) => e.is_transient(),
            ResolveError::DeviceVanished(_) => true,
            ResolveError::InvalidDevice(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_keep_classification() {
        let err: ResolveError = DbError::PoolExhausted.into();
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "Storage error: Connection pool exhausted");

        let err: ResolveError = DbError::not_found("device", "X").into();
        assert!(!err.is_transient());
    }

    #[test]
    fn test_invalid_device_is_permanent() {
        let err: ResolveError = ValidationError::required("deviceId").into();
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Invalid device: deviceId is required");
    }
}
