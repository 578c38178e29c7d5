//! # tappay-core: Pure Terminal Identity Logic
//!
//! This crate holds everything about terminal identity that can be decided
//! without touching storage: how terminal codes are spelled, how device
//! identifiers are compared, what the fallback charge parameters are, and how
//! a statically configured device table is read.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TapPay Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 ESP32 terminal / checkout page                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (JSON)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    broker-api (axum)                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tappay-resolver                              │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────┐   ┌───────────────▼───────────────┐   │
//! │  │ ★ tappay-core (THIS) ★      │   │  tappay-db (SQLite)           │   │
//! │  │  terminal codes, defaults,  │   │  sequences, devices, sessions │   │
//! │  │  device ids, static table   │   │                               │   │
//! │  └─────────────────────────────┘   └───────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (DeviceRecord, Session, ResolvedConfig, ...)
//! - [`terminal`] - Terminal code formatting
//! - [`defaults`] - Fallback charge parameters
//! - [`static_table`] - Fixed device → config table
//! - [`validation`] - Identifier normalization and input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tappay_core::terminal::format_terminal_code;
//!
//! assert_eq!(format_terminal_code(Some("STORE01"), 7, "", 4), "STORE01-0007");
//! assert_eq!(format_terminal_code(None, 42, "TERM", 4), "TERM0042");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod defaults;
pub mod error;
pub mod static_table;
pub mod terminal;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use defaults::ChargeDefaults;
pub use error::{CoreError, CoreResult, ValidationError};
pub use static_table::{StaticDeviceEntry, StaticDeviceTable};
pub use terminal::TerminalCodeFormat;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Status given to a device record created by auto-enrollment.
pub const DEVICE_STATUS_NEW: &str = "new";

/// Currency used when configuration leaves it empty.
pub const FALLBACK_CURRENCY: &str = "USD";

/// Store code used when configuration leaves it empty.
pub const FALLBACK_STORE_CODE: &str = "STORE01";

/// Zero-pad width used when `TERMINAL_PAD` is missing or not a number.
pub const DEFAULT_TERMINAL_PAD: usize = 4;

/// Widest zero-padding a terminal code will ever get.
pub const MAX_TERMINAL_PAD: usize = 32;
