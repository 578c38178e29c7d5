//! # tappay-db: Database Layer for the TapPay Broker
//!
//! SQLite storage for terminal sequences, the device registry and payment
//! sessions, accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TapPay Data Flow                                 │
//! │                                                                         │
//! │  RegistryResolver / HTTP handler                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tappay-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │    Repositories    │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ SequenceRepository │  │ (embedded) │  │   │
//! │  │   │               │    │ DeviceRepository   │  │            │  │   │
//! │  │   │  SqlitePool   │    │ SessionRepository  │  │ 001_init   │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Sequence, device and session repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tappay_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/tappay.db")).await?;
//! let next = db.sequences().allocate("STORE01").await?;
//! let device = db.devices().find("AA:BB:CC").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::device::{DeviceRepository, NewDevice};
pub use repository::sequence::SequenceRepository;
pub use repository::session::SessionRepository;
