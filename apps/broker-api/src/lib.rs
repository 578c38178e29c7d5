//! # TapPay Broker API
//!
//! HTTP server that hands terminals their configuration, records payment
//! sessions and serves the checkout and operator surfaces.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Broker API Surfaces                             │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Terminal API  │  │  Checkout      │  │  Admin                     ││
//! │  │  (x-api-key)   │  │  (public)      │  │  (admin_auth cookie)       ││
//! │  │                │  │                │  │                            ││
//! │  │ • bootstrap    │  │ • checkout     │  │ • login / logout           ││
//! │  │ • sessions     │  │ • sandbox pay  │  │ • sessions, mark-paid      ││
//! │  │ • session poll │  │                │  │ • devices upsert/delete    ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  AppState: Database + dyn DeviceResolver + TerminalAllocator     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - listen port (default: 3000)
//! - `DATABASE_PATH` - SQLite file (default: ./data/tappay.db)
//! - `API_KEY` - terminal shared secret
//! - `ADMIN_KEY` - operator login key
//! - `PUBLIC_BASE_URL` - origin for checkout links
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `RESOLVER_MODE`, `TERMINAL_PREFIX`, `TERMINAL_PAD`, `DEVICE_CONFIG_JSON`,
//!   `DEFAULT_*` - see `tappay_resolver::ResolverSettings`

use std::sync::Arc;

use tappay_db::Database;
use tappay_resolver::{build_resolver, DeviceResolver, ResolverSettings, TerminalAllocator};

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

// Re-exports
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use routes::router;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub resolver: Arc<dyn DeviceResolver>,
    /// Terminal codes for operator-created devices; shares the enrollment counter.
    pub allocator: TerminalAllocator,
    pub config: ServerConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Database, settings: &ResolverSettings, config: ServerConfig) -> Self {
        AppState {
            resolver: build_resolver(settings, &db),
            allocator: TerminalAllocator::new(db.sequences(), settings.terminal_format.clone()),
            db,
            config,
        }
    }
}
