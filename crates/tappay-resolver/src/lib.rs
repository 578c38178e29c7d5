//! # tappay-resolver: Device Resolution
//!
//! Maps a device identifier (plus an optional store hint) to the terminal
//! code and charge parameters that device should use.
//!
//! ## Module Structure
//! ```text
//! tappay_resolver/
//! ├── config.rs    ← ResolverSettings, ResolverMode
//! ├── error.rs     ← ResolveError
//! ├── registry.rs  ← RegistryResolver, TerminalAllocator
//! └── fixed.rs     ← StaticTableResolver
//! ```
//!
//! ## Guarantees
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  • One resolver per deployment, chosen at startup                      │
//! │  • No device id → ChargeDefaults, no storage touched                   │
//! │  • A device gets one terminal code, however many requests race         │
//! │  • Two enrolled devices never share a terminal code                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use tappay_core::validation::validate_device_id;
use tappay_core::{ChargeDefaults, ResolvedConfig};
use tappay_db::Database;

pub mod config;
pub mod error;
pub mod fixed;
pub mod registry;

pub use config::{ResolverMode, ResolverSettings};
pub use error::{ResolveError, ResolveResult};
pub use fixed::StaticTableResolver;
pub use registry::{RegistryResolver, TerminalAllocator};

/// Answers "what config should this device use?".
#[async_trait]
pub trait DeviceResolver: Send + Sync {
    /// Resolves the config for `device_id`.
    ///
    /// `store_hint` only matters when the registry enrolls a new device.
    async fn resolve(
        &self,
        device_id: Option<&str>,
        store_hint: Option<&str>,
    ) -> ResolveResult<ResolvedConfig>;

    /// Deployment-wide fallback values.
    fn defaults(&self) -> &ChargeDefaults;

    fn mode(&self) -> ResolverMode;
}

/// Canonical device id for a resolve call.
///
/// Absent or blank means "no device". Anything else must pass the same
/// check as an operator's upsert, so every enrolled device stays editable.
pub(crate) fn requested_device(device_id: Option<&str>) -> ResolveResult<Option<String>> {
    match device_id.filter(|id| !id.trim().is_empty()) {
        Some(raw) => Ok(Some(validate_device_id(raw)?)),
        None => Ok(None),
    }
}

/// Builds the resolver selected by `settings.mode`.
pub fn build_resolver(settings: &ResolverSettings, db: &Database) -> Arc<dyn DeviceResolver> {
    info!(mode = %settings.mode, "Building device resolver");

    match settings.mode {
        ResolverMode::Registry => Arc::new(RegistryResolver::new(
            db,
            settings.defaults.clone(),
            settings.terminal_format.clone(),
        )),
        ResolverMode::Static => Arc::new(StaticTableResolver::from_raw(
            settings.static_devices.as_deref(),
            settings.defaults.clone(),
        )),
    }
}
