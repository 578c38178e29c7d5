//! # Resolver Configuration
//!
//! Everything the resolvers read from the deployment environment.
//!
//! ## Keys
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RESOLVER_MODE        registry (default) | static                      │
//! │  TERMINAL_PREFIX      text between "<store>-" and the number           │
//! │  TERMINAL_PAD         zero-pad width 0..=32, default 4                 │
//! │  DEVICE_CONFIG_JSON   static mode device list                          │
//! │  DEFAULT_TERMINAL_ID  ┐                                                 │
//! │  DEFAULT_AMOUNT       │ ChargeDefaults (never fail, always degrade)    │
//! │  DEFAULT_CURRENCY     │                                                 │
//! │  DEFAULT_STORE_CODE   ┘                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here fails: an unknown mode is logged and treated as `registry`.

use tappay_core::defaults::KEY_DEFAULT_CURRENCY;
use tappay_core::validation::validate_currency;
use tappay_core::{ChargeDefaults, TerminalCodeFormat, MAX_TERMINAL_PAD};
use tracing::warn;

pub const KEY_RESOLVER_MODE: &str = "RESOLVER_MODE";
pub const KEY_TERMINAL_PREFIX: &str = "TERMINAL_PREFIX";
pub const KEY_TERMINAL_PAD: &str = "TERMINAL_PAD";
pub const KEY_DEVICE_CONFIG_JSON: &str = "DEVICE_CONFIG_JSON";

// =============================================================================
// Resolver Mode
// =============================================================================

/// Which resolution strategy this deployment runs.
///
/// ## Mode Selection
/// ```text
/// REGISTRY (default)
///   • Devices live in the database
///   • Unknown devices are auto-enrolled with the next terminal code
///   • A miss without a store hint enrolls under DEFAULT_STORE_CODE
///
/// STATIC
///   • Devices come from DEVICE_CONFIG_JSON
///   • Unknown devices get the defaults; nothing is written
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverMode {
    #[default]
    Registry,
    Static,
}

impl std::fmt::Display for ResolverMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverMode::Registry => write!(f, "registry"),
            ResolverMode::Static => write!(f, "static"),
        }
    }
}

impl std::str::FromStr for ResolverMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "registry" | "database" | "db" => Ok(ResolverMode::Registry),
            "static" | "fixed" | "env" => Ok(ResolverMode::Static),
            other => Err(format!(
                "Unknown resolver mode: '{}'. Valid options: registry, static",
                other
            )),
        }
    }
}

// =============================================================================
// Resolver Settings
// =============================================================================

/// Resolver configuration loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub mode: ResolverMode,
    pub defaults: ChargeDefaults,
    pub terminal_format: TerminalCodeFormat,
    /// Raw `DEVICE_CONFIG_JSON`; parsed by the static resolver.
    pub static_devices: Option<String>,
}

impl ResolverSettings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup(KEY_RESOLVER_MODE).filter(|m| !m.trim().is_empty()) {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                warn!(error = %e, "Falling back to registry mode");
                ResolverMode::Registry
            }),
            None => ResolverMode::default(),
        };

        let prefix = lookup(KEY_TERMINAL_PREFIX);
        let pad = lookup(KEY_TERMINAL_PAD);
        let terminal_format = TerminalCodeFormat::from_raw(prefix.as_deref(), pad.as_deref());
        if let Some(raw) = pad.as_deref() {
            if raw.trim().parse::<i64>().is_ok_and(|p| p > MAX_TERMINAL_PAD as i64) {
                warn!(pad = %raw.trim(), max = MAX_TERMINAL_PAD, "TERMINAL_PAD clamped");
            }
        }

        let defaults = ChargeDefaults::from_lookup(&lookup);
        if let Some(raw) = lookup(KEY_DEFAULT_CURRENCY).filter(|c| !c.trim().is_empty()) {
            if let Err(e) = validate_currency(&raw) {
                warn!(error = %e, fallback = %defaults.currency, "Ignoring DEFAULT_CURRENCY");
            }
        }

        ResolverSettings {
            mode,
            defaults,
            terminal_format,
            static_devices: lookup(KEY_DEVICE_CONFIG_JSON),
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        ResolverSettings {
            mode: ResolverMode::default(),
            defaults: ChargeDefaults::default(),
            terminal_format: TerminalCodeFormat::default(),
            static_devices: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
