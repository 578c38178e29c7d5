//! # Terminal Codes
//!
//! Formatting of the human-readable terminal codes that appear in checkout
//! URLs (`/p/STORE01-0007`).
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  store   "-"  prefix  zero-padded sequence                              │
//! │  ─────── ───  ──────  ────────────────────                              │
//! │  STORE01  -           0007            store present                     │
//! │               TERM    0042            store absent or blank             │
//! │  S        -           123456          wider than pad: never truncated   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store code is only decoration. Uniqueness comes from the per-store
//! sequence allocation, not from the string.

use crate::{DEFAULT_TERMINAL_PAD, MAX_TERMINAL_PAD};

/// Renders a terminal code from a store code and sequence number.
///
/// A negative `pad_width` is treated as 0 and anything above
/// [`MAX_TERMINAL_PAD`] is clamped to it.
///
/// ## Example
/// ```rust
/// use tappay_core::terminal::format_terminal_code;
///
/// assert_eq!(format_terminal_code(Some("S"), 123456, "", 4), "S-123456");
/// assert_eq!(format_terminal_code(Some("  "), 3, "T", -2), "T3");
/// ```
pub fn format_terminal_code(
    store_code: Option<&str>,
    sequence: i64,
    prefix: &str,
    pad_width: i64,
) -> String {
    let width = usize::try_from(pad_width)
        .unwrap_or(0)
        .min(MAX_TERMINAL_PAD);
    let number = format!("{:0width$}", sequence, width = width);

    match store_code.map(str::trim).filter(|s| !s.is_empty()) {
        Some(store) => format!("{}-{}{}", store, prefix, number),
        None => format!("{}{}", prefix, number),
    }
}

/// Deployment-configured terminal code shape (`TERMINAL_PREFIX`, `TERMINAL_PAD`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalCodeFormat {
    pub prefix: String,
    pub pad_width: usize,
}

impl TerminalCodeFormat {
    pub fn new(prefix: impl Into<String>, pad_width: usize) -> Self {
        TerminalCodeFormat {
            prefix: prefix.into(),
            pad_width,
        }
    }

    /// Reads the raw configuration values.
    ///
    /// Missing or non-numeric pad falls back to 4; negative pad becomes 0 and
    /// an oversized pad is clamped to [`MAX_TERMINAL_PAD`].
    pub fn from_raw(prefix: Option<&str>, pad: Option<&str>) -> Self {
        let pad_width = pad
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| usize::try_from(p).unwrap_or(0).min(MAX_TERMINAL_PAD))
            .unwrap_or(DEFAULT_TERMINAL_PAD);

        TerminalCodeFormat {
            prefix: prefix.unwrap_or_default().to_string(),
            pad_width,
        }
    }

    /// Formats a sequence number for a store.
    pub fn format(&self, store_code: Option<&str>, sequence: i64) -> String {
        let width = i64::try_from(self.pad_width).unwrap_or(i64::MAX);
        format_terminal_code(store_code, sequence, &self.prefix, width)
    }
}

impl Default for TerminalCodeFormat {
    fn default() -> Self {
        TerminalCodeFormat::new("", DEFAULT_TERMINAL_PAD)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
