//! # Request Authentication
//!
//! ## Credentials
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Terminals   x-api-key header   compared with API_KEY                  │
//! │              unset API_KEY matches only an empty header                │
//! │              session polling additionally needs API_KEY to be set      │
//! │                                                                         │
//! │  Operators   admin_auth=1 cookie, issued by /api/admin/login           │
//! │              when the posted key equals ADMIN_KEY (unset = no login)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const ADMIN_COOKIE: &str = "admin_auth";

/// Admin session lifetime: 8 hours.
pub const ADMIN_COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 8;

/// Trimmed header value, `None` when absent, blank or not UTF-8.
pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Checks `x-api-key` against the configured key.
pub fn require_api_key(expected: Option<&str>, headers: &HeaderMap) -> ApiResult<()> {
    let given = header_value(headers, API_KEY_HEADER).unwrap_or_default();
    if given == expected.unwrap_or_default() {
        Ok(())
    } else {
        debug!("Rejected request with bad API key");
        Err(ApiError::Unauthorized)
    }
}

/// Like [`require_api_key`], but an unconfigured key rejects everything.
pub fn require_configured_api_key(expected: Option<&str>, headers: &HeaderMap) -> ApiResult<()> {
    if expected.is_none() {
        return Err(ApiError::Unauthorized);
    }
    require_api_key(expected, headers)
}

/// Reads one cookie from the `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Requires the operator cookie.
pub fn require_admin(headers: &HeaderMap) -> ApiResult<()> {
    match cookie_value(headers, ADMIN_COOKIE) {
        Some("1") => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

/// True when `given` matches a configured admin key.
pub fn admin_key_matches(expected: Option<&str>, given: &str) -> bool {
    matches!(expected, Some(key) if key == given)
}

/// `Set-Cookie` value for the operator session. `None` clears it.
pub fn admin_cookie(value: Option<&str>) -> String {
    let (value, max_age) = match value {
        Some(v) => (v, ADMIN_COOKIE_MAX_AGE_SECS),
        None => ("", 0),
    };
    format!("{ADMIN_COOKIE}={value}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={max_age}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_api_key() {
        let h = headers(&[("x-api-key", "secret")]);
        assert!(require_api_key(Some("secret"), &h).is_ok());
        assert!(require_api_key(Some("other"), &h).is_err());
        assert!(require_api_key(None, &h).is_err());

        let empty = HeaderMap::new();
        assert!(require_api_key(None, &empty).is_ok());
        assert!(require_configured_api_key(None, &empty).is_err());
    }

    #[test]
    fn test_admin_cookie_parsing() {
        let h = headers(&[("cookie", "theme=dark; admin_auth=1")]);
        assert_eq!(cookie_value(&h, "theme"), Some("dark"));
        assert!(require_admin(&h).is_ok());

        let h = headers(&[("cookie", "admin_auth=0")]);
        assert!(require_admin(&h).is_err());
        assert!(require_admin(&HeaderMap::new()).is_err());
    }

    #[test]
    fn test_admin_key_requires_configuration() {
        assert!(admin_key_matches(Some("k"), "k"));
        assert!(!admin_key_matches(Some("k"), ""));
        assert!(!admin_key_matches(None, ""));
    }

    #[test]
    fn test_cookie_attributes() {
        let set = admin_cookie(Some("1"));
        assert!(set.starts_with("admin_auth=1;"));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("Max-Age=28800"));
        assert!(admin_cookie(None).contains("Max-Age=0"));
    }
}
