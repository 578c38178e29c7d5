//! # Terminal Bootstrap
//!
//! A terminal calls this on power-up to learn its terminal code, charge
//! parameters and the checkout URL to write onto its NFC tag.
//!
//! ```text
//! GET /api/v1/bootstrap?deviceId=AA:BB:CC&store=STORE02
//!   (or headers x-device-id / x-store-code)
//!
//! 200 {
//!   "deviceId": "AA:BB:CC", "storeCode": "STORE02",
//!   "terminalId": "STORE02-0007", "amount": 1500, "currency": "USD",
//!   "checkoutUrl": "https://pay.example.com/p/STORE02-0007",
//!   "autoEnrolled": true
//! }
//! ```

use axum::extract::{Query, State};
use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{header_value, require_api_key};
use crate::error::ApiResult;
use crate::routes::non_blank;
use crate::SharedState;

pub const DEVICE_ID_HEADER: &str = "x-device-id";
pub const STORE_CODE_HEADER: &str = "x-store-code";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapQuery {
    pub device_id: Option<String>,
    pub store: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    pub device_id: String,
    pub store_code: String,
    pub terminal_id: String,
    pub amount: i64,
    pub currency: String,
    pub checkout_url: String,
    pub auto_enrolled: bool,
}

pub async fn bootstrap(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<BootstrapQuery>,
) -> ApiResult<Json<BootstrapResponse>> {
    require_api_key(state.config.api_key.as_deref(), &headers)?;

    let device_id = non_blank(query.device_id.as_deref())
        .or_else(|| header_value(&headers, DEVICE_ID_HEADER));
    let store_hint = non_blank(query.store.as_deref())
        .or_else(|| header_value(&headers, STORE_CODE_HEADER));

    let config = state.resolver.resolve(device_id, store_hint).await?;

    let origin = public_origin(state.config.public_base_url.as_deref(), &headers, state.config.http_port);
    let checkout_url = format!("{}/p/{}", origin, config.terminal_id);

    info!(
        device_id = ?config.device_id,
        terminal_id = %config.terminal_id,
        auto_enrolled = config.auto_enrolled,
        "Terminal bootstrapped"
    );

    Ok(Json(BootstrapResponse {
        device_id: config.device_id.unwrap_or_default(),
        store_code: config.store_code,
        terminal_id: config.terminal_id,
        amount: config.amount,
        currency: config.currency,
        checkout_url,
        auto_enrolled: config.auto_enrolled,
    }))
}

/// The configured public origin, else the request's Host.
pub fn public_origin(configured: Option<&str>, headers: &HeaderMap, port: u16) -> String {
    if let Some(base) = configured {
        return base.trim_end_matches('/').to_string();
    }
    match header_value(headers, HOST.as_str()) {
        Some(host) => format!("http://{host}"),
        None => format!("http://localhost:{port}"),
    }
}
