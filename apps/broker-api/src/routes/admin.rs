//! # Operator Endpoints
//!
//! Everything under `/api/admin` except login/logout requires the
//! `admin_auth=1` cookie.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use tappay_core::validation::{amount_from_json, validate_amount, validate_currency, validate_device_id};
use tappay_core::{DeviceRecord, SequenceCounter, Session, ValidationError, FALLBACK_CURRENCY};
use tappay_db::NewDevice;

use crate::auth::{admin_cookie, admin_key_matches, require_admin};
use crate::error::{ApiError, ApiResult};
use crate::routes::{json_body, non_blank, LIST_LIMIT};
use crate::SharedState;

/// Terminal code for sessions an operator opens without naming one.
pub const ADMIN_TEST_TERMINAL: &str = "ADMIN_TEST";

// =============================================================================
// Bodies
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionBody {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub terminal_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRef {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpsertBody {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub store_code: Option<String>,
    /// Blank allocates the store's next terminal code.
    #[serde(default)]
    pub terminal_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRef {
    #[serde(default)]
    pub device_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicesView {
    pub devices: Vec<DeviceRecord>,
    pub sequences: Vec<SequenceCounter>,
}

/// Absent amount means zero; present but unreadable is an error.
fn parse_amount(raw: Option<&Value>) -> ApiResult<i64> {
    let amount = match raw {
        None | Some(Value::Null) => 0,
        Some(value) => amount_from_json(value).ok_or_else(|| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "not a number".to_string(),
        })?,
    };
    validate_amount(amount)?;
    Ok(amount)
}

fn currency_or_default(raw: Option<&str>) -> ApiResult<String> {
    Ok(validate_currency(non_blank(raw).unwrap_or(FALLBACK_CURRENCY))?)
}

// =============================================================================
// Login
// =============================================================================

pub async fn login(
    State(state): State<SharedState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let body = json_body(body)?;

    if !admin_key_matches(state.config.admin_key.as_deref(), &body.key) {
        warn!("Admin login rejected");
        return Err(ApiError::Unauthorized);
    }

    info!("Admin logged in");
    Ok((
        [(SET_COOKIE, admin_cookie(Some("1")))],
        Json(json!({ "ok": true })),
    ))
}

pub async fn logout() -> impl IntoResponse {
    ([(SET_COOKIE, admin_cookie(None))], Json(json!({ "ok": true })))
}

// =============================================================================
// Sessions
// =============================================================================

pub async fn list_sessions(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Session>>> {
    require_admin(&headers)?;
    Ok(Json(state.db.sessions().list(LIST_LIMIT).await?))
}

pub async fn create_session(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<AdminSessionBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    require_admin(&headers)?;
    let body = json_body(body)?;

    let amount = parse_amount(body.amount.as_ref())?;
    let currency = currency_or_default(body.currency.as_deref())?;
    let terminal_id = non_blank(body.terminal_id.as_deref()).unwrap_or(ADMIN_TEST_TERMINAL);

    let session = state.db.sessions().create(terminal_id, amount, &currency).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn mark_paid(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<SessionRef>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    require_admin(&headers)?;
    let body = json_body(body)?;

    let session_id = non_blank(body.session_id.as_deref())
        .ok_or_else(|| ApiError::from(ValidationError::required("sessionId")))?;

    let session = state
        .db
        .sessions()
        .mark_paid(session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    info!(session_id = %session.id, "Session marked paid by operator");
    Ok(Json(session))
}

// =============================================================================
// Devices
// =============================================================================

pub async fn list_devices(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<DevicesView>> {
    require_admin(&headers)?;

    Ok(Json(DevicesView {
        devices: state.db.devices().list(LIST_LIMIT).await?,
        sequences: state.db.sequences().list().await?,
    }))
}

pub async fn upsert_device(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<DeviceUpsertBody>, JsonRejection>,
) -> ApiResult<Json<DeviceRecord>> {
    require_admin(&headers)?;
    let body = json_body(body)?;

    let device_id = validate_device_id(&body.device_id)?;
    let amount = parse_amount(body.amount.as_ref())?;
    let currency = currency_or_default(body.currency.as_deref())?;
    let store_code = non_blank(body.store_code.as_deref())
        .unwrap_or(&state.resolver.defaults().store_code)
        .to_string();

    let terminal_id = match non_blank(body.terminal_id.as_deref()) {
        Some(code) => code.to_string(),
        None => state.allocator.next_code(&store_code).await?,
    };

    let record = state
        .db
        .devices()
        .upsert(NewDevice {
            device_id,
            store_code,
            terminal_id,
            amount,
            currency,
            status: non_blank(body.status.as_deref()).map(str::to_string),
        })
        .await?;

    Ok(Json(record))
}

pub async fn delete_device(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<DeviceRef>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    require_admin(&headers)?;
    let body = json_body(body)?;

    let deleted = state.db.devices().delete(&body.device_id).await?;
    if deleted {
        info!(device_id = %body.device_id.trim(), "Device deleted by operator");
    }
    Ok(Json(json!({ "ok": true, "deleted": deleted })))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{app, send, ADMIN_KEY, API_KEY};

    const COOKIE: (&str, &str) = ("cookie", "admin_auth=1");

    #[tokio::test]
    async fn test_login_sets_cookie() {
        let (router, _) = app().await;

        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/admin/login")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json!({ "key": ADMIN_KEY }).to_string()))
            .unwrap();
        let resp = tower::ServiceExt::oneshot(router.clone(), req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("admin_auth=1;"));
        assert!(cookie.contains("SameSite=Lax"));

        let (status, _) =
            send(&router, "POST", "/api/admin/login", &[], Some(json!({ "key": "nope" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_routes_require_cookie() {
        let (router, _) = app().await;

        for (method, uri) in [
            ("GET", "/api/admin/sessions"),
            ("GET", "/api/admin/devices"),
        ] {
            let (status, _) = send(&router, method, uri, &[], None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }

        let (status, _) = send(
            &router,
            "POST",
            "/api/admin/devices/upsert",
            &[("cookie", "admin_auth=0")],
            Some(json!({ "deviceId": "D1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_sessions() {
        let (router, _) = app().await;

        let (status, created) =
            send(&router, "POST", "/api/admin/sessions", &[COOKIE], Some(json!({ "amount": "42" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["terminalId"], ADMIN_TEST_TERMINAL);
        assert_eq!(created["currency"], "USD");
        assert_eq!(created["amount"], 42);

        let (status, _) = send(
            &router,
            "POST",
            "/api/admin/sessions",
            &[COOKIE],
            Some(json!({ "amount": "lots" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, paid) = send(
            &router,
            "POST",
            "/api/admin/mark-paid",
            &[COOKIE],
            Some(json!({ "sessionId": created["id"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["status"], "paid");

        let (_, list) = send(&router, "GET", "/api/admin/sessions", &[COOKIE], None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_overrides_enrolled_terminal() {
        let (router, _) = app().await;

        let (_, boot) = send(
            &router,
            "GET",
            "/api/v1/bootstrap?deviceId=D1",
            &[("x-api-key", API_KEY)],
            None,
        )
        .await;
        assert_eq!(boot["terminalId"], "STORE01-0001");

        let (status, record) = send(
            &router,
            "POST",
            "/api/admin/devices/upsert",
            &[COOKIE],
            Some(json!({ "deviceId": "d1", "terminalId": "COUNTER-A", "amount": 300 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["terminalId"], "COUNTER-A");

        let (_, boot) = send(
            &router,
            "GET",
            "/api/v1/bootstrap?deviceId=D1",
            &[("x-api-key", API_KEY)],
            None,
        )
        .await;
        assert_eq!(boot["terminalId"], "COUNTER-A");
        assert_eq!(boot["amount"], 300);
        assert_eq!(boot["autoEnrolled"], false);
    }

    #[tokio::test]
    async fn test_upsert_blank_terminal_allocates_next_code() {
        let (router, _) = app().await;

        let (status, record) = send(
            &router,
            "POST",
            "/api/admin/devices/upsert",
            &[COOKIE],
            Some(json!({ "deviceId": "D9", "storeCode": "STORE03", "terminalId": " " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["terminalId"], "STORE03-0001");
        assert_eq!(record["storeCode"], "STORE03");

        let (_, view) = send(&router, "GET", "/api/admin/devices", &[COOKIE], None).await;
        assert_eq!(view["devices"].as_array().unwrap().len(), 1);
        assert_eq!(view["sequences"][0]["storeCode"], "STORE03");
        assert_eq!(view["sequences"][0]["lastValue"], 1);

        let (status, _) = send(
            &router,
            "POST",
            "/api/admin/devices/upsert",
            &[COOKIE],
            Some(json!({ "deviceId": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_unknown_device_is_ok() {
        let (router, _) = app().await;

        let (status, body) = send(
            &router,
            "POST",
            "/api/admin/devices/delete",
            &[COOKIE],
            Some(json!({ "deviceId": "NEVER-SEEN" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], false);
    }
}
