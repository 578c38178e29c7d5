//! # HTTP Routes
//!
//! ```text
//! GET  /health
//! GET  /api/v1/bootstrap              x-api-key
//! POST /api/v1/sessions               x-api-key
//! GET  /api/v1/sessions               x-api-key
//! GET  /api/v1/sessions/{id}          x-api-key (must be configured)
//! GET  /api/v1/checkout/{terminalId}
//! POST /api/sandbox/pay
//! POST /api/admin/login
//! POST /api/admin/logout
//! GET  /api/admin/sessions            cookie
//! POST /api/admin/sessions            cookie
//! POST /api/admin/mark-paid           cookie
//! GET  /api/admin/devices             cookie
//! POST /api/admin/devices/upsert      cookie
//! POST /api/admin/devices/delete      cookie
//! ```

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::SharedState;

pub mod admin;
pub mod bootstrap;
pub mod health;
pub mod sessions;

/// Page size for list endpoints.
pub const LIST_LIMIT: u32 = 200;

/// Builds the application router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/bootstrap", get(bootstrap::bootstrap))
        .route(
            "/api/v1/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/api/v1/sessions/{id}", get(sessions::get_session))
        .route("/api/v1/checkout/{terminal_id}", get(sessions::checkout))
        .route("/api/sandbox/pay", post(sessions::sandbox_pay))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route(
            "/api/admin/sessions",
            get(admin::list_sessions).post(admin::create_session),
        )
        .route("/api/admin/mark-paid", post(admin::mark_paid))
        .route("/api/admin/devices", get(admin::list_devices))
        .route("/api/admin/devices/upsert", post(admin::upsert_device))
        .route("/api/admin/devices/delete", post(admin::delete_device))
        .with_state(state)
}

/// Unwraps a JSON body, turning axum's rejection into our `{error}` shape.
pub(crate) fn json_body<T: DeserializeOwned>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e.body_text())))
}

/// Trimmed optional string, blank treated as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
