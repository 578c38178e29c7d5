//! # Payment Sessions
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Terminal                 Broker                      Customer phone    │
//! │  ────────                 ──────                      ──────────────    │
//! │  POST /api/v1/sessions ─► resolve device ─► pending                    │
//! │                                            ◄─ GET /api/v1/checkout/{t} │
//! │                                            ◄─ POST /api/sandbox/pay    │
//! │  GET /api/v1/sessions/{id} ◄─ paid                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Body fields on session creation override what the resolver returned for
//! the calling device.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use tappay_core::validation::{amount_from_json, validate_amount, validate_currency};
use tappay_core::{ResolvedConfig, Session, ValidationError};

use crate::auth::{header_value, require_api_key, require_configured_api_key};
use crate::error::{ApiError, ApiResult};
use crate::routes::bootstrap::{DEVICE_ID_HEADER, STORE_CODE_HEADER};
use crate::routes::{json_body, non_blank, LIST_LIMIT};
use crate::SharedState;

// =============================================================================
// Request / Response Bodies
// =============================================================================

/// Optional overrides for a new session.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    #[serde(default)]
    pub terminal_id: Option<String>,
    /// Number or numeric string, minor units.
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayBody {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub terminal_id: String,
    pub session: Option<Session>,
}

#[derive(Debug, Serialize)]
pub struct PayResponse {
    pub ok: bool,
    pub status: String,
}

/// Terminal, amount and currency for a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    pub terminal_id: String,
    pub amount: i64,
    pub currency: String,
}

impl SessionDraft {
    /// Applies body overrides on top of the resolved device config.
    pub fn overlay(resolved: &ResolvedConfig, body: &CreateSessionBody) -> ApiResult<Self> {
        let terminal_id = non_blank(body.terminal_id.as_deref())
            .unwrap_or(&resolved.terminal_id)
            .to_string();

        let amount = body
            .amount
            .as_ref()
            .and_then(amount_from_json)
            .unwrap_or(resolved.amount);

        let currency = non_blank(body.currency.as_deref()).unwrap_or(&resolved.currency);

        if terminal_id.is_empty() {
            return Err(ApiError::BadRequest(
                "Missing/invalid fields after resolution".to_string(),
            ));
        }
        validate_amount(amount)?;
        let currency = validate_currency(currency)?;

        Ok(SessionDraft {
            terminal_id,
            amount,
            currency,
        })
    }
}

// =============================================================================
// Terminal Endpoints
// =============================================================================

pub async fn create_session(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<CreateSessionBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    require_api_key(state.config.api_key.as_deref(), &headers)?;
    let body = json_body(body)?;

    let resolved = state
        .resolver
        .resolve(
            header_value(&headers, DEVICE_ID_HEADER),
            header_value(&headers, STORE_CODE_HEADER),
        )
        .await?;

    let draft = SessionDraft::overlay(&resolved, &body)?;
    let session = state
        .db
        .sessions()
        .create(&draft.terminal_id, draft.amount, &draft.currency)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn list_sessions(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Session>>> {
    require_api_key(state.config.api_key.as_deref(), &headers)?;
    let sessions = state.db.sessions().list(LIST_LIMIT).await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Session>> {
    require_configured_api_key(state.config.api_key.as_deref(), &headers)?;

    let session = state
        .db
        .sessions()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))?;

    Ok(Json(session))
}

// =============================================================================
// Checkout Endpoints
// =============================================================================

/// What the checkout page shows for a terminal.
pub async fn checkout(
    State(state): State<SharedState>,
    Path(terminal_id): Path<String>,
) -> ApiResult<Json<CheckoutView>> {
    let session = state
        .db
        .sessions()
        .latest_pending_for_terminal(&terminal_id)
        .await?;

    Ok(Json(CheckoutView {
        terminal_id,
        session,
    }))
}

/// Sandbox approval: marks the session paid without a real processor.
pub async fn sandbox_pay(
    State(state): State<SharedState>,
    body: Result<Json<PayBody>, JsonRejection>,
) -> ApiResult<Json<PayResponse>> {
    let body = json_body(body)?;
    let session_id = non_blank(body.session_id.as_deref())
        .ok_or_else(|| ApiError::from(ValidationError::required("sessionId")))?;

    let session = state
        .db
        .sessions()
        .mark_paid(session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    info!(session_id = %session.id, terminal_id = %session.terminal_id, "Sandbox payment approved");

    Ok(Json(PayResponse {
        ok: true,
        status: session.status.to_string(),
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================
