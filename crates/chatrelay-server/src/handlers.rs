//! HTTP request handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use chatrelay_core::error::ValidationReason;
use chatrelay_core::{Credential, ProxySettings, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::session::{expired_session_cookie, session_cookie, session_from_headers};
use crate::state::AppState;

/// Body of `POST /ask`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskRequest {
    pub question: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub raw_response: Value,
}

/// Body of `POST /set_proxy`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetProxyRequest {
    pub use_proxy: bool,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
}

/// Body of `POST /verify_key`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyKeyRequest {
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyKeyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
    pub started_at: String,
}

/// POST /ask
///
/// Answers a question within the caller's session and records the exchange.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = body?;
    let session = issued_session(&state, &headers);

    let answer = state
        .orchestrator
        .ask(
            session.as_ref(),
            request.question.as_deref().unwrap_or_default(),
            request.api_key.as_deref(),
        )
        .await?;

    Ok(Json(AskResponse {
        answer: answer.text,
        raw_response: answer.raw_response,
    }))
}

/// POST /set_proxy
///
/// Replaces the process-wide proxy settings. Calls already in flight keep
/// the settings they started with.
pub async fn set_proxy(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SetProxyRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = body?;
    let settings = ProxySettings {
        use_proxy: request.use_proxy,
        http_proxy: request.http_proxy,
        https_proxy: request.https_proxy,
    };
    if let Err(e) = settings.validate() {
        tracing::warn!(error = %e, "proxy settings do not parse, calls will fall back to direct");
    }

    state.proxy().update(settings);
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /verify_key
///
/// Checks the key format and starts a new session.
pub async fn verify_key(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifyKeyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;

    let credential = request
        .api_key
        .and_then(Credential::new)
        .filter(Credential::has_valid_format);
    let Some(credential) = credential else {
        tracing::info!("rejected api key with invalid format");
        let body = VerifyKeyResponse {
            success: false,
            session_id: None,
            error: Some(ValidationReason::InvalidCredentialFormat.message().to_string()),
        };
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    };

    let session = state.sessions.issue();
    tracing::info!(session_id = %session, credential = %credential, "session started");

    let body = VerifyKeyResponse {
        success: true,
        session_id: Some(session.to_string()),
        error: None,
    };
    Ok(([(SET_COOKIE, session_cookie(&session))], Json(body)).into_response())
}

/// GET /logout
///
/// Drops the session's window and cookie, then redirects to `/`.
/// Cookies naming an id this process never issued only lose the cookie.
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(session) = session_from_headers(&headers) {
        if state.sessions.revoke(&session) {
            state.orchestrator.end_session(&session);
        }
    }

    (
        [(SET_COOKIE, expired_session_cookie())],
        Redirect::to("/"),
    )
}

/// The cookie's session, if it names an id issued by `/verify_key`
fn issued_session(state: &AppState, headers: &HeaderMap) -> Option<SessionId> {
    let session = session_from_headers(headers)?;
    if state.sessions.contains(&session) {
        Some(session)
    } else {
        tracing::debug!(session_id = %session, "ignoring unknown session cookie");
        None
    }
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        sessions: state.orchestrator.session_count(),
        started_at: state.started_at.to_rfc3339(),
    })
}
