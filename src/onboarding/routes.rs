//! REST endpoints driving the flow. Every transition answers with the new status.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::error;

use crate::error::FlowError;
use crate::route::Route;
use crate::session::OAuthProvider;
use crate::validation::validate_password_strength;

use super::controller::{FlowController, Transition};
use super::forms::{AliasForm, LegalNameForm, LocationForm, LoginForm, SignUpForm};
use super::model::LocationOptions;

/// Shared state for flow routes.
#[derive(Clone)]
pub struct FlowRouteState {
    pub controller: Arc<FlowController>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    remember_password: bool,
}

#[derive(Debug, Deserialize)]
struct SignUpRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct PasswordRequest {
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct OtpRequest {
    #[serde(default)]
    digits: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OtpSlotRequest {
    index: usize,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct OtpBackspaceRequest {
    index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhotoRequest {
    #[serde(default)]
    data_uri: String,
}

#[derive(Debug, Deserialize)]
struct NavigateRequest {
    path: String,
}

/// Map a flow error to a JSON response.
fn error_response(err: FlowError) -> Response {
    let notice = err.notice();
    match err {
        FlowError::Validation(ref errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "errors": errors })),
        )
            .into_response(),
        FlowError::AuthenticationFailed { .. } => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "notice": notice })),
        )
            .into_response(),
        FlowError::InvalidOtp => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "notice": notice })),
        )
            .into_response(),
        FlowError::NotAuthenticated => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": err.to_string(),
                "redirect": Route::Login,
            })),
        )
            .into_response(),
        FlowError::InvalidTransition { .. } | FlowError::Busy => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": err.to_string() })),
        )
            .into_response(),
        FlowError::Store(ref e) => {
            error!(error = %e, "Store failure during flow operation");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Storage unavailable" })),
            )
                .into_response()
        }
    }
}

/// Answer a transition with the status it produced.
async fn respond(state: &FlowRouteState, result: Result<Transition, FlowError>) -> Response {
    match result {
        Ok(_) => status_response(state).await,
        Err(e) => error_response(e),
    }
}

async fn status_response(state: &FlowRouteState) -> Response {
    match state.controller.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => error_response(e),
    }
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("Unknown {what}") })),
    )
        .into_response()
}

// ── Flow ────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/flow
async fn get_status(State(state): State<FlowRouteState>) -> Response {
    status_response(&state).await
}

/// POST /api/flow/navigate
async fn navigate(
    State(state): State<FlowRouteState>,
    Json(req): Json<NavigateRequest>,
) -> Response {
    let Some(route) = Route::parse(&req.path) else {
        return not_found("route");
    };
    let result = state.controller.navigate(route).await;
    respond(&state, result).await
}

/// POST /api/flow/back
async fn back(State(state): State<FlowRouteState>) -> Response {
    let result = state.controller.back().await;
    respond(&state, result).await
}

// ── Auth ────────────────────────────────────────────────────────────

/// POST /api/auth/login
async fn login(State(state): State<FlowRouteState>, Json(req): Json<LoginRequest>) -> Response {
    let form = LoginForm::new(req.username, req.password).remember(req.remember_password);
    let result = state.controller.login(form).await;
    respond(&state, result).await
}

/// POST /api/auth/signup
async fn sign_up(State(state): State<FlowRouteState>, Json(req): Json<SignUpRequest>) -> Response {
    let result = state
        .controller
        .sign_up(SignUpForm::new(req.email, req.password))
        .await;
    respond(&state, result).await
}

/// POST /api/auth/oauth/{provider}
async fn oauth(State(state): State<FlowRouteState>, Path(provider): Path<String>) -> Response {
    let Some(provider) = OAuthProvider::parse(&provider) else {
        return not_found("provider");
    };
    let result = state.controller.oauth(provider).await;
    respond(&state, result).await
}

/// POST /api/auth/show-signup
async fn show_sign_up(State(state): State<FlowRouteState>) -> Response {
    let result = state.controller.show_sign_up().await;
    respond(&state, result).await
}

/// POST /api/auth/show-login
async fn show_login(State(state): State<FlowRouteState>) -> Response {
    let result = state.controller.show_login().await;
    respond(&state, result).await
}

/// POST /api/auth/password-strength
///
/// Live feedback while typing; never blocks.
async fn password_strength(Json(req): Json<PasswordRequest>) -> impl IntoResponse {
    Json(validate_password_strength(&req.password))
}

// ── OTP ─────────────────────────────────────────────────────────────

/// GET /api/otp
async fn get_otp(State(state): State<FlowRouteState>) -> Response {
    match state.controller.otp_target().await {
        Some(target) => Json(serde_json::json!({ "target_email": target })).into_response(),
        None => not_found("OTP challenge"),
    }
}

/// POST /api/otp/slot
async fn otp_slot(State(state): State<FlowRouteState>, Json(req): Json<OtpSlotRequest>) -> Response {
    match state.controller.otp_input(req.index, &req.value).await {
        Ok(focus) => Json(focus).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/otp/backspace
async fn otp_backspace(
    State(state): State<FlowRouteState>,
    Json(req): Json<OtpBackspaceRequest>,
) -> Response {
    match state.controller.otp_backspace(req.index).await {
        Ok(focus) => Json(focus).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/otp
///
/// An empty `digits` submits the slots typed through `/api/otp/slot`.
async fn submit_otp(State(state): State<FlowRouteState>, Json(req): Json<OtpRequest>) -> Response {
    let result = state.controller.submit_otp(req.digits.as_slice()).await;
    respond(&state, result).await
}

// ── Onboarding ──────────────────────────────────────────────────────

/// POST /api/onboarding/name
async fn submit_name(
    State(state): State<FlowRouteState>,
    Json(form): Json<LegalNameForm>,
) -> Response {
    let result = state.controller.submit_legal_name(form).await;
    respond(&state, result).await
}

/// POST /api/onboarding/location
async fn submit_location(
    State(state): State<FlowRouteState>,
    Json(form): Json<LocationForm>,
) -> Response {
    let result = state.controller.submit_location(form).await;
    respond(&state, result).await
}

/// GET /api/onboarding/location-options
async fn location_options() -> impl IntoResponse {
    Json(LocationOptions::default())
}

/// POST /api/onboarding/alias
async fn submit_alias(State(state): State<FlowRouteState>, Json(form): Json<AliasForm>) -> Response {
    let result = state.controller.submit_alias(form).await;
    respond(&state, result).await
}

/// POST /api/onboarding/alias/skip
async fn skip_alias(State(state): State<FlowRouteState>) -> Response {
    let result = state.controller.skip_alias().await;
    respond(&state, result).await
}

/// POST /api/onboarding/photo
async fn submit_photo(
    State(state): State<FlowRouteState>,
    Json(req): Json<PhotoRequest>,
) -> Response {
    let result = state.controller.submit_photo(&req.data_uri).await;
    respond(&state, result).await
}

/// POST /api/onboarding/photo/upload
///
/// Raw image body; the media type comes from `Content-Type`.
async fn upload_photo(
    State(state): State<FlowRouteState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let result = state.controller.upload_photo(mime, &body).await;
    respond(&state, result).await
}

/// POST /api/onboarding/photo/skip
async fn skip_photo(State(state): State<FlowRouteState>) -> Response {
    let result = state.controller.skip_photo().await;
    respond(&state, result).await
}

// ── Dashboard ───────────────────────────────────────────────────────

/// GET /api/dashboard
///
/// 401 with a redirect to `/login` when there is no session.
async fn dashboard(State(state): State<FlowRouteState>) -> Response {
    match state.controller.dashboard().await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/logout
async fn logout(State(state): State<FlowRouteState>) -> Response {
    let result = state.controller.logout().await;
    respond(&state, result).await
}

/// Build the flow REST routes.
pub fn flow_routes(state: FlowRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/flow", get(get_status))
        .route("/api/flow/navigate", post(navigate))
        .route("/api/flow/back", post(back))
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/oauth/{provider}", post(oauth))
        .route("/api/auth/show-signup", post(show_sign_up))
        .route("/api/auth/show-login", post(show_login))
        .route("/api/auth/password-strength", post(password_strength))
        .route("/api/otp", get(get_otp).post(submit_otp))
        .route("/api/otp/slot", post(otp_slot))
        .route("/api/otp/backspace", post(otp_backspace))
        .route("/api/onboarding/name", post(submit_name))
        .route("/api/onboarding/location", post(submit_location))
        .route("/api/onboarding/location-options", get(location_options))
        .route("/api/onboarding/alias", post(submit_alias))
        .route("/api/onboarding/alias/skip", post(skip_alias))
        .route("/api/onboarding/photo", post(submit_photo))
        .route("/api/onboarding/photo/upload", post(upload_photo))
        .route("/api/onboarding/photo/skip", post(skip_photo))
        .route("/api/dashboard", get(dashboard))
        .route("/api/logout", post(logout))
        .with_state(state)
}
