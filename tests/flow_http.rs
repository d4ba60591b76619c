//! Integration tests for the flow REST API.
//!
//! Each test spins up an Axum server on a random port backed by an
//! in-memory store and a zero-latency mock backend, then drives the flow
//! over HTTP with reqwest.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use heyprodata::auth::{AuthBackend, MockAuthBackend};
use heyprodata::onboarding::{FlowController, FlowRouteState, flow_routes};
use heyprodata::store::{MemoryStore, Store};

/// Start an Axum server on a random port, return its base URL.
async fn start_server() -> String {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let auth: Arc<dyn AuthBackend> = Arc::new(MockAuthBackend::instant());
    let controller = Arc::new(FlowController::new(store, auth));
    let app = flow_routes(FlowRouteState { controller });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

/// POST a JSON body, return (status, body).
async fn post(base: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn get(base: &str, path: &str) -> (StatusCode, Value) {
    let resp = reqwest::get(format!("{base}{path}")).await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

/// Log in as `alice` and confirm the OTP, landing on the legal-name step.
async fn login_through_otp(base: &str) {
    let (status, body) = post(
        base,
        "/api/auth/login",
        json!({ "username": "alice", "password": "pw", "rememberPassword": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "awaiting_otp");

    let (status, body) = post(
        base,
        "/api/otp",
        json!({ "digits": ["1", "2", "3", "4", "5"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "onboarding_legal_name");
}

#[tokio::test]
async fn health_ok() {
    let base = start_server().await;
    let (status, body) = get(&base, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn fresh_flow_starts_at_login() {
    let base = start_server().await;
    let (status, body) = get(&base, "/api/flow").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "anonymous_login");
    assert_eq!(body["route"], "/login");
    assert_eq!(body["authenticated"], false);
    assert!(body.get("progress").is_none());
}

#[tokio::test]
async fn full_flow_to_dashboard_and_logout() {
    let base = start_server().await;
    login_through_otp(&base).await;

    let (status, body) = post(
        &base,
        "/api/onboarding/name",
        json!({ "firstName": "Alice", "surname": "Smith" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "/onboarding/location");
    assert_eq!(body["progress"], 50);

    let (status, _) = post(
        &base,
        "/api/onboarding/location",
        json!({ "country": "Canada", "state": "Texas", "city": "Austin" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&base, "/api/onboarding/alias/skip", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "onboarding_photo");

    let (status, body) = post(
        &base,
        "/api/onboarding/photo",
        json!({ "dataUri": "data:image/png;base64,iVBORw0KGgo=" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "authenticated");
    assert_eq!(body["route"], "/dashboard");

    let (status, dash) = get(&base, "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["identity"]["kind"], "username");
    assert_eq!(dash["identity"]["value"], "alice");
    assert_eq!(dash["avatar_initial"], "A");
    assert_eq!(dash["photo"], "data:image/png;base64,iVBORw0KGgo=");
    assert_eq!(dash["profile"]["legalFirstName"], "Alice");
    assert_eq!(dash["profile"]["city"], "Austin");
    assert_eq!(dash["session"]["remember_password"], true);

    let (status, body) = post(&base, "/api/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "anonymous_login");
    assert_eq!(body["authenticated"], false);

    let (status, body) = get(&base, "/api/dashboard").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");
}

#[tokio::test]
async fn empty_login_reports_both_fields() {
    let base = start_server().await;
    let (status, body) = post(
        &base,
        "/api/auth/login",
        json!({ "username": "", "password": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["username"], "Please fill this field");
    assert_eq!(body["errors"]["password"], "Please fill this field");

    let (_, flow) = get(&base, "/api/flow").await;
    assert_eq!(flow["state"], "anonymous_login");
}

#[tokio::test]
async fn weak_sign_up_password_is_rejected() {
    let base = start_server().await;
    let (status, _) = post(&base, "/api/auth/show-signup", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &base,
        "/api/auth/signup",
        json!({ "email": "bad-email", "password": "abc" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"], "Please enter a valid email");
    assert_eq!(
        body["errors"]["password"],
        "Password does not meet all requirements"
    );

    let (status, body) = post(
        &base,
        "/api/auth/signup",
        json!({ "email": "a@b.com", "password": "Secret9#" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "awaiting_otp");

    let (_, otp) = get(&base, "/api/otp").await;
    assert_eq!(otp["target_email"], "a@b.com");
}

#[tokio::test]
async fn short_otp_shows_notice() {
    let base = start_server().await;
    post(
        &base,
        "/api/auth/login",
        json!({ "username": "alice", "password": "pw" }),
    )
    .await;

    let (status, body) = post(&base, "/api/otp", json!({ "digits": ["1", "2", "3"] })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["notice"]["title"], "Invalid OTP");
    assert_eq!(body["notice"]["description"], "Please enter all 5 digits");

    let (_, flow) = get(&base, "/api/flow").await;
    assert_eq!(flow["state"], "awaiting_otp");
}

#[tokio::test]
async fn oauth_goes_through_otp() {
    let base = start_server().await;
    let (status, body) = post(&base, "/api/auth/oauth/google", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "awaiting_otp");

    let (_, otp) = get(&base, "/api/otp").await;
    assert_eq!(otp["target_email"], "user@gmail.com");

    let (status, _) = post(&base, "/api/auth/oauth/myspace", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn step_out_of_order_conflicts() {
    let base = start_server().await;
    let (status, body) = post(
        &base,
        "/api/onboarding/name",
        json!({ "firstName": "Alice", "surname": "Smith" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("anonymous_login"));
}

#[tokio::test]
async fn back_keeps_draft() {
    let base = start_server().await;
    login_through_otp(&base).await;
    post(
        &base,
        "/api/onboarding/name",
        json!({ "firstName": "Alice", "surname": "Smith" }),
    )
    .await;

    let (status, body) = post(&base, "/api/flow/back", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "onboarding_legal_name");

    let (status, dash) = get(&base, "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["profile"]["legalFirstName"], "Alice");
    assert_eq!(dash["profile"]["legalSurname"], "Smith");

    // Login screen has nothing behind it
    let base2 = start_server().await;
    let (status, _) = post(&base2, "/api/flow/back", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn navigate_dashboard_without_session_goes_to_login() {
    let base = start_server().await;
    post(&base, "/api/auth/show-signup", json!({})).await;

    let (status, body) = post(&base, "/api/flow/navigate", json!({ "path": "/dashboard" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "anonymous_login");

    let (status, body) = post(&base, "/api/flow/navigate", json!({ "path": "/signin" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "anonymous_sign_up");

    let (status, _) = post(&base, "/api/flow/navigate", json!({ "path": "/nowhere" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn raw_photo_upload() {
    let base = start_server().await;
    login_through_otp(&base).await;
    post(
        &base,
        "/api/onboarding/name",
        json!({ "firstName": "Alice", "surname": "Smith" }),
    )
    .await;
    post(
        &base,
        "/api/onboarding/location",
        json!({ "country": "Canada", "stateRegion": "Texas", "city": "Austin" }),
    )
    .await;
    post(
        &base,
        "/api/onboarding/alias",
        json!({ "firstName": "Al", "lastName": "S" }),
    )
    .await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/api/onboarding/photo/upload"))
        .header("content-type", "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"]["photo"], "Please select a valid image");

    let resp = client
        .post(format!("{base}/api/onboarding/photo/upload"))
        .header("content-type", "image/png")
        .body(vec![0x89u8, b'P', b'N', b'G'])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, dash) = get(&base, "/api/dashboard").await;
    assert_eq!(dash["photo"], "data:image/png;base64,iVBORw==");
    assert_eq!(dash["profile"]["aliasFirstName"], "Al");
}

#[tokio::test]
async fn password_strength_feedback() {
    let base = start_server().await;
    let (status, body) = post(
        &base,
        "/api/auth/password-strength",
        json!({ "password": "Abc1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasUppercase"], true);
    assert_eq!(body["hasNumber"], true);
    assert_eq!(body["hasSpecialChar"], false);
}

#[tokio::test]
async fn location_options_listed() {
    let base = start_server().await;
    let (status, body) = get(&base, "/api/onboarding/location-options").await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["countries"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c == "Canada")
    );
}

#[tokio::test]
async fn otp_screen_can_return_to_login() {
    let base = start_server().await;
    post(
        &base,
        "/api/auth/login",
        json!({ "username": "typo-name", "password": "pw" }),
    )
    .await;

    // No dashboard before the code is confirmed
    let (status, body) = post(&base, "/api/flow/navigate", json!({ "path": "/dashboard" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "awaiting_otp");
    let (status, _) = get(&base, "/api/dashboard").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = post(&base, "/api/flow/navigate", json!({ "path": "/login" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "anonymous_login");
    assert_eq!(body["authenticated"], false);

    let (status, _) = get(&base, "/api/otp").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post(
        &base,
        "/api/auth/login",
        json!({ "username": "alice", "password": "pw" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "awaiting_otp");
}

#[tokio::test]
async fn otp_slots_then_submit() {
    let base = start_server().await;
    post(
        &base,
        "/api/auth/login",
        json!({ "username": "alice", "password": "pw" }),
    )
    .await;

    for (index, digit) in ["4", "2", "4", "2", "4"].iter().enumerate() {
        let (status, body) = post(
            &base,
            "/api/otp/slot",
            json!({ "index": index, "value": digit }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["focus"], index.min(3) + 1);
    }

    let (_, body) = post(&base, "/api/otp/backspace", json!({ "index": 4 })).await;
    assert_eq!(body["focus"], 4);
    assert_eq!(body["complete"], false);
    let (_, body) = post(&base, "/api/otp/slot", json!({ "index": 4, "value": "7" })).await;
    assert_eq!(body["complete"], true);

    let (status, body) = post(&base, "/api/otp", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "onboarding_legal_name");
}
