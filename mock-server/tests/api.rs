use axum::http::{self, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use mock_bmc::{app, app_with, MockConfig, Session};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn basic() -> String {
    format!("Basic {}", STANDARD.encode("root:turing"))
}

fn get(uri: &str, authorization: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, authorization)
        .body(String::new())
        .unwrap()
}

fn login(body: &str) -> Request<String> {
    Request::builder()
        .method("GET")
        .uri("/api/bmc/authenticate")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn result(envelope: &Value) -> &Value {
    &envelope["response"][0]["result"]
}

// --- authenticate ---

#[tokio::test]
async fn authenticate_issues_token() {
    let resp = app()
        .oneshot(login(r#"{"username":"root","password":"turing"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let session: Session = body_json(resp).await;
    assert!(!session.id.is_empty());
    assert_eq!(session.name, "root");
}

#[tokio::test]
async fn authenticate_rejects_wrong_password() {
    let resp = app()
        .oneshot(login(r#"{"username":"root","password":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticate_malformed_json_returns_422() {
    let resp = app().oneshot(login(r#"{"user":"root"}"#)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn issued_token_authorizes_calls() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(login(r#"{"username":"root","password":"turing"}"#))
        .await
        .unwrap();
    let session: Session = body_json(resp).await;

    let resp = app
        .oneshot(get("/api/bmc?opt=get&type=power", &format!("Bearer {}", session.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- auth on /api/bmc ---

#[tokio::test]
async fn missing_authorization_is_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/bmc?opt=get&type=info")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_bearer_token_is_401() {
    let resp = app()
        .oneshot(get("/api/bmc?opt=get&type=info", "Bearer made-up"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn custom_credentials_are_honoured() {
    let config = MockConfig {
        username: "admin".to_string(),
        password: "secret".to_string(),
        ..Default::default()
    };
    let auth = format!("Basic {}", STANDARD.encode("admin:secret"));
    let resp = app_with(config)
        .oneshot(get("/api/bmc?opt=get&type=info", &auth))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// --- get ---

#[tokio::test]
async fn get_other_uses_object_envelope() {
    let resp = app()
        .oneshot(get("/api/bmc?opt=get&type=other", &basic()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    let other = &result(&envelope)[0];
    assert_eq!(other["api"], "1.1");
    assert_eq!(other["version"], "2.3.4");
}

#[tokio::test]
async fn get_power_starts_all_off() {
    let resp = app()
        .oneshot(get("/api/bmc?opt=get&type=power", &basic()))
        .await
        .unwrap();

    let envelope: Value = body_json(resp).await;
    let power = &result(&envelope)[0];
    for key in ["node1", "node2", "node3", "node4"] {
        assert_eq!(power[key], "0", "{key}");
    }
}

// --- set ---

#[tokio::test]
async fn set_power_is_reflected_in_get_power() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(get("/api/bmc?opt=power&type=set&node2=1", &basic()))
        .await
        .unwrap();
    let envelope: Value = body_json(resp).await;
    assert_eq!(result(&envelope), "ok");

    let resp = app
        .oneshot(get("/api/bmc?opt=get&type=power", &basic()))
        .await
        .unwrap();
    let envelope: Value = body_json(resp).await;
    assert_eq!(result(&envelope)[0]["node3"], "1");
}

#[tokio::test]
async fn usb_boot_out_of_range_returns_empty_result() {
    let resp = app()
        .oneshot(get("/api/bmc?opt=set&type=usb_boot&node=7", &basic()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    assert_eq!(result(&envelope), "");
}

#[tokio::test]
async fn reset_network_returns_ok() {
    let resp = app()
        .oneshot(get("/api/bmc?opt=set&type=network", &basic()))
        .await
        .unwrap();

    let envelope: Value = body_json(resp).await;
    assert_eq!(result(&envelope), "ok");
}

#[tokio::test]
async fn unknown_operation_is_400() {
    let resp = app()
        .oneshot(get("/api/bmc?opt=get&type=flux_capacitor", &basic()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_bytes(resp).await.is_empty());
}
