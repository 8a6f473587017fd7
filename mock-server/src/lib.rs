//! In-memory stand-in for the Turing Pi 2 BMC HTTP API.
//!
//! Serves `/api/bmc/authenticate` and the `/api/bmc?opt=..&type=..` family
//! with the same envelopes the device uses. State lives in memory and is
//! lost when the router is dropped.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const NODE_COUNT: usize = 4;

/// Credentials and identity the mock BMC answers with.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub username: String,
    pub password: String,
    pub other: Other,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            username: "root".to_string(),
            password: "turing".to_string(),
            other: Other::default(),
        }
    }
}

/// Body of `opt=get&type=other`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Other {
    pub api: String,
    pub build_version: String,
    pub buildroot: String,
    pub buildtime: String,
    pub ip: String,
    pub mac: String,
    pub version: String,
}

impl Default for Other {
    fn default() -> Self {
        Self {
            api: "1.1".to_string(),
            build_version: "2024.05.1".to_string(),
            buildroot: "\"Buildroot 2024.05.1\"".to_string(),
            buildtime: "2025-01-17 17:12:52-00:00".to_string(),
            ip: "Unknown".to_string(),
            mac: "Unknown".to_string(),
            version: "2.3.4".to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct Board {
    pub tokens: HashSet<String>,
    pub power: [bool; NODE_COUNT],
    pub usb_boot: [bool; NODE_COUNT],
    pub msd: [bool; NODE_COUNT],
    pub network_resets: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MockConfig>,
    pub board: Arc<RwLock<Board>>,
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        board: Arc::new(RwLock::new(Board::default())),
    };
    Router::new()
        .route("/api/bmc", get(bmc))
        .route("/api/bmc/authenticate", get(authenticate))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn scalar(result: &str) -> Json<Value> {
    Json(json!({ "response": [{ "result": result }] }))
}

fn object(result: Value) -> Json<Value> {
    Json(json!({ "response": [{ "result": [result] }] }))
}

async fn authenticate(
    State(state): State<AppState>,
    Json(login): Json<Login>,
) -> Result<Json<Session>, StatusCode> {
    if login.username != state.config.username || login.password != state.config.password {
        warn!(username = %login.username, "rejected login");
        return Err(StatusCode::UNAUTHORIZED);
    }
    let id = Uuid::new_v4().to_string();
    state.board.write().await.tokens.insert(id.clone());
    info!(username = %login.username, "issued session token");
    Ok(Json(Session {
        id,
        name: login.username,
        description: "api session".to_string(),
    }))
}

async fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    if let Some(token) = value.strip_prefix("Bearer ") {
        return state.board.read().await.tokens.contains(token);
    }
    if let Some(encoded) = value.strip_prefix("Basic ") {
        let expected = format!("{}:{}", state.config.username, state.config.password);
        return STANDARD
            .decode(encoded)
            .map(|decoded| decoded == expected.as_bytes())
            .unwrap_or(false);
    }
    false
}

fn node_index(raw: Option<&String>) -> Option<usize> {
    raw.and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n < NODE_COUNT)
}

/// `nodeN=S` pairs as sent by the power endpoint.
fn power_requests(params: &HashMap<String, String>) -> Vec<(usize, bool)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let node = key.strip_prefix("node")?.parse::<usize>().ok()?;
            let on = match value.as_str() {
                "0" => false,
                "1" => true,
                _ => return None,
            };
            (node < NODE_COUNT).then_some((node, on))
        })
        .collect()
}

async fn bmc(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&state, &headers).await {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let opt = params.get("opt").map(String::as_str).unwrap_or_default();
    let kind = params.get("type").map(String::as_str).unwrap_or_default();
    debug!(opt, kind, "bmc call");

    match (opt, kind) {
        ("get", "info") => Ok(object(json!({
            "ip": state.config.other.ip,
            "mac": state.config.other.mac,
            "version": state.config.other.version,
        }))),
        ("get", "other") => {
            let other = serde_json::to_value(&state.config.other)
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
            Ok(object(other))
        }
        ("get", "power") => {
            let board = state.board.read().await;
            let mut result = serde_json::Map::new();
            for (i, on) in board.power.iter().enumerate() {
                result.insert(format!("node{}", i + 1), json!(if *on { "1" } else { "0" }));
            }
            Ok(object(Value::Object(result)))
        }
        ("set", "usb_boot") | ("set", "clear_usb_boot") | ("set", "node_to_msd") => {
            let Some(node) = node_index(params.get("node")) else {
                return Ok(scalar(""));
            };
            let mut board = state.board.write().await;
            match kind {
                "usb_boot" => board.usb_boot[node] = true,
                "clear_usb_boot" => board.usb_boot[node] = false,
                _ => board.msd[node] = true,
            }
            Ok(scalar("ok"))
        }
        ("set", "network") => {
            state.board.write().await.network_resets += 1;
            Ok(scalar("ok"))
        }
        ("power", "set") => {
            let requests = power_requests(&params);
            if requests.is_empty() {
                return Ok(scalar(""));
            }
            let mut board = state.board.write().await;
            for (node, on) in requests {
                board.power[node] = on;
            }
            Ok(scalar("ok"))
        }
        _ => Err(StatusCode::BAD_REQUEST),
    }
}
