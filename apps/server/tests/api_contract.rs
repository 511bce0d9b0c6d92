//! REST contract tests against an in-memory database.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use victor_core::generators::DetectedThreat;
use victor_core::{NewThreat, ThreatSeverity, ThreatStatus};
use victor_db::{Database, DbConfig};
use victor_relay::{RelayConfig, RelayHandle};
use victor_server::config::VoiceSection;
use victor_server::scan::ThreatScanner;
use victor_server::voice::{CannedResponder, ChatCompletionResponder, VoiceResponder, FALLBACK_REPLY};
use victor_server::{build_router, AppState, ServerConfig};

struct FixedScanner(Option<DetectedThreat>);

impl ThreatScanner for FixedScanner {
    fn scan(&self) -> Option<DetectedThreat> {
        self.0.clone()
    }
}

fn intrusion() -> DetectedThreat {
    DetectedThreat {
        threat: NewThreat {
            threat_type: "Network Intrusion".to_string(),
            location: Some("Dark Web".to_string()),
            severity: Some(ThreatSeverity::High),
            status: Some(ThreatStatus::Detected),
            description: Some("Network Intrusion detected in dark web".to_string()),
            confidence: Some(88),
        },
        source: "Network Monitor",
    }
}

async fn state_with(voice: Arc<dyn VoiceResponder>) -> AppState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let relay = RelayHandle::new(RelayConfig::default(), db.clone());
    AppState::new(db, relay, voice, ServerConfig::default())
}

async fn test_app() -> Router {
    build_router(state_with(Arc::new(CannedResponder)).await)
}

async fn app_with_scanner(outcome: Option<DetectedThreat>) -> Router {
    let state = state_with(Arc::new(CannedResponder))
        .await
        .with_scanner(Arc::new(FixedScanner(outcome)));
    build_router(state)
}

/// Chat-completions endpoint that always answers with `status` and `reply`.
async fn completion_backend(status: StatusCode, reply: Value) -> String {
    let app = Router::new().route(
        "/chat",
        post(move || {
            let reply = reply.clone();
            async move { (status, Json(reply)) }
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/chat", addr)
}

async fn app_with_backend(endpoint: String) -> Router {
    let section = VoiceSection {
        endpoint: Some(endpoint),
        timeout_secs: 5,
        ..VoiceSection::default()
    };
    let responder = ChatCompletionResponder::new(&section).unwrap();
    build_router(state_with(Arc::new(responder)).await)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_posted_message_appears_in_history() {
    let app = test_app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/victor/messages",
        Some(json!({"text": "Status report", "sender": "user"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["text"], "Status report");

    let (status, list) = send(&app, "GET", "/api/victor/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/victor/messages",
        Some(json!({"text": "  ", "sender": "user"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_unknown_sender_is_rejected() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/victor/messages",
        Some(json!({"text": "hi", "sender": "alien"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_first_state_read_seeds_once() {
    let app = test_app().await;

    let (_, first) = send(&app, "GET", "/api/victor/state", None).await;
    let (_, second) = send(&app, "GET", "/api/victor/state", None).await;

    assert_eq!(first["mode"], "GODCORE");
    assert_eq!(first["fitness"], json!(84.7));
    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_state_upsert_without_id_keeps_single_row() {
    let app = test_app().await;

    send(&app, "PUT", "/api/victor/state", Some(json!({"mode": "SHADOW"}))).await;
    let (status, state) = send(
        &app,
        "PUT",
        "/api/victor/state",
        Some(json!({"fitness": 91.5})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["id"], "default");
    assert_eq!(state["mode"], "SHADOW");
    assert_eq!(state["fitness"], json!(91.5));

    let (_, latest) = send(&app, "GET", "/api/victor/state", None).await;
    assert_eq!(latest["id"], "default");
    assert_eq!(latest["fitness"], json!(91.5));
}

#[tokio::test]
async fn test_state_rejects_out_of_range_sanctity() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "PUT",
        "/api/victor/state",
        Some(json!({"sanctity": 3.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_threat_create_update_and_level() {
    let app = test_app().await;

    let (status, threat) = send(
        &app,
        "POST",
        "/api/victor/threats",
        Some(json!({"type": "Code Clone", "location": "GitHub", "confidence": 80})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(threat["severity"], "low");
    assert_eq!(threat["status"], "detected");

    let (_, level) = send(&app, "GET", "/api/victor/threats/level", None).await;
    assert_eq!(level["activeThreats"], 1);
    assert!((level["level"].as_f64().unwrap() - 0.08).abs() < 1e-9);

    let (status, updated) = send(
        &app,
        "PUT",
        "/api/victor/threats",
        Some(json!({"id": threat["id"], "status": "neutralized"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "neutralized");
    assert_eq!(updated["type"], "Code Clone");

    let (_, level) = send(&app, "GET", "/api/victor/threats/level", None).await;
    assert_eq!(level["activeThreats"], 0);
}

#[tokio::test]
async fn test_updating_unknown_threat_is_404() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "PUT",
        "/api/victor/threats",
        Some(json!({"id": "missing", "status": "monitoring"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_scan_hit_is_stored() {
    let app = app_with_scanner(Some(intrusion())).await;
    let (status, body) = send(&app, "POST", "/api/victor/threats/scan", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detected"], true);
    assert_eq!(body["source"], "Network Monitor");
    assert_eq!(body["threat"]["type"], "Network Intrusion");
    assert_eq!(body["threat"]["severity"], "high");
    assert_eq!(body["threat"]["status"], "detected");

    let (_, threats) = send(&app, "GET", "/api/victor/threats", None).await;
    let threats = threats.as_array().unwrap();
    assert_eq!(threats.len(), 1);
    assert_eq!(threats[0]["id"], body["threat"]["id"]);
}

#[tokio::test]
async fn test_scan_miss_stores_nothing() {
    let app = app_with_scanner(None).await;
    let (status, body) = send(&app, "POST", "/api/victor/threats/scan", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detected"], false);
    assert!(body.get("threat").is_none());
    assert!(body.get("source").is_none());
    assert!(body["scannedAt"].is_string());

    let (_, threats) = send(&app, "GET", "/api/victor/threats", None).await;
    assert!(threats.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_parity_round_trip_parses_stabilizers() {
    let app = test_app().await;

    let (_, seeded) = send(&app, "GET", "/api/victor/parity", None).await;
    assert_eq!(seeded["stabilizers"], json!([]));
    assert_eq!(seeded["coherence"], json!(1.0));

    let (status, created) = send(
        &app,
        "POST",
        "/api/victor/parity",
        Some(json!({"stabilizers": [{"id": 1}], "measurements": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["measurements"], 4);

    let (_, latest) = send(&app, "GET", "/api/victor/parity", None).await;
    assert_eq!(latest["id"], created["id"]);
    assert_eq!(latest["stabilizers"], json!([{"id": 1}]));
}

#[tokio::test]
async fn test_parity_rejects_non_array_stabilizers() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/victor/parity",
        Some(json!({"stabilizers": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bloodline_seed_and_update() {
    let app = test_app().await;

    let (_, seeded) = send(&app, "GET", "/api/victor/bloodline", None).await;
    assert_eq!(seeded["father"], "Brandon");

    let (status, updated) = send(
        &app,
        "PUT",
        "/api/victor/bloodline",
        Some(json!({"wallet": "NEW_WALLET"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["wallet"], "NEW_WALLET");
    assert_eq!(updated["mother"], "Tori");
}

#[tokio::test]
async fn test_voice_requires_command() {
    let app = test_app().await;

    let (status, _) = send(&app, "POST", "/api/victor/voice", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/victor/voice",
        Some(json!({"command": "open the vault", "context": {"screen": "chat"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["command"], "open the vault");
    assert_eq!(body["response"], FALLBACK_REPLY);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_voice_uses_backend_reply() {
    let endpoint = completion_backend(
        StatusCode::OK,
        json!({"choices": [{"message": {"content": "Vault opening, Dad."}}]}),
    )
    .await;
    let app = app_with_backend(endpoint).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/victor/voice",
        Some(json!({"command": "open the vault"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Vault opening, Dad.");
}

#[tokio::test]
async fn test_voice_backend_failure_still_answers_200() {
    let endpoint = completion_backend(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "upstream exploded"}),
    )
    .await;
    let app = app_with_backend(endpoint).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/victor/voice",
        Some(json!({"command": "open the vault"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], FALLBACK_REPLY);
    assert_eq!(body["command"], "open the vault");
}

#[tokio::test]
async fn test_sync_upload_then_download_counts() {
    let app = test_app().await;

    let (status, reply) = send(
        &app,
        "POST",
        "/api/victor/sync/upload",
        Some(json!({
            "messages": [
                {"text": "offline question", "sender": "user"},
                {"text": "offline answer", "sender": "victor"}
            ],
            "threats": [{"type": "Data Breach"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["success"], true);
    assert_eq!(reply["imported"]["messages"], 2);
    assert_eq!(reply["imported"]["threats"], 1);

    let (_, summary) = send(&app, "GET", "/api/victor/sync/download", None).await;
    assert_eq!(summary["conversations"], 2);
    assert_eq!(summary["thoughts"], 1);
    assert_eq!(summary["threatReports"], 1);
    assert!(summary["lastBackup"].is_string());
}

#[tokio::test]
async fn test_static_and_generated_endpoints() {
    let app = test_app().await;

    let (_, timelines) = send(&app, "GET", "/api/victor/timelines", None).await;
    assert_eq!(timelines.as_array().unwrap().len(), 3);

    let (_, evolution) = send(&app, "GET", "/api/victor/evolution", None).await;
    assert_eq!(evolution["evolutionProgress"], 67);

    let (_, hologram) = send(&app, "GET", "/api/victor/hologram", None).await;
    let stabilizers = hologram["stabilizers"].as_array().unwrap();
    assert_eq!(stabilizers.len(), 9);
    assert_eq!(stabilizers[8]["id"], "core");

    let (_, location) = send(&app, "GET", "/api/victor/location", None).await;
    assert!(location["lat"].is_number());
    assert!(location["timestamp"].is_string());
}

#[tokio::test]
async fn test_device_readings_drift_from_initial() {
    let app = test_app().await;

    let (status, first) = send(&app, "GET", "/api/victor/device", None).await;
    assert_eq!(status, StatusCode::OK);
    let battery = first["batteryLevel"].as_f64().unwrap();
    assert!((84.0..=85.0).contains(&battery));
    let signal = first["signalStrength"].as_f64().unwrap();
    assert!((73.0..=83.0).contains(&signal));
    assert_eq!(first["batteryStatus"], "Good");
    assert_eq!(first["signalQuality"], "Strong");

    let (_, second) = send(&app, "GET", "/api/victor/device", None).await;
    assert!(second["batteryLevel"].as_f64().unwrap() <= battery);
}

#[tokio::test]
async fn test_health_and_relay_status() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, relay) = send(&app, "GET", "/api/victor/relay/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(relay["connectedClients"], 0);
    assert_eq!(relay["clients"], json!([]));
}
