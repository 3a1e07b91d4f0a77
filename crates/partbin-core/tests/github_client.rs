//! GitHub client integration tests.
//!
//! Starts a fake Contents API on an axum server and drives `GitHubClient`
//! against it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use partbin_core::codec;
use partbin_core::models::Component;
use partbin_core::remote::{GitHubClient, RemoteError, RemoteStore, VersionToken};
use partbin_core::storage::{KeyValueStore, LocalStore};
use partbin_core::sync::{LoadSource, PushOutcome, SyncCoordinator, SyncError, SyncSettings};
use partbin_core::Credentials;

#[derive(Default)]
struct FakeGitHub {
    files: HashMap<String, (Vec<u8>, String)>,
    revision: u64,
    forced_status: Option<StatusCode>,
    last_headers: Option<HeaderMap>,
    last_message: Option<String>,
}

impl FakeGitHub {
    fn next_sha(&mut self) -> String {
        self.revision += 1;
        format!("{:040x}", self.revision)
    }
}

type Shared = Arc<Mutex<FakeGitHub>>;

#[derive(Deserialize)]
struct PutBody {
    message: String,
    content: String,
    sha: Option<String>,
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// GitHub wraps base64 content at 60 columns
fn wrapped_base64(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

async fn get_contents(
    State(state): State<Shared>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    state.last_headers = Some(headers);
    if let Some(status) = state.forced_status {
        return error(status, "forced");
    }
    match state.files.get(&format!("{owner}/{repo}/{path}")) {
        Some((content, sha)) => Json(json!({
            "type": "file",
            "encoding": "base64",
            "content": wrapped_base64(content),
            "sha": sha,
        }))
        .into_response(),
        None => error(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn put_contents(
    State(state): State<Shared>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<PutBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.last_headers = Some(headers);
    if let Some(status) = state.forced_status {
        return error(status, "forced");
    }

    let key = format!("{owner}/{repo}/{path}");
    let current = state.files.get(&key).map(|(_, sha)| sha.clone());
    let created = match (current, body.sha) {
        (None, None) => true,
        (Some(current), Some(sha)) if current == sha => false,
        (Some(_), Some(_)) => return error(StatusCode::CONFLICT, "sha does not match"),
        (Some(_), None) | (None, Some(_)) => {
            return error(StatusCode::UNPROCESSABLE_ENTITY, "Invalid request")
        }
    };

    let content = STANDARD.decode(body.content).unwrap();
    let sha = state.next_sha();
    state.files.insert(key, (content, sha.clone()));
    state.last_message = Some(body.message);

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(json!({ "content": { "sha": sha } }))).into_response()
}

/// Bind to port 0 and return the base URL along with the shared state.
async fn start_server() -> (String, Shared) {
    let state = Shared::default();
    let app = Router::new()
        .route(
            "/repos/:owner/:repo/contents/*path",
            get(get_contents).put(put_contents),
        )
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

fn client(base: &str) -> GitHubClient {
    GitHubClient::new(
        base,
        &Credentials::new("ghp_secret", "octo/parts"),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn sample() -> Vec<Component> {
    let mut ldo = Component::new("AMS1117-3.3", "C347223");
    ldo.category = "线性稳压器(LDO)".to_string();
    ldo.parameters = "输出电压5V，输出电流1A，耐压12V".to_string();
    ldo.stock = 10;
    ldo.datasheet = Some("https://example.com/ams1117.pdf".to_string());
    vec![ldo]
}

#[tokio::test]
async fn fetch_missing_document_is_not_found() {
    let (base, _) = start_server().await;
    let err = client(&base).fetch("data.json").await.unwrap_err();
    assert_eq!(err, RemoteError::NotFound);
}

#[tokio::test]
async fn requests_carry_github_headers() {
    let (base, state) = start_server().await;
    let _ = client(&base).fetch("data.json").await;

    let headers = state.lock().unwrap().last_headers.clone().unwrap();
    assert_eq!(headers["authorization"], "token ghp_secret");
    assert_eq!(headers["accept"], "application/vnd.github.v3+json");
    assert!(headers["user-agent"]
        .to_str()
        .unwrap()
        .starts_with("partbin/"));
}

#[tokio::test]
async fn create_then_update_round_trips_utf8() {
    let (base, state) = start_server().await;
    let client = client(&base);
    let content = codec::encode_collection(&sample()).unwrap();

    let v1 = client
        .put("data.json", &content, None, "create")
        .await
        .unwrap();
    let doc = client.fetch("data.json").await.unwrap();
    assert_eq!(doc.version, v1);
    assert_eq!(doc.content, content);
    assert_eq!(codec::decode_collection(&doc.content).unwrap(), sample());

    let v2 = client
        .put("data.json", b"[]", Some(&v1), "update")
        .await
        .unwrap();
    assert_ne!(v1, v2);
    assert_eq!(state.lock().unwrap().last_message.as_deref(), Some("update"));
}

#[tokio::test]
async fn stale_sha_is_a_conflict() {
    let (base, _) = start_server().await;
    let client = client(&base);
    let v1 = client.put("data.json", b"[]", None, "a").await.unwrap();
    client.put("data.json", b"[1]", Some(&v1), "b").await.unwrap();

    let err = client
        .put("data.json", b"[2]", Some(&v1), "c")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Conflict(_)));

    let err = client
        .put("data.json", b"[2]", None, "c")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Conflict(_)));

    let err = client
        .put("other.json", b"[]", Some(&VersionToken::new("abc")), "d")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Conflict(_)));
}

#[tokio::test]
async fn error_statuses_are_categorized() {
    let (base, state) = start_server().await;
    let client = client(&base);

    let cases = [
        (StatusCode::UNAUTHORIZED, "auth"),
        (StatusCode::FORBIDDEN, "rate"),
        (StatusCode::TOO_MANY_REQUESTS, "rate"),
        (StatusCode::INTERNAL_SERVER_ERROR, "network"),
    ];
    for (status, expected) in cases {
        state.lock().unwrap().forced_status = Some(status);
        let err = client.fetch("data.json").await.unwrap_err();
        let actual = match err {
            RemoteError::Auth(_) => "auth",
            RemoteError::RateLimited(_) => "rate",
            RemoteError::Network(_) => "network",
            other => panic!("unexpected {:?} for {}", other, status),
        };
        assert_eq!(actual, expected, "status {}", status);
    }
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .fetch("data.json")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Network(_)));
}

#[tokio::test]
async fn coordinator_over_github_client() {
    let (base, state) = start_server().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    let local = LocalStore::new(KeyValueStore::new(temp_dir.path()));
    let sync = SyncCoordinator::new(
        Credentials::new("ghp_secret", "octo/parts"),
        client(&base),
        local,
        SyncSettings::default(),
    );

    // Nothing remote yet: defaults are seeded
    let loaded = sync.load().await;
    assert_eq!(loaded.source, LoadSource::Default);

    let components = sample();
    let outcome = sync.push(&components).await.unwrap();
    assert!(matches!(outcome, PushOutcome::Pushed { created: true, .. }));
    assert!(state
        .lock()
        .unwrap()
        .last_message
        .as_deref()
        .unwrap()
        .starts_with("Update component inventory - "));

    let reloaded = sync.load().await;
    assert_eq!(reloaded.source, LoadSource::Remote);
    assert_eq!(reloaded.components, components);

    state.lock().unwrap().forced_status = Some(StatusCode::UNAUTHORIZED);
    let err = sync.push(&components).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote(RemoteError::Auth(_))));

    // The failed push left the cache marked unpushed, so it wins over the remote
    assert!(sync.local().has_pending());
    let fallback = sync.load().await;
    assert_eq!(fallback.source, LoadSource::Local);
    assert_eq!(fallback.components, components);
}
