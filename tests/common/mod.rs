use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use studyqa::config::{ClientConfig, ProviderConfig};
use studyqa::providers::OpenAiProvider;
use studyqa::relay::{self, RelayState};
use studyqa::storage::{SqliteStore, Storage};
use studyqa::RelayClient;

#[allow(dead_code)]
pub fn create_temp_storage() -> (Storage, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("studyqa.db");
    let store = SqliteStore::new_with_path(db_path).expect("failed to create sqlite store");
    (Storage::new(Arc::new(store)), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Chat-completion response body carrying `content`
#[allow(dead_code)]
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    })
}

/// Mock upstream answering every completion with `content`
#[allow(dead_code)]
pub async fn mock_upstream(content: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(&server)
        .await;
    server
}

/// Provider pointed at a mock upstream
#[allow(dead_code)]
pub fn provider_for(server: &MockServer) -> OpenAiProvider {
    let config = ProviderConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
        ..ProviderConfig::default()
    };
    OpenAiProvider::new(config, "sk-test").expect("failed to create provider")
}

/// Serve the relay on an ephemeral port; returns its base URL
#[allow(dead_code)]
pub async fn spawn_relay(upstream: &MockServer) -> String {
    let state = Arc::new(RelayState::new(Arc::new(provider_for(upstream))));
    let app = relay::router(state, None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind relay listener");
    let addr = listener.local_addr().expect("listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("relay server failed");
    });

    format!("http://{}", addr)
}

#[allow(dead_code)]
pub fn relay_client(base_url: &str) -> RelayClient {
    let config = ClientConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    };
    RelayClient::new(&config).expect("failed to create relay client")
}
