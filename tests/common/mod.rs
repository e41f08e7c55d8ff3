//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use greenlight::config::ApiConfig;
use greenlight::data::{FixedClock, InMemoryMovieStore};
use greenlight::{ApiServer, Shutdown};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const CASABLANCA: &str =
    r#"{"title":"Casablanca","year":1942,"runtime":"102 mins","genres":["drama","romance","war"]}"#;

/// A server running on an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a raw body to `path`.
    pub async fn post(&self, path: &str, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// PATCH a raw body to `path`.
    pub async fn patch(&self, path: &str, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }
}

/// Start the API with `config`, judging release years as if it were 2026.
pub async fn spawn_app(config: ApiConfig) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = ApiServer::with_clock(
        config,
        Arc::new(InMemoryMovieStore::new()),
        Arc::new(FixedClock(2026)),
    );
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestApp {
        addr,
        client: reqwest::Client::new(),
        shutdown,
        handle,
    }
}

#[allow(dead_code)]
pub async fn spawn_default_app() -> TestApp {
    spawn_app(ApiConfig::default()).await
}
