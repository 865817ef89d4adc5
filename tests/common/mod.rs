#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::StatusCode;

use items_api::auth::JwtAuthenticator;
use items_api::config::SecurityConfig;
use items_api::database::InMemoryItemStore;
use items_api::{app, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<InMemoryItemStore>,
}

impl TestServer {
    /// Serves the full router over a fresh in-memory store on an unused port.
    /// The server lives as long as the calling test's runtime.
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let security = SecurityConfig {
            jwt_secret: "integration-test-secret".to_string(),
            jwt_expiry_hours: 1,
            cors_origins: Vec::new(),
        };
        let store = Arc::new(InMemoryItemStore::new());
        let tokens = Arc::new(JwtAuthenticator::from_config(&security));
        let router = app(AppState::new(store.clone(), tokens), &security);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            port,
            base_url,
            store,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Logs in and returns a bearer token.
    pub async fn token(&self) -> Result<String> {
        let res = reqwest::Client::new()
            .post(self.url("/login"))
            .json(&serde_json::json!({ "username": "tester", "password": "secret" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body = res.json::<serde_json::Value>().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response missing token")
    }
}
