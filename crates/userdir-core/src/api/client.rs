//! API client for the randomuser.me service.
//!
//! One call, one batch: `fetch_users` requests `batch_size` results and maps
//! them into `UserRecord`s. There is no retry and no partial result; any
//! failed status, transport error or unparseable body fails the whole fetch.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{RandomUserResponse, UserRecord};

use super::{ApiError, UserSource};

// ============================================================================
// Constants
// ============================================================================

/// Public endpoint returning randomly generated identities
pub const DEFAULT_API_URL: &str = "https://randomuser.me/api/";

/// Number of users requested per fetch
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// API client for randomuser.me.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    batch_size: usize,
}

impl ApiClient {
    /// Create a client for the public endpoint with the default batch size
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_API_URL, DEFAULT_BATCH_SIZE, None)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_options(
            config.api_url.clone(),
            config.batch_size,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    /// Create a client against an arbitrary endpoint.
    /// No timeout is applied unless one is given.
    pub fn with_options(
        base_url: impl Into<String>,
        batch_size: usize,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            batch_size,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Fetch one batch of users and flatten them into `UserRecord`s
    pub async fn fetch_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        debug!(url = %self.base_url, batch_size = self.batch_size, "Requesting user batch");

        let response = self
            .client
            .get(&self.base_url)
            .header(header::ACCEPT, "application/json")
            .query(&[("results", self.batch_size)])
            .send()
            .await?;

        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        let parsed = Self::parse_users(&text)?;

        if let Some(ref info) = parsed.info {
            debug!(seed = ?info.seed, page = ?info.page, version = ?info.version, "Batch metadata");
        }

        let users: Vec<UserRecord> = parsed.results.into_iter().map(UserRecord::from).collect();

        if users.len() != self.batch_size {
            warn!(
                requested = self.batch_size,
                received = users.len(),
                "User batch size differs from request"
            );
        }
        info!(count = users.len(), "Fetched user batch");

        Ok(users)
    }

    fn parse_users(body: &str) -> Result<RandomUserResponse, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl UserSource for ApiClient {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>> {
        Ok(ApiClient::fetch_users(self).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve exactly one HTTP response on a loopback port.
    /// Returns the base URL and a receiver for the raw request head.
    async fn serve_once(status_line: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&head).to_string());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (format!("http://{}/api/", addr), rx)
    }

    fn random_user_json(uuid: &str, first: &str) -> String {
        format!(
            r#"{{"name": {{"title": "Mr", "first": "{first}", "last": "Doe"}},
                "email": "{first}@example.com",
                "login": {{"uuid": "{uuid}"}},
                "phone": "(555) 123-4567",
                "picture": {{"large": "https://randomuser.me/api/portraits/men/{first}.jpg"}}}}"#
        )
    }

    fn batch_json(count: usize) -> String {
        let results: Vec<String> = (0..count)
            .map(|i| random_user_json(&format!("uuid-{i}"), &format!("user{i}")))
            .collect();
        format!(
            r#"{{"results": [{}], "info": {{"seed": "abc", "results": {count}, "page": 1, "version": "1.4"}}}}"#,
            results.join(",")
        )
    }

    #[tokio::test]
    async fn test_fetch_users_maps_full_batch() {
        let (url, request) = serve_once("200 OK", batch_json(DEFAULT_BATCH_SIZE)).await;
        let client = ApiClient::with_options(url, DEFAULT_BATCH_SIZE, None).unwrap();

        let users = client.fetch_users().await.unwrap();
        assert_eq!(users.len(), 50);
        assert_eq!(users[0].id, "uuid-0");
        assert_eq!(users[0].first_name, "user0");
        assert_eq!(users[49].id, "uuid-49");

        let head = request.await.unwrap();
        assert!(head.starts_with("GET /api/?results=50 "), "unexpected request: {head}");
    }

    #[tokio::test]
    async fn test_fetch_users_server_error() {
        let (url, _request) = serve_once("500 Internal Server Error", "oops".to_string()).await;
        let client = ApiClient::with_options(url, DEFAULT_BATCH_SIZE, None).unwrap();

        let err = client.fetch_users().await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError { status: 500, .. }));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_users_malformed_body() {
        let (url, _request) = serve_once("200 OK", r#"{"unexpected": true}"#.to_string()).await;
        let client = ApiClient::with_options(url, DEFAULT_BATCH_SIZE, None).unwrap();

        let err = client.fetch_users().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_users_through_trait_object() {
        let (url, _request) = serve_once("200 OK", batch_json(3)).await;
        let source: Box<dyn UserSource> =
            Box::new(ApiClient::with_options(url, 3, None).unwrap());

        let users = source.fetch_users().await.unwrap();
        assert_eq!(users.len(), 3);
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            api_url: "http://localhost:9999/api/".to_string(),
            batch_size: 7,
            ..Config::default()
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/api/");
        assert_eq!(client.batch_size(), 7);
    }
}
