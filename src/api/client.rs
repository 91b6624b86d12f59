use super::types::{AnalysisResult, ApiError, HealthStatus, RawArticle, ScanStatus, TrendCluster};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Default backend location for local development.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Serialize)]
struct AnalyzeTextRequest<'a> {
    text: &'a str,
}

/// Typed client for the analysis backend.
///
/// Each call is one best-effort round trip: no retries, no caching and no
/// client-side request timeout. Cloning is cheap (the reqwest pool is shared).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client with its own connection pool.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;
        Ok(Self::with_http_client(http, base_url))
    }

    /// Wrap an existing reqwest client.
    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `/api/analyze-text` with `{text}`.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisResult, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::EmptyText);
        }
        tracing::debug!(chars = text.chars().count(), "Requesting text analysis");
        let request = self
            .http
            .post(self.url("/api/analyze-text"))
            .json(&AnalyzeTextRequest { text });
        send_json(request).await
    }

    /// GET `/api/trends`.
    pub async fn get_trends(&self) -> Result<Vec<TrendCluster>, ApiError> {
        send_json(self.http.get(self.url("/api/trends"))).await
    }

    /// GET `/api/articles`.
    pub async fn get_articles(&self) -> Result<Vec<RawArticle>, ApiError> {
        send_json(self.http.get(self.url("/api/articles"))).await
    }

    /// POST `/api/trigger-scan` with no body.
    pub async fn trigger_scan(&self) -> Result<ScanStatus, ApiError> {
        send_json(self.http.post(self.url("/api/trigger-scan"))).await
    }

    /// POST `/api/analyze/{content_id}` with no body.
    pub async fn analyze_article(&self, content_id: i64) -> Result<AnalysisResult, ApiError> {
        tracing::debug!(content_id, "Requesting article analysis");
        send_json(
            self.http
                .post(self.url(&format!("/api/analyze/{}", content_id))),
        )
        .await
    }

    /// GET `/api/health`.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        send_json(self.http.get(self.url("/api/health"))).await
    }
}

/// Send a request and decode a JSON body, mapping failures onto [`ApiError`].
async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        // An unreadable error body falls back to the status line.
        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            format!(
                "Request failed with status {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string()
        } else {
            body
        };
        tracing::debug!(status = status.as_u16(), message = %message, "Backend returned error status");
        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
