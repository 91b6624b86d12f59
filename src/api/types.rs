use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Failures of a single backend round trip.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, DNS, TLS, reset mid-body.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the body text, or a synthesized
    /// status line when the body was empty.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// A 2xx response whose body was not the expected JSON.
    #[error("Invalid JSON in response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rejected locally before any request was made.
    #[error("Text to analyze is empty")]
    EmptyText,
}

impl ApiError {
    /// The single human-readable string surfaced to the user.
    ///
    /// For HTTP errors this is exactly the backend's body text (or the
    /// synthesized status line), without any prefix.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Parse(_) | ApiError::EmptyText => None,
        }
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Backend verdict for one analysis request.
///
/// Immutable once received; a newer result replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub report: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verification_results: Vec<Claim>,
}

/// One verified assertion. Every field may be missing from the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default)]
    pub claim: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub correction: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub trusted: Option<bool>,
}

/// Where the active analysis came from. Display attribution only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSource {
    Text { label: String },
    Article { label: String },
}

impl AnalysisSource {
    pub fn label(&self) -> &str {
        match self {
            AnalysisSource::Text { label } | AnalysisSource::Article { label } => label,
        }
    }
}

// ============================================================================
// Trends and Articles
// ============================================================================

/// A recurring narrative grouped by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendCluster {
    pub topic: String,
    pub count: u64,
    #[serde(default)]
    pub examples: Option<Vec<String>>,
}

/// An ingested item as stored by the backend scanner.
///
/// `id` is the only field used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    pub id: i64,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl RawArticle {
    /// Label used to attribute an analysis of this article.
    ///
    /// Falls back from title to source id to `Article #{id}`; empty strings
    /// count as missing.
    pub fn analysis_label(&self) -> String {
        non_empty(&self.title)
            .or_else(|| non_empty(&self.source_id))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Article #{}", self.id))
    }

    /// Title shown in the article list.
    pub fn display_title(&self) -> String {
        match non_empty(&self.title) {
            Some(title) => title.to_string(),
            None => format!(
                "Item from {}",
                self.source_id.as_deref().unwrap_or("unknown source")
            ),
        }
    }

    /// Body preview: text content, else URL.
    pub fn preview(&self) -> Option<&str> {
        non_empty(&self.text_content).or_else(|| non_empty(&self.url))
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

// ============================================================================
// Scan and Health
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article(id: i64) -> RawArticle {
        RawArticle {
            id,
            source_id: None,
            external_id: None,
            url: None,
            content_type: None,
            title: None,
            text_content: None,
            published_at: None,
        }
    }

    #[test]
    fn test_analysis_result_tolerates_missing_fields() {
        let result: AnalysisResult = serde_json::from_str(r#"{"status":"done"}"#).unwrap();
        assert_eq!(result.status, "done");
        assert!(result.report.is_empty());
        assert!(result.verification_results.is_empty());
    }

    #[test]
    fn test_claim_with_null_evidence() {
        let json = r#"{
            "status": "ok",
            "report": "**R**",
            "verification_results": [
                {"claim": "Vitamin C cures colds", "status": "False", "evidence": null},
                {}
            ]
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.verification_results.len(), 2);
        assert_eq!(
            result.verification_results[0].claim.as_deref(),
            Some("Vitamin C cures colds")
        );
        assert!(result.verification_results[0].evidence.is_empty());
        assert_eq!(result.verification_results[1], Claim::default());
    }

    #[test]
    fn test_raw_article_nulls() {
        let json = r#"{"id": 7, "source_id": null, "title": "Headline", "url": null}"#;
        let a: RawArticle = serde_json::from_str(json).unwrap();
        assert_eq!(a.id, 7);
        assert_eq!(a.title.as_deref(), Some("Headline"));
        assert!(a.source_id.is_none());
    }

    #[test]
    fn test_analysis_label_fallbacks() {
        let mut a = article(42);
        assert_eq!(a.analysis_label(), "Article #42");

        a.source_id = Some("bbc".to_string());
        assert_eq!(a.analysis_label(), "bbc");

        a.title = Some(String::new());
        assert_eq!(a.analysis_label(), "bbc");

        a.title = Some("Flu season starts early".to_string());
        assert_eq!(a.analysis_label(), "Flu season starts early");
    }

    #[test]
    fn test_display_title_and_preview() {
        let mut a = article(1);
        a.source_id = Some("cnn".to_string());
        assert_eq!(a.display_title(), "Item from cnn");
        assert_eq!(a.preview(), None);

        a.url = Some("https://example.com/a".to_string());
        assert_eq!(a.preview(), Some("https://example.com/a"));

        a.text_content = Some("Body".to_string());
        assert_eq!(a.preview(), Some("Body"));
    }

    #[test]
    fn test_user_message_is_body_text_for_http() {
        let err = ApiError::Http {
            status: 400,
            message: "no-op".to_string(),
        };
        assert_eq!(err.user_message(), "no-op");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_source_label() {
        let s = AnalysisSource::Article {
            label: "x".to_string(),
        };
        assert_eq!(s.label(), "x");
    }
}
