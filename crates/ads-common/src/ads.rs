use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct AdsClientConfig {
    pub base_url: String,
    pub customer_id: String,
    pub developer_token: String,
    pub access_token: String,
    /// Language constant resource name, e.g. "languageConstants/1000" (English).
    pub language: String,
    /// Geo target constant resource name, e.g. "geoTargetConstants/784".
    pub geo_target: String,
    pub network: String,
    pub timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl AdsClientConfig {
    /// Load provider configuration from environment variables.
    ///
    /// Required:
    /// - `GOOGLE_ADS_CUSTOMER_ID`: account to bill keyword-idea requests against
    /// - `GOOGLE_ADS_DEVELOPER_TOKEN`: API developer token
    /// - `GOOGLE_ADS_ACCESS_TOKEN`: OAuth bearer token (token acquisition is
    ///   external to this service)
    ///
    /// Optional, with defaults: base URL, language/geo constants, network,
    /// timeout, and error-body cap.
    pub fn from_env() -> Result<Self, ProviderError> {
        let customer_id = require_env("GOOGLE_ADS_CUSTOMER_ID")?;
        let developer_token = require_env("GOOGLE_ADS_DEVELOPER_TOKEN")?;
        let access_token = require_env("GOOGLE_ADS_ACCESS_TOKEN")?;

        let base_url = std::env::var("GOOGLE_ADS_API_BASE_URL")
            .unwrap_or_else(|_| "https://googleads.googleapis.com/v16".to_string());

        let language = std::env::var("GOOGLE_ADS_LANGUAGE_CODE")
            .unwrap_or_else(|_| "languageConstants/1000".to_string());

        let geo_target = std::env::var("GOOGLE_ADS_LOCATION_CODE")
            .unwrap_or_else(|_| "geoTargetConstants/784".to_string());

        let network = std::env::var("GOOGLE_ADS_NETWORK")
            .unwrap_or_else(|_| "GOOGLE_SEARCH".to_string());

        let timeout = std::env::var("GOOGLE_ADS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let max_error_body_bytes = std::env::var("GOOGLE_ADS_MAX_ERROR_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(8 * 1024);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            customer_id,
            developer_token,
            access_token,
            language,
            geo_target,
            network,
            timeout,
            max_error_body_bytes,
        })
    }
}

fn require_env(name: &str) -> Result<String, ProviderError> {
    std::env::var(name)
        .map_err(|_| ProviderError::Config(format!("{name} environment variable is required")))
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("config error: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("authentication rejected: status={status} message={message}")]
    Auth { status: StatusCode, message: String },

    #[error("quota exhausted: {message}")]
    Quota { message: String },

    #[error("provider returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("provider returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },
}

/// Client for the keyword-ideas provider API.
///
/// Pure pass-through: one request per call, no retries, no caching. Faults
/// surface as `ProviderError` for the caller to report.
#[derive(Clone)]
pub struct AdsClient {
    config: AdsClientConfig,
    http: reqwest::Client,
}

impl AdsClient {
    pub fn new(config: AdsClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent("keyword-bot/ads-client")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &AdsClientConfig {
        &self.config
    }

    /// Fetch keyword ideas for a seed keyword.
    ///
    /// Returns the provider's idea list in the order received. Ideas without
    /// a metrics bundle are passed through untouched; deciding whether that
    /// is a fault belongs to the resolver, not the transport.
    pub async fn generate_keyword_ideas(
        &self,
        seed_keyword: &str,
    ) -> Result<Vec<KeywordIdea>, ProviderError> {
        let url = format!(
            "{}/customers/{}:generateKeywordIdeas",
            self.config.base_url, self.config.customer_id
        );

        let request = GenerateKeywordIdeasRequest {
            language: self.config.language.clone(),
            geo_target_constants: vec![self.config.geo_target.clone()],
            keyword_plan_network: self.config.network.clone(),
            keyword_seed: KeywordSeed {
                keywords: vec![seed_keyword.to_string()],
            },
        };

        debug!(seed = seed_keyword, %url, "requesting keyword ideas");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .header("developer-token", &self.config.developer_token)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await?;

        if resp.status().is_success() {
            let body = resp.json::<GenerateKeywordIdeasResponse>().await?;
            return Ok(body.results);
        }

        Err(self.to_provider_error(resp).await)
    }

    async fn to_provider_error(&self, resp: reqwest::Response) -> ProviderError {
        let status = resp.status();
        let body = read_limited_text(resp, self.config.max_error_body_bytes).await;

        let message = match serde_json::from_str::<AdsErrorEnvelope>(&body) {
            Ok(parsed) => parsed
                .error
                .message
                .unwrap_or_else(|| "unknown provider error".to_string()),
            Err(_) => return ProviderError::UpstreamBody { status, body },
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::Auth { status, message }
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::Quota { message },
            _ => ProviderError::Upstream { status, message },
        }
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read provider error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdsErrorEnvelope {
    error: AdsErrorObject,
}

#[derive(Debug, Deserialize)]
struct AdsErrorObject {
    message: Option<String>,
    #[allow(dead_code)]
    status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateKeywordIdeasRequest {
    language: String,
    geo_target_constants: Vec<String>,
    keyword_plan_network: String,
    keyword_seed: KeywordSeed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct KeywordSeed {
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateKeywordIdeasResponse {
    #[serde(default)]
    results: Vec<KeywordIdea>,
}

/// A candidate search term with its estimated search-volume statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordIdea {
    pub text: String,
    /// Absent when the provider returns an idea without statistics.
    pub keyword_idea_metrics: Option<KeywordIdeaMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordIdeaMetrics {
    pub avg_monthly_searches: i64,
    pub competition: CompetitionLevel,
    #[serde(default)]
    pub monthly_search_volumes: Vec<MonthlySearchVolume>,
}

/// Provider-assigned tier describing advertiser bidding pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitionLevel {
    Unspecified,
    Unknown,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for CompetitionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Unknown => "UNKNOWN",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        };
        f.write_str(name)
    }
}

/// One per-month search-volume sample. Month numbers 1..13 are expected;
/// 13 is the provider's rollover bucket for January.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySearchVolume {
    pub month: i32,
    pub monthly_searches: i64,
}
