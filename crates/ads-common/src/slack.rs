use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://slack.com/api";

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("chat API rejected message: {0}")]
    Api(String),

    #[error("chat API returned error: status={status} body={body}")]
    Http { status: StatusCode, body: String },
}

/// Chat-delivery sink. Posts messages to a channel; no retries and no
/// delivery confirmation beyond the API acknowledgement.
#[derive(Clone)]
pub struct SlackClient {
    bot_token: String,
    base_url: String,
    http: reqwest::Client,
}

impl SlackClient {
    pub fn new(bot_token: String) -> Result<Self, DeliveryError> {
        Self::with_base_url(bot_token, DEFAULT_BASE_URL.to_string())
    }

    /// Build a client against a non-default API root (tests, proxies).
    pub fn with_base_url(bot_token: String, base_url: String) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .user_agent("keyword-bot/slack-client")
            .build()?;
        Ok(Self {
            bot_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/chat.postMessage", self.base_url);
        let body = PostMessageRequest { channel, text };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.bot_token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Http { status, body });
        }

        // Slack reports application-level failures with HTTP 200.
        let ack = resp.json::<PostMessageResponse>().await?;
        if !ack.ok {
            return Err(DeliveryError::Api(
                ack.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        debug!(channel, "message posted");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}
