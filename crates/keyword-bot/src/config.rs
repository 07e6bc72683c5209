use crate::error::AppError;

/// Service configuration loaded explicitly from environment variables.
///
/// Provider-side settings live in `ads_common::ads::AdsClientConfig`; this
/// covers the bot itself.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token used for posting messages back to the chat platform.
    pub bot_token: String,
    /// Port the webhook server listens on.
    pub port: u16,
    /// Number of research workers draining the job queue.
    pub workers: usize,
    /// Bound on queued research jobs; submissions beyond this are rejected.
    pub queue_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `SLACK_BOT_TOKEN`: chat bot token
    ///
    /// Optional:
    /// - `PORT` (default 5000)
    /// - `RESEARCH_WORKERS` (default 4)
    /// - `RESEARCH_QUEUE_CAPACITY` (default 64)
    pub fn from_env() -> Result<Self, AppError> {
        let bot_token = std::env::var("SLACK_BOT_TOKEN").map_err(|_| {
            AppError::Config("SLACK_BOT_TOKEN environment variable is required".to_string())
        })?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(5000);

        let workers = std::env::var("RESEARCH_WORKERS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(4);

        let queue_capacity = std::env::var("RESEARCH_QUEUE_CAPACITY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(64);

        Ok(Self {
            bot_token,
            port,
            workers,
            queue_capacity,
        })
    }
}
