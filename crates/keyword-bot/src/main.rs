use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ads_common::ads::{AdsClient, AdsClientConfig};
use ads_common::slack::SlackClient;

use keyword_bot::config::Config;
use keyword_bot::dispatch::{Dispatcher, ResearchJob};
use keyword_bot::error::AppError;
use keyword_bot::server::{self, AppState};
use keyword_bot::{format, resolver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("starting keyword-bot webhook server");

    let config = Config::from_env()?;
    let ads_config = AdsClientConfig::from_env()?;
    info!(
        base_url = %ads_config.base_url,
        customer_id = %ads_config.customer_id,
        timeout_ms = ads_config.timeout.as_millis(),
        "ads client configured"
    );

    let ads = Arc::new(AdsClient::new(ads_config)?);
    let slack = Arc::new(SlackClient::new(config.bot_token.clone())?);

    let dispatcher = {
        let ads = Arc::clone(&ads);
        let slack = Arc::clone(&slack);
        Dispatcher::start(config.queue_capacity, config.workers, move |job| {
            let ads = Arc::clone(&ads);
            let slack = Arc::clone(&slack);
            async move { run_research(&ads, &slack, job).await }
        })
    };
    info!(
        workers = config.workers,
        queue_capacity = config.queue_capacity,
        "research dispatcher started"
    );

    let state = Arc::new(AppState {
        dispatcher,
        slack: Arc::clone(&slack),
    });
    let app = server::router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "webhook server listening");
    axum::serve(listener, app).await?;

    info!("webhook server shut down");
    Ok(())
}

/// Worker body: fetch ideas, resolve, format, deliver. Every fault becomes
/// a user-visible apology in the triggering channel; nothing is retried.
async fn run_research(ads: &AdsClient, slack: &SlackClient, job: ResearchJob) {
    let message = match research(ads, &job.keyword).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, keyword = %job.keyword, "keyword research failed");
            format!("❌ Error researching keyword '{}': {e}", job.keyword)
        }
    };

    if let Err(e) = slack.post_message(&job.channel, &message).await {
        error!(error = %e, channel = %job.channel, "failed to deliver research results");
    }
}

async fn research(ads: &AdsClient, keyword: &str) -> Result<String, AppError> {
    let ideas = ads.generate_keyword_ideas(keyword).await?;
    let result = resolver::resolve(keyword, &ideas)?;
    Ok(format::slack_message(&result))
}
