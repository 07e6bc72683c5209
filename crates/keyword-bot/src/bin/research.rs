//! One-shot keyword research from the command line.
//!
//! Usage: `research [keyword]`. Prints the plain-text report to stdout;
//! logs go to stderr so the report stays clean.

use tracing_subscriber::EnvFilter;

use ads_common::ads::{AdsClient, AdsClientConfig};
use keyword_bot::{format, resolver};

const DEFAULT_KEYWORD: &str = "digital marketing dubai";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let keyword = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_KEYWORD.to_string());

    let config = AdsClientConfig::from_env()?;
    let client = AdsClient::new(config)?;

    let ideas = client.generate_keyword_ideas(&keyword).await?;
    let result = resolver::resolve(&keyword, &ideas)?;
    print!("{}", format::plain_report(&result));

    Ok(())
}
