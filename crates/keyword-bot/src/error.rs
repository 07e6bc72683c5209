use ads_common::ads::ProviderError;
use ads_common::slack::DeliveryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// An idea came back without its metrics bundle. Failing loudly here is
    /// deliberate: defaulting the numbers would corrupt displayed statistics.
    #[error("keyword idea '{text}' is missing its metrics")]
    MalformedIdea { text: String },

    #[error("research queue is full")]
    QueueFull,

    #[error("config error: {0}")]
    Config(String),
}
