use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    /// A provider's listing call failed; the whole aggregation is aborted.
    #[error("provider {provider} unavailable: {source:#}")]
    Upstream {
        provider: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("article not found: {0}")]
    NotFound(String),

    #[error("article fetch cancelled")]
    Cancelled,

    #[error("provider task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
