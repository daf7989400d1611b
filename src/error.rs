//! Crate-wide error type. Only acquisition, configuration and output can fail;
//! the calculators themselves are infallible.

#[derive(thiserror::Error, Debug)]
pub enum AnalyticsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A record source could not produce one of its collections.
    #[error("Failed to fetch {collection}: {message}")]
    Source {
        collection: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
