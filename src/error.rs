use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Product #{index} of document {doc_id}: one of uit_code/uitu_code is required")]
    MissingUnitCode { doc_id: String, index: usize },

    #[error("API error: HTTP {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl AppError {
    /// Whether repeating the same request may succeed.
    /// Transport failures and server-side errors qualify; bad input and 4xx do not.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Http(e) => !e.is_builder(),
            AppError::Api { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
