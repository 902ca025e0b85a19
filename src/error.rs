use thiserror::Error;

/// Errors raised by controller actions and the layers beneath them.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: HTTP {status} - {message}")]
    Api { status: u16, message: String },

    #[error("No previewed video to save")]
    NoCurrentVideo,

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Text shown in the error banner.
    ///
    /// Mirrors what a user of the web page sees: bare server messages for API
    /// failures, fixed wording for local ones.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Network(msg) => format!("Network error: {}", msg),
            AppError::Api { message, .. } => message.clone(),
            AppError::NoCurrentVideo => "No video to save".to_string(),
            AppError::Decode(msg) => format!("Unexpected server response: {}", msg),
            AppError::Config(msg) => format!("Configuration error: {}", msg),
            AppError::Io(e) => format!("File system error: {}", e),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::Decode(e.to_string())
        } else {
            AppError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
