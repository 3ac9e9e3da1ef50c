use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("No webhook url for channel: \"{0}\"")]
    NoWebhook(String),

    #[error("Either summary or text is required")]
    MissingContent,

    #[error("Invalid notify configuration: {0}")]
    Config(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Webhook responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Chat API reported an error: {0}")]
    ApiError(String),

    #[error("Failed to serialize message: {0}")]
    SerializationError(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(error: reqwest::Error) -> Self {
        NotifyError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(error: serde_json::Error) -> Self {
        NotifyError::SerializationError(error.to_string())
    }
}

impl From<toml::de::Error> for NotifyError {
    fn from(error: toml::de::Error) -> Self {
        NotifyError::Config(error.to_string())
    }
}
