use thiserror::Error;

pub const CALCULATION_FAILED_FALLBACK: &str = "Calculation failed";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid grading service url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("grading service url '{url}' must use http or https")]
    UnsupportedScheme { url: String },
    #[error("grading service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("grading service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("grading service unavailable: {0}")]
    Unavailable(String),
}

impl ClientError {
    /// Text suitable for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::InvalidBaseUrl { url, .. } => {
                format!("Grading service address '{url}' is not a valid URL")
            }
            ClientError::UnsupportedScheme { url } => {
                format!("Grading service address '{url}' must start with http:// or https://")
            }
            ClientError::Transport(err) if err.is_timeout() => {
                "The grading service did not respond in time".to_string()
            }
            ClientError::Transport(err) if err.is_connect() => {
                "Could not connect to the grading service".to_string()
            }
            ClientError::Transport(err) if err.is_decode() => {
                "The grading service sent a response that could not be read".to_string()
            }
            ClientError::Transport(err) => err.to_string(),
            ClientError::Rejected { message, .. } => message.clone(),
            ClientError::Unavailable(reason) => reason.clone(),
        }
    }
}
