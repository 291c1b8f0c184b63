use crate::config::ValidationError;
use crate::creators::CreateError;
use crate::notifications::NotifyError;
use thiserror::Error;

/// Errors that stop the relay from starting or serving
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Notification sink error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Resource creator error: {0}")]
    Creator(#[from] CreateError),
}
