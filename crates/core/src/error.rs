use thiserror::Error;

/// Every way a notification can fail.
///
/// `Config`, `Api` and `Transport` abort the notification. `JobNotFound` is
/// soft: the resolver downgrades it to a failed status and keeps going.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("GitHub API request failed")]
    Api(#[source] anyhow::Error),
    #[error("Failed to deliver webhook")]
    Transport(#[source] anyhow::Error),
    #[error("No job named '{0}' in workflow run")]
    JobNotFound(String),
}

impl NotifyError {
    pub fn config(message: impl Into<String>) -> Self { Self::Config(message.into()) }
}

pub type Result<T, E = NotifyError> = std::result::Result<T, E>;
