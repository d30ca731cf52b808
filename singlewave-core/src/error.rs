use thiserror::Error;

/// Error outputs from the SingleWave backend client.
///
/// None of these reach the host application: every public SDK operation logs
/// and continues. They exist so the internals can use `?` and so the outbox
/// can tell a failed delivery from a delivered one.
#[derive(Debug, Error)]
pub enum SingleWaveError {
    /// Network connection error with details
    #[error("network_error: {url} (status: {status:?}): {error}")]
    NetworkError {
        /// The URL the request was sent to
        url: String,
        /// HTTP status code, when a response was received
        status: Option<u16>,
        /// Error message
        error: String,
    },
}

impl SingleWaveError {
    /// Whether a later attempt of the same call could succeed.
    ///
    /// Transport failures, rate limiting and server errors qualify; other
    /// client errors do not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError { status: None, .. } => true,
            Self::NetworkError {
                status: Some(status),
                ..
            } => *status == 429 || (500..600).contains(status),
        }
    }
}
