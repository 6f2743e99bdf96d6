use std::sync::Arc;

/// Represents a result type for operations in the Beacon SDK.
///
/// This type alias is used throughout the SDK to indicate the result of operations that may return
/// errors specific to the Beacon SDK.
///
/// This `Result` type is a standard Rust `Result` type where the error variant is defined by the
/// beacon-specific [`Error`] enum.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum representing possible errors that can occur in the Beacon SDK.
///
/// Only client construction and shutdown are fallible. Event recording
/// (`track`/`identify`/`flush`) is fire-and-forget and never surfaces an
/// error to the caller.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Invalid ingestion_url configuration.
    #[error("invalid ingestion_url configuration")]
    InvalidIngestionUrl(#[source] url::ParseError),

    /// The API key is empty, likely a configuration mistake.
    #[error("api_key must not be empty")]
    EmptyApiKey,

    /// Indicates that the flusher thread panicked. This should normally never happen.
    #[error("flusher thread panicked")]
    FlusherThreadPanicked,

    /// An I/O error.
    #[error(transparent)]
    // std::io::Error is not clonable, so we're wrapping it in an Arc.
    Io(Arc<std::io::Error>),

    /// Network error.
    #[error(transparent)]
    Network(Arc<reqwest::Error>),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Network(Arc::new(value.without_url()))
    }
}
