//! Error types used throughout posterforge.
//!
//! Most failures in poster resolution are expected and degrade to "no
//! result"; only the variants below ever reach a caller.

/// Error type for posterforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The downloaded bytes could not be decoded as an image.
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The normalized bitmap could not be re-encoded.
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// A poster sink failed to store a normalized image.
    #[error("Sink error: {0}")]
    Sink(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An HTTP request could not be built or sent.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration was provided.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A blocking task was cancelled or panicked.
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Create a new Sink error.
    pub fn sink<S: Into<String>>(msg: S) -> Self {
        Self::Sink(msg.into())
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Returns `true` if this error means the source bytes were not an image.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result type alias using the posterforge Error type.
pub type Result<T> = std::result::Result<T, Error>;
