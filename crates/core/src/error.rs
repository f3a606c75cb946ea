//! Error types for deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a company deck.
#[derive(Error, Debug)]
pub enum Error {
    /// The submitted ticker was empty after trimming.
    #[error("Please enter company ticker!")]
    EmptyTicker,

    /// A submitted metric name is not one of the supported metrics.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// The market-data provider does not know the ticker.
    #[error("Unknown or invalid ticker: {0}")]
    InvalidTicker(String),

    /// The provider was unreachable or returned something we could not decode.
    #[error("Market data provider error: {0}")]
    Provider(String),

    /// An expected field was absent from the provider response.
    #[error("Missing field in provider response: {0}")]
    MissingField(String),

    /// Downloading or decoding the company logo failed.
    #[error("Failed to fetch logo: {0}")]
    LogoFetch(String),

    /// Failed to render a chart or normalize an image.
    #[error("Rendering error: {0}")]
    Render(String),

    /// The slide template is missing or does not have the expected layout.
    #[error("Template error: {0}")]
    Template(String),

    /// Failed to write the finished presentation.
    #[error("Failed to serialize presentation: {0}")]
    Serialization(String),

    /// Filesystem error (template loading, temporary assets).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlError(String),
}

impl Error {
    /// Whether this is an input validation problem rather than a pipeline failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::EmptyTicker | Error::UnknownMetric(_))
    }
}
