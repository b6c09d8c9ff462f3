//! Error types for parsing, submission and message processing

use thiserror::Error;

/// The raw input is not a usable RFC 5322 message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedMessageError {
    /// No blank line separates the header block from the body
    #[error("No blank line separating headers from body")]
    MissingHeaderSeparator,

    /// A header line could not be split into name and value
    #[error("Invalid header line: {0}")]
    InvalidHeader(String),

    /// A multipart content type without a boundary parameter
    #[error("Multipart content type without boundary: {0}")]
    MissingBoundary(String),
}

/// The ticket could not be delivered to the API
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// The API answered with a non-2xx status
    #[error("Ticket API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or protocol failure before a status was received
    #[error("Ticket API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The ticket payload could not be encoded as JSON
    #[error("Failed to encode ticket payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing the payload to a local sink failed
    #[error("Failed to write ticket payload: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure that turns an inbound message into a rejection
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Draining the inbound stream failed
    #[error("Failed to read raw message: {0}")]
    Read(#[source] std::io::Error),

    #[error(transparent)]
    Malformed(#[from] MalformedMessageError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Invalid or incomplete configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::Config`]
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required setting has no value
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// The endpoint is not an absolute http(s) URL
    #[error("Invalid endpoint URL {url}: {details}")]
    InvalidEndpoint { url: String, details: String },
}

/// Result type for message parsing operations
pub type Result<T> = std::result::Result<T, MalformedMessageError>;
