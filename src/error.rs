use thiserror::Error;

/// Errors that can occur while loading a directory listing
#[derive(Error, Debug)]
pub enum ListingError {
    #[error("Invalid location {location}, redirecting to {redirect_to}")]
    InvalidLocation {
        location: String,
        redirect_to: String,
    },

    #[error("Listing request failed: {status} {status_text}")]
    Transport { status: u16, status_text: String },

    #[error("Protocol mismatch: server sent version {received:?}, client supports {supported}")]
    ProtocolMismatch { received: String, supported: String },

    #[error("Invalid timestamp: {value:?}")]
    InvalidTimestamp { value: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ListingError {
    pub(crate) fn invalid_timestamp(value: impl Into<String>) -> Self {
        ListingError::InvalidTimestamp {
            value: value.into(),
        }
    }
}

/// Result type alias for listing operations
pub type Result<T> = std::result::Result<T, ListingError>;
