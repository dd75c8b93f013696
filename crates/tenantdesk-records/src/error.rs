use thiserror::Error;

/// Errors returned by the record service client.
#[derive(Debug, Error)]
pub enum RecordsError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered but its envelope reports a failure.
    #[error("record service error (statusCode {status_code}): {message}")]
    Api { status_code: i64, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid record service base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl RecordsError {
    /// HTTP status or envelope `statusCode`, when one is known.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RecordsError::Http(e) => e.status().map(|s| s.as_u16()),
            RecordsError::Api { status_code, .. } => u16::try_from(*status_code).ok(),
            RecordsError::Deserialize { .. } | RecordsError::InvalidBaseUrl { .. } => None,
        }
    }
}
