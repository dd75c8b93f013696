use thiserror::Error;

/// Errors surfaced by the map subsystem.
#[derive(Debug, Clone, Error)]
pub enum MapError {
    /// The credential failed the prefix/length check. Nothing was fetched.
    #[error("invalid map credential format: keys start with \"AIza\" and are at least 30 characters")]
    InvalidCredentialFormat,

    #[error(transparent)]
    Load(#[from] LoadError),

    /// The render target never appeared, or vanished while loading.
    #[error("map container '{0}' is not available")]
    ContainerUnavailable(String),
}

/// Why loading the map capability failed.
///
/// Carries the provider's message rather than the transport error so the
/// value can be shared between every caller joined on one load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("quota exceeded or billing issue: {0}")]
    QuotaExceeded(String),

    #[error("domain restriction: this origin is not allowed to use the key: {0}")]
    OriginRestricted(String),

    #[error("credential rejected by the map provider: {0}")]
    InvalidCredential(String),

    #[error("failed to load map capability: {0}")]
    Unknown(String),
}

impl LoadError {
    /// Sorts a provider failure message into one of the known causes. Key
    /// errors win over quota, and quota over origin restrictions.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        let owned = message.to_owned();
        if lower.contains("api key")
            || lower.contains("invalidkey")
            || lower.contains("expiredkey")
        {
            LoadError::InvalidCredential(owned)
        } else if lower.contains("quota") || lower.contains("billing") {
            LoadError::QuotaExceeded(owned)
        } else if lower.contains("referer") || lower.contains("origin") {
            LoadError::OriginRestricted(owned)
        } else {
            LoadError::Unknown(owned)
        }
    }

    /// Classifies a non-2xx bootstrap response. 429 is always quota.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}: {}", body.trim());
        if status == 429 {
            return LoadError::QuotaExceeded(message);
        }
        Self::classify(&message)
    }

    /// Short label for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::QuotaExceeded(_) => "quota_exceeded",
            LoadError::OriginRestricted(_) => "origin_restricted",
            LoadError::InvalidCredential(_) => "invalid_credential",
            LoadError::Unknown(_) => "unknown",
        }
    }
}

/// Errors from the reverse-geocoding provider. Never reach callers of
/// [`crate::GeocodeResolver::resolve`], which substitutes a fallback.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder returned status {status}{}", message_suffix(.message))]
    Status {
        status: String,
        message: Option<String>,
    },

    #[error("geocoder returned no results")]
    NoResults,

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid geocoder base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}
