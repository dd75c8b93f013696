use crate::error::MapError;

const REQUIRED_PREFIX: &str = "AIza";
const MIN_LEN: usize = 30;
const VISIBLE_CHARS: usize = 10;

/// Access key for the external map capability.
///
/// Construction enforces the key shape, so holding a `Credential` means the
/// shape check already passed. Formatting only ever shows the first ten
/// characters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Trims and shape-checks a raw key.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidCredentialFormat`] when the key does not
    /// start with `AIza` or is shorter than 30 characters.
    pub fn parse(raw: &str) -> Result<Self, MapError> {
        let trimmed = raw.trim();
        if trimmed.len() < MIN_LEN || !trimmed.starts_with(REQUIRED_PREFIX) {
            return Err(MapError::InvalidCredentialFormat);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The full key, for building provider requests only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn visible(&self) -> &str {
        self.0.get(..VISIBLE_CHARS).unwrap_or(&self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential({}...)", self.visible())
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...", self.visible())
    }
}
