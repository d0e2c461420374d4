//! Value objects of the game domain.

use serde::Serialize;
use uuid::Uuid;

use super::error::ValueObjectError;

const MAX_SESSION_ID_LENGTH: usize = 64;

/// Opaque identifier of a two-player game session.
///
/// Only ASCII alphanumerics, `-` and `_` are accepted so the id can be used
/// as a URL path segment without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::SessionIdEmpty);
        }
        if value.len() > MAX_SESSION_ID_LENGTH {
            return Err(ValueObjectError::SessionIdTooLong(value.len()));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValueObjectError::SessionIdInvalidCharacter(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Generates fresh session ids.
pub struct SessionIdFactory;

impl SessionIdFactory {
    pub fn generate() -> Result<SessionId, ValueObjectError> {
        SessionId::new(Uuid::new_v4().to_string())
    }
}
