//! Session identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Per-invocation token namespacing local files and artifact keys
///
/// UUID v4 in simple (32 lower-case hex digits) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accept a session id from a request path
    ///
    /// Only the simple hex form is accepted, so a parsed id is always safe to
    /// use as a file-name prefix.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let uuid = Uuid::try_parse(value).ok()?;
        let simple = uuid.simple().to_string();
        if simple == value.to_ascii_lowercase() {
            Some(Self(simple))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_simple_hex_and_distinct() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_accepts_only_simple_form() {
        let id = SessionId::new();
        assert_eq!(SessionId::parse(id.as_str()), Some(id.clone()));
        assert_eq!(
            SessionId::parse(&id.as_str().to_ascii_uppercase()),
            Some(id)
        );
        assert!(SessionId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").is_none());
        assert!(SessionId::parse("../../etc/passwd").is_none());
        assert!(SessionId::parse("").is_none());
    }
}
