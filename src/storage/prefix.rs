// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

/// Optional key prefix for namespacing (e.g., "myapp:" → "myapp:user.alice")
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply the prefix to a key.
    #[inline]
    pub fn apply(&self, key: &str) -> String {
        if self.0.is_empty() {
            key.to_string()
        } else {
            format!("{}{}", self.0, key)
        }
    }

    /// Strip the prefix from a key (for returning clean IDs).
    #[inline]
    pub fn strip<'a>(&self, key: &'a str) -> &'a str {
        if self.0.is_empty() {
            key
        } else {
            key.strip_prefix(&self.0).unwrap_or(key)
        }
    }

    /// `SCAN MATCH` pattern covering every key under this prefix
    pub fn pattern(&self) -> String {
        format!("{}*", self.0)
    }
}

impl From<&str> for KeyPrefix {
    fn from(prefix: &str) -> Self {
        Self::new(prefix)
    }
}
