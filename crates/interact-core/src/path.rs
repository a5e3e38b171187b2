//! Mount paths locating a unit's slice inside the whole-state tree

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered keys from the root of the state tree down to a unit's slice
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MountPath(Vec<String>);

impl MountPath {
    /// Create a mount path from its keys
    pub fn new<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// The root path (no keys)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A new path with `key` appended
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.into());
        Self(keys)
    }

    /// The keys of this path
    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this is the root path
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MountPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl AsRef<[String]> for MountPath {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

impl From<&[&str]> for MountPath {
    fn from(keys: &[&str]) -> Self {
        Self::new(keys.iter().copied())
    }
}

impl From<Vec<String>> for MountPath {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}
