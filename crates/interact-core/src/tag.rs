//! Action tags and unit identities
//!
//! Every unit instance synthesizes its own tags, so two instances of the same
//! class never answer to each other's actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque tag identifying which transition an action targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionTag(String);

impl ActionTag {
    /// Create a tag from raw text
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Get the tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActionTag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Source of collision-free action tags
pub trait TagGenerator: Send + Sync {
    /// Produce a tag for entry `name` of class `class` that no earlier call returned
    fn generate(&self, class: &str, name: &str) -> ActionTag;
}

/// Counter-backed generator rendering `"{class}:{name}#{n}"`
#[derive(Debug, Default)]
pub struct SequentialTags {
    next: AtomicU64,
}

impl SequentialTags {
    /// Create a generator starting at 0
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// The process-wide generator used when none is injected
    pub fn global() -> &'static SequentialTags {
        static GLOBAL: SequentialTags = SequentialTags::new();
        &GLOBAL
    }
}

impl TagGenerator for SequentialTags {
    fn generate(&self, class: &str, name: &str) -> ActionTag {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ActionTag(format!("{}:{}#{}", class, name, n))
    }
}

/// Process-unique identifier of a unit instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl UnitId {
    /// Allocate the next id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit:{}", self.0)
    }
}
