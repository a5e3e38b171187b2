//! Per-class tables of named transitions, selectors and thunks
//!
//! A derived class starts from an overlay copy of its parent's table, so
//! redeclaring a name in the child shadows the parent's entry without ever
//! touching the parent.

use crate::thunk::ThunkContext;
use crate::{Error, Result, Unit, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A state transition: `(behavior, slice, args) -> new slice`
pub type TransitionFn<B> = Arc<dyn Fn(&B, Value, &[Value]) -> Result<Value> + Send + Sync>;

/// A read-only query over a unit's scoped slice
pub type SelectorFn<B> = Arc<dyn Fn(&B, &Value, &[Value]) -> Result<Value> + Send + Sync>;

/// A one-argument routine that may dispatch actions and read state
pub type ThunkFn<B> =
    Arc<dyn Fn(&Unit<B>, Value, &mut ThunkContext<'_>) -> Result<Value> + Send + Sync>;

/// One registered entry
pub enum Entry<B> {
    Transition(TransitionFn<B>),
    Selector(SelectorFn<B>),
    Thunk(ThunkFn<B>),
}

impl<B> Entry<B> {
    /// Human readable kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entry::Transition(_) => "transition",
            Entry::Selector(_) => "selector",
            Entry::Thunk(_) => "thunk",
        }
    }
}

impl<B> Clone for Entry<B> {
    fn clone(&self) -> Self {
        match self {
            Entry::Transition(f) => Entry::Transition(f.clone()),
            Entry::Selector(f) => Entry::Selector(f.clone()),
            Entry::Thunk(f) => Entry::Thunk(f.clone()),
        }
    }
}

impl<B> fmt::Debug for Entry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry::{}", self.kind_name())
    }
}

/// The entry table owned by one class
pub struct Registry<B> {
    class_name: String,
    parent: Option<String>,
    entries: IndexMap<String, Entry<B>>,
}

impl<B> Registry<B> {
    /// Create an empty registry for `class_name`
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            parent: None,
            entries: IndexMap::new(),
        }
    }

    /// A registry for a derived class, starting with every entry of `self`
    pub fn derive(&self, class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            parent: Some(self.class_name.clone()),
            entries: self.entries.clone(),
        }
    }

    /// Register `entry` under `name`, replacing any entry of the same name
    pub fn register(&mut self, name: impl Into<String>, entry: Entry<B>) -> Result<()> {
        let name = name.into();
        validate_name(&self.class_name, &name)?;
        self.entries.insert(name, entry);
        Ok(())
    }

    /// Name of the owning class
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Name of the class this one was derived from
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Look up an entry
    pub fn get(&self, name: &str) -> Option<&Entry<B>> {
        self.entries.get(name)
    }

    /// Look up an entry, failing loudly when it is missing
    pub fn require(&self, name: &str) -> Result<&Entry<B>> {
        self.get(name).ok_or_else(|| Error::UnknownEntry {
            class: self.class_name.clone(),
            name: name.to_string(),
        })
    }

    /// Check if an entry is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry<B>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of the registered transitions
    pub fn transition_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| matches!(entry, Entry::Transition(_)))
            .map(|(name, _)| name.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn wrong_kind(&self, name: &str, expected: &'static str, actual: &Entry<B>) -> Error {
        Error::WrongEntryKind {
            class: self.class_name.clone(),
            name: name.to_string(),
            expected,
            actual: actual.kind_name(),
        }
    }
}

impl<B> Clone for Registry<B> {
    fn clone(&self) -> Self {
        Self {
            class_name: self.class_name.clone(),
            parent: self.parent.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<B> fmt::Debug for Registry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("class_name", &self.class_name)
            .field("parent", &self.parent)
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Upper snake case form of an entry name, e.g. `setAll` and `set_all` both give `SET_ALL`
pub fn constant_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' {
            out.push('_');
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        out.extend(c.to_uppercase());
    }
    out
}

fn validate_name(class: &str, name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "entry names cannot be empty"
    } else if name.chars().any(char::is_whitespace) {
        "entry names cannot contain whitespace"
    } else if name.contains([':', '#']) {
        "entry names cannot contain ':' or '#'"
    } else {
        return Ok(());
    };
    Err(Error::InvalidRegistration {
        class: class.to_string(),
        name: name.to_string(),
        reason: reason.to_string(),
    })
}
