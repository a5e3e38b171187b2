//! Error types for interact-core

use crate::MountPath;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A selector or scoped operation ran before the unit was mounted
    #[error("{class} is not mounted; compose it into a tree before reading scoped state")]
    NotMounted { class: String },

    /// The state handed to a selector does not contain the unit's mount path
    #[error(
        "called selector on {class} with an invalid state object (no path '{path}'); \
         perhaps a selector is calling another selector, or the unit isn't mounted at all"
    )]
    PathNotFound { class: String, path: MountPath },

    /// No entry with this name is registered for the class
    #[error("{class} has no entry named '{name}'")]
    UnknownEntry { class: String, name: String },

    /// The entry exists but is of a different kind than requested
    #[error("{class}#{name} is a {actual}, not a {expected}")]
    WrongEntryKind {
        class: String,
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A registration was rejected while a class was being defined
    #[error("invalid registration {class}#{name}: {reason}")]
    InvalidRegistration {
        class: String,
        name: String,
        reason: String,
    },

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    /// A reducer, selector or thunk body failed
    #[error("reducer failed: {0}")]
    Reducer(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Build a type error from the expected type and the value actually received
    pub fn type_error(expected: impl Into<String>, got: &crate::Value) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.type_name().to_string(),
        }
    }

    /// Wrap a domain error raised inside a reducer body
    pub fn reducer(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Reducer(Box::new(err))
    }

    /// Downcast the boxed source of a `Reducer` error
    pub fn reducer_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Reducer(source) => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
