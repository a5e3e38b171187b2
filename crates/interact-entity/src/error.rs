//! Error types for interact-entity

use thiserror::Error;

/// Errors raised by entity collection reducers and hooks
#[derive(Error, Debug)]
pub enum EntityError {
    #[error("update was given an update for entity '{identity}', which does not exist in the collection")]
    MissingEntity { identity: String },

    #[error("entity has no usable identity: {entity}")]
    MissingIdentity { entity: String },

    #[error("collection slice must be a map, got {got}")]
    NotACollection { got: &'static str },

    #[error("expected a record, got {got}")]
    NotARecord { got: &'static str },
}

impl From<EntityError> for interact_core::Error {
    fn from(err: EntityError) -> Self {
        interact_core::Error::reducer(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EntityError>;
