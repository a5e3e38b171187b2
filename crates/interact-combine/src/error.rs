//! Error types for interact-combine

use interact_core::{MountPath, UnitId};
use thiserror::Error;

/// Result type for interact-combine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a combined reducer
#[derive(Debug, Error)]
pub enum Error {
    /// A key in the mount specification is empty
    #[error("empty mount key under '{parent}'")]
    EmptyKey { parent: MountPath },

    /// The same unit instance appears twice in one specification
    #[error("{class} ({unit}) is mounted at both '{first}' and '{second}'")]
    DuplicateMount {
        class: String,
        unit: UnitId,
        first: MountPath,
        second: MountPath,
    },

    /// Configuration text could not be parsed
    #[error("invalid combine config: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] interact_core::Error),
}

fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::DuplicateMount {
            class: "Todos".into(),
            unit: UnitId(4),
            first: MountPath::new(["a"]),
            second: MountPath::new(["b", "c"]),
        };
        assert_eq!(err.to_string(), "Todos (unit:4) is mounted at both 'a' and 'b.c'");

        let err = Error::EmptyKey {
            parent: MountPath::root(),
        };
        assert_eq!(err.to_string(), "empty mount key under ''");
    }
}
