//! Identity and equality hooks for entity collections

use crate::{EntityError, Result};
use interact_core::Value;

/// How a collection identifies and compares its entities
///
/// Both hooks must be pure; they run many times per dispatch.
pub trait EntityHooks: Send + Sync {
    /// The identity of `entity`, read from its `id` field by default
    fn extract_identity(&self, entity: &Value) -> Result<String> {
        identity_from_field(entity, "id")
    }

    /// Whether two entities carry the same data, structurally by default
    fn values_equal(&self, a: &Value, b: &Value) -> bool {
        a.deep_eq(b)
    }
}

/// The default hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl EntityHooks for DefaultHooks {}

/// Hooks reading the identity from a field other than `id`
#[derive(Debug, Clone)]
pub struct IdentityField {
    field: String,
}

impl IdentityField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl EntityHooks for IdentityField {
    fn extract_identity(&self, entity: &Value) -> Result<String> {
        identity_from_field(entity, &self.field)
    }
}

fn identity_from_field(entity: &Value, field: &str) -> Result<String> {
    entity
        .get(field)
        .and_then(Value::as_key)
        .ok_or_else(|| EntityError::MissingIdentity {
            entity: entity.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity() {
        let hooks = DefaultHooks;
        assert_eq!(
            hooks.extract_identity(&Value::record([("id", 1)])).unwrap(),
            "1"
        );
        assert_eq!(
            hooks.extract_identity(&Value::record([("id", "abc")])).unwrap(),
            "abc"
        );
        assert!(matches!(
            hooks.extract_identity(&Value::record([("name", "x")])),
            Err(EntityError::MissingIdentity { .. })
        ));
    }

    #[test]
    fn test_identity_field() {
        let hooks = IdentityField::new("slug");
        let entity = Value::record([("id", "1"), ("slug", "hello")]);
        assert_eq!(hooks.extract_identity(&entity).unwrap(), "hello");
    }

    #[test]
    fn test_default_equality_is_structural() {
        let hooks = DefaultHooks;
        let a = Value::record([("id", 1), ("v", 1)]);
        let b = Value::record([("id", 1), ("v", 1)]);
        let c = Value::record([("id", 1), ("v", 2)]);
        assert!(hooks.values_equal(&a, &b));
        assert!(!hooks.values_equal(&a, &c));
    }
}
