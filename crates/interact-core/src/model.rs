//! Immutable, kind-tagged records

use crate::{Value, ValueMap};
use serde::{Deserialize, Serialize};

/// An immutable application record tagged with the kind of model it is
///
/// Models are only ever built, never edited: every change yields a new model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    kind: String,
    fields: ValueMap,
}

impl Model {
    /// Create a new model of `kind` owning `fields`
    pub fn new(kind: impl Into<String>, fields: ValueMap) -> Self {
        Self {
            kind: kind.into(),
            fields,
        }
    }

    /// The kind marker
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Check the kind marker
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// All fields
    pub fn fields(&self) -> &ValueMap {
        &self.fields
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A copy of this model with one field replaced
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(key.into(), value.into());
        Self::new(self.kind.clone(), fields)
    }

    /// A copy of this model with `delta` shallow-merged over its fields
    pub fn merged(&self, delta: &ValueMap) -> Self {
        let mut fields = self.fields.clone();
        fields.extend(delta.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self::new(self.kind.clone(), fields)
    }

    /// Consume the model, keeping only its fields
    pub fn into_fields(self) -> ValueMap {
        self.fields
    }
}
