//! Model adapters: turning raw records into tagged, immutable model values

use crate::{EntityError, Result};
use interact_core::{Model, Value, ValueMap};

/// Converts raw records into models of one kind
///
/// `to_model` never touches the caller's data: the fields are copied, run
/// through [`ModelAdapter::transform_properties`] and wrapped in a new
/// [`Model`]. A value that already is a model of this kind is returned as
/// is, so adapting twice is the same as adapting once.
pub trait ModelAdapter: Send + Sync {
    /// The kind marker stamped on every model this adapter builds
    fn kind(&self) -> &str;

    /// Hook for reshaping fields before they are frozen into a model
    fn transform_properties(&self, _fields: &mut ValueMap) -> Result<()> {
        Ok(())
    }

    /// Adapt `raw` into a model of this kind
    fn to_model(&self, raw: Value) -> Result<Value> {
        if raw.as_model().is_some_and(|m| m.is_kind(self.kind())) {
            return Ok(raw);
        }
        let mut fields = raw.fields().cloned().ok_or(EntityError::NotARecord {
            got: raw.type_name(),
        })?;
        self.transform_properties(&mut fields)?;
        Ok(Model::new(self.kind(), fields).into())
    }
}

/// Adapter that only stamps the kind marker
#[derive(Debug, Clone)]
pub struct KindAdapter {
    kind: String,
}

impl KindAdapter {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl ModelAdapter for KindAdapter {
    fn kind(&self) -> &str {
        &self.kind
    }
}
