//! Identity-preserving merge of incoming entities into a keyed collection

use crate::{EntityCollection, EntityError, Result};
use interact_core::{Value, ValueMap};

/// What happens to existing entities the incoming batch does not mention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Drop them; the batch becomes the whole collection
    Replace,
    /// Keep them untouched
    Merge,
}

/// Build the collection that results from applying `incoming` to `existing`
///
/// An incoming entity equal to the one already stored under its identity is
/// not adapted again: the stored value is kept, allocation and all. When
/// nothing changed and the identities are exactly those of `existing`, the
/// `existing` value itself is returned.
pub fn reconcile(
    collection: &EntityCollection,
    incoming: Vec<Value>,
    existing: &Value,
    mode: ReconcileMode,
) -> Result<Value> {
    let current = existing.as_map().ok_or(EntityError::NotACollection {
        got: existing.type_name(),
    })?;

    let mut indexed = match mode {
        ReconcileMode::Merge => current.clone(),
        ReconcileMode::Replace => ValueMap::with_capacity(incoming.len()),
    };

    let mut changed = false;
    for entity in incoming {
        let identity = collection.identity_of(&entity)?;
        match current.get(&identity) {
            Some(stored) if collection.values_equal(&entity, stored) => {
                indexed.insert(identity, stored.clone());
            }
            _ => {
                changed = true;
                indexed.insert(identity, collection.transform(entity)?);
            }
        }
    }

    let same_identities =
        indexed.len() == current.len() && indexed.keys().all(|k| current.contains_key(k));
    if !changed && same_identities {
        return Ok(existing.clone());
    }

    tracing::trace!(
        mode = ?mode,
        before = current.len(),
        after = indexed.len(),
        "reconciled entity collection"
    );
    Ok(Value::map(indexed))
}
