//! Entity collections: units whose slice maps identities to model values
//!
//! The base class registers `set_all`, `set`, `update` and `delete`
//! transitions plus `get_all`, `get_all_ids` and `get_by_id` selectors.
//! Applications derive their own collections from it:
//!
//! ```
//! use interact_entity::{Collection, EntityCollection, KindAdapter};
//! use interact_core::{MountPath, Value};
//!
//! let users = EntityCollection::class()
//!     .unwrap()
//!     .derive("Users")
//!     .build()
//!     .unwrap()
//!     .instantiate(EntityCollection::new().with_model(KindAdapter::new("user")));
//!
//! let set = users.action("set").unwrap();
//! let slice = users
//!     .apply_action(None, &set.call1(Value::record([("id", Value::Int(1)), ("name", "Ada".into())])))
//!     .unwrap();
//!
//! users.mount_at(MountPath::new(["users"]));
//! let whole = Value::record([("users", slice)]);
//! assert_eq!(users.get_all_ids(&whole).unwrap(), ["1"]);
//! ```

use crate::reconcile::{reconcile, ReconcileMode};
use crate::{DefaultHooks, EntityError, EntityHooks, ModelAdapter};
use interact_core::{ClassBuilder, Error, Result, Unit, UnitClass, Value, ValueMap};
use std::fmt;
use std::sync::Arc;

/// Behavior of an entity collection unit: its hooks and optional model adapter
#[derive(Clone)]
pub struct EntityCollection {
    hooks: Arc<dyn EntityHooks>,
    model: Option<Arc<dyn ModelAdapter>>,
}

impl EntityCollection {
    /// A collection keyed by `id`, compared structurally, storing raw records
    pub fn new() -> Self {
        Self {
            hooks: Arc::new(DefaultHooks),
            model: None,
        }
    }

    /// Replace the identity and equality hooks
    pub fn with_hooks(mut self, hooks: impl EntityHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Store entities as models built by `adapter`
    pub fn with_model(mut self, adapter: impl ModelAdapter + 'static) -> Self {
        self.model = Some(Arc::new(adapter));
        self
    }

    /// The model adapter, if any
    pub fn model(&self) -> Option<&dyn ModelAdapter> {
        self.model.as_deref()
    }

    /// Identity of `entity`
    pub fn identity_of(&self, entity: &Value) -> crate::Result<String> {
        self.hooks.extract_identity(entity)
    }

    /// Whether two entities carry the same data
    pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
        self.hooks.values_equal(a, b)
    }

    /// Coerce `entity` into the collection's model, or pass it through
    pub fn transform(&self, entity: Value) -> crate::Result<Value> {
        match &self.model {
            Some(adapter) => adapter.to_model(entity),
            None => Ok(entity),
        }
    }

    /// The base `EntityCollection` class
    pub fn class() -> Result<UnitClass<EntityCollection>> {
        UnitClass::builder("EntityCollection")
            .transition("set_all", |coll: &EntityCollection, state, args| {
                let entities = batch(args.first());
                Ok(reconcile(coll, entities, &state, ReconcileMode::Replace)?)
            })
            .transition("set", |coll: &EntityCollection, state, args| {
                let entities = batch(args.first());
                Ok(reconcile(coll, entities, &state, ReconcileMode::Merge)?)
            })
            .transition("update", |coll: &EntityCollection, state, args| {
                Ok(coll.update(&state, batch(args.first()))?)
            })
            .transition("delete", |_: &EntityCollection, state, args| {
                Ok(delete(&state, batch(args.first()))?)
            })
            .selector("get_all", |_: &EntityCollection, scoped, _| Ok(scoped.clone()))
            .selector("get_all_ids", |_: &EntityCollection, scoped, _| {
                let ids = collection_map(scoped)?
                    .keys()
                    .map(|k| Value::from(k.as_str()))
                    .collect();
                Ok(Value::list(ids))
            })
            .selector("get_by_id", |_: &EntityCollection, scoped, args| {
                let map = collection_map(scoped)?;
                Ok(args
                    .first()
                    .and_then(Value::as_key)
                    .and_then(|id| map.get(&id).cloned())
                    .unwrap_or_default())
            })
            .build()
    }

    /// Start defining a collection class derived from the base class
    pub fn derive(name: impl Into<String>) -> Result<ClassBuilder<EntityCollection>> {
        Ok(Self::class()?.derive(name))
    }

    /// Shallow-merge each delta onto the stored entity of the same identity
    fn update(&self, state: &Value, deltas: Vec<Value>) -> crate::Result<Value> {
        let current = state.as_map().ok_or(EntityError::NotACollection {
            got: state.type_name(),
        })?;

        let mut merged = Vec::with_capacity(deltas.len());
        for delta in deltas {
            let identity = self.identity_of(&delta)?;
            let Some(stored) = current.get(&identity) else {
                return Err(EntityError::MissingEntity { identity });
            };
            let mut fields = stored.fields().cloned().ok_or(EntityError::NotARecord {
                got: stored.type_name(),
            })?;
            let delta_fields = delta.fields().ok_or(EntityError::NotARecord {
                got: delta.type_name(),
            })?;
            fields.extend(delta_fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged.push(Value::map(fields));
        }

        reconcile(self, merged, state, ReconcileMode::Merge)
    }
}

impl Default for EntityCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCollection")
            .field("model", &self.model.as_ref().map(|m| m.kind().to_string()))
            .finish_non_exhaustive()
    }
}

/// Typed selectors and helpers for units built from an entity collection class
pub trait Collection {
    /// The whole collection slice
    fn get_all(&self, whole: &Value) -> Result<Value>;

    /// Every identity in the collection
    fn get_all_ids(&self, whole: &Value) -> Result<Vec<String>>;

    /// The entity stored under `id`
    fn get_by_id(&self, whole: &Value, id: &str) -> Result<Option<Value>>;

    /// Re-adapt every stored entity through the model adapter and write the
    /// collection back into `whole`
    ///
    /// Meant for state restored from storage before the adapter ever ran.
    /// Returns `whole` itself when the collection is empty or absent.
    fn reindex_whole_tree(&self, whole: &Value) -> Result<Value>;
}

impl Collection for Unit<EntityCollection> {
    fn get_all(&self, whole: &Value) -> Result<Value> {
        self.select_with(whole, |_, scoped| Ok(scoped.clone()))
    }

    fn get_all_ids(&self, whole: &Value) -> Result<Vec<String>> {
        self.select_with(whole, |_, scoped| {
            Ok(collection_map(scoped)?.keys().cloned().collect())
        })
    }

    fn get_by_id(&self, whole: &Value, id: &str) -> Result<Option<Value>> {
        self.select_with(whole, |_, scoped| Ok(collection_map(scoped)?.get(id).cloned()))
    }

    fn reindex_whole_tree(&self, whole: &Value) -> Result<Value> {
        let Some(path) = self.mount_point() else {
            return Err(Error::NotMounted {
                class: self.class_name().to_string(),
            });
        };
        let Some(entities) = whole.get_in(path.keys()) else {
            return Ok(whole.clone());
        };
        let map = collection_map(entities)?;
        if map.is_empty() {
            return Ok(whole.clone());
        }

        let mut transformed = ValueMap::with_capacity(map.len());
        for (identity, entity) in map {
            transformed.insert(identity.clone(), self.behavior().transform(entity.clone())?);
        }
        tracing::debug!(
            class = self.class_name(),
            path = %path,
            entities = transformed.len(),
            "reindexed entity collection"
        );
        Ok(whole.set_in(path.keys(), Value::map(transformed)))
    }
}

/// One entity or a list of them
fn batch(arg: Option<&Value>) -> Vec<Value> {
    match arg {
        None => Vec::new(),
        Some(Value::List(items)) => items.to_vec(),
        Some(single) => vec![single.clone()],
    }
}

fn collection_map(scoped: &Value) -> crate::Result<&ValueMap> {
    scoped.as_map().ok_or(EntityError::NotACollection {
        got: scoped.type_name(),
    })
}

/// Remove identities; the slice itself comes back when none was present
fn delete(state: &Value, identities: Vec<Value>) -> crate::Result<Value> {
    let current = collection_map(state)?;
    let doomed: Vec<String> = identities.iter().filter_map(Value::as_key).collect();
    if !doomed.iter().any(|id| current.contains_key(id)) {
        return Ok(state.clone());
    }
    let kept = current
        .iter()
        .filter(|(id, _)| !doomed.contains(id))
        .map(|(id, entity)| (id.clone(), entity.clone()))
        .collect();
    Ok(Value::map(kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IdentityField, KindAdapter};
    use interact_core::MountPath;

    fn entity(id: i64, v: i64) -> Value {
        Value::record([("id", id), ("v", v)])
    }

    fn collection(behavior: EntityCollection) -> Unit<EntityCollection> {
        EntityCollection::class().unwrap().instantiate(behavior)
    }

    fn dispatch(unit: &Unit<EntityCollection>, state: &Value, name: &str, arg: Value) -> Value {
        let action = unit.create(name, vec![arg]).unwrap();
        unit.apply_action(Some(state.clone()), &action).unwrap()
    }

    fn ids(slice: &Value) -> Vec<String> {
        let mut ids: Vec<String> = slice.as_map().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_set_all_replaces_collection() {
        let unit = collection(EntityCollection::new());
        let empty = unit.initial_state();

        let first = dispatch(&unit, &empty, "set_all", vec![entity(1, 1), entity(2, 2)].into());
        let second = dispatch(&unit, &first, "set_all", vec![entity(2, 2), entity(3, 3)].into());

        assert_eq!(ids(&second), ["2", "3"]);
        assert_eq!(second.get("2"), Some(&entity(2, 2)));
        assert_eq!(second.get("3"), Some(&entity(3, 3)));
    }

    #[test]
    fn test_set_merges_into_collection() {
        let unit = collection(EntityCollection::new());
        let empty = unit.initial_state();

        let first = dispatch(&unit, &empty, "set", vec![entity(1, 1), entity(2, 2)].into());
        let second = dispatch(&unit, &first, "set", vec![entity(2, 2), entity(3, 3)].into());

        assert_eq!(ids(&second), ["1", "2", "3"]);
        assert!(second.get("1").unwrap().same(first.get("1").unwrap()));
    }

    #[test]
    fn test_set_single_entity() {
        let unit = collection(EntityCollection::new());
        let slice = dispatch(&unit, &unit.initial_state(), "set", entity(7, 1));
        assert_eq!(ids(&slice), ["7"]);
    }

    #[test]
    fn test_identical_set_keeps_slice_reference() {
        let unit = collection(EntityCollection::new());
        let first = dispatch(&unit, &unit.initial_state(), "set", vec![entity(1, 11)].into());
        let second = dispatch(&unit, &first, "set", vec![entity(1, 11)].into());

        assert!(second.same(&first));
    }

    #[test]
    fn test_changed_set_keeps_unrelated_references() {
        let unit = collection(EntityCollection::new());
        let first = dispatch(
            &unit,
            &unit.initial_state(),
            "set",
            vec![entity(1, 11), entity(2, 22)].into(),
        );
        let second = dispatch(&unit, &first, "set", vec![entity(1, 12)].into());

        assert!(!second.same(&first));
        assert_eq!(second.get("1"), Some(&entity(1, 12)));
        assert!(second.get("2").unwrap().same(first.get("2").unwrap()));
    }

    #[test]
    fn test_update_merges_existing_entity() {
        let unit = collection(EntityCollection::new());
        let first = dispatch(
            &unit,
            &unit.initial_state(),
            "set",
            Value::record([("id", Value::Int(1)), ("v", 11.into()), ("name", "a".into())]),
        );
        let updated = dispatch(&unit, &first, "update", Value::record([("id", 1), ("v", 20)]));

        let stored = updated.get("1").unwrap();
        assert_eq!(stored.get("v"), Some(&Value::Int(20)));
        assert_eq!(stored.get("name"), Some(&Value::from("a")));
    }

    #[test]
    fn test_update_missing_entity_fails() {
        let unit = collection(EntityCollection::new());
        let slice = dispatch(&unit, &unit.initial_state(), "set", entity(2, 2));
        let action = unit
            .create("update", vec![Value::record([("id", 1), ("v", 20)])])
            .unwrap();

        let err = unit.apply_action(Some(slice), &action).unwrap_err();
        assert!(matches!(
            err.reducer_source::<EntityError>(),
            Some(EntityError::MissingEntity { identity }) if identity == "1"
        ));
    }

    #[test]
    fn test_update_with_same_values_keeps_reference() {
        let unit = collection(EntityCollection::new());
        let first = dispatch(&unit, &unit.initial_state(), "set", entity(1, 11));
        let second = dispatch(&unit, &first, "update", Value::record([("id", 1), ("v", 11)]));
        assert!(second.same(&first));
    }

    #[test]
    fn test_delete() {
        let unit = collection(EntityCollection::new());
        let slice = dispatch(
            &unit,
            &unit.initial_state(),
            "set",
            vec![entity(1, 1), entity(2, 2)].into(),
        );

        let deleted = dispatch(&unit, &slice, "delete", Value::from(vec!["2"]));
        assert_eq!(ids(&deleted), ["1"]);

        let single = dispatch(&unit, &slice, "delete", Value::from("1"));
        assert_eq!(ids(&single), ["2"]);

        let absent = dispatch(&unit, &slice, "delete", Value::from(vec!["9"]));
        assert!(absent.same(&slice));
    }

    #[test]
    fn test_model_adapter_applied_once() {
        let unit = collection(EntityCollection::new().with_model(KindAdapter::new("thing")));
        let first = dispatch(&unit, &unit.initial_state(), "set", entity(1, 1));
        let stored = first.get("1").unwrap();
        assert_eq!(stored.as_model().map(|m| m.kind()), Some("thing"));

        // raw record equal to the stored model keeps the model
        let second = dispatch(&unit, &first, "set", entity(1, 1));
        assert!(second.same(&first));
    }

    #[test]
    fn test_custom_identity_hook() {
        let unit = collection(EntityCollection::new().with_hooks(IdentityField::new("slug")));
        let slice = dispatch(
            &unit,
            &unit.initial_state(),
            "set",
            Value::record([("slug", "intro"), ("title", "Intro")]),
        );
        assert_eq!(ids(&slice), ["intro"]);
    }

    #[test]
    fn test_selectors() {
        let unit = collection(EntityCollection::new());
        unit.mount_at(MountPath::new(["entities", "things"]));
        let slice = dispatch(
            &unit,
            &unit.initial_state(),
            "set",
            vec![entity(1, 1), entity(2, 2)].into(),
        );
        let whole = Value::empty_map().set_in(&["entities", "things"], slice.clone());

        assert!(unit.get_all(&whole).unwrap().same(&slice));
        assert_eq!(unit.get_all_ids(&whole).unwrap(), ["1", "2"]);
        assert_eq!(unit.get_by_id(&whole, "2").unwrap(), Some(entity(2, 2)));
        assert_eq!(unit.get_by_id(&whole, "3").unwrap(), None);
        assert_eq!(
            unit.select("get_by_id", &whole, &[Value::Int(1)]).unwrap(),
            entity(1, 1)
        );
        assert_eq!(
            unit.select("get_all_ids", &whole, &[]).unwrap(),
            Value::from(vec!["1", "2"])
        );
    }

    #[test]
    fn test_selectors_require_mount() {
        let unit = collection(EntityCollection::new());
        assert!(matches!(
            unit.get_all(&Value::empty_map()),
            Err(Error::NotMounted { .. })
        ));
    }

    #[test]
    fn test_reindex_whole_tree() {
        let unit = collection(EntityCollection::new().with_model(KindAdapter::new("thing")));
        unit.mount_at(MountPath::new(["things"]));
        let sibling = Value::record([("x", 1)]);
        let whole = Value::record([
            ("things", Value::record([("1", entity(1, 1))])),
            ("other", sibling.clone()),
        ]);

        let reindexed = unit.reindex_whole_tree(&whole).unwrap();
        let stored = reindexed.get_in(&["things", "1"]).unwrap();
        assert_eq!(stored.as_model().map(|m| m.kind()), Some("thing"));
        assert!(reindexed.get("other").unwrap().same(&sibling));
    }

    #[test]
    fn test_reindex_empty_collection_is_noop() {
        let unit = collection(EntityCollection::new().with_model(KindAdapter::new("thing")));
        unit.mount_at(MountPath::new(["things"]));
        let whole = Value::record([("things", Value::empty_map())]);

        assert!(unit.reindex_whole_tree(&whole).unwrap().same(&whole));
    }

    #[test]
    fn test_reindex_absent_collection_is_noop() {
        let unit = collection(EntityCollection::new().with_model(KindAdapter::new("thing")));
        unit.mount_at(MountPath::new(["entities", "things"]));
        let whole = Value::record([("other", 1)]);

        assert!(unit.reindex_whole_tree(&whole).unwrap().same(&whole));
    }

    #[test]
    fn test_reindex_requires_mount() {
        let unit = collection(EntityCollection::new());
        assert!(matches!(
            unit.reindex_whole_tree(&Value::empty_map()),
            Err(Error::NotMounted { .. })
        ));
    }

    #[test]
    fn test_derived_collection_inherits_and_extends() {
        let todos = EntityCollection::derive("Todos")
            .unwrap()
            .transition("complete", |coll: &EntityCollection, state, args| {
                let id = args.first().and_then(Value::as_key).unwrap_or_default();
                let delta = Value::record([("id", Value::from(id)), ("done", true.into())]);
                Ok(coll.update(&state, vec![delta])?)
            })
            .build()
            .unwrap()
            .instantiate(EntityCollection::new());

        assert_eq!(todos.class_name(), "Todos");
        let slice = dispatch(&todos, &todos.initial_state(), "set", entity(1, 1));
        let done = dispatch(&todos, &slice, "complete", Value::from("1"));
        assert_eq!(done.get_in(&["1", "done"]), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_two_collections_of_one_class_do_not_cross_talk() {
        let class = EntityCollection::class().unwrap();
        let a = class.instantiate(EntityCollection::new());
        let b = class.instantiate(EntityCollection::new());

        let slice = b.initial_state();
        let action = a.create("set", vec![entity(1, 1)]).unwrap();
        assert!(b.apply_action(Some(slice.clone()), &action).unwrap().same(&slice));
    }
}
