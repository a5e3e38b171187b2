//! Unit instances: a class bound to one live behavior value
//!
//! A [`Unit`] is a cheap handle. Every clone, every [`ActionCreator`],
//! [`BoundReducer`] and [`BoundSelector`] taken from it keeps pointing at the
//! same instance, so any of them can be detached and passed around as a
//! callback.
//!
//! Tags are synthesized per instance at construction. Two units of the same
//! class never share a tag, which lets several instances of one class live in
//! the same tree without answering each other's actions.

use crate::registry::{Entry, SelectorFn, TransitionFn};
use crate::thunk::PendingThunk;
use crate::{
    constant_name, Action, ActionCreator, ActionTag, Error, MountPath, Result, TagGenerator,
    UnitClass, UnitId, Value,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The face a unit shows to the tree composer
pub trait Mountable: Send + Sync {
    /// Process-unique id of the instance
    fn unit_id(&self) -> UnitId;

    /// Name of the instance's class
    fn class_name(&self) -> &str;

    /// Where the instance currently lives, if anywhere
    fn mount_point(&self) -> Option<MountPath>;

    /// Assign (or reassign) where the instance lives
    fn mount_at(&self, path: MountPath);

    /// Run `action` against the instance's slice
    fn apply_action(&self, state: Option<Value>, action: &Action) -> Result<Value>;
}

struct UnitInner<B> {
    id: UnitId,
    class: UnitClass<B>,
    behavior: B,
    initial_state: Value,
    mount_point: RwLock<Option<MountPath>>,
    tags: IndexMap<String, ActionTag>,
    dispatch: HashMap<ActionTag, TransitionFn<B>>,
}

/// A live interaction unit
pub struct Unit<B> {
    inner: Arc<UnitInner<B>>,
}

impl<B> Unit<B> {
    pub(crate) fn new(class: UnitClass<B>, behavior: B, generator: &dyn TagGenerator) -> Self {
        let id = UnitId::next();
        let mut tags = IndexMap::new();
        let mut dispatch = HashMap::new();
        for (name, entry) in class.registry().entries() {
            if let Entry::Transition(f) = entry {
                let tag = generator.generate(class.name(), name);
                dispatch.insert(tag.clone(), f.clone());
                tags.insert(name.to_string(), tag);
            }
        }
        tracing::trace!(
            class = class.name(),
            unit = %id,
            transitions = tags.len(),
            "instantiated unit"
        );

        Self {
            inner: Arc::new(UnitInner {
                id,
                initial_state: class.initial_state(),
                class,
                behavior,
                mount_point: RwLock::new(None),
                tags,
                dispatch,
            }),
        }
    }

    /// Process-unique id of this instance
    pub fn id(&self) -> UnitId {
        self.inner.id
    }

    /// The class this unit was instantiated from
    pub fn class(&self) -> &UnitClass<B> {
        &self.inner.class
    }

    /// The class name
    pub fn class_name(&self) -> &str {
        self.inner.class.name()
    }

    /// The behavior value transitions and selectors receive
    pub fn behavior(&self) -> &B {
        &self.inner.behavior
    }

    /// The state used when the unit's slice is unset
    pub fn initial_state(&self) -> Value {
        self.inner.initial_state.clone()
    }

    /// Where the unit currently lives
    pub fn mount_point(&self) -> Option<MountPath> {
        self.inner.mount_point.read().clone()
    }

    /// Assign the unit's location; composing does this for you
    pub fn mount_at(&self, path: MountPath) {
        *self.inner.mount_point.write() = Some(path);
    }

    /// Check whether two handles point at the same instance
    pub fn ptr_eq(&self, other: &Unit<B>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The tag this instance synthesized for transition `name`
    pub fn tag(&self, name: &str) -> Option<&ActionTag> {
        self.inner.tags.get(name)
    }

    /// All `(transition name, tag)` pairs of this instance
    pub fn tags(&self) -> impl Iterator<Item = (&str, &ActionTag)> {
        self.inner.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look a tag up by its upper snake case constant, e.g. `SET_ALL`
    pub fn tag_by_constant(&self, constant: &str) -> Option<&ActionTag> {
        self.inner
            .tags
            .iter()
            .find(|(name, _)| constant_name(name) == constant)
            .map(|(_, tag)| tag)
    }

    /// A detached creator for transition `name`
    pub fn action(&self, name: &str) -> Result<ActionCreator> {
        match self.inner.tags.get(name) {
            Some(tag) => Ok(ActionCreator::new(tag.clone())),
            None => Err(self.not_a(name, "transition")),
        }
    }

    /// Build an action for transition `name`
    pub fn create(&self, name: &str, args: Vec<Value>) -> Result<Action> {
        Ok(self.action(name)?.create(args))
    }

    /// Run `action` against `state`
    ///
    /// An unset state falls back to the initial state. Actions whose tag this
    /// instance did not synthesize, or whose `args` is not a list, pass the
    /// state through untouched.
    pub fn apply_action(&self, state: Option<Value>, action: &Action) -> Result<Value> {
        let state = state.unwrap_or_else(|| self.initial_state());
        let Some(args) = action.arg_list() else {
            return Ok(state);
        };
        match self.inner.dispatch.get(&action.tag) {
            Some(transition) => transition(&self.inner.behavior, state, args),
            None => Ok(state),
        }
    }

    /// The unit's slice of `whole`, `None` if the path is absent
    pub fn scoped_state<'s>(&self, whole: &'s Value) -> Result<Option<&'s Value>> {
        let path = self.require_mount()?;
        Ok(whole.get_in(path.keys()))
    }

    /// Run `f` over the unit's slice of `whole`
    ///
    /// Fails if the unit is not mounted or `whole` lacks the mount path.
    pub fn select_with<T>(
        &self,
        whole: &Value,
        f: impl FnOnce(&B, &Value) -> Result<T>,
    ) -> Result<T> {
        let path = self.require_mount()?;
        let scoped = whole
            .get_in(path.keys())
            .ok_or_else(|| Error::PathNotFound {
                class: self.class_name().to_string(),
                path: path.clone(),
            })?;
        f(&self.inner.behavior, scoped)
    }

    /// Run selector `name` over the unit's slice of `whole`
    pub fn select(&self, name: &str, whole: &Value, args: &[Value]) -> Result<Value> {
        let selector = self.selector_fn(name)?;
        self.select_with(whole, |behavior, scoped| selector(behavior, scoped, args))
    }

    /// Package thunk `name` with its argument
    pub fn thunk(&self, name: &str, arg: Value) -> Result<PendingThunk<B>> {
        match self.inner.class.registry().require(name)? {
            Entry::Thunk(body) => Ok(PendingThunk::new(
                self.clone(),
                name.to_string(),
                body.clone(),
                arg,
            )),
            other => Err(self.inner.class.registry().wrong_kind(name, "thunk", other)),
        }
    }

    fn selector_fn(&self, name: &str) -> Result<SelectorFn<B>> {
        match self.inner.class.registry().require(name)? {
            Entry::Selector(f) => Ok(f.clone()),
            other => Err(self.inner.class.registry().wrong_kind(name, "selector", other)),
        }
    }

    fn require_mount(&self) -> Result<MountPath> {
        self.mount_point().ok_or_else(|| Error::NotMounted {
            class: self.class_name().to_string(),
        })
    }

    fn not_a(&self, name: &str, expected: &'static str) -> Error {
        let registry = self.inner.class.registry();
        match registry.get(name) {
            Some(entry) => registry.wrong_kind(name, expected, entry),
            None => Error::UnknownEntry {
                class: self.class_name().to_string(),
                name: name.to_string(),
            },
        }
    }
}

impl<B> Unit<B> {
    /// A detached handle to [`Unit::apply_action`]
    pub fn reducer(&self) -> BoundReducer<B> {
        BoundReducer { unit: self.clone() }
    }

    /// A detached handle to selector `name`
    pub fn selector(&self, name: &str) -> Result<BoundSelector<B>> {
        Ok(BoundSelector {
            unit: self.clone(),
            name: name.to_string(),
            f: self.selector_fn(name)?,
        })
    }
}

impl<B> Clone for Unit<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B> fmt::Debug for Unit<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("id", &self.inner.id)
            .field("class", &self.class_name())
            .field("mount_point", &self.mount_point())
            .finish_non_exhaustive()
    }
}

impl<B: Send + Sync + 'static> Mountable for Unit<B> {
    fn unit_id(&self) -> UnitId {
        self.id()
    }

    fn class_name(&self) -> &str {
        Unit::class_name(self)
    }

    fn mount_point(&self) -> Option<MountPath> {
        Unit::mount_point(self)
    }

    fn mount_at(&self, path: MountPath) {
        Unit::mount_at(self, path)
    }

    fn apply_action(&self, state: Option<Value>, action: &Action) -> Result<Value> {
        Unit::apply_action(self, state, action)
    }
}

/// A unit's reducer, detached from the unit
pub struct BoundReducer<B> {
    unit: Unit<B>,
}

impl<B> BoundReducer<B> {
    /// Same as [`Unit::apply_action`]
    pub fn call(&self, state: Option<Value>, action: &Action) -> Result<Value> {
        self.unit.apply_action(state, action)
    }

    /// The unit this reducer belongs to
    pub fn unit(&self) -> &Unit<B> {
        &self.unit
    }
}

impl<B> Clone for BoundReducer<B> {
    fn clone(&self) -> Self {
        Self {
            unit: self.unit.clone(),
        }
    }
}

/// A unit's selector, detached from the unit
///
/// Calling it with the whole-state tree re-scopes to the unit's slice first.
pub struct BoundSelector<B> {
    unit: Unit<B>,
    name: String,
    f: SelectorFn<B>,
}

impl<B> BoundSelector<B> {
    /// Name of the selector entry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the selector over the unit's slice of `whole`
    pub fn call(&self, whole: &Value, args: &[Value]) -> Result<Value> {
        self.unit
            .select_with(whole, |behavior, scoped| (self.f)(behavior, scoped, args))
    }
}

impl<B> Clone for BoundSelector<B> {
    fn clone(&self) -> Self {
        Self {
            unit: self.unit.clone(),
            name: self.name.clone(),
            f: self.f.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequentialTags;

    fn simple() -> UnitClass<()> {
        UnitClass::<()>::builder("Simple")
            .initial_state(|| Value::Int(123))
            .transition("add", |_, state, _| {
                Ok(Value::Int(state.as_int().unwrap_or(0) + 1))
            })
            .transition("pick_second", |_, _, args| {
                Ok(args.get(1).cloned().unwrap_or_default())
            })
            .selector("first", |_, scoped, _| {
                Ok(scoped.as_list().and_then(|l| l.first()).cloned().unwrap_or_default())
            })
            .selector("nth", |_, scoped, args| {
                let n = args.first().and_then(Value::as_int).unwrap_or(0) as usize;
                Ok(scoped.as_list().and_then(|l| l.get(n)).cloned().unwrap_or_default())
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_unit_without_transitions_passes_state_through() {
        let unit = UnitClass::<()>::builder("Empty").build().unwrap().instantiate(());
        let state = Value::Int(1);
        let out = unit.apply_action(Some(state), &Action::new("foo", vec![])).unwrap();
        assert_eq!(out, Value::Int(1));
    }

    #[test]
    fn test_initial_state_only_replaces_unset() {
        let unit = simple().instantiate(());
        let unknown = Action::new("foo", vec![]);

        assert_eq!(unit.apply_action(None, &unknown).unwrap(), Value::Int(123));
        assert_eq!(
            unit.apply_action(Some(Value::Bool(false)), &unknown).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_action_creator_matches_transition() {
        let unit = simple().instantiate(());
        let action = unit.action("add").unwrap().create(vec![Value::Int(1), Value::Int(2)]);

        assert_eq!(Some(&action.tag), unit.tag("add"));
        assert_eq!(action.args, Value::from(vec![1i64, 2]));
        assert_eq!(unit.apply_action(Some(Value::Int(1)), &action).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_args_forwarded_in_order() {
        let unit = simple().instantiate(());
        let action = unit.create("pick_second", vec![1.into(), 2.into()]).unwrap();
        assert_eq!(unit.apply_action(Some(Value::Int(123)), &action).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_unknown_tag_is_reference_identical_noop() {
        let unit = simple().instantiate(());
        let state = Value::record([("a", 1)]);
        let out = unit
            .apply_action(Some(state.clone()), &Action::new("unknown", vec![]))
            .unwrap();
        assert!(out.same(&state));
    }

    #[test]
    fn test_malformed_args_is_noop() {
        let unit = simple().instantiate(());
        let tag = unit.tag("add").cloned().unwrap();
        let out = unit
            .apply_action(Some(Value::Int(123)), &Action::raw(tag, Value::Null))
            .unwrap();
        assert_eq!(out, Value::Int(123));
    }

    #[test]
    fn test_instances_of_same_class_have_distinct_tags() {
        let class = simple();
        let a = class.instantiate(());
        let b = class.instantiate(());

        assert_ne!(a.tag("add"), b.tag("add"));
        // b ignores a's action
        let action = a.create("add", vec![]).unwrap();
        assert_eq!(b.apply_action(Some(Value::Int(1)), &action).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_injected_tag_generator() {
        let tags = SequentialTags::new();
        let unit = simple().instantiate_with((), &tags);
        assert_eq!(unit.tag("add").map(ActionTag::as_str), Some("Simple:add#0"));
        assert_eq!(
            unit.tag("pick_second").map(ActionTag::as_str),
            Some("Simple:pick_second#1")
        );
        assert_eq!(unit.tag_by_constant("PICK_SECOND"), unit.tag("pick_second"));
    }

    #[test]
    fn test_selectors_have_no_tags() {
        let unit = simple().instantiate(());
        assert!(unit.tag("first").is_none());
        assert!(matches!(
            unit.action("first"),
            Err(Error::WrongEntryKind { expected: "transition", .. })
        ));
        assert!(matches!(unit.action("nope"), Err(Error::UnknownEntry { .. })));
    }

    #[test]
    fn test_detached_reducer() {
        let unit = simple().instantiate(());
        let reducer = unit.reducer();
        let action = unit.create("add", vec![Value::Int(1)]).unwrap();
        drop(unit);

        assert_eq!(reducer.call(Some(Value::Int(1)), &action).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_scoped_state() {
        let unit = simple().instantiate(());
        unit.mount_at(MountPath::new(["a", "b"]));
        let whole = Value::record([("a", Value::record([("b", 1)]))]);

        assert_eq!(unit.scoped_state(&whole).unwrap(), Some(&Value::Int(1)));
    }

    #[test]
    fn test_scoped_state_requires_mount() {
        let unit = simple().instantiate(());
        let whole = Value::record([("a", 1)]);
        let err = unit.scoped_state(&whole).unwrap_err();
        assert!(matches!(err, Error::NotMounted { .. }));
        assert!(err.to_string().contains("mount"));
    }

    #[test]
    fn test_selector_is_scoped_and_forwards_args() {
        let unit = simple().instantiate(());
        unit.mount_at(MountPath::new(["entities", "todos"]));
        let whole = Value::record([(
            "entities",
            Value::record([("todos", Value::from(vec!["a", "b"]))]),
        )]);

        assert_eq!(unit.select("first", &whole, &[]).unwrap(), Value::from("a"));
        let nth = unit.selector("nth").unwrap();
        assert_eq!(nth.call(&whole, &[Value::Int(1)]).unwrap(), Value::from("b"));
    }

    #[test]
    fn test_selector_on_state_without_path_fails() {
        let unit = simple().instantiate(());
        unit.mount_at(MountPath::new(["entities", "todos"]));
        let err = unit.select("first", &Value::empty_map(), &[]).unwrap_err();
        assert!(matches!(err, Error::PathNotFound { .. }));
    }

    #[test]
    fn test_mount_point_shared_across_clones() {
        let unit = simple().instantiate(());
        let handle = unit.clone();
        unit.mount_at(MountPath::new(["foos"]));
        assert_eq!(handle.mount_point(), Some(MountPath::new(["foos"])));
        assert!(handle.ptr_eq(&unit));
    }
}
