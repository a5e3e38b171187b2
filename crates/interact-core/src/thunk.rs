//! Thunks: one-argument routines that dispatch a unit's own actions
//!
//! A thunk never runs by itself. `Unit::thunk` packages the entry, the unit
//! and the argument into a [`PendingThunk`]; whoever owns the dispatch loop
//! runs it with a [`ThunkContext`].

use crate::registry::ThunkFn;
use crate::{Action, Result, Unit, Value, ValueMap};
use std::fmt;

/// Callbacks and extra data handed to a running thunk
pub struct ThunkContext<'a> {
    dispatch: &'a mut dyn FnMut(Action),
    get_state: &'a dyn Fn() -> Value,
    extra: ValueMap,
}

impl<'a> ThunkContext<'a> {
    /// Create a context from the host's dispatch and state accessors
    pub fn new(dispatch: &'a mut dyn FnMut(Action), get_state: &'a dyn Fn() -> Value) -> Self {
        Self {
            dispatch,
            get_state,
            extra: ValueMap::new(),
        }
    }

    /// Attach an extra context value
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Hand an action to the host
    pub fn dispatch(&mut self, action: Action) {
        (self.dispatch)(action)
    }

    /// Read the current whole-state tree
    pub fn state(&self) -> Value {
        (self.get_state)()
    }

    /// Read an extra context value
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl fmt::Debug for ThunkContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThunkContext")
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

/// A thunk bound to its unit and argument, waiting to be run
pub struct PendingThunk<B> {
    unit: Unit<B>,
    name: String,
    body: ThunkFn<B>,
    arg: Value,
}

impl<B> PendingThunk<B> {
    pub(crate) fn new(unit: Unit<B>, name: String, body: ThunkFn<B>, arg: Value) -> Self {
        Self {
            unit,
            name,
            body,
            arg,
        }
    }

    /// Name of the thunk entry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the thunk
    pub fn run(self, ctx: &mut ThunkContext<'_>) -> Result<Value> {
        (self.body)(&self.unit, self.arg, ctx)
    }
}

impl<B> fmt::Debug for PendingThunk<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingThunk")
            .field("name", &self.name)
            .field("arg", &self.arg)
            .finish_non_exhaustive()
    }
}
