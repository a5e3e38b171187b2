//! Unit classes: a registry plus an initial-state factory, defined once
//!
//! ```
//! use interact_core::{UnitClass, Value};
//!
//! let counter = UnitClass::<()>::builder("Counter")
//!     .initial_state(|| Value::Int(0))
//!     .transition("add", |_, state, args| {
//!         let by = args.first().and_then(Value::as_int).unwrap_or(1);
//!         Ok(Value::Int(state.as_int().unwrap_or(0) + by))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let unit = counter.instantiate(());
//! let action = unit.create("add", vec![Value::Int(2)]).unwrap();
//! assert_eq!(unit.apply_action(None, &action).unwrap(), Value::Int(2));
//! ```

use crate::registry::{Entry, Registry};
use crate::thunk::ThunkContext;
use crate::{Error, Result, SequentialTags, TagGenerator, Unit, Value};
use std::fmt;
use std::sync::Arc;

type InitialStateFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// A defined unit class, ready to be instantiated any number of times
pub struct UnitClass<B> {
    registry: Arc<Registry<B>>,
    initial_state: InitialStateFn,
}

impl<B> UnitClass<B> {
    /// Start defining a class with no parent
    pub fn builder(name: impl Into<String>) -> ClassBuilder<B> {
        ClassBuilder {
            registry: Registry::new(name),
            initial_state: Arc::new(Value::empty_map),
            error: None,
        }
    }

    /// Start defining a subclass that inherits every entry and the initial state
    pub fn derive(&self, name: impl Into<String>) -> ClassBuilder<B> {
        ClassBuilder {
            registry: self.registry.derive(name),
            initial_state: self.initial_state.clone(),
            error: None,
        }
    }

    /// The class name
    pub fn name(&self) -> &str {
        self.registry.class_name()
    }

    /// The frozen entry table
    pub fn registry(&self) -> &Registry<B> {
        &self.registry
    }

    /// A fresh initial state
    pub fn initial_state(&self) -> Value {
        (self.initial_state)()
    }
}

impl<B: Send + Sync + 'static> UnitClass<B> {
    /// Create a unit whose tags come from the process-wide generator
    pub fn instantiate(&self, behavior: B) -> Unit<B> {
        self.instantiate_with(behavior, SequentialTags::global())
    }

    /// Create a unit whose tags come from `tags`
    pub fn instantiate_with(&self, behavior: B, tags: &dyn TagGenerator) -> Unit<B> {
        Unit::new(self.clone(), behavior, tags)
    }
}

impl<B> Clone for UnitClass<B> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            initial_state: self.initial_state.clone(),
        }
    }
}

impl<B> fmt::Debug for UnitClass<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitClass")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Collects a class's declarations; the first invalid one fails `build`
pub struct ClassBuilder<B> {
    registry: Registry<B>,
    initial_state: InitialStateFn,
    error: Option<Error>,
}

impl<B> ClassBuilder<B> {
    /// Factory producing each instance's initial state
    pub fn initial_state(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.initial_state = Arc::new(f);
        self
    }

    /// Declare a transition
    pub fn transition<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&B, Value, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.declare(name, Entry::Transition(Arc::new(f)))
    }

    /// Declare a selector; it receives the unit's scoped slice, never the whole tree
    pub fn selector<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&B, &Value, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.declare(name, Entry::Selector(Arc::new(f)))
    }

    /// Declare a thunk taking a single argument
    pub fn thunk<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Unit<B>, Value, &mut ThunkContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.declare(name, Entry::Thunk(Arc::new(f)))
    }

    /// Declare a prebuilt entry
    pub fn declare(mut self, name: impl Into<String>, entry: Entry<B>) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.registry.register(name, entry) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Freeze the declarations into a class
    pub fn build(self) -> Result<UnitClass<B>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(UnitClass {
            registry: Arc::new(self.registry),
            initial_state: self.initial_state,
        })
    }
}
