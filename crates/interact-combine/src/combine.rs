//! The combined reducer: one transition over the whole state tree
//!
//! Every dispatched action reaches every mounted unit, in mount order. Each
//! unit reads its slice at its mount path and hands back a slice; only slices
//! that came back as a different value are written into the tree, by a
//! copy-on-write update of their ancestor chain. A tree nobody changed comes
//! back as the very same value.
//!
//! A unit that fails (or panics, when [`CombineConfig::isolate_panics`] is
//! set) keeps its previous slice and does not stop the others.

use crate::{CombineConfig, MountSpec, Result};
use interact_core::{Action, ActionTag, MountPath, Mountable, Value};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Why a unit produced no slice for a dispatch
#[derive(Debug)]
pub enum FailureReason {
    /// The unit's transition returned an error
    Error(interact_core::Error),
    /// The unit's transition panicked
    Panic(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Error(err) => write!(f, "{}", err),
            FailureReason::Panic(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

/// A unit that failed while processing an action
#[derive(Debug)]
pub struct UnitFailure {
    pub path: MountPath,
    pub class: String,
    pub tag: ActionTag,
    pub args: Value,
    pub reason: FailureReason,
}

/// Outcome of one dispatch
#[derive(Debug)]
pub struct DispatchReport {
    /// The new whole-state tree
    pub state: Value,
    /// Mount paths whose slice was replaced, in mount order
    pub changed: Vec<MountPath>,
    /// Units whose contribution was skipped
    pub failures: Vec<UnitFailure>,
}

impl DispatchReport {
    /// Whether any slice was replaced
    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

struct Mounted {
    path: MountPath,
    unit: Arc<dyn Mountable>,
}

/// The reducer produced by [`combine`]
#[derive(Clone)]
pub struct CombinedReducer {
    units: Arc<[Mounted]>,
    config: CombineConfig,
}

/// Mount every unit in `spec` and build the reducer over them
///
/// ```
/// use interact_combine::{combine, MountSpec};
/// use interact_core::{UnitClass, Value};
///
/// let counter = UnitClass::<()>::builder("Counter")
///     .initial_state(|| Value::Int(0))
///     .transition("increment", |_, state, _| Ok(Value::Int(state.as_int().unwrap_or(0) + 1)))
///     .build()
///     .unwrap();
/// let clicks = counter.instantiate(());
///
/// let reducer = combine(MountSpec::new().mount("clicks", clicks.clone())).unwrap();
/// let state = reducer.reduce(&Value::Null, &clicks.create("increment", vec![]).unwrap());
/// assert_eq!(state.get("clicks"), Some(&Value::Int(1)));
/// ```
pub fn combine(spec: MountSpec) -> Result<CombinedReducer> {
    combine_with_config(spec, CombineConfig::default())
}

/// [`combine`] with explicit failure handling
///
/// The specification is validated in full before any unit is mounted, so a
/// rejected specification leaves every mount point as it was. A unit that was
/// mounted elsewhere before is moved to its new path.
pub fn combine_with_config(spec: MountSpec, config: CombineConfig) -> Result<CombinedReducer> {
    let flat = spec.flatten()?;
    let units: Vec<Mounted> = flat
        .into_iter()
        .map(|(path, unit)| {
            tracing::debug!(path = %path, class = unit.class_name(), unit = %unit.unit_id(), "mounting unit");
            unit.mount_at(path.clone());
            Mounted { path, unit }
        })
        .collect();

    Ok(CombinedReducer {
        units: units.into(),
        config,
    })
}

impl CombinedReducer {
    pub fn config(&self) -> &CombineConfig {
        &self.config
    }

    /// Mounted units as (path, class name), in dispatch order
    pub fn units(&self) -> impl Iterator<Item = (&MountPath, &str)> {
        self.units.iter().map(|m| (&m.path, m.unit.class_name()))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Apply `action` to the tree, discarding the report
    pub fn reduce(&self, state: &Value, action: &Action) -> Value {
        self.dispatch(state, action).state
    }

    /// Apply `action` to the tree
    ///
    /// A `Null` state behaves as an empty map: every unit starts from its
    /// initial state.
    pub fn dispatch(&self, state: &Value, action: &Action) -> DispatchReport {
        let mut next = state.clone();
        let mut changed = Vec::new();
        let mut failures = Vec::new();

        for mounted in self.units.iter() {
            let prior = state.get_in(mounted.path.keys());
            match self.apply(mounted, prior.cloned(), action) {
                Ok(slice) => {
                    if prior.is_some_and(|p| p.same(&slice)) {
                        continue;
                    }
                    next = next.set_in(mounted.path.keys(), slice);
                    changed.push(mounted.path.clone());
                }
                Err(reason) => {
                    if self.config.log_failures {
                        tracing::error!(
                            path = %mounted.path,
                            class = mounted.unit.class_name(),
                            tag = %action.tag,
                            args = %action.args,
                            error = %reason,
                            "unit failed to process action"
                        );
                    }
                    failures.push(UnitFailure {
                        path: mounted.path.clone(),
                        class: mounted.unit.class_name().to_string(),
                        tag: action.tag.clone(),
                        args: action.args.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::trace!(
            tag = %action.tag,
            changed = changed.len(),
            failed = failures.len(),
            "dispatched action"
        );
        DispatchReport {
            state: next,
            changed,
            failures,
        }
    }

    fn apply(
        &self,
        mounted: &Mounted,
        prior: Option<Value>,
        action: &Action,
    ) -> std::result::Result<Value, FailureReason> {
        if !self.config.isolate_panics {
            return mounted
                .unit
                .apply_action(prior, action)
                .map_err(FailureReason::Error);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| mounted.unit.apply_action(prior, action))) {
            Ok(result) => result.map_err(FailureReason::Error),
            Err(payload) => Err(FailureReason::Panic(panic_message(payload))),
        }
    }
}

impl fmt::Debug for CombinedReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("units", &self.units().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
