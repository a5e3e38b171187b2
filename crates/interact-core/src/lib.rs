//! Interact Core - state slices with private, collision-free reducers
//!
//! This crate provides the building blocks of the interactions pattern:
//! - Structurally shared state values (`Value`, `ValueMap`, `Model`)
//! - Per-class entry tables with inheritance (`Registry`, `UnitClass`)
//! - Units that own a slice, synthesize their own action tags and expose
//!   detachable action creators, reducers and selectors (`Unit`)
//! - Thunks that dispatch a unit's own actions (`PendingThunk`)
//!
//! ## Example
//!
//! ```
//! use interact_core::{MountPath, UnitClass, Value};
//!
//! let todos = UnitClass::<()>::builder("Todos")
//!     .initial_state(|| Value::list(Vec::new()))
//!     .transition("add", |_, state, args| {
//!         let mut items = state.as_list().map(<[Value]>::to_vec).unwrap_or_default();
//!         items.extend(args.first().cloned());
//!         Ok(Value::list(items))
//!     })
//!     .selector("count", |_, scoped, _| {
//!         Ok(Value::Int(scoped.as_list().map_or(0, |l| l.len() as i64)))
//!     })
//!     .build()
//!     .unwrap()
//!     .instantiate(());
//!
//! let add = todos.action("add").unwrap();
//! let slice = todos.apply_action(None, &add.call1("milk")).unwrap();
//!
//! todos.mount_at(MountPath::new(["todos"]));
//! let whole = Value::record([("todos", slice)]);
//! assert_eq!(todos.select("count", &whole, &[]).unwrap(), Value::Int(1));
//! ```

mod action;
mod class;
mod error;
mod model;
mod path;
pub mod registry;
mod tag;
pub mod thunk;
mod unit;
mod value;

pub use action::{Action, ActionCreator};
pub use class::{ClassBuilder, UnitClass};
pub use error::{Error, Result};
pub use model::Model;
pub use path::MountPath;
pub use registry::{constant_name, Entry, Registry};
pub use tag::{ActionTag, SequentialTags, TagGenerator, UnitId};
pub use thunk::{PendingThunk, ThunkContext};
pub use unit::{BoundReducer, BoundSelector, Mountable, Unit};
pub use value::{Value, ValueMap};
