//! Interact Combine - compose interaction units into one state tree
//!
//! A [`MountSpec`] says where each unit lives. [`combine`] assigns every unit
//! its mount path and returns a [`CombinedReducer`], the single transition an
//! external dispatcher drives:
//!
//! - Every action is offered to every unit at its own slice
//! - Unchanged subtrees keep their allocation, so `Value::same` is a change signal
//! - A failing unit is logged, reported in the [`DispatchReport`] and skipped

mod combine;
mod config;
mod error;
mod mount;

pub use combine::{
    combine, combine_with_config, CombinedReducer, DispatchReport, FailureReason, UnitFailure,
};
pub use config::CombineConfig;
pub use error::{Error, Result};
pub use mount::{MountNode, MountSpec};
