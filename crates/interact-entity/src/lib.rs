//! Interact Entity - keyed collections of model values
//!
//! An [`EntityCollection`] unit stores entities in a map keyed by identity.
//! Reconciliation keeps every stored value whose data did not change, so
//! downstream identity checks only fire for entities that really moved.
//!
//! - [`EntityHooks`] decide identity and equality
//! - [`ModelAdapter`] turns raw records into tagged models
//! - [`Collection`] adds typed selectors to collection units

mod adapter;
mod collection;
mod error;
mod hooks;
pub mod reconcile;

pub use adapter::{KindAdapter, ModelAdapter};
pub use collection::{Collection, EntityCollection};
pub use error::{EntityError, Result};
pub use hooks::{DefaultHooks, EntityHooks, IdentityField};
pub use reconcile::{reconcile, ReconcileMode};
