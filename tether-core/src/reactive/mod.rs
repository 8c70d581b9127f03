//! Reactive Surface
//!
//! This module is the public face of the engine: entity handles, change
//! hooks, and the dispatcher that runs them.
//!
//! # Concepts
//!
//! ## Bindings
//!
//! A [`Bindings`] handle owns one binding graph. Entities are registered with
//! it, declare named fields, and can bind those fields to fields of other
//! entities. Bound fields share a single value: writing through any of them is
//! visible through all of them.
//!
//! ## Hooks
//!
//! An entity may register a hook per field. After a write commits, the hook of
//! every field sharing that value runs once, in the order the fields joined.
//!
//! # Implementation Notes
//!
//! Structural changes happen inside the graph and report which fields to
//! notify. Hooks run only after the graph borrow is released, so they can
//! safely re-enter the API.

mod bindings;
mod dispatcher;
mod entity;
mod options;

pub use bindings::{Bindings, WeakBindings};
pub use dispatcher::{Dispatcher, Notification};
pub use entity::Entity;
pub use options::{BindOptions, SetOptions};
