//! Tether Core
//!
//! This crate provides the engine behind Tether, an in-process property
//! binding library. Any number of entities can share one value for a named
//! field: a write through any of them is seen by all of them, and each may
//! register a hook that runs when the value changes.
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `graph`: property slots, shared groups, and the engine that binds,
//!   merges and splits them
//! - `reactive`: the `Bindings` handle, entity handles, change hooks and the
//!   dispatcher that runs them
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use tether_core::{Bindings, Value};
//!
//! let bindings: Bindings<Value> = Bindings::new();
//! let a = bindings.spawn([("foo", json!("bar"))]);
//! let b = bindings.spawn([("foo", json!("x"))]);
//!
//! a.on_changed("foo", || println!("a.foo changed"))?;
//!
//! b.bind_to("foo", &a)?;
//! assert_eq!(b.get("foo")?, json!("bar"));
//!
//! b.set("foo", json!("cool"))?;
//! // prints: "a.foo changed"
//! assert_eq!(a.get("foo")?, json!("cool"));
//! ```

pub mod error;
pub mod graph;
pub mod reactive;

pub use error::{BindError, Result};
pub use graph::{EntityId, FieldRef, GroupId};
pub use reactive::{BindOptions, Bindings, Entity, SetOptions, WeakBindings};

/// Dynamic value type for hosts that bind heterogeneous fields.
pub type Value = serde_json::Value;
