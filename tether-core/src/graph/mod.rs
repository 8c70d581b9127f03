//! Binding Graph
//!
//! This module implements the data structures that let several entity fields
//! share one value.
//!
//! # Overview
//!
//! - A [`Slot`] stores one field of one entity. It is either `Simple` (owns
//!   its value) or `Bound` (its value lives in a group).
//! - A [`SharedGroup`] holds the canonical value and a flat, position-stable
//!   list of the fields bound into it.
//! - The [`Graph`] is the arena owning every record and group, and performs
//!   promote, bind, merge and split.
//! - [`Hooks`] holds the change callbacks each record registered, keyed by
//!   field name.
//!
//! # Design Decisions
//!
//! 1. Groups live in an arena keyed by [`GroupId`] and slots refer to them by
//!    handle. Slots and groups point at each other, and handles keep that
//!    cycle out of the ownership graph.
//!
//! 2. Removal tombstones a position instead of compacting the list, so
//!    indices held elsewhere never need a global reindex.
//!
//! 3. Every bound slot keeps the positions of its direct children. Structural
//!    operations walk that subtree only, never the whole group.

mod engine;
mod group;
mod hooks;
mod record;
mod slot;

pub use engine::Graph;
pub use group::{GroupId, GroupSnapshot, SharedGroup};
pub use hooks::{ChangeHook, Hooks};
pub use record::Record;
pub use slot::{BoundSlot, ChildIndices, EntityId, FieldRef, Slot};
