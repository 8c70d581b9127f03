//! Property Slots
//!
//! A slot is the storage cell for one field of one entity. It either holds
//! its value directly or has been promoted into a shared group, in which case
//! it records its position in the group and the positions of the slots that
//! were bound directly to it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::group::GroupId;

/// Unique identifier for an entity registered with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Generate a new unique entity ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Address of a single field on a single entity.
///
/// Shared groups store these rather than the slots themselves; the slot is
/// resolved through the owning record when needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub entity: EntityId,
    pub field: String,
}

impl FieldRef {
    pub fn new(entity: EntityId, field: impl Into<String>) -> Self {
        Self {
            entity,
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.field)
    }
}

/// Positions of direct children inside the owning group's observer list.
pub type ChildIndices = SmallVec<[usize; 4]>;

/// The bookkeeping of a slot that belongs to a shared group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSlot {
    pub(crate) self_index: usize,
    pub(crate) child_indices: ChildIndices,
    pub(crate) group: GroupId,
}

impl BoundSlot {
    /// A slot anchoring a group of its own.
    pub(crate) fn root(group: GroupId) -> Self {
        Self::at(group, 0)
    }

    pub(crate) fn at(group: GroupId, self_index: usize) -> Self {
        Self {
            self_index,
            child_indices: ChildIndices::new(),
            group,
        }
    }

    /// Position of this slot in its group's observer list.
    pub fn self_index(&self) -> usize {
        self.self_index
    }

    /// Positions of the slots bound directly to this one.
    pub fn child_indices(&self) -> &[usize] {
        &self.child_indices
    }

    /// The group this slot belongs to.
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Whether this slot is the anchor of its group.
    ///
    /// Only roots may be bound outward.
    pub fn is_root(&self) -> bool {
        self.self_index == 0
    }
}

/// Storage for one field of one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<V> {
    /// The field owns its value and shares it with nobody.
    Simple(V),

    /// The field's value lives in a shared group.
    Bound(BoundSlot),
}

impl<V> Slot<V> {
    pub fn is_bound(&self) -> bool {
        matches!(self, Slot::Bound(_))
    }

    pub fn as_bound(&self) -> Option<&BoundSlot> {
        match self {
            Slot::Bound(bound) => Some(bound),
            Slot::Simple(_) => None,
        }
    }

    pub(crate) fn as_bound_mut(&mut self) -> Option<&mut BoundSlot> {
        match self {
            Slot::Bound(bound) => Some(bound),
            Slot::Simple(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_are_unique() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn field_ref_display() {
        let field = FieldRef::new(EntityId::from(3), "foo");
        assert_eq!(field.to_string(), "#3.foo");
    }

    #[test]
    fn root_slot_starts_childless() {
        let group = GroupId::new();
        let bound = BoundSlot::root(group);
        assert!(bound.is_root());
        assert!(bound.child_indices().is_empty());
        assert_eq!(bound.group(), group);

        let slot: Slot<i32> = Slot::Bound(bound);
        assert!(slot.is_bound());
        assert!(Slot::Simple(1).as_bound().is_none());
    }
}
