//! Shared Groups
//!
//! A shared group holds the canonical value for every field bound into it,
//! plus a flat list of those fields in registration order.
//!
//! Positions in the observer list are stable: removing a member leaves a
//! tombstone behind instead of shifting later entries, so the indices that
//! slots keep about themselves and their children stay valid without a
//! reindex.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::slot::FieldRef;

/// Unique identifier for a shared group in the engine arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(u64);

impl GroupId {
    /// Generate a new unique group ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

/// A canonical value shared by every field in the observer list.
#[derive(Debug, Clone)]
pub struct SharedGroup<V> {
    id: GroupId,

    value: V,

    /// Members in append order. `None` is a tombstone.
    observers: Vec<Option<FieldRef>>,

    /// Number of non-tombstone entries in `observers`.
    live: usize,
}

impl<V> SharedGroup<V> {
    /// Create a group whose first (root) member is `root`.
    pub fn seeded(value: V, root: FieldRef) -> Self {
        Self {
            id: GroupId::new(),
            value,
            observers: vec![Some(root)],
            live: 1,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Replace the canonical value, returning the previous one.
    pub fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Append a member and return the position it was assigned.
    pub fn insert(&mut self, member: FieldRef) -> usize {
        let index = self.observers.len();
        self.observers.push(Some(member));
        self.live += 1;
        index
    }

    /// Append a tombstone and return its position.
    pub fn insert_tombstone(&mut self) -> usize {
        let index = self.observers.len();
        self.observers.push(None);
        index
    }

    /// Tombstone the entry at `index`, returning the member that was there.
    ///
    /// Returns `None` if the position was already a tombstone or out of range.
    pub fn tombstone(&mut self, index: usize) -> Option<FieldRef> {
        let removed = self.observers.get_mut(index)?.take();
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Append every position of `other` (tombstones included) after the last
    /// entry of this group. Returns the position of `other`'s first entry.
    ///
    /// `other`'s value is discarded.
    pub fn absorb(&mut self, other: SharedGroup<V>) -> usize {
        let base = self.observers.len();
        self.live += other.live;
        self.observers.extend(other.observers);
        base
    }

    /// The member at `index`, if it is not a tombstone.
    pub fn get(&self, index: usize) -> Option<&FieldRef> {
        self.observers.get(index).and_then(Option::as_ref)
    }

    /// Total number of positions, tombstones included.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no live member remains.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn tombstone_count(&self) -> usize {
        self.observers.len() - self.live
    }

    /// Live members with their positions, in append order.
    pub fn live_members(&self) -> impl Iterator<Item = (usize, &FieldRef)> + '_ {
        self.observers
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|member| (index, member)))
    }
}

impl<V: Clone> SharedGroup<V> {
    pub fn snapshot(&self) -> GroupSnapshot<V> {
        GroupSnapshot {
            id: self.id,
            value: self.value.clone(),
            observers: self.observers.clone(),
            live: self.live,
        }
    }
}

/// A point-in-time copy of a shared group, for inspection and debugging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSnapshot<V> {
    pub id: GroupId,
    pub value: V,
    pub observers: Vec<Option<FieldRef>>,
    pub live: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EntityId;

    fn member(name: &str) -> FieldRef {
        FieldRef::new(EntityId::new(), name)
    }

    #[test]
    fn group_ids_are_unique() {
        assert_ne!(GroupId::new(), GroupId::new());
    }

    #[test]
    fn insert_assigns_next_position() {
        let mut group = SharedGroup::seeded(1, member("root"));
        assert_eq!(group.insert(member("a")), 1);
        assert_eq!(group.insert(member("b")), 2);
        assert_eq!(group.len(), 3);
        assert_eq!(group.live_count(), 3);
    }

    #[test]
    fn tombstone_preserves_positions() {
        let mut group = SharedGroup::seeded(1, member("root"));
        let a = member("a");
        let b = member("b");
        group.insert(a.clone());
        group.insert(b.clone());

        assert_eq!(group.tombstone(1), Some(a));
        assert_eq!(group.tombstone(1), None);
        assert_eq!(group.len(), 3);
        assert_eq!(group.live_count(), 2);
        assert_eq!(group.tombstone_count(), 1);
        assert_eq!(group.get(2), Some(&b));

        let positions: Vec<usize> = group.live_members().map(|(i, _)| i).collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn absorb_concatenates_positions() {
        let mut target = SharedGroup::seeded("t", member("root"));
        target.insert_tombstone();

        let mut other = SharedGroup::seeded("o", member("other"));
        let tail = member("tail");
        other.insert(tail.clone());
        other.tombstone(0);

        let base = target.absorb(other);
        assert_eq!(base, 2);
        assert_eq!(target.len(), 4);
        assert_eq!(target.live_count(), 2);
        assert_eq!(target.get(3), Some(&tail));
        assert_eq!(*target.value(), "t");
    }

    #[test]
    fn empty_after_last_member_leaves() {
        let mut group = SharedGroup::seeded(0, member("root"));
        assert!(!group.is_empty());
        group.tombstone(0);
        assert!(group.is_empty());
    }
}
