//! Binding Graph Engine
//!
//! The engine owns every entity record and every shared group, and performs
//! the structural operations that move slots between groups.
//!
//! # Algorithm
//!
//! Each group keeps a flat observer list for notification. Layered on top of
//! it is a forest: every bound slot remembers the positions of the slots that
//! were bound directly to it. The forest is what keeps the structural
//! operations local:
//!
//! 1. Binding a `Simple` field appends it to the target's group.
//! 2. Binding a group root to another group shifts every index held by the
//!    root's group by the target's length, then concatenates the two observer
//!    lists. Only the absorbed group is touched.
//! 3. Unbinding a slot with children tombstones its subtree in the old group
//!    and rebuilds it, deepest entries first, inside a fresh group. Members
//!    that stay behind keep their positions.
//! 4. Removing an entity detaches its fields in place. The group root adopts
//!    the children of a detached field; when the root itself goes, its first
//!    child becomes the new root and its other children bind to it.
//!
//! Structural operations never fire hooks. They return the members that need
//! notifying and leave dispatch to the caller, so the graph is consistent by
//! the time any hook observes it.

use std::collections::HashMap;

use tracing::debug;

use super::group::{GroupId, SharedGroup};
use super::record::Record;
use super::slot::{BoundSlot, ChildIndices, EntityId, FieldRef, Slot};
use crate::error::{BindError, Result};

fn undefined(field: &FieldRef) -> BindError {
    BindError::UndefinedField {
        entity: field.entity,
        field: field.field.clone(),
    }
}

fn not_bound(field: &FieldRef) -> BindError {
    BindError::NotBound {
        entity: field.entity,
        field: field.field.clone(),
    }
}

/// Arena of entity records and shared groups.
#[derive(Debug)]
pub struct Graph<V> {
    records: HashMap<EntityId, Record<V>>,
    groups: HashMap<GroupId, SharedGroup<V>>,
}

impl<V> Graph<V>
where
    V: Clone + PartialEq,
{
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Register a record with the graph.
    pub fn insert_record(&mut self, record: Record<V>) -> EntityId {
        let id = record.id();
        self.records.insert(id, record);
        id
    }

    /// Detach every field of an entity and drop its record.
    ///
    /// Unlike [`Graph::unbind`], the fields bound through the entity keep
    /// sharing the group's value.
    pub fn remove_record(&mut self, id: EntityId) -> Result<Record<V>> {
        let bound = self.require(id)?.bound_fields();
        for field in bound {
            let field = FieldRef::new(id, field);
            // re-rooting may already have released a sibling field
            if self.slot(&field)?.is_bound() {
                self.detach(&field)?;
            }
        }
        self.records.remove(&id).ok_or(BindError::UnknownEntity(id))
    }

    pub fn record(&self, id: EntityId) -> Option<&Record<V>> {
        self.records.get(&id)
    }

    pub(crate) fn require(&self, id: EntityId) -> Result<&Record<V>> {
        self.records.get(&id).ok_or(BindError::UnknownEntity(id))
    }

    pub(crate) fn require_mut(&mut self, id: EntityId) -> Result<&mut Record<V>> {
        self.records.get_mut(&id).ok_or(BindError::UnknownEntity(id))
    }

    pub fn slot(&self, field: &FieldRef) -> Result<&Slot<V>> {
        self.require(field.entity)?
            .slot(&field.field)
            .ok_or_else(|| undefined(field))
    }

    fn slot_mut(&mut self, field: &FieldRef) -> Result<&mut Slot<V>> {
        self.require_mut(field.entity)?
            .slot_mut(&field.field)
            .ok_or_else(|| undefined(field))
    }

    fn bound_mut(&mut self, field: &FieldRef) -> Option<&mut BoundSlot> {
        self.records
            .get_mut(&field.entity)?
            .slot_mut(&field.field)?
            .as_bound_mut()
    }

    pub fn group(&self, id: GroupId) -> Option<&SharedGroup<V>> {
        self.groups.get(&id)
    }

    /// The group a field belongs to, or `None` if it is `Simple`.
    pub fn group_of(&self, field: &FieldRef) -> Result<Option<GroupId>> {
        Ok(self.slot(field)?.as_bound().map(BoundSlot::group))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Current value of a field, wherever it is stored.
    pub fn value(&self, field: &FieldRef) -> Result<&V> {
        match self.slot(field)? {
            Slot::Simple(value) => Ok(value),
            Slot::Bound(bound) => self
                .groups
                .get(&bound.group)
                .map(SharedGroup::value)
                .ok_or_else(|| not_bound(field)),
        }
    }

    /// Commit a new value for a field.
    ///
    /// Returns the members whose hooks should fire: every live member of the
    /// group for a bound field, the field itself for a simple one. An
    /// unchanged value reports nothing, unless `force` is set on a bound
    /// field.
    pub fn write(&mut self, field: &FieldRef, value: V, force: bool) -> Result<Vec<FieldRef>> {
        let group_id = match self.slot_mut(field)? {
            Slot::Simple(current) => {
                if *current == value {
                    return Ok(Vec::new());
                }
                *current = value;
                return Ok(vec![field.clone()]);
            }
            Slot::Bound(bound) => bound.group,
        };

        let group = self
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| not_bound(field))?;
        if *group.value() == value && !force {
            return Ok(Vec::new());
        }
        group.replace_value(value);
        Ok(group.live_members().map(|(_, member)| member.clone()).collect())
    }

    /// Turn a simple field into the root of a new group of one.
    ///
    /// Returns the field's group, whether it was just created or not.
    pub fn promote(&mut self, field: &FieldRef) -> Result<GroupId> {
        let value = match self.slot(field)? {
            Slot::Bound(bound) => return Ok(bound.group),
            Slot::Simple(value) => value.clone(),
        };

        let group = SharedGroup::seeded(value, field.clone());
        let id = group.id();
        *self.slot_mut(field)? = Slot::Bound(BoundSlot::root(id));
        self.groups.insert(id, group);

        debug!(field = %field, group = id.raw(), "promoted field to shared group");
        Ok(id)
    }

    /// Bind `observer` to `target` so that both share the target's value.
    ///
    /// If the observer already anchors a group, that whole group is merged
    /// into the target's. Returns the newly attached members whose hooks
    /// should fire.
    pub fn bind(
        &mut self,
        observer: &FieldRef,
        target: &FieldRef,
        suppress_notify: bool,
    ) -> Result<Vec<FieldRef>> {
        let target_group = self.group_of(target)?;
        let observer_group = match self.slot(observer)? {
            Slot::Bound(bound) if !bound.is_root() => {
                return Err(BindError::AlreadyBound {
                    entity: observer.entity,
                    field: observer.field.clone(),
                });
            }
            Slot::Bound(bound) => Some(bound.group),
            Slot::Simple(_) => None,
        };
        if observer == target || (observer_group.is_some() && observer_group == target_group) {
            return Err(BindError::BindingCycle {
                entity: observer.entity,
                field: observer.field.clone(),
            });
        }

        let group_id = self.promote(target)?;
        let base = self
            .groups
            .get(&group_id)
            .map(SharedGroup::len)
            .ok_or_else(|| not_bound(target))?;
        if let Some(bound) = self.bound_mut(target) {
            bound.child_indices.push(base);
        }

        let previous = match observer_group {
            Some(absorbed_id) => {
                self.shift_group(absorbed_id, base);
                let absorbed = self
                    .groups
                    .remove(&absorbed_id)
                    .ok_or_else(|| not_bound(observer))?;
                let previous = absorbed.value().clone();
                let group = self
                    .groups
                    .get_mut(&group_id)
                    .ok_or_else(|| not_bound(target))?;
                let at = group.absorb(absorbed);
                debug_assert_eq!(at, base);

                debug!(
                    observer = %observer,
                    target = %target,
                    base,
                    absorbed = absorbed_id.raw(),
                    "merged groups"
                );
                previous
            }
            None => {
                let slot = self.slot_mut(observer)?;
                let replaced = std::mem::replace(slot, Slot::Bound(BoundSlot::at(group_id, base)));
                let Slot::Simple(previous) = replaced else {
                    return Err(BindError::AlreadyBound {
                        entity: observer.entity,
                        field: observer.field.clone(),
                    });
                };
                let group = self
                    .groups
                    .get_mut(&group_id)
                    .ok_or_else(|| not_bound(target))?;
                let at = group.insert(observer.clone());
                debug_assert_eq!(at, base);

                debug!(observer = %observer, target = %target, base, "attached field");
                previous
            }
        };

        let group = self
            .groups
            .get(&group_id)
            .ok_or_else(|| not_bound(target))?;
        let changed = *group.value() != previous;
        let attached: Vec<(usize, FieldRef)> = group
            .live_members()
            .filter(|(index, _)| *index >= base)
            .map(|(index, member)| (index, member.clone()))
            .collect();

        let mut pending = Vec::new();
        for (index, member) in attached {
            if let Some(bound) = self.bound_mut(&member) {
                bound.group = group_id;
            }
            let notify = if index == base { !suppress_notify } else { changed };
            if notify {
                pending.push(member);
            }
        }

        debug_assert!(self.group_is_consistent(group_id));
        Ok(pending)
    }

    /// Shift every index held by the members of `id` by `base` positions.
    ///
    /// Child positions that point at tombstones are dropped on the way.
    fn shift_group(&mut self, id: GroupId, base: usize) {
        let Some(group) = self.groups.get(&id) else {
            return;
        };
        for (_, member) in group.live_members() {
            let bound = self
                .records
                .get_mut(&member.entity)
                .and_then(|record| record.slot_mut(&member.field))
                .and_then(Slot::as_bound_mut);
            let Some(bound) = bound else {
                continue;
            };
            bound.self_index += base;
            bound.child_indices.retain(|child| group.get(*child).is_some());
            for child in bound.child_indices.iter_mut() {
                *child += base;
            }
        }
    }

    /// Detach a field from its group.
    ///
    /// A childless field collapses back to a simple value. A field with
    /// children takes its whole subtree along into a fresh group, where it
    /// becomes the root.
    pub fn unbind(&mut self, field: &FieldRef) -> Result<()> {
        let bound = match self.slot(field)? {
            Slot::Bound(bound) => bound.clone(),
            Slot::Simple(_) => return Err(not_bound(field)),
        };
        let old = self
            .groups
            .get_mut(&bound.group)
            .ok_or_else(|| not_bound(field))?;
        old.tombstone(bound.self_index);
        let value = old.value().clone();
        let root = old.get(0).cloned();
        if let Some(root) = root {
            self.forget_child(&root, bound.self_index);
        }

        if bound.child_indices.is_empty() {
            *self.slot_mut(field)? = Slot::Simple(value);
            debug!(field = %field, group = bound.group.raw(), "collapsed field to simple value");
        } else {
            let fresh = SharedGroup::seeded(value, field.clone());
            let fresh_id = fresh.id();
            self.groups.insert(fresh_id, fresh);
            if let Some(slot) = self.bound_mut(field) {
                slot.group = fresh_id;
                slot.self_index = 0;
            }
            self.rebind_subtree(bound.group, fresh_id, field);
            debug_assert!(self.group_is_consistent(fresh_id));

            debug!(
                field = %field,
                from = bound.group.raw(),
                to = fresh_id.raw(),
                "split subtree into new group"
            );
        }

        self.release_if_empty(bound.group);
        debug_assert!(self.group_is_consistent(bound.group));
        Ok(())
    }

    /// Tombstone a field's position and give it back a simple value.
    ///
    /// The group root adopts the field's children. If the field was the root,
    /// the group is rebuilt around its first child.
    fn detach(&mut self, field: &FieldRef) -> Result<()> {
        let bound = match self.slot(field)? {
            Slot::Bound(bound) => bound.clone(),
            Slot::Simple(_) => return Err(not_bound(field)),
        };
        let group_id = bound.group;
        let group = self
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| not_bound(field))?;
        group.tombstone(bound.self_index);
        let value = group.value().clone();
        let root = group.get(0).cloned();
        let children: Vec<FieldRef> = bound
            .child_indices
            .iter()
            .filter_map(|&index| group.get(index).cloned())
            .collect();
        *self.slot_mut(field)? = Slot::Simple(value);
        debug!(field = %field, group = group_id.raw(), "detached field");

        match root {
            Some(root) => {
                self.forget_child(&root, bound.self_index);
                if let Some(root_slot) = self.bound_mut(&root) {
                    root_slot.child_indices.extend(bound.child_indices.iter().copied());
                }
            }
            None => self.reroot(&children)?,
        }

        self.release_if_empty(group_id);
        Ok(())
    }

    /// Rebuild a group whose root was detached.
    ///
    /// The first orphan is unbound and becomes the new root; the others are
    /// unbound and bound to it. Values are equal throughout, so nothing is
    /// reported.
    fn reroot(&mut self, orphans: &[FieldRef]) -> Result<()> {
        let Some((head, rest)) = orphans.split_first() else {
            return Ok(());
        };
        self.unbind(head)?;
        for orphan in rest {
            self.unbind(orphan)?;
            self.bind(orphan, head, true)?;
        }
        debug!(root = %head, orphans = orphans.len(), "re-rooted group");
        Ok(())
    }

    /// Drop `index` from the child list of `parent`.
    fn forget_child(&mut self, parent: &FieldRef, index: usize) {
        if let Some(bound) = self.bound_mut(parent) {
            bound.child_indices.retain(|child| *child != index);
        }
    }

    /// Move every descendant of `parent` from group `old` into group `fresh`.
    ///
    /// Children are relocated depth-first, so the deepest descendants take
    /// the lowest positions in the new group.
    fn rebind_subtree(&mut self, old: GroupId, fresh: GroupId, parent: &FieldRef) {
        let children = match self.bound_mut(parent) {
            Some(bound) => std::mem::take(&mut bound.child_indices),
            None => return,
        };

        let mut relocated = ChildIndices::new();
        for index in children {
            let detached = self.groups.get_mut(&old).and_then(|g| g.tombstone(index));
            let Some(child) = detached else {
                if let Some(group) = self.groups.get_mut(&fresh) {
                    group.insert_tombstone();
                }
                continue;
            };

            self.rebind_subtree(old, fresh, &child);

            let Some(position) = self.groups.get_mut(&fresh).map(|g| g.insert(child.clone())) else {
                continue;
            };
            if let Some(bound) = self.bound_mut(&child) {
                bound.group = fresh;
                bound.self_index = position;
            }
            relocated.push(position);
        }

        if let Some(bound) = self.bound_mut(parent) {
            bound.child_indices = relocated;
        }
    }

    fn release_if_empty(&mut self, id: GroupId) {
        if self.groups.get(&id).is_some_and(SharedGroup::is_empty) {
            self.groups.remove(&id);
            debug!(group = id.raw(), "released empty group");
        }
    }

    /// Check that one group and the slots it lists agree with each other.
    ///
    /// A group that no longer exists passes.
    fn group_is_consistent(&self, id: GroupId) -> bool {
        self.groups
            .get(&id)
            .map_or(true, |group| self.group_agrees(id, group))
    }

    fn group_agrees(&self, id: GroupId, group: &SharedGroup<V>) -> bool {
        !group.is_empty()
            && group.live_members().all(|(index, member)| match self.slot(member) {
                Ok(Slot::Bound(bound)) => {
                    bound.group == id
                        && bound.self_index == index
                        && bound.child_indices.iter().all(|&child| child < group.len())
                }
                _ => false,
            })
    }

    /// Check that every group has a live root, and that every group and every
    /// bound slot agree with each other.
    ///
    /// Walks the whole graph; meant for tests.
    pub fn is_consistent(&self) -> bool {
        let groups_agree = self
            .groups
            .iter()
            .all(|(id, group)| group.get(0).is_some() && self.group_agrees(*id, group));

        let slots_agree = self.records.values().all(|record| {
            record.field_names().all(|name| match record.slot(name) {
                Some(Slot::Bound(bound)) => self
                    .groups
                    .get(&bound.group)
                    .and_then(|group| group.get(bound.self_index))
                    .is_some_and(|member| member.entity == record.id() && member.field == name),
                _ => true,
            })
        });

        groups_agree && slots_agree
    }
}

impl<V> Default for Graph<V>
where
    V: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}
