//! Bindings Handle
//!
//! [`Bindings`] is the public entry point: a cheaply cloneable handle to one
//! binding graph, exposing bind, unbind, get and set for the entities
//! registered with it.
//!
//! # Re-entrancy
//!
//! Every operation borrows the graph only for the structural change. Hooks
//! run after that borrow is released, so a hook may call back into the same
//! handle (for example to set a related field). A hook that needs the handle
//! should capture a [`WeakBindings`]; capturing a strong handle would keep the
//! graph alive through its own hook table.
//!
//! # Thread Safety
//!
//! None. The graph lives behind `Rc<RefCell<_>>` and hooks are `Rc<dyn Fn()>`,
//! so the handle is neither `Send` nor `Sync`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::dispatcher::Dispatcher;
use super::entity::Entity;
use super::options::{BindOptions, SetOptions};
use crate::error::{BindError, Result};
use crate::graph::{BoundSlot, EntityId, FieldRef, Graph, GroupSnapshot, Record, SharedGroup};

/// Shared handle to a binding graph.
///
/// Clones refer to the same graph.
pub struct Bindings<V> {
    graph: Rc<RefCell<Graph<V>>>,
}

impl<V> Bindings<V>
where
    V: Clone + PartialEq + 'static,
{
    /// Create an empty binding graph.
    pub fn new() -> Self {
        Self {
            graph: Rc::new(RefCell::new(Graph::new())),
        }
    }

    /// A handle that does not keep the graph alive.
    pub fn downgrade(&self) -> WeakBindings<V> {
        WeakBindings {
            graph: Rc::downgrade(&self.graph),
        }
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Register an entity with the given fields and initial values.
    pub fn create_entity<I, K>(&self, fields: I) -> EntityId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let mut record = Record::new(EntityId::new());
        for (field, value) in fields {
            record.declare(field, value);
        }
        self.graph.borrow_mut().insert_record(record)
    }

    /// Register an entity and return a handle to it.
    pub fn spawn<I, K>(&self, fields: I) -> Entity<V>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let id = self.create_entity(fields);
        Entity::new(self.clone(), id)
    }

    /// Handle to an already registered entity.
    pub fn entity(&self, id: EntityId) -> Result<Entity<V>> {
        self.graph.borrow().require(id)?;
        Ok(Entity::new(self.clone(), id))
    }

    /// Unbind every field of an entity and forget it.
    pub fn remove_entity(&self, id: EntityId) -> Result<()> {
        let record = self.graph.borrow_mut().remove_record(id)?;
        // Hooks may own handles to this graph; drop them with no borrow held.
        drop(record);
        Ok(())
    }

    /// Declare a new field on an entity.
    ///
    /// Returns `false` if the field already existed; its value is kept.
    pub fn declare_field(&self, id: EntityId, field: &str, value: V) -> Result<bool> {
        Ok(self.graph.borrow_mut().require_mut(id)?.declare(field, value))
    }

    pub fn has_field(&self, id: EntityId, field: &str) -> bool {
        self.graph
            .borrow()
            .record(id)
            .is_some_and(|record| record.has_field(field))
    }

    /// Field names of an entity, in declaration order.
    pub fn fields(&self, id: EntityId) -> Result<Vec<String>> {
        Ok(self
            .graph
            .borrow()
            .require(id)?
            .field_names()
            .map(str::to_owned)
            .collect())
    }

    /// Register the hook to run after `field` changes.
    ///
    /// Replaces any hook previously registered for the field.
    pub fn on_changed<F>(&self, id: EntityId, field: &str, hook: F) -> Result<()>
    where
        F: Fn() + 'static,
    {
        let replaced = {
            let mut graph = self.graph.borrow_mut();
            let record = graph.require_mut(id)?;
            if !record.has_field(field) {
                return Err(BindError::UndefinedField {
                    entity: id,
                    field: field.to_owned(),
                });
            }
            record.hooks_mut().register(field, hook)
        };
        drop(replaced);
        Ok(())
    }

    /// Remove the hook for `field`. Returns whether one was registered.
    pub fn clear_hook(&self, id: EntityId, field: &str) -> Result<bool> {
        let removed = self.graph.borrow_mut().require_mut(id)?.hooks_mut().remove(field);
        Ok(removed.is_some())
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Make `observer.key` share the value of `target.key`.
    pub fn bind_to(&self, observer: EntityId, key: &str, target: EntityId) -> Result<()> {
        self.bind_to_with(observer, key, target, &BindOptions::default())
    }

    /// Make `observer.key` share the value of a field on `target`.
    ///
    /// The target field is `options.target_key`, or `key` when unset.
    pub fn bind_to_with(
        &self,
        observer: EntityId,
        key: &str,
        target: EntityId,
        options: &BindOptions,
    ) -> Result<()> {
        let target_key = options.target_key.as_deref().unwrap_or(key);
        let observer = FieldRef::new(observer, key);
        let target = FieldRef::new(target, target_key);

        let pending = self
            .graph
            .borrow_mut()
            .bind(&observer, &target, options.suppress_notify)?;
        self.notify(pending);
        Ok(())
    }

    /// Detach `key` from the group it belongs to.
    pub fn unbind(&self, id: EntityId, key: &str) -> Result<()> {
        self.graph.borrow_mut().unbind(&FieldRef::new(id, key))
    }

    /// Unbind every bound field of an entity. Simple fields are left alone.
    pub fn unbind_all(&self, id: EntityId) -> Result<()> {
        let bound = self.graph.borrow().require(id)?.bound_fields();
        for field in bound {
            self.unbind(id, &field)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Current value of a field.
    pub fn get(&self, id: EntityId, key: &str) -> Result<V> {
        self.graph
            .borrow()
            .value(&FieldRef::new(id, key))
            .cloned()
    }

    /// Write a field, notifying every field that shares it.
    ///
    /// Writing the current value again is a no-op.
    pub fn set(&self, id: EntityId, key: &str, value: V) -> Result<()> {
        self.set_with(id, key, value, SetOptions::default())
    }

    pub fn set_with(&self, id: EntityId, key: &str, value: V, options: SetOptions) -> Result<()> {
        let pending = self.graph.borrow_mut().write(
            &FieldRef::new(id, key),
            value,
            options.force_callback,
        )?;
        self.notify(pending);
        Ok(())
    }

    /// Write several fields in order.
    ///
    /// Not atomic: if a write fails, the earlier writes stay committed.
    pub fn set_values<I, K>(&self, id: EntityId, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        for (key, value) in pairs {
            self.set(id, key.as_ref(), value)?;
        }
        Ok(())
    }

    /// Write the result of `f` applied to the current value.
    pub fn update<F>(&self, id: EntityId, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(&V) -> V,
    {
        let current = self.get(id, key)?;
        self.set(id, key, f(&current))
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn is_bound(&self, id: EntityId, key: &str) -> Result<bool> {
        Ok(self.graph.borrow().slot(&FieldRef::new(id, key))?.is_bound())
    }

    /// Whether two fields currently share a group.
    pub fn shares_value(&self, a: EntityId, a_key: &str, b: EntityId, b_key: &str) -> Result<bool> {
        let graph = self.graph.borrow();
        let left = graph.group_of(&FieldRef::new(a, a_key))?;
        let right = graph.group_of(&FieldRef::new(b, b_key))?;
        Ok(left.is_some() && left == right)
    }

    /// Number of live members in the field's group, or `None` if unbound.
    pub fn group_len(&self, id: EntityId, key: &str) -> Result<Option<usize>> {
        let graph = self.graph.borrow();
        let group = graph.group_of(&FieldRef::new(id, key))?;
        Ok(group
            .and_then(|group| graph.group(group))
            .map(SharedGroup::live_count))
    }

    /// The field's index bookkeeping, or `None` if unbound.
    pub fn bound_slot(&self, id: EntityId, key: &str) -> Result<Option<BoundSlot>> {
        Ok(self
            .graph
            .borrow()
            .slot(&FieldRef::new(id, key))?
            .as_bound()
            .cloned())
    }

    /// A copy of the field's group, or `None` if unbound.
    pub fn snapshot(&self, id: EntityId, key: &str) -> Result<Option<GroupSnapshot<V>>> {
        let graph = self.graph.borrow();
        let group = graph.group_of(&FieldRef::new(id, key))?;
        Ok(group
            .and_then(|group| graph.group(group))
            .map(SharedGroup::snapshot))
    }

    pub fn entity_count(&self) -> usize {
        self.graph.borrow().record_count()
    }

    pub fn group_count(&self) -> usize {
        self.graph.borrow().group_count()
    }

    /// Whether every slot and group agree on their indices.
    pub fn is_consistent(&self) -> bool {
        self.graph.borrow().is_consistent()
    }

    fn notify(&self, pending: Vec<FieldRef>) {
        if pending.is_empty() {
            return;
        }
        let notification = {
            let graph = self.graph.borrow();
            Dispatcher::collect(&*graph, pending)
        };
        notification.dispatch();
    }
}

impl<V> Clone for Bindings<V> {
    fn clone(&self) -> Self {
        Self {
            graph: Rc::clone(&self.graph),
        }
    }
}

impl<V> Default for Bindings<V>
where
    V: Clone + PartialEq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Bindings<V>
where
    V: Clone + PartialEq,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Bindings");
        match self.graph.try_borrow() {
            Ok(graph) => debug
                .field("entities", &graph.record_count())
                .field("groups", &graph.group_count()),
            Err(_) => debug.field("graph", &"<borrowed>"),
        };
        debug.finish()
    }
}

/// Non-owning handle to a binding graph.
pub struct WeakBindings<V> {
    graph: Weak<RefCell<Graph<V>>>,
}

impl<V> WeakBindings<V> {
    /// Recover a strong handle, if the graph is still alive.
    pub fn upgrade(&self) -> Option<Bindings<V>> {
        self.graph.upgrade().map(|graph| Bindings { graph })
    }
}

impl<V> Clone for WeakBindings<V> {
    fn clone(&self) -> Self {
        Self {
            graph: Weak::clone(&self.graph),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
