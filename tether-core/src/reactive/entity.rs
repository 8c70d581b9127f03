//! Entity handles.
//!
//! An [`Entity`] pairs an entity id with the bindings it was registered in,
//! so the accessor API reads as methods on the entity itself.

use std::fmt;

use super::bindings::Bindings;
use super::options::{BindOptions, SetOptions};
use crate::error::Result;
use crate::graph::EntityId;

/// Handle to one entity in a binding graph.
///
/// # Example
///
/// ```rust,ignore
/// let bindings = Bindings::new();
/// let a = bindings.spawn([("foo", json!("bar"))]);
/// let b = bindings.spawn([("foo", json!("x"))]);
///
/// b.bind_to("foo", &a)?;
/// b.set("foo", json!("cool"))?;
/// assert_eq!(a.get("foo")?, json!("cool"));
/// ```
pub struct Entity<V> {
    bindings: Bindings<V>,
    id: EntityId,
}

impl<V> Entity<V>
where
    V: Clone + PartialEq + 'static,
{
    pub(crate) fn new(bindings: Bindings<V>, id: EntityId) -> Self {
        Self { bindings, id }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn bindings(&self) -> &Bindings<V> {
        &self.bindings
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.bindings.has_field(self.id, key)
    }

    pub fn declare_field(&self, key: &str, value: V) -> Result<bool> {
        self.bindings.declare_field(self.id, key, value)
    }

    pub fn on_changed<F>(&self, key: &str, hook: F) -> Result<()>
    where
        F: Fn() + 'static,
    {
        self.bindings.on_changed(self.id, key, hook)
    }

    pub fn clear_hook(&self, key: &str) -> Result<bool> {
        self.bindings.clear_hook(self.id, key)
    }

    /// Share `key` with the same field on `target`.
    pub fn bind_to(&self, key: &str, target: &Entity<V>) -> Result<()> {
        self.bindings.bind_to(self.id, key, target.id)
    }

    pub fn bind_to_with(&self, key: &str, target: &Entity<V>, options: &BindOptions) -> Result<()> {
        self.bindings.bind_to_with(self.id, key, target.id, options)
    }

    pub fn unbind(&self, key: &str) -> Result<()> {
        self.bindings.unbind(self.id, key)
    }

    pub fn unbind_all(&self) -> Result<()> {
        self.bindings.unbind_all(self.id)
    }

    pub fn is_bound(&self, key: &str) -> Result<bool> {
        self.bindings.is_bound(self.id, key)
    }

    pub fn get(&self, key: &str) -> Result<V> {
        self.bindings.get(self.id, key)
    }

    pub fn set(&self, key: &str, value: V) -> Result<()> {
        self.bindings.set(self.id, key, value)
    }

    pub fn set_with(&self, key: &str, value: V, options: SetOptions) -> Result<()> {
        self.bindings.set_with(self.id, key, value, options)
    }

    pub fn set_values<I, K>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        self.bindings.set_values(self.id, pairs)
    }

    pub fn update<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(&V) -> V,
    {
        self.bindings.update(self.id, key, f)
    }
}

impl<V> Clone for Entity<V> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
            id: self.id,
        }
    }
}

impl<V> fmt::Debug for Entity<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity").field("id", &self.id).finish()
    }
}
