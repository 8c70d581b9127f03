//! Entity Records
//!
//! A record is the engine's view of a host entity: its declared fields, each
//! backed by a [`Slot`], and the change hooks it registered.

use indexmap::IndexMap;

use super::slot::{EntityId, Slot};
use super::hooks::{ChangeHook, Hooks};

/// The declared fields and change hooks of one entity.
#[derive(Debug)]
pub struct Record<V> {
    id: EntityId,

    /// Fields in declaration order.
    fields: IndexMap<String, Slot<V>>,

    hooks: Hooks,
}

impl<V> Record<V> {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            fields: IndexMap::new(),
            hooks: Hooks::default(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Declare a field holding `value`.
    ///
    /// Returns `false` and leaves the field untouched if it already exists.
    pub fn declare(&mut self, field: impl Into<String>, value: V) -> bool {
        let field = field.into();
        if self.fields.contains_key(&field) {
            return false;
        }
        self.fields.insert(field, Slot::Simple(value));
        true
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn slot(&self, field: &str) -> Option<&Slot<V>> {
        self.fields.get(field)
    }

    pub fn slot_mut(&mut self, field: &str) -> Option<&mut Slot<V>> {
        self.fields.get_mut(field)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    /// Names of the fields currently bound into a group.
    pub fn bound_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, slot)| slot.is_bound())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// The hook registered for `field`, if any.
    pub fn changed_hook(&self, field: &str) -> Option<ChangeHook> {
        self.hooks.lookup(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_keeps_existing_fields() {
        let mut record = Record::new(EntityId::new());
        assert!(record.declare("foo", 1));
        assert!(!record.declare("foo", 2));
        assert_eq!(record.slot("foo"), Some(&Slot::Simple(1)));
        assert!(record.has_field("foo"));
        assert!(!record.has_field("bar"));
    }

    #[test]
    fn field_names_follow_declaration_order() {
        let mut record = Record::new(EntityId::new());
        record.declare("zeta", 0);
        record.declare("alpha", 0);
        record.declare("mid", 0);

        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(record.bound_fields().is_empty());
    }
}
