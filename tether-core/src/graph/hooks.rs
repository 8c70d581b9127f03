//! Change hooks.
//!
//! A hook is the callback an entity registers for one of its fields. It runs
//! after the field's value changed, with no arguments.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Callback invoked after a field's value changed.
///
/// Hooks are reference counted so a dispatch can hold on to them after the
/// graph is released.
pub type ChangeHook = Rc<dyn Fn()>;

/// Per-entity table of change hooks, looked up by field name.
#[derive(Clone, Default)]
pub struct Hooks {
    table: HashMap<String, ChangeHook>,
}

impl Hooks {
    /// Register `hook` for `field`, returning the hook it replaced.
    pub fn register<F>(&mut self, field: impl Into<String>, hook: F) -> Option<ChangeHook>
    where
        F: Fn() + 'static,
    {
        self.table.insert(field.into(), Rc::new(hook))
    }

    /// Remove the hook for `field`.
    pub fn remove(&mut self, field: &str) -> Option<ChangeHook> {
        self.table.remove(field)
    }

    /// The hook registered for `field`, if any.
    pub fn lookup(&self, field: &str) -> Option<ChangeHook> {
        self.table.get(field).cloned()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn lookup_returns_registered_hook() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let mut hooks = Hooks::default();
        assert!(hooks.register("foo", move || calls_clone.set(calls_clone.get() + 1)).is_none());
        assert!(hooks.lookup("bar").is_none());

        let hook = hooks.lookup("foo").expect("hook registered");
        hook();
        hook();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn register_replaces_previous_hook() {
        let mut hooks = Hooks::default();
        hooks.register("foo", || {});
        assert!(hooks.register("foo", || {}).is_some());
        assert_eq!(hooks.len(), 1);

        assert!(hooks.remove("foo").is_some());
        assert!(hooks.is_empty());
    }
}
