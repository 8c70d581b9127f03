//! Change Notification Dispatcher
//!
//! The dispatcher turns the members reported by a graph mutation into the
//! hooks to run, and runs them.
//!
//! # How It Works
//!
//! 1. While the graph is borrowed, [`Dispatcher::collect`] resolves each
//!    member to the hook its entity registered for that field. Members
//!    without a hook are skipped.
//!
//! 2. The caller releases the graph.
//!
//! 3. [`Notification::dispatch`] invokes the hooks in the order the members
//!    were reported, which is the group's append order.
//!
//! Because no borrow is held in step 3, a hook may call back into the
//! bindings API.

use std::collections::HashSet;

use tracing::trace;

use crate::graph::{ChangeHook, FieldRef, Graph};

/// Hooks gathered for one mutation, not yet invoked.
#[must_use = "a notification does nothing until dispatched"]
#[derive(Default)]
pub struct Notification {
    hooks: Vec<(FieldRef, ChangeHook)>,
}

impl Notification {
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Invoke every collected hook once.
    pub fn dispatch(self) {
        for (field, hook) in self.hooks {
            trace!(field = %field, "invoking change hook");
            hook();
        }
    }
}

/// Resolves mutated members to their change hooks.
pub struct Dispatcher;

impl Dispatcher {
    /// Collect the hooks for `members`, keeping their order.
    ///
    /// Members whose entity is gone or registered no hook for the field are
    /// skipped. A member listed twice is only notified once.
    pub fn collect<V>(graph: &Graph<V>, members: Vec<FieldRef>) -> Notification
    where
        V: Clone + PartialEq,
    {
        let mut notification = Notification::default();
        let mut seen = HashSet::new();
        for member in members {
            if !seen.insert(member.clone()) {
                continue;
            }
            let hook = graph
                .record(member.entity)
                .and_then(|record| record.changed_hook(&member.field));
            if let Some(hook) = hook {
                notification.hooks.push((member, hook));
            }
        }
        notification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EntityId, Record};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn collects_in_member_order_and_skips_missing_hooks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph: Graph<i32> = Graph::new();

        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            let mut record = Record::new(EntityId::new());
            record.declare("foo", 0);
            if name != "b" {
                let log = log.clone();
                record.hooks_mut().register("foo", move || log.borrow_mut().push(name));
            }
            ids.push(graph.insert_record(record));
        }

        let members: Vec<FieldRef> = ids
            .iter()
            .rev()
            .map(|id| FieldRef::new(*id, "foo"))
            .collect();
        let notification = Dispatcher::collect(&graph, members);
        assert_eq!(notification.len(), 2);

        notification.dispatch();
        assert_eq!(*log.borrow(), vec!["c", "a"]);
    }

    #[test]
    fn duplicate_members_fire_once() {
        let calls = Rc::new(RefCell::new(0));
        let mut graph: Graph<i32> = Graph::new();

        let mut record = Record::new(EntityId::new());
        record.declare("foo", 0);
        let calls_clone = calls.clone();
        record
            .hooks_mut()
            .register("foo", move || *calls_clone.borrow_mut() += 1);
        let id = graph.insert_record(record);

        let field = FieldRef::new(id, "foo");
        Dispatcher::collect(&graph, vec![field.clone(), field]).dispatch();
        assert_eq!(*calls.borrow(), 1);
    }
}
