use std::collections::HashMap;

use crate::ast::Value;

/// Per-query variable environment: an insertion-ordered map from variable
/// name to an optional bound value.
///
/// Declaration order is fixed by first occurrence during parsing and is
/// the order variables are reported in on success. Entries are never
/// removed; `unset` only reverts a value, which is the undo primitive the
/// resolver relies on when a tentative binding fails.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    order: Vec<String>,
    slots: HashMap<String, Slot>,
}

#[derive(Debug, Clone)]
struct Slot {
    value: Option<Value>,
    /// Variables from the original query are reported on success;
    /// variables introduced during matching are not.
    public: bool,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Declare a reportable variable. The first occurrence fixes the
    /// reporting order; declaring the same name again is a no-op.
    pub fn declare(&mut self, name: &str) {
        if !self.slots.contains_key(name) {
            self.order.push(name.to_string());
            self.slots
                .insert(name.to_string(), Slot { value: None, public: true });
        }
    }

    /// Bind `name` to a value. A name that was never declared is added as
    /// a private entry rather than treated as a fault.
    pub fn bind(&mut self, name: &str, value: Value) {
        match self.slots.get_mut(name) {
            Some(slot) => slot.value = Some(value),
            None => {
                self.order.push(name.to_string());
                self.slots
                    .insert(name.to_string(), Slot { value: Some(value), public: false });
            }
        }
    }

    /// Revert an entry to unbound. The `public` flag is left untouched so
    /// a later successful path still reports the variable.
    pub fn unset(&mut self, name: &str) {
        if let Some(slot) = self.slots.get_mut(name) {
            slot.value = None;
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Current value of a variable. `None` means the name was never
    /// declared, which callers treat as an internal fault; `Some(None)`
    /// is an ordinary unbound variable.
    pub fn get(&self, name: &str) -> Option<Option<&Value>> {
        self.slots.get(name).map(|slot| slot.value.as_ref())
    }

    /// Public entries in declaration order, for reporting on success.
    pub fn report(&self) -> Vec<(String, Option<Value>)> {
        self.order
            .iter()
            .filter(|name| self.slots[*name].public)
            .map(|name| (name.clone(), self.slots[name].value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_is_idempotent() {
        let mut env = Bindings::new();
        env.declare("X");
        env.declare("X");
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("X"), Some(None));
    }

    #[test]
    fn test_bind_then_unset_restores_prior_state() {
        let mut env = Bindings::new();
        env.declare("X");
        env.bind("X", Value::Atom("a".into()));
        assert_eq!(env.get("X"), Some(Some(&Value::Atom("a".into()))));

        env.unset("X");
        assert_eq!(env.get("X"), Some(None));
        assert_eq!(env.report(), vec![("X".to_string(), None)]);
    }

    #[test]
    fn test_bind_auto_declares_private() {
        let mut env = Bindings::new();
        env.bind("Tmp", Value::Number("1".into()));
        assert!(env.is_declared("Tmp"));
        // private entries never show up in a report
        assert!(env.report().is_empty());
    }

    #[test]
    fn test_report_keeps_declaration_order() {
        let mut env = Bindings::new();
        env.declare("B");
        env.declare("A");
        env.bind("A", Value::Atom("x".into()));

        let report = env.report();
        assert_eq!(report[0].0, "B");
        assert_eq!(report[1], ("A".to_string(), Some(Value::Atom("x".into()))));
    }

    #[test]
    fn test_undeclared_lookup_is_distinguishable() {
        let env = Bindings::new();
        assert_eq!(env.get("Missing"), None);
    }
}
