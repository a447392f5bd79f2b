//! Default variables declared by templates, and how they combine.

use std::collections::{BTreeMap, HashMap};

use stencil_value::Value;

use crate::literal::parse_literal;

/// Render parameters keyed by variable name.
pub type Params = BTreeMap<String, Value>;

/// Declared defaults per template, plus each entry's descendant list.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    defaults: HashMap<String, Params>,
    descendants: HashMap<String, Vec<String>>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `variable` for `template` from its literal text.
    ///
    /// The first declaration of a name wins, including across recompiles.
    /// Returns whether the value was stored.
    pub fn declare(&mut self, template: &str, variable: &str, literal: &str) -> bool {
        let declared = self.defaults.entry(template.to_string()).or_default();
        if declared.contains_key(variable) {
            return false;
        }
        declared.insert(variable.to_string(), parse_literal(literal));
        true
    }

    /// Defaults declared directly by `template`.
    pub fn defaults(&self, template: &str) -> Option<&Params> {
        self.defaults.get(template)
    }

    /// Replace the descendant list of `entry`.
    pub fn set_descendants(&mut self, entry: &str, descendants: Vec<String>) {
        self.descendants.insert(entry.to_string(), descendants);
    }

    /// Templates pulled in by `entry`, in resolution order.
    pub fn descendants(&self, entry: &str) -> &[String] {
        self.descendants.get(entry).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Forget everything known about `entry` as an entry template.
    pub fn remove_entry(&mut self, entry: &str) {
        self.descendants.remove(entry);
    }

    /// Caller values, then the entry's own defaults, then each descendant's
    /// defaults in order. Earlier sources win.
    pub fn effective_params(&self, entry: &str, caller: &Params) -> Params {
        let mut merged = caller.clone();
        let sources =
            std::iter::once(entry).chain(self.descendants(entry).iter().map(String::as_str));
        for source in sources {
            if let Some(defaults) = self.defaults.get(source) {
                for (name, value) in defaults {
                    merged.entry(name.clone()).or_insert_with(|| value.clone());
                }
            }
        }
        merged
    }
}
