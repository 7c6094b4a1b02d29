//! Minimal plug-in interface: a named set of rule functions, registered at
//! process start and invoked on demand against a [`Node`]. Deliberately
//! thin — full schema design (types, migrations, a validation registry) is
//! out of scope here.

use crate::error::GraphError;
use crate::node::Node;

pub type Rule = fn(&Node) -> Result<(), GraphError>;

#[derive(Default)]
pub struct SchemaRegistry {
    rules: Vec<(String, Rule)>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, rule: Rule) {
        self.rules.push((name.into(), rule));
    }

    /// Runs every registered rule against `node` in registration order,
    /// stopping at the first failure.
    pub fn validate(&self, node: &Node) -> Result<(), GraphError> {
        for (name, rule) in &self.rules {
            rule(node).map_err(|e| GraphError::Validation(format!("{name}: {e}")))?;
        }
        Ok(())
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }
}
