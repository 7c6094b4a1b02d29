//! A single outgoing relationship, identified by `(category, from, to)`.
//!
//! An edge owns at most one properties node (empty id string if the edge
//! carries no properties of its own). Edge persists its entry inside the
//! source node's edges file; it does not know about any other edge sharing
//! that file.

use crate::error::GraphError;
use crate::id::Id;
use crate::store::Store;
use crate::transaction::Transaction;

#[derive(Clone, Debug)]
pub struct Edge {
    pub category: String,
    pub from: Id,
    pub to: Id,
    /// Id of the node holding this edge's properties, if any.
    pub properties: Option<Id>,
}

impl Edge {
    pub fn new(category: impl Into<String>, from: Id, to: Id, properties: Option<Id>) -> Self {
        Self {
            category: category.into(),
            from,
            to,
            properties,
        }
    }

    /// Reads the whole edges file, upserts this single entry, writes it
    /// back.
    pub fn save<S: Store>(&self, txn: &mut Transaction<'_, S>) -> Result<(), GraphError> {
        let mut edges = txn.get_edges(&self.category, &self.from)?;
        let prop_id = self
            .properties
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();
        edges.insert(self.to.to_string(), prop_id);
        txn.save_edges(&self.category, &self.from, &edges)
    }

    /// Removes only this edge's entry from the source node's edges file.
    /// Deliberately does not remove the property node — callers wanting
    /// that must go through [`crate::node::Node::remove_edge`].
    pub fn remove<S: Store>(&self, txn: &mut Transaction<'_, S>) -> Result<(), GraphError> {
        let mut edges = txn.get_edges(&self.category, &self.from)?;
        edges.remove(&self.to.to_string());
        if edges.is_empty() {
            txn.remove_edges(&self.category, &self.from)
        } else {
            txn.save_edges(&self.category, &self.from, &edges)
        }
    }
}
