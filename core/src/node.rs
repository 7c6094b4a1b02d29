//! In-memory view of one vertex: batches writes, drives loads, owns its own
//! edge operations.

use std::collections::BTreeSet;

use crate::edge::Edge;
use crate::error::GraphError;
use crate::id::Id;
use crate::store::Store;
use crate::transaction::Transaction;
use crate::value::{BlobMap, EdgeMap, PropMap, PropPatch, PropValue, TextMap};

#[derive(Clone, Debug)]
pub struct Node {
    id: Id,
    is_new: bool,
    properties: PropMap,
    texts: TextMap,
    blobs: BlobMap,
    /// Keys touched since the last successful [`Node::save`], partitioned by
    /// which map they live in so `save` knows which `save_node_*` call to
    /// route each one through.
    dirty_properties: BTreeSet<String>,
    dirty_texts: BTreeSet<String>,
    dirty_blobs: BTreeSet<String>,
}

impl Node {
    /// Generates a fresh id in `shard` and marks the node new.
    pub fn new_in(shard: impl Into<String>) -> Result<Self, GraphError> {
        Ok(Self::from_id(Id::new_in(shard)?, true))
    }

    /// Opens a handle to an existing id. Does not touch storage; call the
    /// `load_*` methods to populate fields.
    pub fn open(id: Id) -> Self {
        Self::from_id(id, false)
    }

    fn from_id(id: Id, is_new: bool) -> Self {
        Self {
            id,
            is_new,
            properties: PropMap::new(),
            texts: TextMap::new(),
            blobs: BlobMap::new(),
            dirty_properties: BTreeSet::new(),
            dirty_texts: BTreeSet::new(),
            dirty_blobs: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn properties(&self) -> &PropMap {
        &self.properties
    }

    pub fn texts(&self) -> &TextMap {
        &self.texts
    }

    pub fn blobs(&self) -> &BlobMap {
        &self.blobs
    }

    /// Typed convenience accessor over the in-memory properties map; does
    /// not hit storage. Returns `None` for a missing key and
    /// `TypeMismatch` if the stored value is a different kind.
    pub fn property<T: FromPropValue>(&self, key: &str) -> Result<Option<T>, GraphError> {
        match self.properties.get(key) {
            Some(v) => T::from_prop_value(key, v).map(Some),
            None => Ok(None),
        }
    }

    /// Sets (or replaces) a property, marking it dirty. Rejects overlong
    /// strings without mutating anything.
    pub fn set_property(&mut self, key: impl Into<String>, value: PropValue) -> Result<(), GraphError> {
        value.check_short_string_len()?;
        let key = key.into();
        self.properties.insert(key.clone(), value);
        self.dirty_properties.insert(key);
        Ok(())
    }

    /// Marks a property for deletion on next save.
    pub fn remove_property(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.properties.remove(&key);
        self.dirty_properties.insert(key);
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.texts.insert(key.clone(), value.into());
        self.dirty_texts.insert(key);
    }

    pub fn set_blob(&mut self, key: impl Into<String>, value: Vec<u8>) {
        let key = key.into();
        self.blobs.insert(key.clone(), value);
        self.dirty_blobs.insert(key);
    }

    /// Partitions the dirty set by map and forwards each non-empty subset
    /// to the matching `save_node_*` call, in order: properties, texts,
    /// blobs. Clears dirty bits and the new flag only on full success — a
    /// mid-sequence failure is left for the session driver to roll back.
    pub fn save<S: Store>(&mut self, txn: &mut Transaction<'_, S>) -> Result<(), GraphError> {
        if !self.dirty_properties.is_empty() {
            let mut patch = PropPatch::new();
            for key in &self.dirty_properties {
                patch.insert(key.clone(), self.properties.get(key).cloned());
            }
            txn.save_node_properties(&self.id, &patch)?;
        }

        if !self.dirty_texts.is_empty() {
            let mut texts = TextMap::new();
            for key in &self.dirty_texts {
                if let Some(v) = self.texts.get(key) {
                    texts.insert(key.clone(), v.clone());
                }
            }
            txn.save_node_texts(&self.id, &texts)?;
        }

        if !self.dirty_blobs.is_empty() {
            let mut blobs = BlobMap::new();
            for key in &self.dirty_blobs {
                if let Some(v) = self.blobs.get(key) {
                    blobs.insert(key.clone(), v.clone());
                }
            }
            txn.save_node_blobs(&self.id, &blobs)?;
        }

        self.dirty_properties.clear();
        self.dirty_texts.clear();
        self.dirty_blobs.clear();
        self.is_new = false;
        Ok(())
    }

    pub fn load_properties<S: Store>(
        &mut self,
        txn: &Transaction<'_, S>,
        keys: &[String],
    ) -> Result<(), GraphError> {
        let loaded = txn.get_node_properties(&self.id, keys)?;
        for (k, v) in loaded {
            self.dirty_properties.remove(&k);
            self.properties.insert(k, v);
        }
        Ok(())
    }

    pub fn load_texts<S: Store>(&mut self, txn: &Transaction<'_, S>, keys: &[String]) -> Result<(), GraphError> {
        let loaded = txn.get_node_texts(&self.id, keys)?;
        for (k, v) in loaded {
            self.dirty_texts.remove(&k);
            self.texts.insert(k, v);
        }
        Ok(())
    }

    pub fn load_blobs<S: Store>(&mut self, txn: &Transaction<'_, S>, keys: &[String]) -> Result<(), GraphError> {
        let loaded = txn.get_node_blobs(&self.id, keys)?;
        for (k, v) in loaded {
            self.dirty_blobs.remove(&k);
            self.blobs.insert(k, v);
        }
        Ok(())
    }

    /// Removes the node from storage. The handle must not be reused after
    /// this returns.
    pub fn remove<S: Store>(self, txn: &mut Transaction<'_, S>) -> Result<(), GraphError> {
        txn.remove_node(&self.id)
    }

    /// Creates (or replaces) an outgoing edge. When `edge_props` is empty
    /// the edges-file entry is written with an empty property-node id;
    /// otherwise a fresh property node is created in this node's shard,
    /// saved with every provided key dirty, and the edge entry points at
    /// it. Property node first, then edge entry — both land in the same
    /// staged state, so a failure on either rolls back together.
    pub fn new_edge<S: Store>(
        &self,
        txn: &mut Transaction<'_, S>,
        category: &str,
        to: &Id,
        edge_props: PropMap,
    ) -> Result<Edge, GraphError> {
        let properties = if edge_props.is_empty() {
            None
        } else {
            let mut prop_node = Node::new_in(self.id.shard.clone())?;
            for (k, v) in edge_props {
                prop_node.set_property(k, v)?;
            }
            prop_node.save(txn)?;
            Some(prop_node.id().clone())
        };

        let edge = Edge::new(category, self.id.clone(), to.clone(), properties);
        edge.save(txn)?;
        Ok(edge)
    }

    /// Cascading removal: looks up the edges file, removes the target's
    /// property node (if any), deletes the map entry, and removes the
    /// edges file entirely if that empties it.
    pub fn remove_edge<S: Store>(
        &self,
        txn: &mut Transaction<'_, S>,
        category: &str,
        to: &Id,
    ) -> Result<(), GraphError> {
        let mut edges = txn.get_edges(category, &self.id)?;
        if let Some(prop_id) = edges.remove(&to.to_string()) {
            if !prop_id.is_empty() {
                let prop_node_id = Id::parse(&prop_id)?;
                txn.remove_node(&prop_node_id)?;
            }
            if edges.is_empty() {
                txn.remove_edges(category, &self.id)?;
            } else {
                txn.save_edges(category, &self.id, &edges)?;
            }
        }
        Ok(())
    }

    /// Returns a detached [`Edge`] handle; properties are not loaded.
    pub fn get_edge<S: Store>(
        &self,
        txn: &Transaction<'_, S>,
        category: &str,
        to: &Id,
    ) -> Result<Option<Edge>, GraphError> {
        let edges = txn.get_edges(category, &self.id)?;
        match edges.get(&to.to_string()) {
            Some(prop_id) => {
                let properties = if prop_id.is_empty() {
                    None
                } else {
                    Some(Id::parse(prop_id)?)
                };
                Ok(Some(Edge::new(category, self.id.clone(), to.clone(), properties)))
            }
            None => Ok(None),
        }
    }

    /// Returns every outgoing edge in `category` whose target lies in
    /// `target_shard`. A target id string that fails to parse is reported
    /// as `InvalidId` rather than silently skipped.
    pub fn get_edges<S: Store>(
        &self,
        txn: &Transaction<'_, S>,
        category: &str,
        target_shard: &str,
    ) -> Result<Vec<Edge>, GraphError> {
        let map: EdgeMap = txn.get_edges(category, &self.id)?;
        let mut result = Vec::new();
        for (to_str, prop_str) in map {
            let to = Id::parse(&to_str)?;
            if to.shard != target_shard {
                continue;
            }
            let properties = if prop_str.is_empty() {
                None
            } else {
                Some(Id::parse(&prop_str)?)
            };
            result.push(Edge::new(category, self.id.clone(), to, properties));
        }
        Ok(result)
    }
}

/// Typed extraction from a [`PropValue`], used by [`Node::property`].
pub trait FromPropValue: Sized {
    fn from_prop_value(key: &str, value: &PropValue) -> Result<Self, GraphError>;
}

impl FromPropValue for bool {
    fn from_prop_value(key: &str, value: &PropValue) -> Result<Self, GraphError> {
        match value {
            PropValue::Bool(b) => Ok(*b),
            other => Err(type_mismatch(key, "bool", other)),
        }
    }
}

impl FromPropValue for i64 {
    fn from_prop_value(key: &str, value: &PropValue) -> Result<Self, GraphError> {
        match value {
            PropValue::Int(i) => Ok(*i),
            other => Err(type_mismatch(key, "int", other)),
        }
    }
}

impl FromPropValue for f64 {
    fn from_prop_value(key: &str, value: &PropValue) -> Result<Self, GraphError> {
        match value {
            PropValue::Float(f) => Ok(*f),
            PropValue::Int(i) => Ok(*i as f64),
            other => Err(type_mismatch(key, "float", other)),
        }
    }
}

impl FromPropValue for String {
    fn from_prop_value(key: &str, value: &PropValue) -> Result<Self, GraphError> {
        match value {
            PropValue::Str(s) => Ok(s.clone()),
            other => Err(type_mismatch(key, "string", other)),
        }
    }
}

fn type_mismatch(key: &str, expected: &'static str, actual: &PropValue) -> GraphError {
    GraphError::TypeMismatch {
        key: key.to_string(),
        expected,
        actual: actual.type_name(),
    }
}
