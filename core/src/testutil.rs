//! In-memory [`Store`] used to exercise Transaction/Node/Edge logic without
//! a real backend. Models the staged-state-vs-committed-snapshot split that
//! a git-shaped backend gives for free, so commit/rollback behave the same
//! way a real adapter's would.

use std::collections::BTreeMap;

use crate::error::GraphError;
use crate::id::Id;
use crate::path;
use crate::store::{CommitMessage, Store};
use crate::value::{BlobMap, EdgeMap, PropMap, PropPatch, TextMap};

/// A flat path -> properties/edges snapshot, keyed exactly the way
/// [`crate::path`] builds paths for the real backend.
#[derive(Clone, Debug, Default)]
struct Snapshot {
    properties: BTreeMap<String, PropMap>,
    texts: BTreeMap<String, String>,
    blobs: BTreeMap<String, Vec<u8>>,
    edges: BTreeMap<String, EdgeMap>,
}

pub struct MemStore {
    shard: String,
    committed: Snapshot,
    staged: Snapshot,
    pub commits: Vec<CommitMessage>,
}

impl MemStore {
    pub fn new(shard: impl Into<String>) -> Self {
        Self {
            shard: shard.into(),
            committed: Snapshot::default(),
            staged: Snapshot::default(),
            commits: Vec::new(),
        }
    }

    /// Test-only inspection hooks into the *committed* snapshot (what a
    /// caller reopening the repository after a successful run would see).
    pub fn committed_properties(&self, id: &Id) -> PropMap {
        self.committed
            .properties
            .get(&path::node_properties(id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn committed_edges(&self, category: &str, from: &Id) -> EdgeMap {
        let key = path::edges_file(category, from).unwrap();
        self.committed.edges.get(&key).cloned().unwrap_or_default()
    }
}

impl Store for MemStore {
    fn shard(&self) -> &str {
        &self.shard
    }

    fn save_node_properties(&mut self, id: &Id, props: &PropPatch) -> Result<(), GraphError> {
        let key = path::node_properties(id);
        let entry = self.staged.properties.entry(key).or_default();
        for (k, v) in props {
            match v {
                Some(value) => {
                    entry.insert(k.clone(), value.clone());
                }
                None => {
                    entry.remove(k);
                }
            }
        }
        Ok(())
    }

    fn get_node_properties(&self, id: &Id, keys: &[String]) -> Result<PropMap, GraphError> {
        let key = path::node_properties(id);
        let mut result = PropMap::new();
        if let Some(existing) = self.staged.properties.get(&key) {
            for k in keys {
                if let Some(v) = existing.get(k) {
                    result.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(result)
    }

    fn save_node_texts(&mut self, id: &Id, texts: &TextMap) -> Result<(), GraphError> {
        for (key, value) in texts {
            let path = path::node_text(id, key)?;
            self.staged.texts.insert(path, value.clone());
        }
        Ok(())
    }

    fn get_node_texts(&self, id: &Id, keys: &[String]) -> Result<TextMap, GraphError> {
        let mut result = TextMap::new();
        for key in keys {
            let path = path::node_text(id, key)?;
            if let Some(v) = self.staged.texts.get(&path) {
                result.insert(key.clone(), v.clone());
            }
        }
        Ok(result)
    }

    fn save_node_blobs(&mut self, id: &Id, blobs: &BlobMap) -> Result<(), GraphError> {
        for (key, value) in blobs {
            let path = path::node_blob(id, key)?;
            self.staged.blobs.insert(path, value.clone());
        }
        Ok(())
    }

    fn get_node_blobs(&self, id: &Id, keys: &[String]) -> Result<BlobMap, GraphError> {
        let mut result = BlobMap::new();
        for key in keys {
            let path = path::node_blob(id, key)?;
            if let Some(v) = self.staged.blobs.get(&path) {
                result.insert(key.clone(), v.clone());
            }
        }
        Ok(result)
    }

    fn save_edges(&mut self, category: &str, from: &Id, map: &EdgeMap) -> Result<(), GraphError> {
        let key = path::edges_file(category, from)?;
        self.staged.edges.insert(key, map.clone());
        Ok(())
    }

    fn get_edges(&self, category: &str, from: &Id) -> Result<EdgeMap, GraphError> {
        let key = path::edges_file(category, from)?;
        Ok(self.staged.edges.get(&key).cloned().unwrap_or_default())
    }

    fn remove_edges(&mut self, category: &str, from: &Id) -> Result<(), GraphError> {
        let key = path::edges_file(category, from)?;
        if let Some(map) = self.staged.edges.remove(&key) {
            for prop_id in map.values() {
                if !prop_id.is_empty() {
                    let id = Id::parse(prop_id)?;
                    self.remove_node(&id)?;
                }
            }
        }
        Ok(())
    }

    fn remove_node(&mut self, id: &Id) -> Result<(), GraphError> {
        self.staged.properties.remove(&path::node_properties(id));

        let text_prefix = format!("text/{}/{}/{}/", id.shard, id.uuid_prefix(), id.uuid_suffix());
        self.staged.texts.retain(|k, _| !k.starts_with(&text_prefix));

        let blob_prefix = format!("blob/{}/{}/{}/", id.shard, id.uuid_prefix(), id.uuid_suffix());
        self.staged.blobs.retain(|k, _| !k.starts_with(&blob_prefix));

        let glob = path::edges_glob(id);
        self.staged.edges.retain(|k, _| !path::glob_match(&glob, k));

        Ok(())
    }

    fn commit(&mut self, msg: &CommitMessage) -> Result<(), GraphError> {
        self.committed = self.staged.clone();
        self.commits.push(msg.clone());
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), GraphError> {
        self.staged = self.committed.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PropValue;

    #[test]
    fn rollback_discards_staged_but_uncommitted_writes() {
        let mut store = MemStore::new("s1");
        let id = Id::new_in("s1").unwrap();

        let mut patch = PropPatch::new();
        patch.insert("a".into(), Some(PropValue::Int(1)));
        store.save_node_properties(&id, &patch).unwrap();
        store.rollback().unwrap();

        assert!(store.get_node_properties(&id, &["a".to_string()]).unwrap().is_empty());
    }

    #[test]
    fn commit_promotes_staged_to_committed() {
        let mut store = MemStore::new("s1");
        let id = Id::new_in("s1").unwrap();

        let mut patch = PropPatch::new();
        patch.insert("a".into(), Some(PropValue::Int(1)));
        store.save_node_properties(&id, &patch).unwrap();
        store.commit(&CommitMessage::default()).unwrap();

        assert_eq!(store.committed_properties(&id).get("a"), Some(&PropValue::Int(1)));
    }
}
