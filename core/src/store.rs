//! The capability interface every backend adapter implements, plus the
//! structured commit message it receives on `commit`.

use std::fmt;

use crate::error::GraphError;
use crate::id::Id;
use crate::value::{BlobMap, EdgeMap, PropMap, PropPatch, TextMap};

/// Structured commit message. Two equal messages must serialize
/// bit-identically, so the encoding is a fixed `Display` impl rather than
/// ad-hoc string building at each call site.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitMessage {
    pub app: String,
    pub version: String,
    pub command: String,
    pub host: String,
    pub user: String,
    pub details: String,
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut triggered = String::new();
        if !self.host.is_empty() {
            triggered = format!(" on {}", self.host);
        }
        if !self.user.is_empty() {
            triggered = format!("triggered by {:?}{}", self.user, triggered);
        }
        write!(
            f,
            "{} {} {}\nversion: {}\n{}\n",
            self.app, self.command, triggered, self.version, self.details
        )
    }
}

/// The abstraction every higher layer (Transaction, Node, Edge) talks to.
/// An implementation wraps a content-addressed object database with an
/// index-cache (staging area) and refs (named pointers to commits).
///
/// All operations fail with [`GraphError::Backend`] on underlying I/O
/// failure; the table of documented special cases lives on each method.
pub trait Store {
    /// The shard label this session is bound to.
    fn shard(&self) -> &str;

    /// Merges `props` into the properties object at `id`: present keys with
    /// `Some(value)` overwrite, present keys with `None` delete, absent keys
    /// are untouched. If no properties object exists yet, stores the
    /// non-`None` entries as a fresh object.
    fn save_node_properties(&mut self, id: &Id, props: &PropPatch) -> Result<(), GraphError>;

    /// Returns the subset of `keys` that exist. Missing keys, or a missing
    /// properties object entirely, are not errors — just absent from the
    /// result.
    fn get_node_properties(&self, id: &Id, keys: &[String]) -> Result<PropMap, GraphError>;

    /// Per-key upsert; only keys present in `texts` are touched.
    fn save_node_texts(&mut self, id: &Id, texts: &TextMap) -> Result<(), GraphError>;

    fn get_node_texts(&self, id: &Id, keys: &[String]) -> Result<TextMap, GraphError>;

    fn save_node_blobs(&mut self, id: &Id, blobs: &BlobMap) -> Result<(), GraphError>;

    fn get_node_blobs(&self, id: &Id, keys: &[String]) -> Result<BlobMap, GraphError>;

    /// Replaces the edges file for `(category, from)` wholesale.
    fn save_edges(&mut self, category: &str, from: &Id, map: &EdgeMap) -> Result<(), GraphError>;

    /// Missing edges file returns an empty map, not an error.
    fn get_edges(&self, category: &str, from: &Id) -> Result<EdgeMap, GraphError>;

    /// Cascading: removes the property node for every non-empty entry in the
    /// edges file, then removes the edges file itself. Missing file is not
    /// an error.
    fn remove_edges(&mut self, category: &str, from: &Id) -> Result<(), GraphError>;

    /// Removes the properties object, every text key, every blob key, and
    /// every `refs/*/{shard}/{uuid}` entry reachable for `id`. Does not
    /// touch incoming edges from other nodes. Missing files are not errors.
    fn remove_node(&mut self, id: &Id) -> Result<(), GraphError>;

    /// Writes a tree of the current staged state, creates a commit pointing
    /// at the branch tip as parent, advances the branch ref.
    fn commit(&mut self, msg: &CommitMessage) -> Result<(), GraphError>;

    /// Resets the staged state to the current branch tip. Idempotent.
    fn rollback(&mut self) -> Result<(), GraphError>;
}
