//! Scopes a set of mutations over a [`Store`] so that either all of them
//! persist as one commit, or none do.

use tracing::{instrument, warn};

use crate::error::GraphError;
use crate::id::Id;
use crate::store::{CommitMessage, Store};
use crate::value::{BlobMap, EdgeMap, PropMap, PropPatch, TextMap};

/// A scoped handle to a [`Store`] for the duration of one [`run`] call.
/// Node and Edge methods take `&mut Transaction<S>` explicitly; there is no
/// back-pointer from Node/Edge into the store, so no lifetime cycle.
pub struct Transaction<'s, S: Store> {
    store: &'s mut S,
}

impl<'s, S: Store> Transaction<'s, S> {
    fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    pub fn shard(&self) -> &str {
        self.store.shard()
    }

    pub fn save_node_properties(&mut self, id: &Id, props: &PropPatch) -> Result<(), GraphError> {
        self.store.save_node_properties(id, props)
    }

    pub fn get_node_properties(&self, id: &Id, keys: &[String]) -> Result<PropMap, GraphError> {
        self.store.get_node_properties(id, keys)
    }

    pub fn save_node_texts(&mut self, id: &Id, texts: &TextMap) -> Result<(), GraphError> {
        self.store.save_node_texts(id, texts)
    }

    pub fn get_node_texts(&self, id: &Id, keys: &[String]) -> Result<TextMap, GraphError> {
        self.store.get_node_texts(id, keys)
    }

    pub fn save_node_blobs(&mut self, id: &Id, blobs: &BlobMap) -> Result<(), GraphError> {
        self.store.save_node_blobs(id, blobs)
    }

    pub fn get_node_blobs(&self, id: &Id, keys: &[String]) -> Result<BlobMap, GraphError> {
        self.store.get_node_blobs(id, keys)
    }

    pub fn save_edges(&mut self, category: &str, from: &Id, map: &EdgeMap) -> Result<(), GraphError> {
        self.store.save_edges(category, from, map)
    }

    pub fn get_edges(&self, category: &str, from: &Id) -> Result<EdgeMap, GraphError> {
        self.store.get_edges(category, from)
    }

    pub fn remove_edges(&mut self, category: &str, from: &Id) -> Result<(), GraphError> {
        self.store.remove_edges(category, from)
    }

    pub fn remove_node(&mut self, id: &Id) -> Result<(), GraphError> {
        self.store.remove_node(id)
    }
}

/// Runs `action` against a fresh [`Transaction`] over `store`, then commits
/// or rolls back depending on the outcome.
///
/// State machine:
/// `Open` -action ok-> `Committing` -commit ok-> `Done`
/// `Open` -action err-> `RollingBack` -rollback ok-> `Aborted`
/// `Committing` -commit err-> `RollingBack`
/// `RollingBack` -rollback err-> `Broken`
///
/// [`GraphError::DoNotCommit`] is a sentinel, not a failure: it triggers a
/// rollback and `run` still returns `Ok(())`.
#[instrument(skip(store, message, action), fields(app = %message.app, command = %message.command))]
pub fn run<S, F>(store: &mut S, message: &CommitMessage, action: F) -> Result<(), GraphError>
where
    S: Store,
    F: FnOnce(&mut Transaction<'_, S>) -> Result<(), GraphError>,
{
    let mut txn = Transaction::new(store);

    match action(&mut txn) {
        Ok(()) => match txn.store.commit(message) {
            Ok(()) => Ok(()),
            Err(commit_err) => match txn.store.rollback() {
                Ok(()) => Err(commit_err),
                Err(rollback_err) => {
                    warn!(%commit_err, %rollback_err, "rollback after failed commit also failed");
                    Err(GraphError::rollback_failed(commit_err, rollback_err))
                }
            },
        },
        Err(GraphError::DoNotCommit) => match txn.store.rollback() {
            Ok(()) => Ok(()),
            Err(rollback_err) => {
                warn!(%rollback_err, "rollback after DoNotCommit sentinel failed");
                Err(GraphError::rollback_failed(GraphError::DoNotCommit, rollback_err))
            }
        },
        Err(action_err) => match txn.store.rollback() {
            Ok(()) => Err(action_err),
            Err(rollback_err) => {
                warn!(%action_err, %rollback_err, "rollback after failed action also failed");
                Err(GraphError::rollback_failed(action_err, rollback_err))
            }
        },
    }
}
