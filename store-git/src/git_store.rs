//! Git-object-database-backed implementation of [`graph_core::Store`].
//!
//! Every logical path from [`graph_core::path`] becomes an entry in an
//! in-memory `git2::Index`; commit writes that index as a tree, commits it
//! with the branch tip as parent, and advances the branch ref. Rollback
//! rebuilds the index from the branch tip's tree, discarding whatever was
//! staged since.

use std::path::Path;

use git2::Repository;
use graph_core::error::{BackendError, GraphError};
use graph_core::id::Id;
use graph_core::path;
use graph_core::store::{CommitMessage, Store};
use graph_core::value::{self, BlobMap, EdgeMap, PropMap, PropPatch, TextMap};
use tracing::instrument;

use crate::config::GitStoreConfig;
use crate::error::StorageError;
use crate::lock::RepoLock;

fn backend(err: impl std::error::Error + Send + Sync + 'static) -> GraphError {
    GraphError::Backend(BackendError::new(err))
}

/// Commit author/committer identity is held fixed at the epoch rather than
/// wall-clock time. Two transactions with identical actions and identical
/// commit messages, applied to identical starting states, must produce
/// identical commit hashes (P8); a real timestamp would make that impossible.
fn deterministic_signature(config: &GitStoreConfig) -> Result<git2::Signature<'static>, GraphError> {
    git2::Signature::new(&config.committer_name, &config.committer_email, &git2::Time::new(0, 0))
        .map_err(|e| backend(StorageError::from(e)))
}

pub struct GitStore {
    repo: Repository,
    shard: String,
    index: git2::Index,
    config: GitStoreConfig,
    _lock: RepoLock,
}

impl GitStore {
    /// Opens the bare repository at `repo_dir` with the default
    /// [`GitStoreConfig`], initializing it (README blob + empty initial
    /// commit + `master` ref) if it doesn't exist yet, and acquires the
    /// exclusive repository lock for the session's shard.
    pub fn open(repo_dir: impl AsRef<Path>, shard: impl Into<String>) -> Result<Self, GraphError> {
        Self::open_with_config(repo_dir, shard, GitStoreConfig::default())
    }

    /// Same as [`GitStore::open`] but with an explicit [`GitStoreConfig`]
    /// (branch ref, README text, committer identity).
    #[instrument(skip(repo_dir, config), fields(shard = %shard.as_ref()))]
    pub fn open_with_config(
        repo_dir: impl AsRef<Path>,
        shard: impl Into<String>,
        config: GitStoreConfig,
    ) -> Result<Self, GraphError> {
        let repo_dir = repo_dir.as_ref();
        let shard = shard.into();
        let lock = RepoLock::acquire(repo_dir).map_err(map_storage_err)?;

        let repo = if repo_dir.join("HEAD").exists() || repo_dir.join(".git").exists() {
            Repository::open(repo_dir).map_err(|e| backend(StorageError::from(e)))?
        } else {
            Self::init_repo(repo_dir, &config)?
        };

        let index = Self::index_at_head(&repo, &config)?;

        Ok(Self {
            repo,
            shard,
            index,
            config,
            _lock: lock,
        })
    }

    fn init_repo(repo_dir: &Path, config: &GitStoreConfig) -> Result<Repository, GraphError> {
        let repo = Repository::init_bare(repo_dir).map_err(|e| backend(StorageError::from(e)))?;

        let readme_oid = repo
            .blob(config.readme_text.as_bytes())
            .map_err(|e| backend(StorageError::from(e)))?;
        let mut builder = repo.treebuilder(None).map_err(|e| backend(StorageError::from(e)))?;
        builder
            .insert("README", readme_oid, git2::FileMode::Blob.into())
            .map_err(|e| backend(StorageError::from(e)))?;
        let tree_oid = builder.write().map_err(|e| backend(StorageError::from(e)))?;
        let tree = repo.find_tree(tree_oid).map_err(|e| backend(StorageError::from(e)))?;

        let sig = deterministic_signature(config)?;
        repo.commit(Some(&config.branch_ref), &sig, &sig, "initial commit\n", &tree, &[])
            .map_err(|e| backend(StorageError::from(e)))?;

        Ok(repo)
    }

    fn index_at_head(repo: &Repository, config: &GitStoreConfig) -> Result<git2::Index, GraphError> {
        let mut index = git2::Index::new().map_err(|e| backend(StorageError::from(e)))?;
        if let Ok(reference) = repo.find_reference(&config.branch_ref) {
            let commit = reference.peel_to_commit().map_err(|e| backend(StorageError::from(e)))?;
            let tree = commit.tree().map_err(|e| backend(StorageError::from(e)))?;
            index
                .read_tree(&tree)
                .map_err(|e| backend(StorageError::from(e)))?;
        }
        Ok(index)
    }

    fn write_blob(&mut self, logical_path: &str, bytes: &[u8]) -> Result<(), GraphError> {
        let oid = self.repo.blob(bytes).map_err(|e| backend(StorageError::from(e)))?;
        let entry = git2::IndexEntry {
            ctime: git2::IndexTime::new(0, 0),
            mtime: git2::IndexTime::new(0, 0),
            dev: 0,
            ino: 0,
            mode: git2::FileMode::Blob.into(),
            uid: 0,
            gid: 0,
            file_size: bytes.len() as u32,
            id: oid,
            flags: 0,
            flags_extended: 0,
            path: logical_path.as_bytes().to_vec(),
        };
        self.index
            .add_frombuffer(&entry, bytes)
            .map_err(|e| backend(StorageError::from(e)))?;
        Ok(())
    }

    fn read_blob(&self, logical_path: &str) -> Result<Option<Vec<u8>>, GraphError> {
        match self.index.get_path(Path::new(logical_path), 0) {
            Some(entry) => {
                let blob = self
                    .repo
                    .find_blob(entry.id)
                    .map_err(|e| backend(StorageError::from(e)))?;
                Ok(Some(blob.content().to_vec()))
            }
            None => Ok(None),
        }
    }

    fn remove_path(&mut self, logical_path: &str) -> Result<(), GraphError> {
        if self.index.get_path(Path::new(logical_path), 0).is_some() {
            self.index
                .remove_path(Path::new(logical_path))
                .map_err(|e| backend(StorageError::from(e)))?;
        }
        Ok(())
    }

    /// Paths whose index entry matches `glob` (a single-`*`-wildcard
    /// pattern, see [`path::glob_match`]).
    fn matching_paths(&self, glob: &str) -> Vec<String> {
        self.index
            .iter()
            .filter_map(|entry| String::from_utf8(entry.path).ok())
            .filter(|p| path::glob_match(glob, p))
            .collect()
    }

    fn remove_properties_at(&mut self, id: &Id) -> Result<(), GraphError> {
        self.remove_path(&path::node_properties(id))
    }

    fn remove_prefixed(&mut self, prefix: &str) -> Result<(), GraphError> {
        let paths: Vec<String> = self
            .index
            .iter()
            .filter_map(|entry| String::from_utf8(entry.path).ok())
            .filter(|p| p.starts_with(prefix))
            .collect();
        for p in paths {
            self.remove_path(&p)?;
        }
        Ok(())
    }
}

fn map_storage_err(err: StorageError) -> GraphError {
    match err {
        StorageError::Locked(path) => {
            tracing::warn!(?path, "repository already locked");
            GraphError::Locked
        }
        other => backend(other),
    }
}

impl Store for GitStore {
    fn shard(&self) -> &str {
        &self.shard
    }

    #[instrument(skip(self, props), fields(id = %id))]
    fn save_node_properties(&mut self, id: &Id, props: &PropPatch) -> Result<(), GraphError> {
        let logical_path = path::node_properties(id);
        let mut current: PropMap = match self.read_blob(&logical_path)? {
            Some(bytes) => value::decode_properties(&bytes)?,
            None => PropMap::new(),
        };
        for (k, v) in props {
            match v {
                Some(value) => {
                    current.insert(k.clone(), value.clone());
                }
                None => {
                    current.remove(k);
                }
            }
        }
        let encoded = value::encode_properties(&current)?;
        self.write_blob(&logical_path, &encoded)
    }

    fn get_node_properties(&self, id: &Id, keys: &[String]) -> Result<PropMap, GraphError> {
        let logical_path = path::node_properties(id);
        let current = match self.read_blob(&logical_path)? {
            Some(bytes) => value::decode_properties(&bytes)?,
            None => return Ok(PropMap::new()),
        };
        Ok(current
            .into_iter()
            .filter(|(k, _)| keys.contains(k))
            .collect())
    }

    fn save_node_texts(&mut self, id: &Id, texts: &TextMap) -> Result<(), GraphError> {
        for (key, value) in texts {
            let logical_path = path::node_text(id, key)?;
            self.write_blob(&logical_path, value.as_bytes())?;
        }
        Ok(())
    }

    fn get_node_texts(&self, id: &Id, keys: &[String]) -> Result<TextMap, GraphError> {
        let mut result = TextMap::new();
        for key in keys {
            let logical_path = path::node_text(id, key)?;
            if let Some(bytes) = self.read_blob(&logical_path)? {
                let text = String::from_utf8(bytes).map_err(|e| backend(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
                result.insert(key.clone(), text);
            }
        }
        Ok(result)
    }

    fn save_node_blobs(&mut self, id: &Id, blobs: &BlobMap) -> Result<(), GraphError> {
        for (key, value) in blobs {
            let logical_path = path::node_blob(id, key)?;
            self.write_blob(&logical_path, value)?;
        }
        Ok(())
    }

    fn get_node_blobs(&self, id: &Id, keys: &[String]) -> Result<BlobMap, GraphError> {
        let mut result = BlobMap::new();
        for key in keys {
            let logical_path = path::node_blob(id, key)?;
            if let Some(bytes) = self.read_blob(&logical_path)? {
                result.insert(key.clone(), bytes);
            }
        }
        Ok(result)
    }

    fn save_edges(&mut self, category: &str, from: &Id, map: &EdgeMap) -> Result<(), GraphError> {
        let logical_path = path::edges_file(category, from)?;
        let encoded = value::encode_edges(map)?;
        self.write_blob(&logical_path, &encoded)
    }

    fn get_edges(&self, category: &str, from: &Id) -> Result<EdgeMap, GraphError> {
        let logical_path = path::edges_file(category, from)?;
        match self.read_blob(&logical_path)? {
            Some(bytes) => value::decode_edges(&bytes),
            None => Ok(EdgeMap::new()),
        }
    }

    #[instrument(skip(self), fields(category, from = %from))]
    fn remove_edges(&mut self, category: &str, from: &Id) -> Result<(), GraphError> {
        let logical_path = path::edges_file(category, from)?;
        if let Some(bytes) = self.read_blob(&logical_path)? {
            let map = value::decode_edges(&bytes)?;
            for prop_id in map.values() {
                if !prop_id.is_empty() {
                    let id = Id::parse(prop_id)?;
                    self.remove_node(&id)?;
                }
            }
        }
        self.remove_path(&logical_path)
    }

    #[instrument(skip(self), fields(id = %id))]
    fn remove_node(&mut self, id: &Id) -> Result<(), GraphError> {
        self.remove_properties_at(id)?;
        self.remove_prefixed(&format!("text/{}/{}/{}/", id.shard, id.uuid_prefix(), id.uuid_suffix()))?;
        self.remove_prefixed(&format!("blob/{}/{}/{}/", id.shard, id.uuid_prefix(), id.uuid_suffix()))?;

        let glob = path::edges_glob(id);
        for p in self.matching_paths(&glob) {
            self.remove_path(&p)?;
        }
        Ok(())
    }

    #[instrument(skip(self, msg), fields(app = %msg.app))]
    fn commit(&mut self, msg: &CommitMessage) -> Result<(), GraphError> {
        let tree_oid = self
            .index
            .write_tree_to(&self.repo)
            .map_err(|e| backend(StorageError::from(e)))?;
        let tree = self
            .repo
            .find_tree(tree_oid)
            .map_err(|e| backend(StorageError::from(e)))?;

        let parent = self
            .repo
            .find_reference(&self.config.branch_ref)
            .ok()
            .and_then(|r| r.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let sig = deterministic_signature(&self.config)?;
        let message = msg.to_string();
        self.repo
            .commit(Some(&self.config.branch_ref), &sig, &sig, &message, &tree, &parents)
            .map_err(|e| backend(StorageError::from(e)))?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn rollback(&mut self) -> Result<(), GraphError> {
        self.index = Self::index_at_head(&self.repo, &self.config)?;
        Ok(())
    }
}
