//! Plain configuration for [`crate::GitStore::open_with_config`].
//!
//! Configuration here is constructor-supplied, not loaded from disk, env,
//! or flags: callers build a [`GitStoreConfig`] (or start from its
//! `Default`) and hand it to the store directly.

use serde::{Deserialize, Serialize};

/// Backend-local knobs for one [`crate::GitStore`] session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitStoreConfig {
    /// Branch ref the store commits advance and read from.
    pub branch_ref: String,

    /// Contents of the `README` blob written on first initialization.
    pub readme_text: String,

    /// Commit author/committer name used for every commit this session
    /// makes, including the initial repository-init commit.
    pub committer_name: String,

    /// Commit author/committer email.
    pub committer_email: String,
}

impl Default for GitStoreConfig {
    fn default() -> Self {
        Self {
            branch_ref: "refs/heads/master".to_string(),
            readme_text: "this is a database — do not modify by hand\n".to_string(),
            committer_name: "graph-store".to_string(),
            committer_email: "graph-store@localhost".to_string(),
        }
    }
}
