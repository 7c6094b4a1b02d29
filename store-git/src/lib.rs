//! `graph_core::Store` implementation backed by a bare git object database.
//!
//! # Quick Start
//!
//! ```
//! use graph_core::value::{PropPatch, PropValue};
//! use graph_core::{run, CommitMessage, Id, Store};
//! use graph_git_store::GitStore;
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let mut store = GitStore::open(tmp.path(), "s1").unwrap();
//!
//! let id = Id::new_in("s1").unwrap();
//! let msg = CommitMessage {
//!     app: "demo".into(),
//!     command: "seed".into(),
//!     ..Default::default()
//! };
//!
//! run(&mut store, &msg, |txn| {
//!     let mut patch = PropPatch::new();
//!     patch.insert("name".into(), Some(PropValue::Str("Nadja".into())));
//!     txn.save_node_properties(&id, &patch)
//! })
//! .unwrap();
//!
//! let loaded = store.get_node_properties(&id, &["name".to_string()]).unwrap();
//! assert_eq!(loaded.get("name"), Some(&PropValue::Str("Nadja".into())));
//! ```

mod config;
mod error;
mod git_store;
mod lock;

pub use config::GitStoreConfig;
pub use error::StorageError;
pub use git_store::GitStore;
