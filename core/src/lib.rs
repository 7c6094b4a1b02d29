//! Backend-agnostic core of a small property graph: identifiers, the
//! content-addressed path layout, the wire encoding for properties/texts/
//! edges, the `Store` capability interface, the commit-or-rollback
//! transaction driver, and the `Node`/`Edge`/`SchemaRegistry` types built on
//! top of it.
//!
//! Concrete backends (e.g. the git-backed adapter in `graph-git-store`)
//! implement [`store::Store`]; this crate never talks to disk directly.

pub mod edge;
pub mod error;
pub mod id;
pub mod node;
pub mod path;
pub mod schema;
pub mod store;
pub mod transaction;
pub mod value;

#[cfg(test)]
pub mod testutil;

#[cfg(test)]
mod scenarios;

pub use edge::Edge;
pub use error::{BackendError, GraphError};
pub use id::Id;
pub use node::Node;
pub use schema::SchemaRegistry;
pub use store::{CommitMessage, Store};
pub use transaction::{run, Transaction};
