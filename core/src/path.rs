//! Deterministic, collision-free mapping of logical graph items to store
//! paths. Pure and idempotent: identical inputs always produce the
//! identical path string, across processes and releases.

use crate::error::GraphError;
use crate::id::{validate_label, Id};

fn validate_key(key: &str) -> Result<(), GraphError> {
    if key.is_empty() || key.contains('/') {
        return Err(GraphError::InvalidId(key.to_string()));
    }
    Ok(())
}

/// `node/{shard}/{uuid[:2]}/{uuid[2:]}`
pub fn node_properties(id: &Id) -> String {
    format!(
        "node/{}/{}/{}",
        id.shard,
        id.uuid_prefix(),
        id.uuid_suffix()
    )
}

/// `text/{shard}/{uuid[:2]}/{uuid[2:]}/{key}`
pub fn node_text(id: &Id, key: &str) -> Result<String, GraphError> {
    validate_key(key)?;
    Ok(format!(
        "text/{}/{}/{}/{}",
        id.shard,
        id.uuid_prefix(),
        id.uuid_suffix(),
        key
    ))
}

/// `blob/{shard}/{uuid[:2]}/{uuid[2:]}/{blobpath}`
pub fn node_blob(id: &Id, key: &str) -> Result<String, GraphError> {
    validate_key(key)?;
    Ok(format!(
        "blob/{}/{}/{}/{}",
        id.shard,
        id.uuid_prefix(),
        id.uuid_suffix(),
        key
    ))
}

/// `refs/{category}/{shard}/{uuid[:2]}/{uuid[2:]}`
pub fn edges_file(category: &str, from: &Id) -> Result<String, GraphError> {
    validate_label(category)?;
    Ok(format!(
        "refs/{}/{}/{}/{}",
        category,
        from.shard,
        from.uuid_prefix(),
        from.uuid_suffix()
    ))
}

/// Glob enumerating every edges file (across all categories) for one node:
/// `refs/*/{shard}/{uuid[:2]}/{uuid[2:]}`.
pub fn edges_glob(id: &Id) -> String {
    format!(
        "refs/*/{}/{}/{}",
        id.shard,
        id.uuid_prefix(),
        id.uuid_suffix()
    )
}

/// Matches a single-`*`-wildcard glob of the shape produced by
/// [`edges_glob`] against a concrete path. Backends enumerate with this
/// instead of a full glob crate: PathCodec only ever needs one wildcard
/// segment.
pub fn glob_match(pattern: &str, candidate: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            candidate.len() >= prefix.len() + suffix.len()
                && candidate.starts_with(prefix)
                && candidate.ends_with(suffix)
        }
        None => pattern == candidate,
    }
}
