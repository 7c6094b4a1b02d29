use std::fmt;

use thiserror::Error;

/// Opaque wrapper around whatever error a concrete [`crate::store::Store`]
/// implementation produced. The core has no knowledge of backend internals
/// (git2, I/O, ...); it only needs to propagate and display them.
pub struct BackendError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl BackendError {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }
}

impl fmt::Debug for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// The full error taxonomy surfaced by the core and its store adapters.
///
/// `DoNotCommit` is the sentinel, not a "real" failure: the session driver
/// recognizes it and turns it into a clean rollback-and-return-success.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The external `shard-uuid` string failed to parse: an empty or
    /// malformed shard label, or a uuid that isn't a canonical UUIDv4.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// A short-string property setter was given a value over 255 bytes;
    /// callers wanting larger payloads must use the text path instead.
    #[error("string value exceeds 255 bytes")]
    StringTooLong,

    /// A typed property accessor was called on a key whose stored value is
    /// a different `PropValue` kind.
    #[error("property {key} is a {actual}, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Another transaction already holds the repository's exclusive lock.
    #[error("repository is locked by another transaction")]
    Locked,

    /// The underlying content-addressed store failed; the core has no
    /// knowledge of what specifically went wrong, only that it did.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Sentinel, not a true error: returned by an action to mean "roll back
    /// and report success". Recognized only by the session driver.
    #[error("do not commit")]
    DoNotCommit,

    /// A transaction's action failed and the subsequent rollback also
    /// failed; the repository may be left in a state that needs manual
    /// recovery.
    #[error("transaction failed ({original}) and rollback also failed ({rollback})")]
    RollbackFailed {
        original: Box<GraphError>,
        rollback: Box<GraphError>,
    },

    /// A registered schema rule rejected a node.
    #[error("schema validation failed: {0}")]
    Validation(String),
}

impl GraphError {
    /// Wraps `original` together with a rollback failure into the composite
    /// "you're in trouble" error: the transaction body failed and the
    /// backend could not even restore its pre-transaction state.
    pub fn rollback_failed(original: GraphError, rollback: GraphError) -> Self {
        GraphError::RollbackFailed {
            original: Box::new(original),
            rollback: Box::new(rollback),
        }
    }
}
