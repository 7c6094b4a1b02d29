use thiserror::Error;

/// Backend-specific failures surfaced through [`graph_core::BackendError`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// `libgit2` rejected an operation (bad oid, corrupt object, ref
    /// update conflict, ...).
    #[error(transparent)]
    Git(#[from] git2::Error),

    /// Filesystem I/O failed outside of `libgit2` itself (e.g. creating the
    /// lock file).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A commit message could not be encoded to the fixed `Display` layout
    /// the store writes to the underlying commit object.
    #[error("malformed commit message encoding")]
    Encoding,

    /// Another process already holds the advisory lock on this repository
    /// directory.
    #[error("failed to acquire repository lock at {0}")]
    Locked(std::path::PathBuf),
}
