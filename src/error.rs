/// Error taxonomy for resource operations
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by resource operations and waits.
///
/// A wait that runs out of time is not represented here: waits return
/// `Ok(false)` on timeout so callers can branch on the outcome without
/// inspecting error text.
#[derive(Debug, Error)]
pub enum Error {
    /// The locator has no mapping for the requested kind. Raised before
    /// any transport call is made.
    #[error("unknown kind: '{0}'")]
    UnknownKind(String),

    /// A manifest could not be decoded, or a document is missing the
    /// fields needed to route it (kind, name).
    #[error("failed to decode manifest: {0}")]
    Decode(String),

    #[error("{kind} '{name}' not found")]
    NotFound { kind: String, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: String, name: String },

    /// A write raced with another writer (stale resourceVersion on update,
    /// or a server-side apply owned by a different field manager).
    #[error("conflict writing {kind} '{name}': {reason}")]
    Conflict {
        kind: String,
        name: String,
        reason: String,
    },

    /// A typed value and its document form do not agree in shape.
    #[error("failed to convert object: {0}")]
    Conversion(#[source] serde_json::Error),

    /// Network, auth or server failure. The underlying cause is preserved.
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),

    /// The object a wait was watching entered its designated failure state
    /// (e.g. pod phase Failed, job Failed condition).
    #[error("wait condition failed: {0}")]
    WaitFailed(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, Error::UnknownKind(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Transport(err)
    }
}
