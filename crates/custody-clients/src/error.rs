//! Error types for the client contracts.

use thiserror::Error;

/// Why the ledger refused a write.
///
/// The reason string stays transport-specific; the kind is what callers
/// branch on. `Other` covers rejections a transport cannot classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The target (case, party) already exists.
    AlreadyExists,
    /// The calling identity is not allowed to perform this write.
    NotAuthorized,
    /// The target of the write does not exist.
    NotFound,
    /// Unclassified rejection.
    Other,
}

/// Errors surfaced by blob store and ledger clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The blob store could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The ledger could not be reached.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The ledger refused a write; its reason is passed through verbatim.
    #[error("ledger rejected the write: {reason}")]
    LedgerRejection {
        kind: RejectionKind,
        reason: String,
    },
}

impl ClientError {
    /// An unclassified rejection with a reason string.
    pub fn rejection(reason: impl Into<String>) -> Self {
        Self::LedgerRejection {
            kind: RejectionKind::Other,
            reason: reason.into(),
        }
    }

    /// A rejection because the target already exists.
    pub fn already_exists(reason: impl Into<String>) -> Self {
        Self::LedgerRejection {
            kind: RejectionKind::AlreadyExists,
            reason: reason.into(),
        }
    }

    /// A rejection because the caller is not authorized for the write.
    pub fn not_authorized(reason: impl Into<String>) -> Self {
        Self::LedgerRejection {
            kind: RejectionKind::NotAuthorized,
            reason: reason.into(),
        }
    }

    /// A rejection because the target does not exist.
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::LedgerRejection {
            kind: RejectionKind::NotFound,
            reason: reason.into(),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
