//! Error types for the pipeline.

use std::path::PathBuf;

use thiserror::Error;

use custody_clients::ClientError;
use custody_core::{CaseId, CoreError, PartyId};
use custody_grants::GrantError;

/// Errors that can occur while driving a batch run or a retrieval.
///
/// Per-file errors are caught inside the batch loop and recorded in the
/// result log; only setup errors and retrieval errors propagate out.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configured batch input root does not exist or is not a directory.
    #[error("input root missing or not a directory: {0}")]
    InputRootMissing(PathBuf),

    /// Filesystem error while scanning or reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Envelope sealing, opening, or framing error.
    ///
    /// An [`CoreError::AuthenticationFailure`] here means corruption, a
    /// wrong key, or tampering — deliberately distinct from the
    /// connectivity errors in [`PipelineError::Client`].
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Key wrapping or recipient key error.
    #[error(transparent)]
    Grant(#[from] GrantError),

    /// Store or ledger client error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The ledger returned no grant for the (case, recipient) pair.
    #[error("access denied: no grant for {recipient} on case {case}")]
    AccessDenied { case: CaseId, recipient: PartyId },

    /// The case exists but holds no registered evidence.
    #[error("case {0} has no registered evidence")]
    NoEvidence(CaseId),

    /// The ledger reported a record count but the record at the
    /// expected index could not be read back.
    #[error("no evidence record at index {index} for case {case}")]
    NoSuchRecord { case: CaseId, index: u64 },

    /// The batch completed but one or more files failed.
    #[error("partial batch failure: {failed} of {total} files failed")]
    PartialBatchFailure { failed: usize, total: usize },
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
