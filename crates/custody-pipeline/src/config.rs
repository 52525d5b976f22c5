//! Pipeline configuration.
//!
//! All knobs travel in one explicit structure handed to the runner at
//! construction; there is no process-global state.

use std::path::PathBuf;
use std::time::Duration;

use custody_core::PartyId;

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the batch input tree: one directory per case, the case
    /// id parsed from the directory name.
    pub input_root: PathBuf,

    /// The submitting identity. Must match the signing identity of the
    /// ledger client, and the registrant of every case it touches.
    pub submitter: PartyId,

    /// Recipients granted access to every file in the run.
    pub recipients: Vec<PartyId>,

    /// Minimum spacing between consecutive ledger writes.
    ///
    /// Correctness comes from awaiting each write's confirmation before
    /// the next; the spacing is extra headroom for ledgers that
    /// rate-limit a submitting account. Zero disables it.
    pub write_spacing: Duration,
}

impl PipelineConfig {
    /// Configuration with no recipients and no write spacing.
    pub fn new(input_root: impl Into<PathBuf>, submitter: impl Into<PartyId>) -> Self {
        Self {
            input_root: input_root.into(),
            submitter: submitter.into(),
            recipients: Vec::new(),
            write_spacing: Duration::ZERO,
        }
    }

    /// Add a recipient to grant on every file.
    pub fn recipient(mut self, party: impl Into<PartyId>) -> Self {
        self.recipients.push(party.into());
        self
    }

    /// Set the minimum spacing between ledger writes.
    pub fn write_spacing(mut self, spacing: Duration) -> Self {
        self.write_spacing = spacing;
        self
    }
}
