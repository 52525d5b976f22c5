//! The ordered per-file result log of a batch run.
//!
//! A run always produces one entry per input file, success or not, in
//! processing order. Entries are never mutated after being finalized.

use serde::Serialize;
use std::fmt;

use custody_core::{CaseId, ContentAddress};

use crate::error::{PipelineError, Result};

/// The pipeline stage at which a file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Case creation or ownership probe.
    CaseSetup,
    /// Reading the plaintext from disk.
    Read,
    /// Sealing the envelope.
    Encrypt,
    /// Submitting the envelope to the blob store.
    Store,
    /// Registering the evidence record on the ledger.
    Register,
    /// Wrapping and granting to a recipient.
    Grant,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CaseSetup => "case-setup",
            Stage::Read => "read",
            Stage::Encrypt => "encrypt",
            Stage::Store => "store",
            Stage::Register => "register",
            Stage::Grant => "grant",
        };
        write!(f, "{name}")
    }
}

/// The error recorded against a failed file.
#[derive(Debug, Clone, Serialize)]
pub struct ItemError {
    /// Stage at which processing stopped.
    pub stage: Stage,
    /// Human-readable reason from the originating error.
    pub reason: String,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.reason)
    }
}

/// One file's outcome in a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    /// The case the file belongs to.
    pub case_id: CaseId,
    /// The file's name within its case directory.
    pub filename: String,
    /// Content address of the sealed envelope, when storage succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<ContentAddress>,
    /// MIME type registered with the record, when registration ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Whether the file completed every stage.
    pub success: bool,
    /// The failure, when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
}

impl BatchItem {
    /// A fully processed file.
    pub fn succeeded(
        case_id: CaseId,
        filename: impl Into<String>,
        address: ContentAddress,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            case_id,
            filename: filename.into(),
            address: Some(address),
            mime_type: Some(mime_type.into()),
            success: true,
            error: None,
        }
    }

    /// A file that failed at `stage`.
    pub fn failed(
        case_id: CaseId,
        filename: impl Into<String>,
        stage: Stage,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            case_id,
            filename: filename.into(),
            address: None,
            mime_type: None,
            success: false,
            error: Some(ItemError {
                stage,
                reason: reason.into(),
            }),
        }
    }
}

/// The complete, ordered result log of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct BatchReport {
    items: Vec<BatchItem>,
}

impl BatchReport {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, item: BatchItem) {
        self.items.push(item);
    }

    /// All entries in processing order.
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the run processed no files.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of failed entries.
    pub fn failed(&self) -> usize {
        self.items.iter().filter(|i| !i.success).count()
    }

    /// Number of successful entries.
    pub fn succeeded(&self) -> usize {
        self.items.len() - self.failed()
    }

    /// Whether every file completed.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// Distinguish "all succeeded" from partial failure, so automation
    /// can detect the latter without parsing the log.
    pub fn as_result(&self) -> Result<()> {
        match self.failed() {
            0 => Ok(()),
            failed => Err(PipelineError::PartialBatchFailure {
                failed,
                total: self.items.len(),
            }),
        }
    }

    /// Serialize the log as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.items)
    }
}
