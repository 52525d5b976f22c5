//! The batch orchestrator.
//!
//! Walks a directory tree of cases, sealing and distributing every file:
//! read plaintext, seal under a fresh key, store the envelope, register
//! the record, wrap and grant the key to every configured recipient.
//! Per file the states run `Pending → Encrypting → Stored → Registered →
//! Granted* → Done`, or `Failed(stage, error)` from any state; one
//! file's failure never aborts the batch.

use std::path::{Path, PathBuf};

use custody_clients::{BlobStore, ClientError, Ledger, RejectionKind};
use custody_core::{CaseId, ContentAddress, Envelope, EvidenceRecord, SymmetricKey};
use custody_grants::{RecipientPublicKey, WrappedKey};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::mime::guess_mime;
use crate::report::{BatchItem, BatchReport, Stage};
use crate::sequencer::WriteSequencer;

/// One case directory and its pending files, in deterministic order.
struct CaseInput {
    case_id: CaseId,
    dir: PathBuf,
    files: Vec<String>,
}

/// A per-file result before it becomes a log entry.
type StageResult<T> = std::result::Result<T, (Stage, PipelineError)>;

/// Drives a full batch run against one store and one ledger identity.
pub struct BatchRunner<S, L> {
    store: S,
    ledger: WriteSequencer<L>,
    config: PipelineConfig,
}

impl<S: BlobStore, L: Ledger> BatchRunner<S, L> {
    /// Build a runner. The ledger client must sign as `config.submitter`.
    pub fn new(store: S, ledger: L, config: PipelineConfig) -> Self {
        let spacing = config.write_spacing;
        Self {
            store,
            ledger: WriteSequencer::new(ledger, spacing),
            config,
        }
    }

    /// Process the whole input tree.
    ///
    /// Setup errors (missing input root, unreadable directories) abort
    /// before any file is processed. After that, every input file gets
    /// exactly one entry in the returned log regardless of outcome.
    pub async fn run(&self) -> Result<BatchReport> {
        let cases = self.scan_input().await?;
        let mut report = BatchReport::new();

        for case in &cases {
            tracing::info!(case = %case.case_id, files = case.files.len(), "processing case");

            if let Err(err) = self.ensure_case(case.case_id).await {
                tracing::warn!(case = %case.case_id, error = %err, "case setup failed");
                for filename in &case.files {
                    report.push(BatchItem::failed(
                        case.case_id,
                        filename.clone(),
                        Stage::CaseSetup,
                        err.to_string(),
                    ));
                }
                continue;
            }

            for filename in &case.files {
                let item = self.process_file(case, filename).await;
                match &item.error {
                    None => tracing::info!(case = %case.case_id, filename, "file done"),
                    Some(err) => {
                        tracing::warn!(case = %case.case_id, filename, error = %err, "file failed")
                    }
                }
                report.push(item);
            }
        }

        tracing::info!(
            total = report.len(),
            failed = report.failed(),
            "batch complete"
        );
        Ok(report)
    }

    /// Walk the input root: one directory per case, case id parsed from
    /// the directory name, dotfiles and nested directories skipped.
    async fn scan_input(&self) -> Result<Vec<CaseInput>> {
        let root = &self.config.input_root;
        if !root.is_dir() {
            return Err(PipelineError::InputRootMissing(root.clone()));
        }

        let mut case_dirs: Vec<(CaseId, PathBuf)> = Vec::new();
        let mut entries = tokio::fs::read_dir(root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match CaseId::from_dir_name(&name) {
                Some(case_id) => case_dirs.push((case_id, entry.path())),
                None => tracing::warn!(dir = %name, "skipping directory with no case id"),
            }
        }
        case_dirs.sort_by_key(|(case_id, _)| *case_id);

        let mut cases = Vec::new();
        for (case_id, dir) in case_dirs {
            let mut files = Vec::new();
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') {
                    continue;
                }
                if entry.file_type().await?.is_dir() {
                    continue;
                }
                files.push(name);
            }
            files.sort();
            cases.push(CaseInput {
                case_id,
                dir,
                files,
            });
        }
        Ok(cases)
    }

    /// Make sure the case exists and is ours to write.
    ///
    /// A missing case is created; an "already exists" rejection from a
    /// racing creator is benign. A case owned by someone else is not.
    async fn ensure_case(&self, case: CaseId) -> Result<()> {
        match self.ledger.ledger().case_owner(case).await? {
            Some(owner) if owner == self.config.submitter => Ok(()),
            Some(owner) => Err(ClientError::not_authorized(format!(
                "case {case} is registered to {owner}"
            ))
            .into()),
            None => match self.ledger.create_case(case).await {
                Ok(()) => {
                    tracing::info!(case = %case, "case created");
                    Ok(())
                }
                // Lost a creation race; the case exists now, and every
                // subsequent write re-checks ownership anyway.
                Err(ClientError::LedgerRejection {
                    kind: RejectionKind::AlreadyExists,
                    ..
                }) => Ok(()),
                Err(err) => Err(err.into()),
            },
        }
    }

    async fn process_file(&self, case: &CaseInput, filename: &str) -> BatchItem {
        let path = case.dir.join(filename);
        match self.ingest_file(case.case_id, &path, filename).await {
            Ok((address, mime_type)) => {
                BatchItem::succeeded(case.case_id, filename, address, mime_type)
            }
            Err((stage, err)) => BatchItem::failed(case.case_id, filename, stage, err.to_string()),
        }
    }

    /// The full per-file pipeline. The fresh key lives only for the
    /// span of this call and is wiped on drop.
    async fn ingest_file(
        &self,
        case: CaseId,
        path: &Path,
        filename: &str,
    ) -> StageResult<(ContentAddress, String)> {
        // A file finished by an earlier run is skipped in full: sealing
        // it again would mint a new key, and the new grant would orphan
        // the envelope already on the ledger.
        if let Some(existing) = self
            .existing_record(case, filename)
            .await
            .map_err(|e| (Stage::Register, e))?
        {
            tracing::info!(case = %case, filename, "already registered, skipping");
            return Ok((existing.content_address, existing.mime_type));
        }

        let plaintext = tokio::fs::read(path)
            .await
            .map_err(|e| (Stage::Read, e.into()))?;

        let key = SymmetricKey::generate();
        let envelope = Envelope::seal(&plaintext, &key).map_err(|e| (Stage::Encrypt, e.into()))?;

        // The store must confirm the address before the dependent
        // ledger write is submitted.
        let address = self
            .store
            .put(&envelope.to_bytes())
            .await
            .map_err(|e| (Stage::Store, e.into()))?;

        let mime_type = guess_mime(filename);
        self.ledger
            .register_evidence(case, &address, filename, mime_type)
            .await
            .map_err(|e| (Stage::Register, e.into()))?;

        for recipient in &self.config.recipients {
            self.grant_to(case, recipient, &key)
                .await
                .map_err(|e| (Stage::Grant, e))?;
        }

        Ok((address, mime_type.to_string()))
    }

    /// Find the record an earlier run registered under this filename.
    async fn existing_record(
        &self,
        case: CaseId,
        filename: &str,
    ) -> Result<Option<EvidenceRecord>> {
        let count = self.ledger.ledger().record_count(case).await?;
        for index in 0..count {
            if let Some(record) = self.ledger.ledger().record(case, index).await? {
                if record.filename == filename {
                    return Ok(Some(record));
                }
            }
        }
        Ok(None)
    }

    /// Wrap the content key for one recipient and submit the grant.
    async fn grant_to(&self, case: CaseId, recipient: &custody_core::PartyId, key: &SymmetricKey) -> Result<()> {
        let pem = self.ledger.ledger().public_key(recipient).await?;
        let public = RecipientPublicKey::from_registry(pem.as_deref())?;
        let wrapped = WrappedKey::wrap(key, &public)?;
        self.ledger.grant_access(case, recipient, &wrapped).await?;
        Ok(())
    }
}
