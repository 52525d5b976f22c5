//! The recipient-side retrieval and decryption path.
//!
//! A recipient reads their grant from the ledger, unwraps the content
//! key with their private key, fetches the envelope from the store, and
//! opens it. The ledger is the sole authorizer: a missing grant is
//! reported as denied access before anything is fetched.
//!
//! Retrieval always targets the most recently registered record. The
//! ledger holds one wrapped key per (case, recipient) pair and later
//! grants supersede earlier ones, so the surviving key only opens the
//! envelope it was granted with - the newest one.

use custody_clients::{collect_chunks, BlobStore, Ledger};
use custody_core::{CaseId, Envelope, EvidenceRecord, PartyId};
use custody_grants::RecipientPrivateKey;

use crate::error::{PipelineError, Result};

/// A decrypted evidence record and the ledger metadata it came with.
#[derive(Debug)]
pub struct RetrievedEvidence {
    /// The record as registered on the ledger.
    pub record: EvidenceRecord,
    /// The recovered plaintext, byte-identical to the submitted file.
    pub plaintext: Vec<u8>,
}

/// Fetch-and-open for one recipient identity.
///
/// The ledger client must be bound to the retrieving recipient; grant
/// reads for anyone else come back empty.
pub struct DecryptionPath<S, L> {
    store: S,
    ledger: L,
}

impl<S: BlobStore, L: Ledger> DecryptionPath<S, L> {
    pub fn new(store: S, ledger: L) -> Self {
        Self { store, ledger }
    }

    /// Retrieve and decrypt the most recently registered record of a
    /// case.
    ///
    /// The grant is checked first, so an unauthorized caller learns
    /// nothing about the case's contents.
    pub async fn retrieve_latest(
        &self,
        case: CaseId,
        recipient: &PartyId,
        private_key: &RecipientPrivateKey,
    ) -> Result<RetrievedEvidence> {
        let wrapped = self
            .ledger
            .get_grant(case, recipient)
            .await?
            .ok_or_else(|| PipelineError::AccessDenied {
                case,
                recipient: recipient.clone(),
            })?;
        let key = wrapped.unwrap_with(private_key)?;

        let record = self.latest_record(case).await?;
        tracing::debug!(case = %case, filename = %record.filename, "fetching envelope");

        let source = self.store.get(&record.content_address).await?;
        let bytes = collect_chunks(source).await?;
        let envelope = Envelope::from_bytes(&bytes)?;
        let plaintext = envelope.open(&key)?;

        Ok(RetrievedEvidence { record, plaintext })
    }

    async fn latest_record(&self, case: CaseId) -> Result<EvidenceRecord> {
        let count = self.ledger.record_count(case).await?;
        if count == 0 {
            return Err(PipelineError::NoEvidence(case));
        }
        self.ledger
            .record(case, count - 1)
            .await?
            .ok_or(PipelineError::NoSuchRecord {
                case,
                index: count - 1,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_clients::{MemoryBlobStore, MemoryLedger};
    use custody_core::SymmetricKey;
    use custody_grants::WrappedKey;

    /// Seal `plaintext`, store it, register it, and grant it to `judge`.
    async fn seed_record(
        store: &MemoryBlobStore,
        ledger: &MemoryLedger,
        case: CaseId,
        filename: &str,
        plaintext: &[u8],
        judge_key: &RecipientPrivateKey,
    ) {
        let investigator = ledger.client_for("investigator");
        if investigator.case_owner(case).await.unwrap().is_none() {
            investigator.create_case(case).await.unwrap();
        }

        let key = SymmetricKey::generate();
        let envelope = Envelope::seal(plaintext, &key).unwrap();
        let address = store.put(&envelope.to_bytes()).await.unwrap();
        investigator
            .register_evidence(case, &address, filename, "text/plain")
            .await
            .unwrap();

        let wrapped = WrappedKey::wrap(&key, &judge_key.public_key()).unwrap();
        investigator
            .grant_access(case, &"judge".into(), &wrapped)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_latest_record_decrypts() {
        let store = MemoryBlobStore::new();
        let ledger = MemoryLedger::new();
        let judge_key = RecipientPrivateKey::generate().unwrap();
        let case = CaseId::new(7);

        seed_record(&store, &ledger, case, "old.txt", b"first", &judge_key).await;
        seed_record(&store, &ledger, case, "new.txt", b"second", &judge_key).await;

        let path = DecryptionPath::new(store, ledger.client_for("judge"));
        let evidence = path
            .retrieve_latest(case, &"judge".into(), &judge_key)
            .await
            .unwrap();

        assert_eq!(evidence.record.filename, "new.txt");
        assert_eq!(evidence.plaintext, b"second");
    }

    #[tokio::test]
    async fn test_superseding_grants_track_the_latest_record() {
        // Each new record supersedes the previous grant; the surviving
        // key must always open the newest envelope, never a stale one.
        let store = MemoryBlobStore::new();
        let ledger = MemoryLedger::new();
        let judge_key = RecipientPrivateKey::generate().unwrap();
        let case = CaseId::new(8);

        for (name, body) in [("a.txt", b"one"), ("b.txt", b"two"), ("c.txt", b"ten")] {
            seed_record(&store, &ledger, case, name, body, &judge_key).await;
        }

        let path = DecryptionPath::new(store, ledger.client_for("judge"));
        let evidence = path
            .retrieve_latest(case, &"judge".into(), &judge_key)
            .await
            .unwrap();

        assert_eq!(evidence.record.filename, "c.txt");
        assert_eq!(evidence.plaintext, b"ten");
    }

    #[tokio::test]
    async fn test_no_grant_is_access_denied() {
        let store = MemoryBlobStore::new();
        let ledger = MemoryLedger::new();
        let judge_key = RecipientPrivateKey::generate().unwrap();
        let case = CaseId::new(9);

        seed_record(&store, &ledger, case, "a.txt", b"secret", &judge_key).await;

        // "auditor" was never granted access to case 9
        let auditor_key = RecipientPrivateKey::generate().unwrap();
        let path = DecryptionPath::new(store, ledger.client_for("auditor"));
        let err = path
            .retrieve_latest(case, &"auditor".into(), &auditor_key)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::AccessDenied { .. }));
    }

    #[tokio::test]
    async fn test_empty_case_reports_no_evidence() {
        let store = MemoryBlobStore::new();
        let ledger = MemoryLedger::new();
        let judge_key = RecipientPrivateKey::generate().unwrap();
        let case = CaseId::new(12);

        let investigator = ledger.client_for("investigator");
        investigator.create_case(case).await.unwrap();
        let wrapped =
            WrappedKey::wrap(&SymmetricKey::generate(), &judge_key.public_key()).unwrap();
        investigator
            .grant_access(case, &"judge".into(), &wrapped)
            .await
            .unwrap();

        let path = DecryptionPath::new(store, ledger.client_for("judge"));
        let err = path
            .retrieve_latest(case, &"judge".into(), &judge_key)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NoEvidence(_)));
    }

    #[tokio::test]
    async fn test_wrong_private_key_fails_unwrap() {
        let store = MemoryBlobStore::new();
        let ledger = MemoryLedger::new();
        let judge_key = RecipientPrivateKey::generate().unwrap();
        let case = CaseId::new(14);

        seed_record(&store, &ledger, case, "a.txt", b"secret", &judge_key).await;

        let wrong_key = RecipientPrivateKey::generate().unwrap();
        let path = DecryptionPath::new(store, ledger.client_for("judge"));
        let err = path
            .retrieve_latest(case, &"judge".into(), &wrong_key)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Grant(_)));
    }
}
