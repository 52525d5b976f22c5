//! In-memory implementations of the client contracts.
//!
//! These are primarily for testing. They honor the same observable
//! semantics as a real deployment: content addressing and chunked reads
//! on the store side; ownership enforcement, recipient-only grant
//! reads, and grant supersession on the ledger side. Writes confirm
//! immediately, which satisfies the await-confirmation contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use custody_core::{CaseId, ContentAddress, EvidenceRecord, PartyId};
use custody_grants::WrappedKey;

use crate::error::{ClientError, Result};
use crate::traits::{BlobStore, ChunkSource, Ledger};

/// Default chunk size for streamed reads.
const DEFAULT_CHUNK_SIZE: usize = 4096;

// ─────────────────────────────────────────────────────────────────────────────
// Blob store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory content-addressed blob store.
///
/// Addresses are `b3:<hex blake3>` of the content, so identical bytes
/// deduplicate to one address. All data is lost on drop. Cloning shares
/// the underlying storage.
#[derive(Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Bytes>>>,
    unavailable: Arc<AtomicBool>,
    chunk_size: usize,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create an empty store that streams reads in chunks of `chunk_size`.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
            unavailable: Arc::new(AtomicBool::new(false)),
            chunk_size,
        }
    }

    /// Simulate a connectivity outage: subsequent put/get calls fail
    /// with `StoreUnavailable` until restored.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of distinct blobs held.
    pub fn len(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ClientError::StoreUnavailable(
                "simulated outage".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentAddress> {
        self.check_available()?;

        let address = format!("b3:{}", hex::encode(blake3::hash(bytes).as_bytes()));
        self.blobs
            .write()
            .unwrap()
            .entry(address.clone())
            .or_insert_with(|| Bytes::copy_from_slice(bytes));

        tracing::debug!(address = %address, len = bytes.len(), "stored blob");
        Ok(ContentAddress::new(address))
    }

    async fn get(&self, address: &ContentAddress) -> Result<Box<dyn ChunkSource>> {
        self.check_available()?;

        let data = self
            .blobs
            .read()
            .unwrap()
            .get(address.as_str())
            .cloned()
            .ok_or_else(|| {
                ClientError::StoreUnavailable(format!("no blob at {}", address))
            })?;

        Ok(Box::new(MemoryChunkSource {
            data,
            offset: 0,
            chunk_size: self.chunk_size,
        }))
    }
}

/// Forward-only chunk reader over one in-memory blob.
struct MemoryChunkSource {
    data: Bytes,
    offset: usize,
    chunk_size: usize,
}

#[async_trait]
impl ChunkSource for MemoryChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.offset >= self.data.len() {
            return Ok(None);
        }
        let end = (self.offset + self.chunk_size).min(self.data.len());
        let chunk = self.data.slice(self.offset..end);
        self.offset = end;
        Ok(Some(chunk))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ledger
// ─────────────────────────────────────────────────────────────────────────────

/// The shared state behind an in-memory ledger deployment.
///
/// Hand out identity-bound handles with [`MemoryLedger::client_for`],
/// mirroring how a contract handle is connected to one signer.
pub struct MemoryLedger {
    inner: Arc<RwLock<LedgerState>>,
}

#[derive(Default)]
struct LedgerState {
    parties: HashMap<PartyId, PartyEntry>,
    cases: HashMap<CaseId, CaseEntry>,
}

struct PartyEntry {
    #[allow(dead_code)]
    role: u8,
    public_key_pem: String,
}

struct CaseEntry {
    owner: PartyId,
    records: Vec<EvidenceRecord>,
    grants: HashMap<PartyId, WrappedKey>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LedgerState::default())),
        }
    }

    /// A client handle signing as `party`.
    pub fn client_for(&self, party: impl Into<PartyId>) -> MemoryLedgerClient {
        MemoryLedgerClient {
            caller: party.into(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-memory ledger handle bound to one signing identity.
pub struct MemoryLedgerClient {
    caller: PartyId,
    inner: Arc<RwLock<LedgerState>>,
}

impl MemoryLedgerClient {
    /// The identity this handle signs as.
    pub fn caller(&self) -> &PartyId {
        &self.caller
    }
}

#[async_trait]
impl Ledger for MemoryLedgerClient {
    async fn create_case(&self, case: CaseId) -> Result<()> {
        let mut state = self.inner.write().unwrap();
        if state.cases.contains_key(&case) {
            return Err(ClientError::already_exists(format!(
                "case {case} already exists"
            )));
        }
        state.cases.insert(
            case,
            CaseEntry {
                owner: self.caller.clone(),
                records: Vec::new(),
                grants: HashMap::new(),
            },
        );
        tracing::debug!(case = %case, owner = %self.caller, "case created");
        Ok(())
    }

    async fn register_evidence(
        &self,
        case: CaseId,
        address: &ContentAddress,
        filename: &str,
        mime_type: &str,
    ) -> Result<()> {
        let mut state = self.inner.write().unwrap();
        let entry = state
            .cases
            .get_mut(&case)
            .ok_or_else(|| ClientError::not_found(format!("case {case} does not exist")))?;
        if entry.owner != self.caller {
            return Err(ClientError::not_authorized(format!(
                "{} is not the registrant of case {case}",
                self.caller
            )));
        }
        entry.records.push(EvidenceRecord {
            case_id: case,
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            content_address: address.clone(),
            added_by: self.caller.clone(),
        });
        tracing::debug!(case = %case, filename, address = %address, "evidence registered");
        Ok(())
    }

    async fn grant_access(
        &self,
        case: CaseId,
        recipient: &PartyId,
        wrapped_key: &WrappedKey,
    ) -> Result<()> {
        let mut state = self.inner.write().unwrap();
        let entry = state
            .cases
            .get_mut(&case)
            .ok_or_else(|| ClientError::not_found(format!("case {case} does not exist")))?;
        if entry.owner != self.caller {
            return Err(ClientError::not_authorized(format!(
                "{} is not the registrant of case {case}",
                self.caller
            )));
        }
        // Later grants for the same (case, recipient) pair supersede
        entry.grants.insert(recipient.clone(), wrapped_key.clone());
        tracing::debug!(case = %case, recipient = %recipient, "access granted");
        Ok(())
    }

    async fn register_party(&self, party: &PartyId, role: u8, public_key_pem: &str) -> Result<()> {
        let mut state = self.inner.write().unwrap();
        if state.parties.contains_key(party) {
            return Err(ClientError::already_exists(format!(
                "party {party} already registered"
            )));
        }
        state.parties.insert(
            party.clone(),
            PartyEntry {
                role,
                public_key_pem: public_key_pem.to_string(),
            },
        );
        Ok(())
    }

    async fn update_public_key(&self, public_key_pem: &str) -> Result<()> {
        let mut state = self.inner.write().unwrap();
        let entry = state
            .parties
            .get_mut(&self.caller)
            .ok_or_else(|| ClientError::not_found(format!("{} is not registered", self.caller)))?;
        entry.public_key_pem = public_key_pem.to_string();
        Ok(())
    }

    async fn case_owner(&self, case: CaseId) -> Result<Option<PartyId>> {
        let state = self.inner.read().unwrap();
        Ok(state.cases.get(&case).map(|c| c.owner.clone()))
    }

    async fn get_grant(&self, case: CaseId, recipient: &PartyId) -> Result<Option<WrappedKey>> {
        let state = self.inner.read().unwrap();
        // Only the named recipient reads their own grant; everyone else
        // sees an absent grant, not an error.
        if recipient != &self.caller {
            return Ok(None);
        }
        Ok(state
            .cases
            .get(&case)
            .and_then(|c| c.grants.get(recipient).cloned()))
    }

    async fn record_count(&self, case: CaseId) -> Result<u64> {
        let state = self.inner.read().unwrap();
        Ok(state
            .cases
            .get(&case)
            .map(|c| c.records.len() as u64)
            .unwrap_or(0))
    }

    async fn record(&self, case: CaseId, index: u64) -> Result<Option<EvidenceRecord>> {
        let state = self.inner.read().unwrap();
        Ok(state
            .cases
            .get(&case)
            .and_then(|c| c.records.get(index as usize).cloned()))
    }

    async fn public_key(&self, party: &PartyId) -> Result<Option<String>> {
        let state = self.inner.read().unwrap();
        Ok(state
            .parties
            .get(party)
            .map(|p| p.public_key_pem.clone())
            .filter(|pem| !pem.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectionKind;
    use crate::traits::collect_chunks;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryBlobStore::with_chunk_size(3);
        let address = store.put(b"hello chunked world").await.unwrap();

        let source = store.get(&address).await.unwrap();
        let bytes = collect_chunks(source).await.unwrap();
        assert_eq!(bytes, b"hello chunked world");
    }

    #[tokio::test]
    async fn test_put_deduplicates() {
        let store = MemoryBlobStore::new();
        let a1 = store.put(b"same bytes").await.unwrap();
        let a2 = store.put(b"same bytes").await.unwrap();
        assert_eq!(a1, a2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = MemoryBlobStore::new();
        let address = store.put(b"data").await.unwrap();

        store.set_unavailable(true);
        assert!(matches!(
            store.put(b"more").await.unwrap_err(),
            ClientError::StoreUnavailable(_)
        ));
        assert!(matches!(
            store.get(&address).await.map(|_| ()).unwrap_err(),
            ClientError::StoreUnavailable(_)
        ));

        store.set_unavailable(false);
        assert!(store.get(&address).await.is_ok());
    }

    #[tokio::test]
    async fn test_case_creation_is_owner_bound() {
        let ledger = MemoryLedger::new();
        let investigator = ledger.client_for("investigator");
        let outsider = ledger.client_for("outsider");

        investigator.create_case(CaseId::new(101)).await.unwrap();
        assert_eq!(
            investigator.case_owner(CaseId::new(101)).await.unwrap(),
            Some(PartyId::new("investigator"))
        );

        // Duplicate creation is rejected and classified as such
        let err = investigator.create_case(CaseId::new(101)).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::LedgerRejection {
                kind: RejectionKind::AlreadyExists,
                ..
            }
        ));

        // Non-owner writes are rejected
        let err = outsider
            .register_evidence(
                CaseId::new(101),
                &ContentAddress::new("b3:00"),
                "x.bin",
                "application/octet-stream",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::LedgerRejection { .. }));
    }

    #[tokio::test]
    async fn test_grant_is_recipient_scoped() {
        let ledger = MemoryLedger::new();
        let investigator = ledger.client_for("investigator");
        let judge = ledger.client_for("judge");
        let outsider = ledger.client_for("outsider");

        let case = CaseId::new(7);
        investigator.create_case(case).await.unwrap();
        let key = WrappedKey::from_ledger("d2hhdGV2ZXI=");
        investigator
            .grant_access(case, &PartyId::new("judge"), &key)
            .await
            .unwrap();

        // The named recipient reads their grant
        let read = judge.get_grant(case, &PartyId::new("judge")).await.unwrap();
        assert_eq!(read, Some(key.clone()));

        // Anyone else sees an absent grant, not an error
        let read = outsider
            .get_grant(case, &PartyId::new("judge"))
            .await
            .unwrap();
        assert_eq!(read, None);

        // Later grants supersede
        let newer = WrappedKey::from_ledger("bmV3ZXI=");
        investigator
            .grant_access(case, &PartyId::new("judge"), &newer)
            .await
            .unwrap();
        let read = judge.get_grant(case, &PartyId::new("judge")).await.unwrap();
        assert_eq!(read, Some(newer));
    }

    #[tokio::test]
    async fn test_records_are_ordered() {
        let ledger = MemoryLedger::new();
        let investigator = ledger.client_for("investigator");
        let case = CaseId::new(9);
        investigator.create_case(case).await.unwrap();

        for name in ["a.txt", "b.txt", "c.txt"] {
            investigator
                .register_evidence(case, &ContentAddress::new(name), name, "text/plain")
                .await
                .unwrap();
        }

        assert_eq!(investigator.record_count(case).await.unwrap(), 3);
        let last = investigator.record(case, 2).await.unwrap().unwrap();
        assert_eq!(last.filename, "c.txt");
        assert!(investigator.record(case, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identity_registry() {
        let ledger = MemoryLedger::new();
        let admin = ledger.client_for("admin");
        let judge = ledger.client_for("judge");

        admin
            .register_party(&PartyId::new("judge"), 4, "")
            .await
            .unwrap();
        // Empty PEM reads back as absent
        assert_eq!(admin.public_key(&PartyId::new("judge")).await.unwrap(), None);

        judge.update_public_key("-----BEGIN PUBLIC KEY-----").await.unwrap();
        assert!(admin
            .public_key(&PartyId::new("judge"))
            .await
            .unwrap()
            .is_some());
    }
}
