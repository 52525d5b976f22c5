//! Client contracts for the two external collaborators.
//!
//! The blob store and the authorization ledger are shared, append-mostly
//! systems outside this codebase. The pipeline drives them exclusively
//! through these traits, so tests and deployments can swap transports
//! without touching the orchestration logic.

use async_trait::async_trait;
use bytes::Bytes;

use custody_core::{CaseId, ContentAddress, EvidenceRecord, PartyId};
use custody_grants::WrappedKey;

use crate::error::Result;

/// A finite, non-restartable sequence of byte chunks from the store.
///
/// The transport may not support seeking, so consumers read forward
/// only. Returning `None` means the object is fully delivered.
#[async_trait]
pub trait ChunkSource: Send {
    /// Fetch the next chunk, or `None` at end of object.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

/// The content-addressed blob store contract.
///
/// The store is globally readable and not order-sensitive. Identical
/// content may deduplicate to one address, but callers must not assume
/// it: the address actually returned by `put` is the one to track.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a byte blob and return its content address.
    async fn put(&self, bytes: &[u8]) -> Result<ContentAddress>;

    /// Retrieve a blob as a chunk stream.
    ///
    /// Consumption must not require buffering the whole object before
    /// processing begins; callers concatenate only where a complete
    /// envelope must be deserialized.
    async fn get(&self, address: &ContentAddress) -> Result<Box<dyn ChunkSource>>;
}

/// The authorization ledger contract.
///
/// A client instance is bound to one signing identity, the way a
/// connected contract handle is. The ledger serializes writes from one
/// identity by strict order and is the sole source of truth for
/// authorization decisions; this crate never duplicates that logic.
///
/// Every write method returns only after the ledger's durability
/// confirmation. A rejected write is [`ClientError::LedgerRejection`]
/// with the ledger's reason attached.
///
/// [`ClientError::LedgerRejection`]: crate::error::ClientError::LedgerRejection
#[async_trait]
pub trait Ledger: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Writes (ordered per signing identity)
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a case owned by the calling identity.
    async fn create_case(&self, case: CaseId) -> Result<()>;

    /// Register one evidence record under a case.
    ///
    /// Only the case's registrant may register; the ledger enforces it.
    async fn register_evidence(
        &self,
        case: CaseId,
        address: &ContentAddress,
        filename: &str,
        mime_type: &str,
    ) -> Result<()>;

    /// Bind a wrapped key to one recipient for one case.
    ///
    /// A later grant for the same (case, recipient) pair supersedes the
    /// earlier one.
    async fn grant_access(
        &self,
        case: CaseId,
        recipient: &PartyId,
        wrapped_key: &WrappedKey,
    ) -> Result<()>;

    /// Register a party in the identity registry with a role tag and a
    /// PEM public key (possibly empty for parties that never receive).
    async fn register_party(&self, party: &PartyId, role: u8, public_key_pem: &str) -> Result<()>;

    /// Replace the calling identity's registered public key.
    async fn update_public_key(&self, public_key_pem: &str) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// The owner of a case, or `None` if the case does not exist.
    async fn case_owner(&self, case: CaseId) -> Result<Option<PartyId>>;

    /// Read a recipient's grant for a case.
    ///
    /// Returns `None` when no grant exists or when the caller is not
    /// the named recipient: an empty read means "access denied", never
    /// an input error.
    async fn get_grant(&self, case: CaseId, recipient: &PartyId) -> Result<Option<WrappedKey>>;

    /// Number of evidence records registered under a case.
    async fn record_count(&self, case: CaseId) -> Result<u64>;

    /// One evidence record by index (0-based, registration order).
    async fn record(&self, case: CaseId, index: u64) -> Result<Option<EvidenceRecord>>;

    /// A party's registered public key PEM, or `None` if absent.
    async fn public_key(&self, party: &PartyId) -> Result<Option<String>>;
}

/// Drain a chunk source into one buffer.
///
/// This is the single point where a streamed object is concatenated,
/// used at the boundary where a complete envelope must be deserialized.
pub async fn collect_chunks(mut source: Box<dyn ChunkSource>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = source.next_chunk().await? {
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}
