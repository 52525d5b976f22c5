//! Strong type definitions for Custody.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A case identifier, assigned externally by the submitting party.
///
/// Case IDs are not guaranteed unique per creation attempt; the ledger
/// rejects a second `create_case` for an ID it already knows.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(pub u64);

impl CaseId {
    /// Create a case ID from a raw number.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw number.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Parse a case ID from a directory name.
    ///
    /// The first run of ASCII digits in the name is the ID; a name with
    /// no digits yields `None` and the directory is skipped by the batch.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let start = name.find(|c: char| c.is_ascii_digit())?;
        let digits: String = name[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok().map(Self)
    }
}

impl fmt::Debug for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaseId({})", self.0)
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CaseId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The identity of a submitting or receiving party.
///
/// Opaque to the core; the ledger resolves it to a signing account and
/// a registered public key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyId(pub String);

impl PartyId {
    /// Create a party ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartyId({})", self.0)
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An opaque content address assigned by the blob store.
///
/// The core never interprets the address; it only hands back the exact
/// string the store returned from `put`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentAddress(pub String);

impl ContentAddress {
    /// Wrap an address string returned by the store.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({})", self.0)
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registered piece of evidence, immutable once on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// The case this record belongs to.
    pub case_id: CaseId,
    /// Original filename of the plaintext.
    pub filename: String,
    /// MIME type guessed at ingest time.
    pub mime_type: String,
    /// Address of the sealed envelope in the blob store.
    pub content_address: ContentAddress,
    /// The party that registered this record.
    pub added_by: PartyId,
}
