//! # Custody Core
//!
//! Pure primitives for Custody: identifiers, key material, and the
//! envelope codec.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Envelope`] - the self-contained encrypted form of one file
//! - [`SymmetricKey`] - single-use 256-bit content key
//! - [`CaseId`], [`PartyId`], [`ContentAddress`] - strong identifiers
//! - [`EvidenceRecord`] - one immutable ledger-registered record
//!
//! ## Wire Format
//!
//! A serialized envelope is `nonce(12) ‖ tag(16) ‖ ciphertext`, stored
//! as the raw byte content at a content address. No header, no version
//! byte; the layout is implicit and fixed. See [`envelope`].

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod types;

pub use crypto::{EnvelopeNonce, SymmetricKey};
pub use envelope::{Envelope, MIN_ENVELOPE_LEN, TAG_LEN};
pub use error::{CoreError, Result};
pub use types::{CaseId, ContentAddress, EvidenceRecord, PartyId};
