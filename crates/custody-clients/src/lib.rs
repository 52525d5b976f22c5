//! # Custody Clients
//!
//! Client contracts for the two external collaborators: the
//! content-addressed blob store and the authorization ledger.
//!
//! ## Overview
//!
//! The pipeline never talks to storage or the ledger directly; it goes
//! through the [`BlobStore`] and [`Ledger`] traits. The ledger is the
//! sole source of truth for authorization: this crate calls it and
//! interprets its responses, nothing more.
//!
//! ## Key Types
//!
//! - [`BlobStore`] - put/get against a content-addressed store
//! - [`ChunkSource`] - forward-only streamed retrieval
//! - [`Ledger`] - case, evidence, grant, and identity-registry operations
//! - [`MemoryBlobStore`] / [`MemoryLedger`] - in-memory implementations
//!   for tests, enforcing the same observable semantics
//!
//! ## Design Notes
//!
//! - **Identity-bound handles**: a `Ledger` instance signs as exactly one
//!   party, like a connected contract handle
//! - **Confirmed writes**: every write returns only after the ledger's
//!   durability confirmation
//! - **Empty grant reads mean denied**: never an error

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{ClientError, RejectionKind, Result};
pub use memory::{MemoryBlobStore, MemoryLedger, MemoryLedgerClient};
pub use traits::{collect_chunks, BlobStore, ChunkSource, Ledger};
