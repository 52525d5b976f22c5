//! # Custody Pipeline
//!
//! The unified API for Custody - confidential evidence distribution
//! over a content-addressed store and an authorization ledger.
//!
//! ## Overview
//!
//! The Custody pipeline provides a batch-oriented library for:
//!
//! - **Ingest**: Seal each file under a fresh symmetric key and push
//!   the envelope to the blob store
//! - **Registration**: Record every stored envelope on the ledger under
//!   its case, in deterministic order
//! - **Grants**: Wrap the content key to each recipient and bind the
//!   wrapped key on the ledger
//! - **Retrieval**: A granted recipient reads back, unwraps, and opens
//!   any record of a case
//!
//! ## Key Concepts
//!
//! - **Case**: A numbered grouping of evidence, owned by its registrant.
//! - **Envelope**: `nonce ++ tag ++ ciphertext`, AES-256-GCM sealed.
//! - **Grant**: A per-(case, recipient) wrapped key; later grants supersede.
//! - **Report**: One entry per input file, success or failure, always.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use custody_pipeline::{BatchRunner, PipelineConfig};
//! use custody_pipeline::clients::{MemoryBlobStore, MemoryLedger};
//!
//! async fn example() {
//!     let store = MemoryBlobStore::new();
//!     let ledger = MemoryLedger::new();
//!
//!     let config = PipelineConfig::new("./batch_input", "investigator")
//!         .recipient("judge");
//!
//!     let runner = BatchRunner::new(store, ledger.client_for("investigator"), config);
//!     let report = runner.run().await.unwrap();
//!     println!("{}", report.to_json().unwrap());
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `custody_pipeline::core` - Core primitives (CaseId, Envelope, etc.)
//! - `custody_pipeline::grants` - Recipient keys and key wrapping
//! - `custody_pipeline::clients` - Store and ledger contracts

pub mod batch;
pub mod config;
pub mod decrypt;
pub mod error;
pub mod mime;
pub mod report;
pub mod sequencer;

// Re-export component crates
pub use custody_clients as clients;
pub use custody_core as core;
pub use custody_grants as grants;

// Re-export main types for convenience
pub use batch::BatchRunner;
pub use config::PipelineConfig;
pub use decrypt::{DecryptionPath, RetrievedEvidence};
pub use error::{PipelineError, Result};
pub use report::{BatchItem, BatchReport, ItemError, Stage};
pub use sequencer::WriteSequencer;

// Re-export commonly used core types
pub use custody_core::{CaseId, ContentAddress, Envelope, EvidenceRecord, PartyId, SymmetricKey};
pub use custody_grants::{RecipientPrivateKey, RecipientPublicKey, WrappedKey};
