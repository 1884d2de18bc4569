//! Voucher-batch ledger engine.
//!
//! Deterministic state machine for escrowed voucher distribution: batches
//! are created and funded into a derived escrow subaccount, claims are
//! settled against per-claim signatures with replay protection, and expired
//! batches are refunded to their sender. All execution is atomic: each
//! operation either commits all of its state writes and transfers or none.

mod claims;
mod config;
mod engine;
mod error;
mod events;
mod operation;
mod overlay;
mod store;

pub use claims::ClaimSet;
pub use config::{ClaimSignaturePolicy, DuplicatePolicy, EngineConfig};
pub use engine::{OpContext, VoucherEngine};
pub use error::LedgerError;
pub use events::Event;
pub use operation::{ClaimEntry, CreateBatchInput, Operation};
pub use store::{
    LedgerStore, BATCHES_PATH, CLAIM_SETS_PATH, INITIALIZED_PATH, MAX_CLAIM_COUNT_PATH,
};

pub(crate) use overlay::ExecutionOverlay;
