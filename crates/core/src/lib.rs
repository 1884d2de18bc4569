//! Host interface for the dropvault voucher engine.
//!
//! This crate defines the seams between the engine and its execution host:
//! the [`TokenLedger`] and [`FeeOracle`] traits the engine and planner call
//! out through, the [`TransferEffect`] shape handed back to the ledger, and
//! the [`StatePath`]/[`ResourceSet`] conflict-declaration types the host
//! scheduler consumes.

mod paths;
mod traits;
mod transfer;

pub use paths::{ResourceSet, StatePath};
pub use traits::{FeeOracle, TokenLedger};
pub use transfer::TransferEffect;
