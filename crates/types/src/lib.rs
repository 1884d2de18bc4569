//! Core types for the dropvault voucher-batch engine.
//!
//! Everything here is pure data and pure functions: content hashing,
//! addresses and identifier newtypes, the recoverable-signature authority,
//! canonical signing messages, and the immutable batch record.

mod batch;
mod crypto;
mod hash;
mod identifiers;
mod signing;

pub use batch::{BatchKind, BatchRecord};
pub use crypto::{recover_signer, verify_signature, KeyPair, SIGNATURE_BYTES};
pub use hash::{Hash, HexError};
pub use identifiers::{Address, Amount, BatchId, Symbol};
pub use signing::{claim_message, create_message, refund_message};
