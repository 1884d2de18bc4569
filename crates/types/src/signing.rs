//! Canonical signing messages for batch operations.
//!
//! Each authorized operation signs a specific dash-joined string. The formats
//! below are a wire contract shared with off-ledger signers and must be
//! reproduced exactly:
//!
//! | Operation | Message |
//! |-----------|---------|
//! | create    | `{id}-{symbol}-{min_amount}-{max_count}` |
//! | claim     | `{batch_id}-{receiver}-{amount}` |
//! | refund    | `{batch_id}-{amount}` |
//!
//! `max_count` is the global maximum-claim-count configuration value at
//! creation time, which ties the creation signature to the configuration it
//! was issued under. Addresses render as lowercase hex, amounts as decimal.
//!
//! The distinct field layouts keep the three message kinds from colliding:
//! a claim message always has three segments with an address in the middle,
//! a refund message two.

use crate::{Address, Amount, BatchId, Symbol};

/// Build the signing message authorizing batch creation.
pub fn create_message(
    id: &BatchId,
    symbol: &Symbol,
    min_amount: Amount,
    max_count: u64,
) -> String {
    format!("{id}-{symbol}-{min_amount}-{max_count}")
}

/// Build the signing message authorizing one receiver's claim.
pub fn claim_message(id: &BatchId, receiver: &Address, amount: Amount) -> String {
    format!("{id}-{receiver}-{amount}")
}

/// Build the signing message authorizing a refund to the batch sender.
pub fn refund_message(id: &BatchId, amount: Amount) -> String {
    format!("{id}-{amount}")
}
