//! Batch record types.

use crate::{Address, Amount, BatchId, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution variant tag.
///
/// Opaque to the engine: it is persisted and echoed in events so off-ledger
/// products can distinguish their distribution styles, but no core logic
/// branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchKind {
    /// Equal shares, claimable by anyone holding a valid signature.
    QuickTransfer,
    /// Randomized share amounts.
    Random,
    /// Fixed per-receiver share amounts.
    Fixed,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchKind::QuickTransfer => write!(f, "quick-transfer"),
            BatchKind::Random => write!(f, "random"),
            BatchKind::Fixed => write!(f, "fixed"),
        }
    }
}

/// One escrowed voucher distribution.
///
/// Created once per batch id and immutable afterwards. The escrowed funds
/// live in the subaccount derived via [`Address::subaccount_of`], not in the
/// record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Unique batch identifier (primary key).
    pub id: BatchId,

    /// Distribution variant tag.
    pub kind: BatchKind,

    /// Token denomination for the escrowed amount and all claims.
    pub symbol: Symbol,

    /// Maximum number of claims allowed.
    pub total_count: u64,

    /// Total value escrowed at creation.
    pub total_amount: Amount,

    /// Minimum amount a single claim may pay out.
    pub min_amount: Amount,

    /// Absolute expiry deadline in milliseconds; refunds only after this.
    pub expires_at_millis: u64,

    /// Hex-encoded public key authorizing claims and refunds.
    pub public_key: String,

    /// Batch creator, entitled to the post-expiry refund.
    pub sender: Address,
}

impl BatchRecord {
    /// Check whether the batch has expired at the given host time.
    ///
    /// The deadline itself counts as expired: refunds are rejected strictly
    /// before `expires_at_millis` and allowed at or after it.
    pub fn is_expired(&self, now_millis: u64) -> bool {
        now_millis >= self.expires_at_millis
    }
}
