//! Error types for voucher-batch operations.
//!
//! Every failure carries a human-readable reason string; callers are allowed
//! to branch on message content, so the wording is part of the interface.
//! No error is retried internally, and no error leaves partial state behind.

use dropvault_types::{Address, Amount, BatchId, Symbol};
use thiserror::Error;

/// Errors surfaced by voucher-batch operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ─── State errors ────────────────────────────────────────────────────
    /// Initialize called twice.
    #[error("Already initialized.")]
    AlreadyInitialized,

    /// A mutating operation arrived before Initialize.
    #[error("Contract not initialized.")]
    NotInitialized,

    /// CreateBatch for an id that already has a record.
    #[error("Batch {0} already exists.")]
    BatchExists(BatchId),

    /// The referenced batch does not exist.
    #[error("Batch {0} not found.")]
    BatchNotFound(BatchId),

    /// Refund attempted strictly before the expiry deadline.
    #[error("Batch not expired.")]
    BatchNotExpired,

    /// Duplicate receiver under the rejecting duplicate policy.
    #[error("Receiver {0} already received.")]
    ReceiverAlreadyClaimed(Address),

    /// A strict-mode claim call settled zero entries.
    #[error("All receivers already received.")]
    AllAlreadyReceived,

    // ─── Authorization errors ────────────────────────────────────────────
    /// Signature does not recover to the expected public key.
    #[error("Invalid signature.")]
    InvalidSignature,

    /// Caller is not allowed to perform this operation.
    #[error("No permission.")]
    NoPermission,

    // ─── Validation errors ───────────────────────────────────────────────
    /// Batch id is empty.
    #[error("Batch id should not be empty.")]
    EmptyBatchId,

    /// Token symbol is empty.
    #[error("Symbol should not be empty.")]
    EmptySymbol,

    /// Total escrowed amount is zero.
    #[error("TotalAmount should be greater than 0.")]
    InvalidTotalAmount,

    /// Claim count is zero.
    #[error("TotalCount should be greater than 0.")]
    InvalidTotalCount,

    /// Claim count exceeds the configured maximum.
    #[error("TotalCount should be less than or equal to MaxCount.")]
    TotalCountExceedsMax,

    /// Minimum per-claim amount is zero.
    #[error("MinAmount should be greater than 0.")]
    InvalidMinAmount,

    /// Escrow cannot cover the promised minimum shares.
    #[error("TotalAmount should be greater than MinAmount * TotalCount.")]
    TotalAmountBelowMinimum,

    /// Expiry deadline is not in the future.
    #[error("ExpirationTime should be greater than now.")]
    ExpiryNotInFuture,

    /// Public key is empty.
    #[error("PublicKey should not be empty.")]
    EmptyPublicKey,

    /// Signature string is empty.
    #[error("Signature should not be empty.")]
    EmptySignature,

    /// Creation input with the zero address as sender.
    #[error("SenderAddress should not be null.")]
    EmptySender,

    /// Max claim count update with a zero value.
    #[error("MaxCount should be greater than 0.")]
    InvalidMaxCount,

    /// Initialize called with the zero address as admin.
    #[error("Invalid admin address.")]
    InvalidAdmin,

    /// Controller registry update with the zero address.
    #[error("Invalid controller address.")]
    InvalidController,

    /// Claim entry with a zero receiver address.
    #[error("ReceiverAddress is empty.")]
    EmptyReceiver,

    /// Claim call with no entries.
    #[error("Claim list should not be empty.")]
    EmptyClaimList,

    /// Amount arithmetic overflowed.
    #[error("Amount overflow.")]
    AmountOverflow,

    // ─── Ledger invariant violations ─────────────────────────────────────
    /// A transfer would overdraw the payer, including the escrow subaccount.
    #[error("Insufficient balance of {owner} in {symbol}.")]
    InsufficientBalance {
        /// Account that would be overdrawn.
        owner: Address,
        /// Token denomination.
        symbol: Symbol,
    },

    /// The caller has not approved the contract for the escrowed amount.
    #[error("Insufficient allowance from {owner} in {symbol}: need {needed}.")]
    InsufficientAllowance {
        /// Allowance grantor.
        owner: Address,
        /// Token denomination.
        symbol: Symbol,
        /// Amount the transfer required.
        needed: Amount,
    },
}
