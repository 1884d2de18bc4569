//! The closed set of mutating operations.
//!
//! The host decodes a submitted transaction into an [`Operation`] and hands
//! it to the engine's dispatch; the conflict planner consumes the same enum
//! to declare resource paths before scheduling. Read-only queries are plain
//! methods on the engine and are not represented here.

use dropvault_types::{Address, Amount, BatchId, BatchKind, Symbol};
use serde::{Deserialize, Serialize};

/// Input for batch creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBatchInput {
    /// Unique batch identifier.
    pub id: BatchId,

    /// Distribution variant tag (opaque to the engine).
    pub kind: BatchKind,

    /// Token denomination.
    pub symbol: Symbol,

    /// Maximum number of claims.
    pub total_count: u64,

    /// Total amount to escrow.
    pub total_amount: Amount,

    /// Minimum amount a single claim may pay out.
    pub min_amount: Amount,

    /// Absolute expiry deadline in milliseconds.
    pub expires_at_millis: u64,

    /// Hex-encoded public key that will authorize claims and the refund.
    pub public_key: String,

    /// Hex-encoded signature over the creation message.
    pub signature: String,

    /// Declared sender, echoed in the creation event.
    pub sender: Address,
}

/// One receiver's claim within a claim-settlement call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    /// Receiving address.
    pub receiver: Address,

    /// Amount claimed.
    pub amount: Amount,

    /// Hex-encoded signature over the per-claim message.
    pub signature: String,
}

/// A mutating operation submitted to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// One-time initialization of admin and claim-count cap.
    Initialize {
        /// Admin address; defaults to the caller when absent.
        admin: Option<Address>,
        /// Global maximum claim count per batch.
        max_claim_count: u64,
    },

    /// Create and fund a batch.
    CreateBatch(CreateBatchInput),

    /// Settle a list of signed claims against a batch.
    ClaimBatch {
        /// Batch identifier.
        id: BatchId,
        /// Ordered claim entries.
        entries: Vec<ClaimEntry>,
    },

    /// Return escrowed funds to the sender after expiry.
    RefundBatch {
        /// Batch identifier.
        id: BatchId,
        /// Amount to return.
        amount: Amount,
        /// Hex-encoded signature over the refund message.
        signature: String,
    },

    /// Admin: change the global maximum claim count.
    SetMaxCount {
        /// New maximum; must be positive.
        max_count: u64,
    },

    /// Admin: add a claim-settlement controller.
    AddController {
        /// Controller address.
        address: Address,
    },

    /// Admin: remove a claim-settlement controller.
    RemoveController {
        /// Controller address.
        address: Address,
    },
}

impl Operation {
    /// The method name used in fee-schedule lookups and logs.
    pub fn method_name(&self) -> &'static str {
        match self {
            Operation::Initialize { .. } => "Initialize",
            Operation::CreateBatch(_) => "CreateBatch",
            Operation::ClaimBatch { .. } => "ClaimBatch",
            Operation::RefundBatch { .. } => "RefundBatch",
            Operation::SetMaxCount { .. } => "SetMaxCount",
            Operation::AddController { .. } => "AddController",
            Operation::RemoveController { .. } => "RemoveController",
        }
    }
}
