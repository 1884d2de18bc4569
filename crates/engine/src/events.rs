//! Events emitted by successful operations.
//!
//! Events are returned from `execute` for the host to publish; they are never
//! consulted by the engine itself.

use dropvault_types::{Address, Amount, BatchId, BatchKind, Symbol};
use serde::{Deserialize, Serialize};

/// An event describing a committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A batch was created and funded.
    BatchCreated {
        /// Batch identifier.
        id: BatchId,
        /// Distribution variant tag.
        kind: BatchKind,
        /// Token denomination.
        symbol: Symbol,
        /// Maximum number of claims.
        total_count: u64,
        /// Escrowed amount.
        total_amount: Amount,
        /// Declared sender from the creation input.
        sender: Address,
        /// Derived escrow subaccount now holding the funds.
        escrow: Address,
    },

    /// One claim entry was settled (or, in lenient mode, failed).
    ClaimSettled {
        /// Batch identifier.
        id: BatchId,
        /// Claiming receiver.
        receiver: Address,
        /// Claimed amount.
        amount: Amount,
        /// Batch creator.
        sender: Address,
        /// False only for lenient-mode signature failures; no funds moved.
        success: bool,
    },

    /// Escrowed funds were returned to the batch sender after expiry.
    BatchRefunded {
        /// Batch identifier.
        id: BatchId,
        /// Refund destination (the batch creator).
        refund_address: Address,
        /// Refunded amount.
        amount: Amount,
        /// Token denomination.
        symbol: Symbol,
    },

    /// The global maximum claim count was changed by the admin.
    MaxCountChanged {
        /// New maximum.
        max_count: u64,
    },

    /// A controller was added to the claim-settlement allow list.
    ControllerAdded {
        /// The added controller.
        address: Address,
    },

    /// A controller was removed from the claim-settlement allow list.
    ControllerRemoved {
        /// The removed controller.
        address: Address,
    },
}

impl Event {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::BatchCreated { .. } => "BatchCreated",
            Event::ClaimSettled { .. } => "ClaimSettled",
            Event::BatchRefunded { .. } => "BatchRefunded",
            Event::MaxCountChanged { .. } => "MaxCountChanged",
            Event::ControllerAdded { .. } => "ControllerAdded",
            Event::ControllerRemoved { .. } => "ControllerRemoved",
        }
    }
}
