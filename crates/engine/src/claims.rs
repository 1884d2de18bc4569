//! Per-batch claim tracking.

use dropvault_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The set of receivers already paid out of one batch.
///
/// Append-only for the lifetime of the batch: a receiver appears at most
/// once, which is the anti-replay rule for claims. Insertion order is kept
/// for event reconstruction and debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    receivers: Vec<Address>,
    #[serde(skip)]
    index: HashSet<Address>,
}

impl ClaimSet {
    /// Create an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a receiver has already claimed.
    pub fn contains(&self, receiver: &Address) -> bool {
        if self.index.len() == self.receivers.len() {
            self.index.contains(receiver)
        } else {
            // Index may be empty after deserialization; fall back to a scan.
            self.receivers.contains(receiver)
        }
    }

    /// Record a claim. Returns false if the receiver was already present.
    pub fn insert(&mut self, receiver: Address) -> bool {
        if self.contains(&receiver) {
            return false;
        }
        self.rebuild_index_if_stale();
        self.index.insert(receiver);
        self.receivers.push(receiver);
        true
    }

    /// Receivers in claim order.
    pub fn receivers(&self) -> &[Address] {
        &self.receivers
    }

    /// Number of settled claims.
    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    /// Check if no claims have settled yet.
    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    fn rebuild_index_if_stale(&mut self) {
        if self.index.len() != self.receivers.len() {
            self.index = self.receivers.iter().copied().collect();
        }
    }
}
