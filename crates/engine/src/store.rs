//! The voucher ledger's own state, held behind an explicit handle.
//!
//! There is no ambient global state: every handler receives a store (or an
//! overlay over it) as an argument. The path-segment constants below are the
//! names the conflict planner uses to address the same locations, so they
//! must track the store layout.

use crate::ClaimSet;
use dropvault_types::{Address, BatchId, BatchRecord};
use std::collections::HashMap;

/// Path segment naming the initialized flag.
pub const INITIALIZED_PATH: &str = "Initialized";
/// Path segment naming the batch record map.
pub const BATCHES_PATH: &str = "Batches";
/// Path segment naming the per-batch claim sets.
pub const CLAIM_SETS_PATH: &str = "ClaimSets";
/// Path segment naming the max-claim-count cell.
///
/// The admin cell and controller list have no constants: the operations
/// touching them always plan as non-parallelizable, so no path names them.
pub const MAX_CLAIM_COUNT_PATH: &str = "MaxClaimCount";

/// All state owned by the voucher contract.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    initialized: bool,
    admin: Option<Address>,
    max_claim_count: u64,
    batches: HashMap<BatchId, BatchRecord>,
    claim_sets: HashMap<BatchId, ClaimSet>,
    controllers: Vec<Address>,
}

impl LedgerStore {
    /// Create an empty, uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Initialize has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The admin address, if initialized.
    pub fn admin(&self) -> Option<Address> {
        self.admin
    }

    /// The global maximum claim count per batch.
    pub fn max_claim_count(&self) -> u64 {
        self.max_claim_count
    }

    /// Look up a batch record.
    pub fn batch(&self, id: &BatchId) -> Option<&BatchRecord> {
        self.batches.get(id)
    }

    /// Look up a batch's claim set. Absent means no claims settled yet.
    pub fn claim_set(&self, id: &BatchId) -> Option<&ClaimSet> {
        self.claim_sets.get(id)
    }

    /// The claim-settlement controller list, in insertion order.
    pub fn controllers(&self) -> &[Address] {
        &self.controllers
    }

    /// Check controller membership.
    pub fn is_controller(&self, address: &Address) -> bool {
        self.controllers.contains(address)
    }

    /// Number of batches ever created.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    // ─── Mutations (called on overlay commit only) ───────────────────────

    pub(crate) fn initialize(&mut self, admin: Address, max_claim_count: u64) {
        self.initialized = true;
        self.admin = Some(admin);
        self.max_claim_count = max_claim_count;
    }

    pub(crate) fn insert_batch(&mut self, record: BatchRecord) {
        self.batches.insert(record.id.clone(), record);
    }

    pub(crate) fn record_claim(&mut self, id: &BatchId, receiver: Address) {
        self.claim_sets.entry(id.clone()).or_default().insert(receiver);
    }

    pub(crate) fn set_max_claim_count(&mut self, max_claim_count: u64) {
        self.max_claim_count = max_claim_count;
    }

    pub(crate) fn add_controller(&mut self, address: Address) {
        if !self.controllers.contains(&address) {
            self.controllers.push(address);
        }
    }

    pub(crate) fn remove_controller(&mut self, address: &Address) {
        self.controllers.retain(|c| c != address);
    }
}
