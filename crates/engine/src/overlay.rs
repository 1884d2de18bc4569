//! Execution overlay for atomic operation semantics.
//!
//! Every operation runs against an `ExecutionOverlay` that wraps the base
//! store and token ledger read-only and captures all writes. Reads check the
//! overlay first, then fall through to the base. If the handler errors, the
//! overlay is simply dropped and nothing changed; on success the buffered
//! store writes and transfer effects are committed together.
//!
//! Balance and allowance checks happen here, against base values adjusted by
//! in-flight deltas, so an operation can never produce a transfer list the
//! ledger would have to reject halfway through.

use crate::{LedgerError, LedgerStore};
use dropvault_core::{TokenLedger, TransferEffect};
use dropvault_types::{Address, Amount, BatchId, BatchRecord, Symbol};
use std::collections::HashMap;

/// Store writes buffered during one operation.
#[derive(Debug, Default)]
pub(crate) struct StagedWrites {
    init: Option<(Address, u64)>,
    batches: Vec<BatchRecord>,
    claims: Vec<(BatchId, Address)>,
    max_claim_count: Option<u64>,
    added_controllers: Vec<Address>,
    removed_controllers: Vec<Address>,
}

impl StagedWrites {
    /// Apply all buffered writes to the base store.
    pub(crate) fn apply(self, store: &mut LedgerStore) {
        if let Some((admin, max_claim_count)) = self.init {
            store.initialize(admin, max_claim_count);
        }
        for record in self.batches {
            store.insert_batch(record);
        }
        for (id, receiver) in self.claims {
            store.record_claim(&id, receiver);
        }
        if let Some(max_claim_count) = self.max_claim_count {
            store.set_max_claim_count(max_claim_count);
        }
        for address in self.added_controllers {
            store.add_controller(address);
        }
        for address in self.removed_controllers {
            store.remove_controller(&address);
        }
    }
}

/// Overlay capturing one operation's writes over the store and ledger.
pub(crate) struct ExecutionOverlay<'a, L: TokenLedger> {
    store: &'a LedgerStore,
    ledger: &'a L,

    /// Net balance movement per (owner, symbol) from buffered transfers.
    deltas: HashMap<(Address, Symbol), i128>,

    /// Allowance already consumed per (owner, spender, symbol).
    allowance_used: HashMap<(Address, Address, Symbol), u64>,

    transfers: Vec<TransferEffect>,
    writes: StagedWrites,
}

impl<'a, L: TokenLedger> ExecutionOverlay<'a, L> {
    pub(crate) fn new(store: &'a LedgerStore, ledger: &'a L) -> Self {
        Self {
            store,
            ledger,
            deltas: HashMap::new(),
            allowance_used: HashMap::new(),
            transfers: Vec::new(),
            writes: StagedWrites::default(),
        }
    }

    // ─── Reads (overlay first, then base) ────────────────────────────────

    pub(crate) fn is_initialized(&self) -> bool {
        self.writes.init.is_some() || self.store.is_initialized()
    }

    pub(crate) fn admin(&self) -> Option<Address> {
        self.writes
            .init
            .map(|(admin, _)| admin)
            .or_else(|| self.store.admin())
    }

    pub(crate) fn max_claim_count(&self) -> u64 {
        self.writes
            .max_claim_count
            .or_else(|| self.writes.init.map(|(_, max)| max))
            .unwrap_or_else(|| self.store.max_claim_count())
    }

    pub(crate) fn batch(&self, id: &BatchId) -> Option<&BatchRecord> {
        self.writes
            .batches
            .iter()
            .find(|record| &record.id == id)
            .or_else(|| self.store.batch(id))
    }

    /// Check the claim set including claims staged earlier in this call.
    pub(crate) fn has_claimed(&self, id: &BatchId, receiver: &Address) -> bool {
        if self
            .writes
            .claims
            .iter()
            .any(|(staged_id, staged_receiver)| staged_id == id && staged_receiver == receiver)
        {
            return true;
        }
        self.store
            .claim_set(id)
            .map(|set| set.contains(receiver))
            .unwrap_or(false)
    }

    pub(crate) fn is_controller(&self, address: &Address) -> bool {
        if self.writes.removed_controllers.contains(address) {
            return false;
        }
        self.writes.added_controllers.contains(address) || self.store.is_controller(address)
    }

    // ─── Staged store writes ─────────────────────────────────────────────

    pub(crate) fn stage_initialize(&mut self, admin: Address, max_claim_count: u64) {
        self.writes.init = Some((admin, max_claim_count));
    }

    pub(crate) fn stage_batch(&mut self, record: BatchRecord) {
        self.writes.batches.push(record);
    }

    pub(crate) fn stage_claim(&mut self, id: BatchId, receiver: Address) {
        self.writes.claims.push((id, receiver));
    }

    pub(crate) fn stage_max_claim_count(&mut self, max_claim_count: u64) {
        self.writes.max_claim_count = Some(max_claim_count);
    }

    pub(crate) fn stage_add_controller(&mut self, address: Address) {
        self.writes.removed_controllers.retain(|c| c != &address);
        self.writes.added_controllers.push(address);
    }

    pub(crate) fn stage_remove_controller(&mut self, address: Address) {
        self.writes.added_controllers.retain(|c| c != &address);
        self.writes.removed_controllers.push(address);
    }

    // ─── Buffered transfers ──────────────────────────────────────────────

    /// Balance of `owner` as seen inside this operation.
    pub(crate) fn available_balance(&self, owner: &Address, symbol: &Symbol) -> i128 {
        let base = self.ledger.balance_of(owner, symbol).get() as i128;
        let delta = self
            .deltas
            .get(&(*owner, symbol.clone()))
            .copied()
            .unwrap_or(0);
        base + delta
    }

    /// Buffer a transfer spending `from`'s own balance.
    pub(crate) fn transfer(
        &mut self,
        from: Address,
        to: Address,
        symbol: Symbol,
        amount: Amount,
        memo: &str,
    ) -> Result<(), LedgerError> {
        self.debit_checked(&from, &symbol, amount)?;
        self.credit(&to, &symbol, amount);
        self.transfers.push(TransferEffect::transfer(
            from,
            to,
            symbol,
            amount,
            memo,
        ));
        Ok(())
    }

    /// Buffer an allowance-consuming transfer executed by `spender` on
    /// behalf of `from`.
    pub(crate) fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        spender: Address,
        symbol: Symbol,
        amount: Amount,
        memo: &str,
    ) -> Result<(), LedgerError> {
        let key = (from, spender, symbol.clone());
        let used = self.allowance_used.get(&key).copied().unwrap_or(0);
        let granted = self.ledger.allowance(&from, &spender, &symbol).get();
        if granted.saturating_sub(used) < amount.get() {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                symbol,
                needed: amount,
            });
        }

        self.debit_checked(&from, &symbol, amount)?;
        self.credit(&to, &symbol, amount);
        *self.allowance_used.entry(key).or_insert(0) += amount.get();
        self.transfers.push(TransferEffect::transfer_from(
            from,
            to,
            spender,
            symbol,
            amount,
            memo,
        ));
        Ok(())
    }

    fn debit_checked(
        &mut self,
        owner: &Address,
        symbol: &Symbol,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if self.available_balance(owner, symbol) < amount.get() as i128 {
            return Err(LedgerError::InsufficientBalance {
                owner: *owner,
                symbol: symbol.clone(),
            });
        }
        *self.deltas.entry((*owner, symbol.clone())).or_insert(0) -= amount.get() as i128;
        Ok(())
    }

    fn credit(&mut self, owner: &Address, symbol: &Symbol, amount: Amount) {
        *self.deltas.entry((*owner, symbol.clone())).or_insert(0) += amount.get() as i128;
    }

    /// Consume the overlay, releasing the buffered writes for commit.
    pub(crate) fn into_parts(self) -> (StagedWrites, Vec<TransferEffect>) {
        (self.writes, self.transfers)
    }
}
