//! The voucher engine: operation dispatch and handlers.
//!
//! The engine is a deterministic, synchronous state machine. Each operation
//! executes to completion against an execution overlay; on any error the
//! overlay is dropped and no state moved, on success the staged writes and
//! transfer effects commit together. Concurrency exists only across
//! operations and is the scheduler's problem, driven by the conflict
//! planner's declared paths.

use crate::{
    ClaimEntry, ClaimSignaturePolicy, CreateBatchInput, DuplicatePolicy, EngineConfig, Event,
    ExecutionOverlay, LedgerError, LedgerStore, Operation,
};
use dropvault_core::TokenLedger;
use dropvault_types::{
    claim_message, create_message, refund_message, verify_signature, Address, Amount, BatchId,
    BatchRecord,
};
use tracing::{debug, info};

/// Memo recorded on escrow-funding transfers.
const MEMO_ESCROW: &str = "VoucherBatch";
/// Memo recorded on claim payouts.
const MEMO_CLAIM: &str = "TransferToReceiver";
/// Memo recorded on refunds.
const MEMO_REFUND: &str = "RefundBatch";

/// Per-operation execution context supplied by the host.
#[derive(Debug, Clone, Copy)]
pub struct OpContext {
    /// The account that submitted the operation.
    pub caller: Address,

    /// Current host time in milliseconds.
    pub now_millis: u64,
}

/// The voucher-batch ledger engine.
///
/// Owns the contract's state and executes operations against it. The token
/// ledger is external and passed per call.
pub struct VoucherEngine {
    contract: Address,
    config: EngineConfig,
    store: LedgerStore,
}

impl VoucherEngine {
    /// Create an engine for the contract deployed at `contract`.
    pub fn new(contract: Address, config: EngineConfig) -> Self {
        Self {
            contract,
            config,
            store: LedgerStore::new(),
        }
    }

    /// The contract's own address (holds escrow in transit).
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Read access to the contract state, used by the conflict planner.
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Execute one operation atomically.
    ///
    /// Returns the emitted events on success. On error, neither the store
    /// nor the token ledger has changed.
    pub fn execute<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        ctx: &OpContext,
        op: &Operation,
    ) -> Result<Vec<Event>, LedgerError> {
        let (writes, transfers, events) = {
            let mut overlay = ExecutionOverlay::new(&self.store, &*ledger);
            let events = match op {
                Operation::Initialize {
                    admin,
                    max_claim_count,
                } => self.handle_initialize(&mut overlay, ctx, *admin, *max_claim_count)?,
                Operation::CreateBatch(input) => self.handle_create(&mut overlay, ctx, input)?,
                Operation::ClaimBatch { id, entries } => {
                    self.handle_claim(&mut overlay, ctx, id, entries)?
                }
                Operation::RefundBatch {
                    id,
                    amount,
                    signature,
                } => self.handle_refund(&mut overlay, ctx, id, *amount, signature)?,
                Operation::SetMaxCount { max_count } => {
                    self.handle_set_max_count(&mut overlay, ctx, *max_count)?
                }
                Operation::AddController { address } => {
                    self.handle_add_controller(&mut overlay, ctx, *address)?
                }
                Operation::RemoveController { address } => {
                    self.handle_remove_controller(&mut overlay, ctx, *address)?
                }
            };
            let (writes, transfers) = overlay.into_parts();
            (writes, transfers, events)
        };

        writes.apply(&mut self.store);
        ledger.apply(&transfers);

        debug!(
            method = op.method_name(),
            caller = %ctx.caller,
            events = events.len(),
            "operation committed"
        );
        Ok(events)
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Full batch record for `id`.
    pub fn batch_info(&self, id: &BatchId) -> Result<&BatchRecord, LedgerError> {
        self.store
            .batch(id)
            .ok_or_else(|| LedgerError::BatchNotFound(id.clone()))
    }

    /// Current global maximum claim count.
    pub fn max_count(&self) -> u64 {
        self.store.max_claim_count()
    }

    /// Claim-settlement controllers.
    pub fn controllers(&self) -> &[Address] {
        self.store.controllers()
    }

    /// Admin address, if initialized.
    pub fn admin(&self) -> Option<Address> {
        self.store.admin()
    }

    // ─── Handlers ────────────────────────────────────────────────────────

    fn handle_initialize<L: TokenLedger>(
        &self,
        overlay: &mut ExecutionOverlay<'_, L>,
        ctx: &OpContext,
        admin: Option<Address>,
        max_claim_count: u64,
    ) -> Result<Vec<Event>, LedgerError> {
        if overlay.is_initialized() {
            return Err(LedgerError::AlreadyInitialized);
        }
        if let Some(admin) = admin {
            if admin.is_zero() {
                return Err(LedgerError::InvalidAdmin);
            }
        }
        if max_claim_count == 0 {
            return Err(LedgerError::InvalidMaxCount);
        }

        let admin = admin.unwrap_or(ctx.caller);
        overlay.stage_initialize(admin, max_claim_count);

        info!(%admin, max_claim_count, "voucher ledger initialized");
        Ok(vec![])
    }

    fn handle_create<L: TokenLedger>(
        &self,
        overlay: &mut ExecutionOverlay<'_, L>,
        ctx: &OpContext,
        input: &CreateBatchInput,
    ) -> Result<Vec<Event>, LedgerError> {
        self.require_initialized(overlay)?;

        if input.id.is_empty() {
            return Err(LedgerError::EmptyBatchId);
        }
        if overlay.batch(&input.id).is_some() {
            return Err(LedgerError::BatchExists(input.id.clone()));
        }
        if input.total_amount.is_zero() {
            return Err(LedgerError::InvalidTotalAmount);
        }
        if input.total_count == 0 {
            return Err(LedgerError::InvalidTotalCount);
        }
        if input.total_count > overlay.max_claim_count() {
            return Err(LedgerError::TotalCountExceedsMax);
        }
        if input.min_amount.is_zero() {
            return Err(LedgerError::InvalidMinAmount);
        }
        if input.symbol.is_empty() {
            return Err(LedgerError::EmptySymbol);
        }
        let promised = input
            .min_amount
            .checked_mul(input.total_count)
            .ok_or(LedgerError::AmountOverflow)?;
        if input.total_amount < promised {
            return Err(LedgerError::TotalAmountBelowMinimum);
        }
        if input.expires_at_millis <= ctx.now_millis {
            return Err(LedgerError::ExpiryNotInFuture);
        }
        if input.public_key.is_empty() {
            return Err(LedgerError::EmptyPublicKey);
        }
        if input.signature.is_empty() {
            return Err(LedgerError::EmptySignature);
        }
        if input.sender.is_zero() {
            return Err(LedgerError::EmptySender);
        }

        // The creation signature binds the batch to the max-count
        // configuration in force when it was issued.
        let message = create_message(
            &input.id,
            &input.symbol,
            input.min_amount,
            overlay.max_claim_count(),
        );
        if !verify_signature(&input.public_key, &input.signature, message.as_bytes()) {
            return Err(LedgerError::InvalidSignature);
        }

        // Two-hop escrow funding: the caller must have approved the contract
        // as spender; the contract then forwards into the subaccount.
        let escrow = Address::subaccount_of(&input.id);
        overlay.transfer_from(
            ctx.caller,
            self.contract,
            self.contract,
            input.symbol.clone(),
            input.total_amount,
            MEMO_ESCROW,
        )?;
        overlay.transfer(
            self.contract,
            escrow,
            input.symbol.clone(),
            input.total_amount,
            MEMO_ESCROW,
        )?;

        overlay.stage_batch(BatchRecord {
            id: input.id.clone(),
            kind: input.kind,
            symbol: input.symbol.clone(),
            total_count: input.total_count,
            total_amount: input.total_amount,
            min_amount: input.min_amount,
            expires_at_millis: input.expires_at_millis,
            public_key: input.public_key.clone(),
            sender: ctx.caller,
        });

        info!(
            id = %input.id,
            symbol = %input.symbol,
            total_amount = %input.total_amount,
            total_count = input.total_count,
            %escrow,
            "batch created"
        );
        Ok(vec![Event::BatchCreated {
            id: input.id.clone(),
            kind: input.kind,
            symbol: input.symbol.clone(),
            total_count: input.total_count,
            total_amount: input.total_amount,
            sender: input.sender,
            escrow,
        }])
    }

    fn handle_claim<L: TokenLedger>(
        &self,
        overlay: &mut ExecutionOverlay<'_, L>,
        ctx: &OpContext,
        id: &BatchId,
        entries: &[ClaimEntry],
    ) -> Result<Vec<Event>, LedgerError> {
        self.require_initialized(overlay)?;

        if id.is_empty() {
            return Err(LedgerError::EmptyBatchId);
        }
        if entries.is_empty() {
            return Err(LedgerError::EmptyClaimList);
        }
        let batch = overlay
            .batch(id)
            .cloned()
            .ok_or_else(|| LedgerError::BatchNotFound(id.clone()))?;

        if self.config.restrict_claims_to_controllers {
            let is_admin = overlay.admin() == Some(ctx.caller);
            if !is_admin && !overlay.is_controller(&ctx.caller) {
                return Err(LedgerError::NoPermission);
            }
        }

        let escrow = Address::subaccount_of(id);
        let mut events = Vec::new();
        let mut settled = 0usize;

        for entry in entries {
            if entry.receiver.is_zero() {
                return Err(LedgerError::EmptyReceiver);
            }

            if overlay.has_claimed(id, &entry.receiver) {
                match self.config.duplicate_policy {
                    DuplicatePolicy::Skip => {
                        debug!(id = %id, receiver = %entry.receiver, "duplicate claim skipped");
                        continue;
                    }
                    DuplicatePolicy::Reject => {
                        return Err(LedgerError::ReceiverAlreadyClaimed(entry.receiver));
                    }
                }
            }

            let message = claim_message(&batch.id, &entry.receiver, entry.amount);
            if !verify_signature(&batch.public_key, &entry.signature, message.as_bytes()) {
                match self.config.signature_policy {
                    ClaimSignaturePolicy::Strict => return Err(LedgerError::InvalidSignature),
                    ClaimSignaturePolicy::Lenient => {
                        events.push(Event::ClaimSettled {
                            id: batch.id.clone(),
                            receiver: entry.receiver,
                            amount: entry.amount,
                            sender: batch.sender,
                            success: false,
                        });
                        continue;
                    }
                }
            }

            overlay.transfer(
                escrow,
                entry.receiver,
                batch.symbol.clone(),
                entry.amount,
                MEMO_CLAIM,
            )?;
            overlay.stage_claim(id.clone(), entry.receiver);
            events.push(Event::ClaimSettled {
                id: batch.id.clone(),
                receiver: entry.receiver,
                amount: entry.amount,
                sender: batch.sender,
                success: true,
            });
            settled += 1;
        }

        if settled == 0 && self.config.signature_policy == ClaimSignaturePolicy::Strict {
            return Err(LedgerError::AllAlreadyReceived);
        }

        info!(id = %id, settled, entries = entries.len(), "claims settled");
        Ok(events)
    }

    fn handle_refund<L: TokenLedger>(
        &self,
        overlay: &mut ExecutionOverlay<'_, L>,
        ctx: &OpContext,
        id: &BatchId,
        amount: Amount,
        signature: &str,
    ) -> Result<Vec<Event>, LedgerError> {
        self.require_initialized(overlay)?;

        if id.is_empty() {
            return Err(LedgerError::EmptyBatchId);
        }
        let batch = overlay
            .batch(id)
            .cloned()
            .ok_or_else(|| LedgerError::BatchNotFound(id.clone()))?;
        if !batch.is_expired(ctx.now_millis) {
            return Err(LedgerError::BatchNotExpired);
        }

        let message = refund_message(&batch.id, amount);
        if !verify_signature(&batch.public_key, signature, message.as_bytes()) {
            return Err(LedgerError::InvalidSignature);
        }

        let escrow = Address::subaccount_of(id);
        overlay.transfer(escrow, batch.sender, batch.symbol.clone(), amount, MEMO_REFUND)?;

        info!(id = %id, %amount, refund_address = %batch.sender, "batch refunded");
        Ok(vec![Event::BatchRefunded {
            id: batch.id.clone(),
            refund_address: batch.sender,
            amount,
            symbol: batch.symbol,
        }])
    }

    fn handle_set_max_count<L: TokenLedger>(
        &self,
        overlay: &mut ExecutionOverlay<'_, L>,
        ctx: &OpContext,
        max_count: u64,
    ) -> Result<Vec<Event>, LedgerError> {
        self.require_initialized(overlay)?;
        self.require_admin(overlay, ctx)?;
        if max_count == 0 {
            return Err(LedgerError::InvalidMaxCount);
        }

        overlay.stage_max_claim_count(max_count);
        info!(max_count, "max claim count updated");
        Ok(vec![Event::MaxCountChanged { max_count }])
    }

    fn handle_add_controller<L: TokenLedger>(
        &self,
        overlay: &mut ExecutionOverlay<'_, L>,
        ctx: &OpContext,
        address: Address,
    ) -> Result<Vec<Event>, LedgerError> {
        self.require_admin(overlay, ctx)?;
        if address.is_zero() {
            return Err(LedgerError::InvalidController);
        }
        if overlay.is_controller(&address) {
            // Idempotent: already present, no event.
            return Ok(vec![]);
        }

        overlay.stage_add_controller(address);
        info!(%address, "controller added");
        Ok(vec![Event::ControllerAdded { address }])
    }

    fn handle_remove_controller<L: TokenLedger>(
        &self,
        overlay: &mut ExecutionOverlay<'_, L>,
        ctx: &OpContext,
        address: Address,
    ) -> Result<Vec<Event>, LedgerError> {
        self.require_admin(overlay, ctx)?;
        if address.is_zero() {
            return Err(LedgerError::InvalidController);
        }
        if !overlay.is_controller(&address) {
            // Idempotent: not present, no event.
            return Ok(vec![]);
        }

        overlay.stage_remove_controller(address);
        info!(%address, "controller removed");
        Ok(vec![Event::ControllerRemoved { address }])
    }

    // ─── Shared checks ───────────────────────────────────────────────────

    fn require_initialized<L: TokenLedger>(
        &self,
        overlay: &ExecutionOverlay<'_, L>,
    ) -> Result<(), LedgerError> {
        if !overlay.is_initialized() {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }

    fn require_admin<L: TokenLedger>(
        &self,
        overlay: &ExecutionOverlay<'_, L>,
        ctx: &OpContext,
    ) -> Result<(), LedgerError> {
        if overlay.admin() != Some(ctx.caller) {
            return Err(LedgerError::NoPermission);
        }
        Ok(())
    }
}
