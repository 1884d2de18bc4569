//! The conflict planner proper.

use crate::fees::add_fee_paths;
use dropvault_core::{FeeOracle, ResourceSet, StatePath};
use dropvault_engine::{
    ClaimEntry, CreateBatchInput, LedgerStore, Operation, BATCHES_PATH, CLAIM_SETS_PATH,
    INITIALIZED_PATH, MAX_CLAIM_COUNT_PATH,
};
use dropvault_types::{Address, BatchId};
use tracing::debug;

/// Plans the read/write path sets of pending voucher operations.
///
/// Holds only the voucher contract's own address; all other scoping comes
/// from the fee oracle at planning time.
#[derive(Debug, Clone, Copy)]
pub struct ConflictPlanner {
    contract: Address,
}

impl ConflictPlanner {
    pub fn new(contract: Address) -> Self {
        Self { contract }
    }

    /// Declare the resource set of `op` as submitted by `caller`.
    ///
    /// `store` is the committed state at planning time. Planning never
    /// mutates anything and must not assume the operation will succeed.
    pub fn plan(
        &self,
        store: &LedgerStore,
        fees: &dyn FeeOracle,
        caller: &Address,
        op: &Operation,
    ) -> ResourceSet {
        let set = match op {
            Operation::CreateBatch(input) => self.plan_create(fees, caller, input),
            Operation::ClaimBatch { id, entries } => {
                self.plan_claim(store, fees, caller, id, entries)
            }
            // Initialization, refunds, and admin updates are rare; they take
            // the conservative path rather than a bespoke model.
            _ => ResourceSet::non_parallelizable(),
        };

        debug!(
            method = op.method_name(),
            reads = set.read_paths.len(),
            writes = set.write_paths.len(),
            non_parallelizable = set.non_parallelizable,
            "planned resource set"
        );
        set
    }

    fn plan_create(
        &self,
        fees: &dyn FeeOracle,
        caller: &Address,
        input: &CreateBatchInput,
    ) -> ResourceSet {
        let mut set = ResourceSet::new();
        let token = fees.token_contract();

        set.read(self.own_path([INITIALIZED_PATH.to_string()]));
        set.read(self.own_path([MAX_CLAIM_COUNT_PATH.to_string()]));
        // The pre-existence check reads the record before the write lands.
        set.read(self.own_path([BATCHES_PATH.to_string(), input.id.to_string()]));
        set.write(self.own_path([BATCHES_PATH.to_string(), input.id.to_string()]));

        // Escrow funding moves caller -> contract -> derived subaccount.
        let escrow = Address::subaccount_of(&input.id);
        for owner in [caller, &self.contract, &escrow] {
            set.write(StatePath::new(
                token,
                [
                    crate::BALANCES_PATH.to_string(),
                    owner.to_hex(),
                    input.symbol.to_string(),
                ],
            ));
        }

        add_fee_paths(&mut set, fees, caller, "CreateBatch");
        set
    }

    fn plan_claim(
        &self,
        store: &LedgerStore,
        fees: &dyn FeeOracle,
        caller: &Address,
        id: &BatchId,
        entries: &[ClaimEntry],
    ) -> ResourceSet {
        // The batch's token symbol determines the balance paths; without the
        // record there is nothing safe to declare.
        let Some(batch) = store.batch(id) else {
            return ResourceSet::non_parallelizable();
        };

        let mut set = ResourceSet::new();
        let token = fees.token_contract();
        let escrow = Address::subaccount_of(id);

        set.read(self.own_path([INITIALIZED_PATH.to_string()]));
        set.read(self.own_path([BATCHES_PATH.to_string(), id.to_string()]));
        set.write(StatePath::new(
            token,
            [
                crate::BALANCES_PATH.to_string(),
                escrow.to_hex(),
                batch.symbol.to_string(),
            ],
        ));

        for entry in entries {
            set.write(self.own_path([
                CLAIM_SETS_PATH.to_string(),
                id.to_string(),
                entry.receiver.to_hex(),
            ]));
            set.write(StatePath::new(
                token,
                [
                    crate::BALANCES_PATH.to_string(),
                    entry.receiver.to_hex(),
                    batch.symbol.to_string(),
                ],
            ));
        }

        add_fee_paths(&mut set, fees, caller, "ClaimBatch");
        set
    }

    fn own_path<I, S>(&self, parts: I) -> StatePath
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StatePath::new(self.contract, parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropvault_engine::{EngineConfig, OpContext, VoucherEngine};
    use dropvault_test_helpers::{test_address, test_keypair, InMemoryTokenLedger, StaticFeeOracle};
    use dropvault_types::{create_message, Amount, BatchKind, Symbol};

    const MAX_COUNT: u64 = 1_000;

    fn tok() -> Symbol {
        Symbol::new("TOK")
    }

    fn oracle() -> StaticFeeOracle {
        StaticFeeOracle::new(test_address(0xAA)).with_primary_symbol(Symbol::new("NATIVE"))
    }

    fn create_input(id: &str, sender: Address) -> CreateBatchInput {
        let signer = test_keypair(1);
        let id = BatchId::new(id);
        let message = create_message(&id, &tok(), Amount(10), MAX_COUNT);
        CreateBatchInput {
            id,
            kind: BatchKind::QuickTransfer,
            symbol: tok(),
            total_count: 10,
            total_amount: Amount(1_000),
            min_amount: Amount(10),
            expires_at_millis: 10_000,
            public_key: signer.public_key_hex(),
            signature: signer.sign(message.as_bytes()),
            sender,
        }
    }

    fn claim_entry(receiver: Address) -> ClaimEntry {
        ClaimEntry {
            receiver,
            amount: Amount(10),
            signature: "00".into(),
        }
    }

    /// An engine whose store holds one created batch "B1".
    fn store_with_batch() -> LedgerStore {
        let contract = test_address(0xCC);
        let creator = test_address(1);
        let mut engine = VoucherEngine::new(contract, EngineConfig::strict());
        let mut ledger = InMemoryTokenLedger::new();
        ledger.mint(creator, &tok(), 10_000);
        ledger.approve(creator, contract, &tok(), 10_000);

        let ctx = OpContext {
            caller: creator,
            now_millis: 0,
        };
        engine
            .execute(
                &mut ledger,
                &ctx,
                &Operation::Initialize {
                    admin: None,
                    max_claim_count: MAX_COUNT,
                },
            )
            .unwrap();
        engine
            .execute(
                &mut ledger,
                &ctx,
                &Operation::CreateBatch(create_input("B1", creator)),
            )
            .unwrap();
        engine.store().clone()
    }

    #[test]
    fn test_create_declares_batch_and_balance_writes() {
        let planner = ConflictPlanner::new(test_address(0xCC));
        let caller = test_address(1);
        let input = create_input("B1", caller);
        let escrow = Address::subaccount_of(&input.id);

        let set = planner.plan(
            &LedgerStore::new(),
            &oracle(),
            &caller,
            &Operation::CreateBatch(input),
        );

        assert!(!set.non_parallelizable);
        assert!(set.write_paths.contains(&StatePath::new(
            test_address(0xCC),
            ["Batches".to_string(), "B1".into()],
        )));
        // The pre-existence check is declared as a read of the same record.
        assert!(set.read_paths.contains(&StatePath::new(
            test_address(0xCC),
            ["Batches".to_string(), "B1".into()],
        )));
        for owner in [caller, test_address(0xCC), escrow] {
            assert!(set.write_paths.contains(&StatePath::new(
                test_address(0xAA),
                ["Balances".to_string(), owner.to_hex(), "TOK".into()],
            )));
        }
        // Fee charging in the primary token for the caller.
        assert!(set.write_paths.contains(&StatePath::new(
            test_address(0xAA),
            ["Balances".to_string(), caller.to_hex(), "NATIVE".into()],
        )));
    }

    #[test]
    fn test_claim_declares_per_receiver_paths() {
        let planner = ConflictPlanner::new(test_address(0xCC));
        let store = store_with_batch();
        let caller = test_address(2);
        let id = BatchId::new("B1");
        let escrow = Address::subaccount_of(&id);
        let receivers = [test_address(0x11), test_address(0x12), test_address(0x13)];

        let set = planner.plan(
            &store,
            &oracle(),
            &caller,
            &Operation::ClaimBatch {
                id: id.clone(),
                entries: receivers.iter().copied().map(claim_entry).collect(),
            },
        );

        assert!(!set.non_parallelizable);
        assert!(set.write_paths.contains(&StatePath::new(
            test_address(0xAA),
            ["Balances".to_string(), escrow.to_hex(), "TOK".into()],
        )));
        for receiver in receivers {
            assert!(set.write_paths.contains(&StatePath::new(
                test_address(0xCC),
                ["ClaimSets".to_string(), "B1".into(), receiver.to_hex()],
            )));
            assert!(set.write_paths.contains(&StatePath::new(
                test_address(0xAA),
                ["Balances".to_string(), receiver.to_hex(), "TOK".into()],
            )));
        }
        assert!(set.read_paths.contains(&StatePath::new(
            test_address(0xCC),
            ["Batches".to_string(), "B1".into()],
        )));
    }

    #[test]
    fn test_claims_on_distinct_batches_parallelize() {
        let contract = test_address(0xCC);
        let creator = test_address(1);
        let mut engine = VoucherEngine::new(contract, EngineConfig::strict());
        let mut ledger = InMemoryTokenLedger::new();
        ledger.mint(creator, &tok(), 10_000);
        ledger.approve(creator, contract, &tok(), 10_000);

        let ctx = OpContext {
            caller: creator,
            now_millis: 0,
        };
        engine
            .execute(
                &mut ledger,
                &ctx,
                &Operation::Initialize {
                    admin: None,
                    max_claim_count: MAX_COUNT,
                },
            )
            .unwrap();
        for id in ["B1", "B2"] {
            engine
                .execute(
                    &mut ledger,
                    &ctx,
                    &Operation::CreateBatch(create_input(id, creator)),
                )
                .unwrap();
        }

        let planner = ConflictPlanner::new(contract);
        let plan = |id: &str, caller: Address, receiver: Address| {
            planner.plan(
                engine.store(),
                &oracle(),
                &caller,
                &Operation::ClaimBatch {
                    id: BatchId::new(id),
                    entries: vec![claim_entry(receiver)],
                },
            )
        };

        // Different batches, callers, and receivers: fully disjoint.
        let a = plan("B1", test_address(2), test_address(0x11));
        let b = plan("B2", test_address(3), test_address(0x12));
        assert!(!a.conflicts_with(&b));

        // Same batch, same receiver: claim-set write collides.
        let c = plan("B1", test_address(3), test_address(0x11));
        assert!(a.conflicts_with(&c));
    }

    #[test]
    fn test_missing_batch_falls_back_to_non_parallelizable() {
        let planner = ConflictPlanner::new(test_address(0xCC));
        let set = planner.plan(
            &LedgerStore::new(),
            &oracle(),
            &test_address(2),
            &Operation::ClaimBatch {
                id: BatchId::new("NOPE"),
                entries: vec![claim_entry(test_address(0x11))],
            },
        );
        assert!(set.non_parallelizable);
    }

    #[test]
    fn test_unmodeled_operations_are_non_parallelizable() {
        let planner = ConflictPlanner::new(test_address(0xCC));
        let ops = [
            Operation::Initialize {
                admin: None,
                max_claim_count: 10,
            },
            Operation::RefundBatch {
                id: BatchId::new("B1"),
                amount: Amount(1),
                signature: "00".into(),
            },
            Operation::SetMaxCount { max_count: 10 },
            Operation::AddController {
                address: test_address(5),
            },
            Operation::RemoveController {
                address: test_address(5),
            },
        ];

        for op in &ops {
            let set = planner.plan(&LedgerStore::new(), &oracle(), &test_address(2), op);
            assert!(set.non_parallelizable, "{} should be conservative", op.method_name());
        }
    }

    #[test]
    fn test_fee_delegation_closure_is_two_levels_deduplicated() {
        let planner = ConflictPlanner::new(test_address(0xCC));
        let caller = test_address(1);
        let d1 = test_address(0x21);
        let d2 = test_address(0x22);
        let d3 = test_address(0x23);

        // caller -> d1 -> {d2, d3}; d2 -> caller (cycle, already covered);
        // d3 -> d3 (self, already covered). Depth cuts off past level two.
        let oracle = oracle()
            .with_delegation(caller, vec![d1])
            .with_delegation(d1, vec![d2, d3])
            .with_delegation(d2, vec![caller])
            .with_delegation(d3, vec![d3]);

        let set = planner.plan(
            &LedgerStore::new(),
            &oracle,
            &caller,
            &Operation::CreateBatch(create_input("B1", caller)),
        );

        let native_paths: Vec<&StatePath> = set
            .write_paths
            .iter()
            .filter(|p| p.parts.last().map(String::as_str) == Some("NATIVE"))
            .collect();
        // Exactly caller, d1, d2, d3: each payer once.
        assert_eq!(native_paths.len(), 4);
        for payer in [caller, d1, d2, d3] {
            assert!(set.write_paths.contains(&StatePath::new(
                test_address(0xAA),
                ["Balances".to_string(), payer.to_hex(), "NATIVE".into()],
            )));
        }
    }

    #[test]
    fn test_free_allowance_paths_declared_per_payer() {
        let planner = ConflictPlanner::new(test_address(0xCC));
        let caller = test_address(1);
        let oracle = oracle().with_free_allowance_symbols(vec![Symbol::new("NATIVE")]);

        let set = planner.plan(
            &LedgerStore::new(),
            &oracle,
            &caller,
            &Operation::CreateBatch(create_input("B1", caller)),
        );

        assert!(set.write_paths.contains(&StatePath::new(
            test_address(0xAA),
            [
                "TransactionFeeFreeAllowances".to_string(),
                caller.to_hex(),
                "NATIVE".into(),
            ],
        )));
        assert!(set.write_paths.contains(&StatePath::new(
            test_address(0xAA),
            [
                "TransactionFeeFreeAllowancesLastRefreshTimes".to_string(),
                caller.to_hex(),
                "NATIVE".into(),
            ],
        )));
        assert!(set.read_paths.contains(&StatePath::new(
            test_address(0xAA),
            ["TransactionFeeFreeAllowancesConfigMap".to_string(), "NATIVE".into()],
        )));
    }
}
