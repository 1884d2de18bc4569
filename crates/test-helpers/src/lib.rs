//! Shared test fixtures: an in-memory token ledger, a static fee oracle,
//! and deterministic keypairs.
//!
//! Only for use in tests. Depends on the types and core crates alone so the
//! engine and planner can both pull it in as a dev-dependency.

use dropvault_core::{FeeOracle, TokenLedger, TransferEffect};
use dropvault_types::{Address, Amount, KeyPair, Symbol};
use std::collections::HashMap;

/// A minimal fungible-token ledger held in memory.
///
/// `apply` panics on any effect the engine should have validated away:
/// overdrafts and missing allowances are test failures, not runtime errors.
#[derive(Debug, Default)]
pub struct InMemoryTokenLedger {
    balances: HashMap<(Address, Symbol), u64>,
    allowances: HashMap<(Address, Address, Symbol), u64>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `owner` with `amount` of `symbol` out of thin air.
    pub fn mint(&mut self, owner: Address, symbol: &Symbol, amount: u64) {
        *self.balances.entry((owner, symbol.clone())).or_insert(0) += amount;
    }

    /// Set the allowance `owner` grants to `spender`.
    pub fn approve(&mut self, owner: Address, spender: Address, symbol: &Symbol, amount: u64) {
        self.allowances.insert((owner, spender, symbol.clone()), amount);
    }

    /// Sum of all balances in `symbol`, for conservation assertions.
    pub fn total_supply(&self, symbol: &Symbol) -> u64 {
        self.balances
            .iter()
            .filter(|((_, s), _)| s == symbol)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn balance_of(&self, owner: &Address, symbol: &Symbol) -> Amount {
        Amount(
            self.balances
                .get(&(*owner, symbol.clone()))
                .copied()
                .unwrap_or(0),
        )
    }

    fn allowance(&self, owner: &Address, spender: &Address, symbol: &Symbol) -> Amount {
        Amount(
            self.allowances
                .get(&(*owner, *spender, symbol.clone()))
                .copied()
                .unwrap_or(0),
        )
    }

    fn apply(&mut self, transfers: &[TransferEffect]) {
        for effect in transfers {
            if let Some(spender) = effect.spender {
                let key = (effect.from, spender, effect.symbol.clone());
                let granted = self.allowances.get(&key).copied().unwrap_or(0);
                let remaining = granted
                    .checked_sub(effect.amount.get())
                    .unwrap_or_else(|| panic!("allowance exceeded: {effect:?}"));
                self.allowances.insert(key, remaining);
            }

            let from_key = (effect.from, effect.symbol.clone());
            let from_balance = self.balances.get(&from_key).copied().unwrap_or(0);
            let remaining = from_balance
                .checked_sub(effect.amount.get())
                .unwrap_or_else(|| panic!("overdraft: {effect:?}"));
            self.balances.insert(from_key, remaining);

            *self
                .balances
                .entry((effect.to, effect.symbol.clone()))
                .or_insert(0) += effect.amount.get();
        }
    }
}

/// A fee oracle with fixed, test-controlled answers.
#[derive(Debug)]
pub struct StaticFeeOracle {
    token_contract: Address,
    primary_symbol: Symbol,
    method_fees: HashMap<String, Vec<Symbol>>,
    free_allowance_symbols: Vec<Symbol>,
    delegations: HashMap<Address, Vec<Address>>,
}

impl StaticFeeOracle {
    /// An oracle where every method is fee-free and nothing is delegated.
    pub fn new(token_contract: Address) -> Self {
        Self {
            token_contract,
            primary_symbol: Symbol::new("NATIVE"),
            method_fees: HashMap::new(),
            free_allowance_symbols: Vec::new(),
            delegations: HashMap::new(),
        }
    }

    pub fn with_primary_symbol(mut self, symbol: Symbol) -> Self {
        self.primary_symbol = symbol;
        self
    }

    pub fn with_method_fee(mut self, method: &str, symbols: Vec<Symbol>) -> Self {
        self.method_fees.insert(method.to_string(), symbols);
        self
    }

    pub fn with_free_allowance_symbols(mut self, symbols: Vec<Symbol>) -> Self {
        self.free_allowance_symbols = symbols;
        self
    }

    pub fn with_delegation(mut self, delegator: Address, delegatees: Vec<Address>) -> Self {
        self.delegations.insert(delegator, delegatees);
        self
    }
}

impl FeeOracle for StaticFeeOracle {
    fn token_contract(&self) -> Address {
        self.token_contract
    }

    fn primary_token_symbol(&self) -> Symbol {
        self.primary_symbol.clone()
    }

    fn method_fee_symbols(&self, method: &str) -> Vec<Symbol> {
        self.method_fees.get(method).cloned().unwrap_or_default()
    }

    fn free_allowance_symbols(&self) -> Vec<Symbol> {
        self.free_allowance_symbols.clone()
    }

    fn delegatees_of(&self, delegator: &Address) -> Vec<Address> {
        self.delegations.get(delegator).cloned().unwrap_or_default()
    }
}

/// Deterministic keypair for test `index`.
pub fn test_keypair(index: u8) -> KeyPair {
    let mut seed = [7u8; 32];
    seed[0] = index;
    KeyPair::from_seed(&seed)
}

/// Deterministic address unrelated to any keypair.
pub fn test_address(index: u8) -> Address {
    Address([index; 32])
}
