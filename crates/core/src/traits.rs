//! Traits for the external collaborators of the voucher engine.
//!
//! The engine never owns token balances or fee configuration; it talks to
//! the host's fungible-token ledger and fee machinery through these traits.
//! Implementations must be deterministic: the conflict planner calls the
//! [`FeeOracle`] while *planning*, and the declared paths are only a faithful
//! superset of actual accesses if planning and execution see the same data.

use crate::TransferEffect;
use dropvault_types::{Address, Amount, Symbol};

/// The external fungible-token ledger, at its interface.
///
/// The engine validates every transfer against `balance_of`/`allowance`
/// (plus its own in-flight deltas) before calling `apply`, so `apply`
/// receives only effects the ledger can honor and applies them atomically.
pub trait TokenLedger {
    /// Current balance of `owner` in `symbol`.
    fn balance_of(&self, owner: &Address, symbol: &Symbol) -> Amount;

    /// Remaining allowance `owner` has granted to `spender` in `symbol`.
    fn allowance(&self, owner: &Address, spender: &Address, symbol: &Symbol) -> Amount;

    /// Apply a batch of validated transfers as one atomic mutation.
    fn apply(&mut self, transfers: &[TransferEffect]);
}

/// The host's transaction-fee machinery, at its interface.
///
/// Used only by the conflict planner, to declare fee-payer balance paths and
/// the two-level fee-delegation closure.
pub trait FeeOracle {
    /// Address of the token contract whose storage holds balances and
    /// fee-free allowances.
    fn token_contract(&self) -> Address;

    /// The configured primary fee token.
    fn primary_token_symbol(&self) -> Symbol;

    /// Symbols the governance fee schedule may charge for `method`.
    fn method_fee_symbols(&self, method: &str) -> Vec<Symbol>;

    /// Symbols with a configured fee-free allowance.
    fn free_allowance_symbols(&self) -> Vec<Symbol>;

    /// Addresses registered to pay fees on behalf of `delegator`.
    fn delegatees_of(&self, delegator: &Address) -> Vec<Address>;
}
