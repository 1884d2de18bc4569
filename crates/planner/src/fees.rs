//! Fee-charging paths and the fee-delegation closure.
//!
//! Charging a transaction fee touches the token contract's storage for every
//! account that might end up paying: the caller, plus anyone registered to
//! pay on the caller's behalf, plus anyone registered to pay on *their*
//! behalf. The closure is cut off at two levels, matching the fee engine's
//! own lookup depth.

use dropvault_core::{FeeOracle, ResourceSet, StatePath};
use dropvault_types::Address;

/// Token-contract path segment for account balances.
pub const BALANCES_PATH: &str = "Balances";
/// Token-contract path segment for fee-free allowance balances.
pub const FREE_ALLOWANCES_PATH: &str = "TransactionFeeFreeAllowances";
/// Token-contract path segment for fee-free allowance refresh timestamps.
pub const FREE_ALLOWANCE_REFRESH_PATH: &str = "TransactionFeeFreeAllowancesLastRefreshTimes";
/// Token-contract path segment for the fee-free allowance configuration.
pub const FREE_ALLOWANCE_CONFIG_PATH: &str = "TransactionFeeFreeAllowancesConfigMap";

/// Fee-delegation lookup depth.
const DELEGATION_LEVELS: usize = 2;

/// Declare every path fee charging may touch for `caller` executing `method`.
pub(crate) fn add_fee_paths(
    set: &mut ResourceSet,
    fees: &dyn FeeOracle,
    caller: &Address,
    method: &str,
) {
    for payer in delegation_closure(fees, caller) {
        add_payer_paths(set, fees, &payer, method);
    }
}

/// The caller plus the deduplicated two-level delegatee closure.
fn delegation_closure(fees: &dyn FeeOracle, caller: &Address) -> Vec<Address> {
    let mut closure = vec![*caller];
    let mut frontier = vec![*caller];

    for _ in 0..DELEGATION_LEVELS {
        let mut next = Vec::new();
        for delegator in &frontier {
            for delegatee in fees.delegatees_of(delegator) {
                if !closure.contains(&delegatee) {
                    closure.push(delegatee);
                    next.push(delegatee);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    closure
}

fn add_payer_paths(set: &mut ResourceSet, fees: &dyn FeeOracle, payer: &Address, method: &str) {
    let token = fees.token_contract();

    // Any fee symbol the schedule allows for this method may be debited,
    // and the primary token is always a candidate.
    let mut symbols = fees.method_fee_symbols(method);
    let primary = fees.primary_token_symbol();
    if !symbols.contains(&primary) {
        symbols.push(primary);
    }
    for symbol in &symbols {
        set.write(StatePath::new(
            token,
            [BALANCES_PATH.to_string(), payer.to_hex(), symbol.to_string()],
        ));
    }

    // Fee-free allowances are consumed (and lazily refreshed) during
    // charging; their configuration is only read.
    for symbol in fees.free_allowance_symbols() {
        set.write(StatePath::new(
            token,
            [
                FREE_ALLOWANCES_PATH.to_string(),
                payer.to_hex(),
                symbol.to_string(),
            ],
        ));
        set.write(StatePath::new(
            token,
            [
                FREE_ALLOWANCE_REFRESH_PATH.to_string(),
                payer.to_hex(),
                symbol.to_string(),
            ],
        ));
        set.read(StatePath::new(
            token,
            [FREE_ALLOWANCE_CONFIG_PATH.to_string(), symbol.to_string()],
        ));
    }
}
