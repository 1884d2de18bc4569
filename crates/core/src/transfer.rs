//! Transfer effects handed to the token ledger.

use dropvault_types::{Address, Amount, Symbol};
use serde::{Deserialize, Serialize};

/// One validated balance movement.
///
/// Produced by the engine's execution overlay and applied by the
/// [`TokenLedger`](crate::TokenLedger) in order. When `spender` is set the
/// transfer consumes that spender's allowance on `from` (the transferFrom
/// shape of the allowance model); otherwise it spends `from`'s own balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEffect {
    /// Account debited.
    pub from: Address,

    /// Account credited.
    pub to: Address,

    /// Token denomination.
    pub symbol: Symbol,

    /// Amount moved.
    pub amount: Amount,

    /// Spender whose allowance is consumed, for delegated transfers.
    pub spender: Option<Address>,

    /// Free-form memo recorded with the transfer.
    pub memo: String,
}

impl TransferEffect {
    /// A direct transfer spending `from`'s own balance.
    pub fn transfer(
        from: Address,
        to: Address,
        symbol: Symbol,
        amount: Amount,
        memo: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to,
            symbol,
            amount,
            spender: None,
            memo: memo.into(),
        }
    }

    /// An allowance-consuming transfer executed by `spender` on behalf of
    /// `from`.
    pub fn transfer_from(
        from: Address,
        to: Address,
        spender: Address,
        symbol: Symbol,
        amount: Amount,
        memo: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to,
            symbol,
            amount,
            spender: Some(spender),
            memo: memo.into(),
        }
    }
}
