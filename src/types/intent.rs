//! Swap intents.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Amount selector for a sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SellAmount {
    /// Sell an exact amount, in the token's smallest unit.
    Literal(U256),
    /// Sell a percentage of the current token balance, floored.
    Percentage(u8),
    /// Sell the recorded initial investment.
    Initials,
}

/// What a flow does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapAction {
    /// Buy `token` with `eth_amount` ether.
    Buy {
        /// Target token.
        token: Address,
        /// Ether to spend, fee included.
        eth_amount: Decimal,
    },
    /// Sell a position in `token` back to ether.
    Sell {
        /// Token being sold.
        token: Address,
        /// How much of it to sell.
        amount: SellAmount,
    },
}

impl SwapAction {
    /// The token this action trades.
    pub fn token(&self) -> Address {
        match *self {
            Self::Buy { token, .. } | Self::Sell { token, .. } => token,
        }
    }
}

/// An immutable swap request, consumed by exactly one orchestration call.
#[derive(Debug, Clone, Copy)]
pub struct SwapIntent {
    /// What to do.
    pub action: SwapAction,
    /// Per-user gas price preference, in gwei. Flow-direction defaults apply
    /// when unset.
    pub gas_price_gwei: Option<u64>,
}
