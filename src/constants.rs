//! Desk constants.

use alloy::primitives::{Address, address};
use std::time::Duration;

/// Chain id of Base Mainnet.
pub const BASE_MAINNET_CHAIN_ID: u64 = 8453;

/// The Uniswap V3 router exposing the single-hop exact-input entry point.
pub const DEFAULT_ROUTER: Address = address!("E592427A0AEce92De3Edee1F18E0157C05861564");

/// Canonical WETH on Base (OP-stack predeploy).
///
/// See also <https://docs.base.org/chain/network-information>
pub const DEFAULT_WRAPPED_NATIVE: Address = address!("4200000000000000000000000000000000000006");

/// VIRTUAL, the intermediate asset every route goes through.
pub const DEFAULT_TRADING_TOKEN: Address = address!("0b3e328455c4059EEb9e3f84b5543F74E24e7E1b");

/// Service fee in basis points (100 = 1%).
pub const DEFAULT_FEE_RATE_BPS: u32 = 100;

/// Uniswap V3 pool fee tier used for every hop (3000 = 0.3%).
pub const DEFAULT_ROUTER_FEE_TIER: u32 = 3000;

/// Seconds added to the latest block timestamp to form a swap deadline.
pub const SWAP_DEADLINE_SECS: u64 = 600;

/// Gas limit for the service-fee value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Gas limit for wrapped-native deposit and withdraw calls.
pub const WRAP_GAS_LIMIT: u64 = 100_000;

/// Gas limit for a single-hop router swap.
pub const SWAP_GAS_LIMIT: u64 = 250_000;

/// Gas limits of the four buy-flow steps, in execution order.
pub const BUY_GAS_LIMITS: [u64; 4] =
    [TRANSFER_GAS_LIMIT, WRAP_GAS_LIMIT, SWAP_GAS_LIMIT, SWAP_GAS_LIMIT];

/// Default gas price for buy flows, in gwei.
pub const DEFAULT_BUY_GAS_PRICE_GWEI: u64 = 20;

/// Default gas price for sell flows, in gwei.
pub const DEFAULT_SELL_GAS_PRICE_GWEI: u64 = 10;

/// How long to wait for a router or unwrap step to confirm, in seconds.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 300;

/// How long to wait for a fee transfer or wrap to confirm.
///
/// A timed-out wait does not prove the transaction failed, only that it was
/// not seen included in time.
pub const TRANSFER_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
