//! Service-fee math.
//!
//! All fee math runs over [`Decimal`]: the split feeds directly into
//! on-chain value fields, where binary floating point drift would either
//! under-collect the fee or starve the swap of its remaining balance.

use crate::error::SwapError;
use alloy::primitives::U256;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use serde::{Deserialize, Serialize};

/// Number of wei in one ether.
const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Number of wei in one gwei.
const WEI_PER_GWEI: u128 = 1_000_000_000;

/// The split of a source amount into service fee and swap input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    /// Amount forwarded to the fee recipient, in ether.
    pub fee_amount: Decimal,
    /// Amount left for the swap path, in ether.
    pub net_amount: Decimal,
}

/// A cost preview for a flow: service fee plus worst-case gas, in ether.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    /// The service fee.
    pub service_fee: Decimal,
    /// Gas cost if every step consumes its full gas limit.
    pub gas_cost: Decimal,
    /// The sum of both.
    pub total: Decimal,
}

/// Splits `amount` by `fee_rate_bps` basis points.
///
/// The parts always recompose exactly: `fee_amount + net_amount == amount`.
pub fn compute_fees(amount: Decimal, fee_rate_bps: u32) -> Result<FeeBreakdown, SwapError> {
    if amount <= Decimal::ZERO {
        return Err(SwapError::InvalidAmount(amount));
    }
    let fee_amount = amount * Decimal::new(fee_rate_bps.into(), 4);
    let net_amount = amount - fee_amount;
    Ok(FeeBreakdown { fee_amount, net_amount })
}

/// Quotes the total cost of swapping `amount` ether: the service fee plus
/// gas for every step at `gas_price_gwei`.
pub fn quote_total_fees(
    amount: Decimal,
    fee_rate_bps: u32,
    gas_price_gwei: u64,
    gas_limits: &[u64],
) -> Result<FeeQuote, SwapError> {
    let service_fee = compute_fees(amount, fee_rate_bps)?.fee_amount;
    let gas_wei = gas_limits.iter().map(|limit| u128::from(*limit)).sum::<u128>()
        * u128::from(gas_price_gwei)
        * WEI_PER_GWEI;
    let gas_cost = Decimal::from_u128(gas_wei).unwrap_or_default() / Decimal::from(WEI_PER_ETHER);
    Ok(FeeQuote { service_fee, gas_cost, total: service_fee + gas_cost })
}

/// Converts an ether-denominated decimal into wei, truncating below 1 wei.
pub fn to_wei(amount: Decimal) -> Result<U256, SwapError> {
    let wei = amount
        .checked_mul(Decimal::from(WEI_PER_ETHER))
        .and_then(|wei| wei.trunc().to_u128())
        .ok_or(SwapError::InvalidAmount(amount))?;
    Ok(U256::from(wei))
}

/// Converts a gwei gas price into wei.
pub fn gwei_to_wei(gwei: u64) -> u128 {
    u128::from(gwei) * WEI_PER_GWEI
}
