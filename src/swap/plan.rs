//! Step plans for buy and sell flows.

use crate::config::DeskConfig;
use alloy::primitives::{Address, U256};
use serde::Serialize;
use std::fmt;

/// A stage of a swap flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Service-fee value transfer.
    FeeTransfer,
    /// Native-asset deposit into the wrapped-asset contract.
    Wrap,
    /// Single-hop router swap.
    Swap {
        /// Asset paid in.
        token_in: Address,
        /// Asset bought.
        token_out: Address,
    },
    /// Wrapped-asset withdrawal back to the native coin.
    Unwrap,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeeTransfer => f.write_str("fee transfer"),
            Self::Wrap => f.write_str("wrap"),
            Self::Swap { token_in, token_out } => write!(f, "swap {token_in} -> {token_out}"),
            Self::Unwrap => f.write_str("unwrap"),
        }
    }
}

/// How a step's input amount is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAmount {
    /// A fixed amount, decided when the plan was built.
    Exact(U256),
    /// The wallet's full balance of the input asset, read right before the
    /// step's transaction is built.
    FullBalance,
}

/// Specification of one on-chain call within a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSpec {
    /// Plain value transfer of the service fee.
    FeeTransfer {
        /// Fee recipient.
        to: Address,
        /// Fee amount, in wei.
        value: U256,
    },
    /// Deposit `value` into the wrapped-native contract.
    Wrap {
        /// The wrapped-native contract.
        contract: Address,
        /// Native value to wrap, in wei.
        value: U256,
    },
    /// Exact-input single-hop swap through the router.
    Swap {
        /// Asset paid in.
        token_in: Address,
        /// Asset bought.
        token_out: Address,
        /// Input amount.
        amount: StepAmount,
    },
    /// Withdraw the full wrapped balance back to the native coin.
    Unwrap {
        /// The wrapped-native contract.
        contract: Address,
    },
}

impl StepSpec {
    /// The stage this step corresponds to.
    pub fn stage(&self) -> Stage {
        match *self {
            Self::FeeTransfer { .. } => Stage::FeeTransfer,
            Self::Wrap { .. } => Stage::Wrap,
            Self::Swap { token_in, token_out, .. } => Stage::Swap { token_in, token_out },
            Self::Unwrap { .. } => Stage::Unwrap,
        }
    }
}

/// The ordered steps composing one flow. Built once per intent, consumed in
/// order.
#[derive(Debug, Clone)]
pub struct StepPlan {
    steps: Vec<StepSpec>,
}

impl StepPlan {
    /// Plan for buying `token`: fee transfer, wrap, then two router hops
    /// ending in the target token.
    ///
    /// The second hop consumes the full trading-asset output of the first.
    pub fn buy(config: &DeskConfig, token: Address, fee_wei: U256, net_wei: U256) -> Self {
        let contracts = &config.contracts;
        Self {
            steps: vec![
                StepSpec::FeeTransfer { to: config.fees.recipient, value: fee_wei },
                StepSpec::Wrap { contract: contracts.wrapped_native, value: net_wei },
                StepSpec::Swap {
                    token_in: contracts.wrapped_native,
                    token_out: contracts.trading_token,
                    amount: StepAmount::Exact(net_wei),
                },
                StepSpec::Swap {
                    token_in: contracts.trading_token,
                    token_out: token,
                    amount: StepAmount::FullBalance,
                },
            ],
        }
    }

    /// Plan for selling `amount` of `token`: two router hops back to the
    /// wrapped asset, then unwrap.
    pub fn sell(config: &DeskConfig, token: Address, amount: U256) -> Self {
        let contracts = &config.contracts;
        Self {
            steps: vec![
                StepSpec::Swap {
                    token_in: token,
                    token_out: contracts.trading_token,
                    amount: StepAmount::Exact(amount),
                },
                StepSpec::Swap {
                    token_in: contracts.trading_token,
                    token_out: contracts.wrapped_native,
                    amount: StepAmount::FullBalance,
                },
                StepSpec::Unwrap { contract: contracts.wrapped_native },
            ],
        }
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const TOKEN: Address = address!("00000000000000000000000000000000deadbeef");

    #[test]
    fn buy_plan_shape() {
        let config = DeskConfig::default();
        let fee = U256::from(1_000_000_000_000_000u128);
        let net = U256::from(99_000_000_000_000_000u128);
        let plan = StepPlan::buy(&config, TOKEN, fee, net);

        let steps = plan.steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0], StepSpec::FeeTransfer { to: config.fees.recipient, value: fee });
        assert_eq!(
            steps[1],
            StepSpec::Wrap { contract: config.contracts.wrapped_native, value: net }
        );
        assert_eq!(
            steps[2],
            StepSpec::Swap {
                token_in: config.contracts.wrapped_native,
                token_out: config.contracts.trading_token,
                amount: StepAmount::Exact(net),
            }
        );
        // The last hop consumes whatever the previous one produced.
        assert_eq!(
            steps[3],
            StepSpec::Swap {
                token_in: config.contracts.trading_token,
                token_out: TOKEN,
                amount: StepAmount::FullBalance,
            }
        );
    }

    #[test]
    fn sell_plan_shape() {
        let config = DeskConfig::default();
        let amount = U256::from(1234u64);
        let plan = StepPlan::sell(&config, TOKEN, amount);

        let steps = plan.steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(
            steps[0],
            StepSpec::Swap {
                token_in: TOKEN,
                token_out: config.contracts.trading_token,
                amount: StepAmount::Exact(amount),
            }
        );
        assert_eq!(
            steps[1],
            StepSpec::Swap {
                token_in: config.contracts.trading_token,
                token_out: config.contracts.wrapped_native,
                amount: StepAmount::FullBalance,
            }
        );
        assert_eq!(steps[2], StepSpec::Unwrap { contract: config.contracts.wrapped_native });
    }
}
