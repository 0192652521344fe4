//! The swap orchestrator.

use super::{executor::StepExecutor, metrics::SwapMetrics, plan::StepPlan};
use crate::{
    chain::ChainClient,
    config::DeskConfig,
    error::SwapError,
    fees::{self, compute_fees},
    types::{SellAmount, SwapAction, SwapIntent, Wallet},
};
use alloy::primitives::{Address, TxHash, U256};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::{sync::Arc, time::Instant};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Orchestrates buy and sell flows.
///
/// Each flow is one sequential unit of work: the nonce is seeded once from
/// the chain, then advanced locally after every broadcast and never
/// re-queried mid-flow. Flows for the same wallet serialize on a per-wallet
/// lock; nothing else may submit transactions for a wallet while a flow is
/// running.
#[derive(Clone)]
pub struct SwapEngine {
    inner: Arc<SwapEngineInner>,
}

struct SwapEngineInner {
    chain: Arc<dyn ChainClient>,
    config: DeskConfig,
    flow_locks: DashMap<Address, Arc<Mutex<()>>>,
    metrics: SwapMetrics,
}

impl SwapEngine {
    /// Creates a new engine over `chain`.
    pub fn new(chain: Arc<dyn ChainClient>, config: DeskConfig) -> Self {
        Self {
            inner: Arc::new(SwapEngineInner {
                chain,
                config,
                flow_locks: DashMap::default(),
                metrics: SwapMetrics::default(),
            }),
        }
    }

    /// Buys `token` with `eth_amount` ether from `wallet`.
    ///
    /// Returns the hash of the final swap transaction.
    pub async fn buy(
        &self,
        wallet: &Wallet,
        token: Address,
        eth_amount: Decimal,
        gas_price_gwei: Option<u64>,
    ) -> Result<TxHash, SwapError> {
        self.execute(wallet, SwapIntent {
            action: SwapAction::Buy { token, eth_amount },
            gas_price_gwei,
        })
        .await
    }

    /// Sells a position in `token` from `wallet` back to ether.
    ///
    /// Returns the hash of the final (unwrap) transaction.
    pub async fn sell(
        &self,
        wallet: &Wallet,
        token: Address,
        amount: SellAmount,
        gas_price_gwei: Option<u64>,
    ) -> Result<TxHash, SwapError> {
        self.execute(wallet, SwapIntent { action: SwapAction::Sell { token, amount }, gas_price_gwei })
            .await
    }

    /// Runs one flow to completion, holding the wallet's flow lock
    /// throughout.
    ///
    /// Dropping the returned future between steps abandons the remaining
    /// plan; a transaction that was already broadcast cannot be recalled.
    #[instrument(skip_all, fields(wallet = %wallet.address, token = %intent.action.token()))]
    pub async fn execute(&self, wallet: &Wallet, intent: SwapIntent) -> Result<TxHash, SwapError> {
        // Locks the dashmap for a short duration to clone the `Arc`; the
        // flow lock itself is held across await points, the map lock is not.
        let lock = {
            let entry = self.inner.flow_locks.entry(wallet.address).or_default();
            Arc::clone(entry.value())
        };
        let _flow = lock.lock().await;

        self.inner.metrics.active_flows.increment(1.0);
        let started = Instant::now();
        let result = self.run_flow(wallet, &intent).await;
        self.inner.metrics.active_flows.decrement(1.0);
        self.inner.metrics.flow_duration.record(started.elapsed().as_secs_f64());

        match &result {
            Ok(tx_hash) => {
                self.inner.metrics.completed_flows.increment(1);
                info!(%tx_hash, "flow complete");
            }
            Err(err) => {
                self.inner.metrics.failed_flows.increment(1);
                warn!(%err, "flow aborted");
            }
        }
        result
    }

    async fn run_flow(&self, wallet: &Wallet, intent: &SwapIntent) -> Result<TxHash, SwapError> {
        let inner = &self.inner;
        let plan = self.plan(wallet, intent).await?;

        let gas_price_gwei = intent.gas_price_gwei.unwrap_or(match intent.action {
            SwapAction::Buy { .. } => inner.config.gas_price.buy_gwei,
            SwapAction::Sell { .. } => inner.config.gas_price.sell_gwei,
        });
        let executor = StepExecutor::new(
            inner.chain.as_ref(),
            &inner.config,
            wallet.signer()?,
            fees::gwei_to_wei(gas_price_gwei),
        );

        // One nonce fetch per flow. Re-querying mid-flow risks interleaving
        // with externally submitted transactions for the same account.
        let mut nonce = inner.chain.transaction_count(wallet.address).await?;

        let mut confirmed = Vec::with_capacity(plan.steps().len());
        for step in plan.steps() {
            match executor.execute(step, nonce).await {
                Ok(record) => {
                    inner.metrics.confirmed_steps.increment(1);
                    confirmed.push(record);
                    nonce += 1;
                }
                Err(cause) => {
                    return Err(SwapError::Aborted { stage: step.stage(), confirmed, cause });
                }
            }
        }

        // Plan builders never produce an empty plan.
        Ok(confirmed.last().expect("plan is never empty").tx_hash)
    }

    async fn plan(&self, wallet: &Wallet, intent: &SwapIntent) -> Result<StepPlan, SwapError> {
        let config = &self.inner.config;
        match intent.action {
            SwapAction::Buy { token, eth_amount } => {
                let breakdown = compute_fees(eth_amount, config.fees.rate_bps)?;
                let fee_wei = fees::to_wei(breakdown.fee_amount)?;
                let net_wei = fees::to_wei(breakdown.net_amount)?;
                Ok(StepPlan::buy(config, token, fee_wei, net_wei))
            }
            SwapAction::Sell { token, amount } => {
                let amount = self.resolve_sell_amount(wallet, token, amount).await?;
                Ok(StepPlan::sell(config, token, amount))
            }
        }
    }

    /// Resolves the concrete token amount a sell will consume.
    ///
    /// Resolution happens before any transaction is built; an empty position
    /// fails here, not inside the flow.
    async fn resolve_sell_amount(
        &self,
        wallet: &Wallet,
        token: Address,
        amount: SellAmount,
    ) -> Result<U256, SwapError> {
        let resolved = match amount {
            SellAmount::Literal(amount) => amount,
            SellAmount::Percentage(pct) => {
                if pct > 100 {
                    return Err(SwapError::InvalidAmount(Decimal::from(pct)));
                }
                let balance = self.inner.chain.erc20_balance(token, wallet.address).await?;
                balance * U256::from(pct) / U256::from(100)
            }
            SellAmount::Initials => wallet.initial_investment.unwrap_or_default(),
        };

        if resolved.is_zero() {
            return Err(SwapError::NoPositionFound { token });
        }
        Ok(resolved)
    }
}
