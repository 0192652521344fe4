//! Single-step execution.

use super::plan::{Stage, StepAmount, StepSpec};
use crate::{
    chain::{ChainClient, ReceiptOutcome},
    config::DeskConfig,
    constants::{
        SWAP_DEADLINE_SECS, SWAP_GAS_LIMIT, TRANSFER_CONFIRMATION_TIMEOUT, TRANSFER_GAS_LIMIT,
        WRAP_GAS_LIMIT,
    },
    error::StepError,
    types::contracts::{
        ExactInputSingleParams, depositCall, exactInputSingleCall, withdrawCall,
    },
};
use alloy::{
    consensus::{TxLegacy, TypedTransaction},
    eips::Encodable2718,
    network::{Ethereum, EthereumWallet, NetworkWallet},
    primitives::{
        Address, Bytes, TxHash, TxKind, U256,
        aliases::{U24, U160},
    },
    sol_types::SolCall,
    transports::{RpcError, TransportErrorKind},
};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Result of executing one step of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Stage the step belongs to.
    pub stage: Stage,
    /// Hash of the confirmed transaction.
    pub tx_hash: TxHash,
    /// Nonce the transaction was sent with.
    pub nonce: u64,
}

/// Executes the steps of one flow for one wallet.
///
/// Scoped to a single flow: the signer and gas price are pinned at
/// construction and reused for every step, even if the flow spans minutes.
pub struct StepExecutor<'a> {
    chain: &'a dyn ChainClient,
    config: &'a DeskConfig,
    wallet: EthereumWallet,
    sender: Address,
    gas_price: u128,
}

impl<'a> StepExecutor<'a> {
    /// Creates an executor signing as `wallet` at `gas_price` wei.
    pub fn new(
        chain: &'a dyn ChainClient,
        config: &'a DeskConfig,
        wallet: EthereumWallet,
        gas_price: u128,
    ) -> Self {
        let sender = NetworkWallet::<Ethereum>::default_signer_address(&wallet);
        Self { chain, config, wallet, sender, gas_price }
    }

    /// Executes one step: precondition checks, build, sign, broadcast, and a
    /// bounded wait for confirmation.
    ///
    /// Never retries. A reverted or timed-out step is surfaced to the caller;
    /// blindly resending with the same nonce would double-spend or conflict.
    #[instrument(skip_all, fields(sender = %self.sender, stage = %step.stage(), nonce))]
    pub async fn execute(
        &self,
        step: &StepSpec,
        nonce: u64,
    ) -> Result<TransactionRecord, StepError> {
        let tx = self.build(step, nonce).await?;

        let signed =
            NetworkWallet::<Ethereum>::sign_transaction_from(&self.wallet, self.sender, tx)
                .await?;
        let tx_hash = match self.chain.send_raw_transaction(&signed.encoded_2718()).await {
            Ok(tx_hash) => tx_hash,
            Err(err) => return Err(classify_broadcast_error(err, self.sender, nonce)),
        };
        debug!(%tx_hash, "broadcast step transaction");

        let timeout = self.timeout_for(step);
        match self.chain.wait_for_receipt(tx_hash, timeout).await? {
            ReceiptOutcome::Confirmed => {
                Ok(TransactionRecord { stage: step.stage(), tx_hash, nonce })
            }
            ReceiptOutcome::Reverted => Err(StepError::Reverted { tx_hash }),
            ReceiptOutcome::TimedOut => Err(StepError::Timeout { tx_hash, timeout }),
        }
    }

    async fn build(&self, step: &StepSpec, nonce: u64) -> Result<TypedTransaction, StepError> {
        match *step {
            StepSpec::FeeTransfer { to, value } => {
                Ok(self.legacy(nonce, to, value, Bytes::new(), TRANSFER_GAS_LIMIT))
            }
            StepSpec::Wrap { contract, value } => Ok(self.legacy(
                nonce,
                contract,
                value,
                depositCall {}.abi_encode().into(),
                WRAP_GAS_LIMIT,
            )),
            StepSpec::Swap { token_in, token_out, amount } => {
                let amount_in = self.resolve_amount(token_in, amount).await?;
                let deadline = self.chain.latest_block_timestamp().await? + SWAP_DEADLINE_SECS;
                let params = ExactInputSingleParams {
                    tokenIn: token_in,
                    tokenOut: token_out,
                    fee: U24::from(self.config.fees.router_fee_tier),
                    recipient: self.sender,
                    deadline: U256::from(deadline),
                    amountIn: amount_in,
                    // The route carries no slippage protection.
                    amountOutMinimum: U256::ONE,
                    sqrtPriceLimitX96: U160::ZERO,
                };
                Ok(self.legacy(
                    nonce,
                    self.config.contracts.router,
                    U256::ZERO,
                    exactInputSingleCall { params }.abi_encode().into(),
                    SWAP_GAS_LIMIT,
                ))
            }
            StepSpec::Unwrap { contract } => {
                // The wrapped balance is re-read here rather than taken from
                // the previous swap's output; balance changes from outside
                // the flow are unwrapped along with it.
                let balance = self.chain.erc20_balance(contract, self.sender).await?;
                if balance.is_zero() {
                    return Err(StepError::InsufficientBalance {
                        token: contract,
                        available: balance,
                        required: U256::ONE,
                    });
                }
                Ok(self.legacy(
                    nonce,
                    contract,
                    U256::ZERO,
                    withdrawCall { wad: balance }.abi_encode().into(),
                    WRAP_GAS_LIMIT,
                ))
            }
        }
    }

    async fn resolve_amount(
        &self,
        token_in: Address,
        amount: StepAmount,
    ) -> Result<U256, StepError> {
        let available = self.chain.erc20_balance(token_in, self.sender).await?;
        match amount {
            StepAmount::Exact(required) if available < required => {
                Err(StepError::InsufficientBalance { token: token_in, available, required })
            }
            StepAmount::Exact(required) => Ok(required),
            StepAmount::FullBalance if available.is_zero() => Err(StepError::InsufficientBalance {
                token: token_in,
                available,
                required: U256::ONE,
            }),
            StepAmount::FullBalance => Ok(available),
        }
    }

    fn legacy(
        &self,
        nonce: u64,
        to: Address,
        value: U256,
        input: Bytes,
        gas_limit: u64,
    ) -> TypedTransaction {
        TypedTransaction::Legacy(TxLegacy {
            chain_id: Some(self.config.chain_id),
            nonce,
            gas_price: self.gas_price,
            gas_limit,
            to: TxKind::Call(to),
            value,
            input,
        })
    }

    fn timeout_for(&self, step: &StepSpec) -> Duration {
        match step {
            StepSpec::FeeTransfer { .. } | StepSpec::Wrap { .. } => TRANSFER_CONFIRMATION_TIMEOUT,
            StepSpec::Swap { .. } | StepSpec::Unwrap { .. } => {
                Duration::from_secs(self.config.confirmation_timeout_secs)
            }
        }
    }
}

/// Maps a broadcast rejection to a step error, surfacing nonce conflicts.
fn classify_broadcast_error(
    err: RpcError<TransportErrorKind>,
    sender: Address,
    nonce: u64,
) -> StepError {
    if let RpcError::ErrorResp(payload) = &err {
        let message = payload.message.to_lowercase();
        if message.contains("nonce too low") || message.contains("already known") {
            return StepError::NonceConflict { sender, nonce };
        }
    }
    StepError::Rpc(err)
}
