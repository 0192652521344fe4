//! Chain access.
//!
//! The narrow RPC surface the swap engine consumes, and its production
//! implementation over an alloy provider. The engine only talks to the chain
//! through [`ChainClient`], which is injected at construction so flows run
//! deterministically against a scripted client under test.

use crate::types::contracts::balanceOfCall;
use alloy::{
    eips::BlockId,
    network::TransactionBuilder,
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, PendingTransactionConfig, Provider},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
    transports::{RpcError, TransportErrorKind},
};
use async_trait::async_trait;
use std::time::Duration;

/// Type alias for `Result<T, RpcError<TransportErrorKind>>`.
pub type Result<T> = core::result::Result<T, RpcError<TransportErrorKind>>;

/// Terminal observation for a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// Included with success status.
    Confirmed,
    /// Included, but execution reverted.
    Reverted,
    /// Not seen included within the wait bound.
    ///
    /// The transaction may still land later; the ambiguity is deliberate and
    /// must not be collapsed into [`ReceiptOutcome::Reverted`].
    TimedOut,
}

/// Node RPC operations the swap engine depends on.
///
/// Balance reads are always live. The unwrap step deliberately re-derives
/// the wrapped balance right before building its transaction, so balance
/// changes from outside the flow are absorbed into the unwrap rather than
/// tracked.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Number of transactions ever sent by `address`, including pending
    /// ones.
    async fn transaction_count(&self, address: Address) -> Result<u64>;

    /// Native coin balance of `address`.
    async fn native_balance(&self, address: Address) -> Result<U256>;

    /// ERC-20 balance of `owner` on `token`.
    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256>;

    /// Timestamp of the latest block.
    async fn latest_block_timestamp(&self) -> Result<u64>;

    /// Broadcasts a raw signed transaction, returning its hash.
    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash>;

    /// Waits up to `timeout` for `tx_hash` to be included and reports how
    /// the wait ended.
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<ReceiptOutcome>;
}

/// [`ChainClient`] over an alloy [`DynProvider`].
#[derive(Debug, Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
}

impl RpcChainClient {
    /// Creates a new chain client over `provider`.
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn transaction_count(&self, address: Address) -> Result<u64> {
        self.provider.get_transaction_count(address).pending().await
    }

    async fn native_balance(&self, address: Address) -> Result<U256> {
        self.provider.get_balance(address).await
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256> {
        let request = TransactionRequest::default()
            .with_to(token)
            .with_input(balanceOfCall { owner }.abi_encode());
        let data = self.provider.call(request).await?;
        balanceOfCall::abi_decode_returns(&data).map_err(TransportErrorKind::custom)
    }

    async fn latest_block_timestamp(&self) -> Result<u64> {
        let block = self.provider.get_block(BlockId::latest()).await?.ok_or(RpcError::NullResp)?;
        Ok(block.header.timestamp)
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash> {
        Ok(*self.provider.send_raw_transaction(encoded).await?.tx_hash())
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<ReceiptOutcome> {
        let watcher = self
            .provider
            .watch_pending_transaction(
                PendingTransactionConfig::new(tx_hash).with_timeout(Some(timeout)),
            )
            .await?;

        if watcher.await.is_err() {
            return Ok(ReceiptOutcome::TimedOut);
        }

        match self.provider.get_transaction_receipt(tx_hash).await? {
            Some(receipt) if receipt.status() => Ok(ReceiptOutcome::Confirmed),
            Some(_) => Ok(ReceiptOutcome::Reverted),
            None => Ok(ReceiptOutcome::TimedOut),
        }
    }
}
