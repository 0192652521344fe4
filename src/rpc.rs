//! # Desk RPC
//!
//! Implementation of the `desk_` namespace: the boundary a chat frontend
//! calls into.
//!
//! - `desk_createWallet`, `desk_wallets` and `desk_positions` manage and
//!   inspect custodial wallets.
//! - `desk_buy` and `desk_sell` run complete swap flows and block until the
//!   flow reaches a terminal state.
//!
//! This layer resolves stored wallets and preferences, hands the engine a
//! typed request, and maps typed failures to JSON-RPC errors. It never
//! renders user-facing text; presentation belongs to the frontend.

use crate::{
    chain::ChainClient,
    config::DeskConfig,
    constants::BUY_GAS_LIMITS,
    error::{ToRpcResult, internal_rpc, invalid_params},
    fees::{FeeQuote, quote_total_fees},
    storage::{DeskStorage, StorageApi},
    swap::SwapEngine,
    types::{SellAmount, Wallet},
};
use alloy::primitives::{Address, TxHash, U256};
use jsonrpsee::{
    core::{RpcResult, async_trait},
    proc_macros::rpc,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// A wallet's holdings of the native coin and, optionally, one token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Wallet address.
    pub wallet: Address,
    /// Native coin balance, in wei.
    pub native_balance: U256,
    /// Token the balance below refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Address>,
    /// Token balance, in the token's smallest unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_balance: Option<U256>,
}

/// Desk `desk_` RPC namespace.
#[rpc(server, client, namespace = "desk")]
pub trait DeskApi {
    /// Creates a new custodial wallet for a chat session and returns its
    /// address.
    #[method(name = "createWallet")]
    async fn create_wallet(&self, chat_id: i64) -> RpcResult<Address>;

    /// Lists the wallet addresses of a chat session.
    #[method(name = "wallets")]
    async fn wallets(&self, chat_id: i64) -> RpcResult<Vec<Address>>;

    /// Returns the native and token holdings of a wallet.
    #[method(name = "positions")]
    async fn positions(
        &self,
        chat_id: i64,
        wallet: Address,
        token: Option<Address>,
    ) -> RpcResult<Position>;

    /// Stores a chat's preferred gas price in gwei, applied to later flows.
    #[method(name = "setGasPrice")]
    async fn set_gas_price(&self, chat_id: i64, gwei: u64) -> RpcResult<()>;

    /// Previews the total cost of buying with `eth_amount` ether: service
    /// fee plus worst-case gas at the chat's preferred gas price.
    #[method(name = "quoteBuy")]
    async fn quote_buy(&self, chat_id: i64, eth_amount: Decimal) -> RpcResult<FeeQuote>;

    /// Buys `token` with `eth_amount` ether. Blocks until the flow reaches a
    /// terminal state and returns the final swap transaction hash.
    #[method(name = "buy")]
    async fn buy(
        &self,
        chat_id: i64,
        wallet: Address,
        token: Address,
        eth_amount: Decimal,
    ) -> RpcResult<TxHash>;

    /// Sells a position in `token` back to ether. Blocks until the flow
    /// reaches a terminal state and returns the final (unwrap) transaction
    /// hash.
    #[method(name = "sell")]
    async fn sell(
        &self,
        chat_id: i64,
        wallet: Address,
        token: Address,
        amount: SellAmount,
    ) -> RpcResult<TxHash>;
}

/// Desk RPC implementation.
pub struct Desk {
    engine: SwapEngine,
    storage: DeskStorage,
    chain: Arc<dyn ChainClient>,
    config: DeskConfig,
}

impl Desk {
    /// Creates a new [`Desk`].
    pub fn new(
        engine: SwapEngine,
        storage: DeskStorage,
        chain: Arc<dyn ChainClient>,
        config: DeskConfig,
    ) -> Self {
        Self { engine, storage, chain, config }
    }

    async fn require_wallet(&self, chat_id: i64, address: Address) -> RpcResult<Wallet> {
        self.storage.wallet(chat_id, address).await.to_rpc_result()?.ok_or_else(|| {
            invalid_params(format!("no wallet {address} for chat {chat_id}"))
        })
    }
}

#[async_trait]
impl DeskApiServer for Desk {
    async fn create_wallet(&self, chat_id: i64) -> RpcResult<Address> {
        let wallet = Wallet::random(chat_id);
        let address = wallet.address;
        self.storage.add_wallet(wallet).await.to_rpc_result()?;
        info!(chat_id, %address, "created wallet");
        Ok(address)
    }

    async fn wallets(&self, chat_id: i64) -> RpcResult<Vec<Address>> {
        Ok(self
            .storage
            .wallets(chat_id)
            .await
            .to_rpc_result()?
            .into_iter()
            .map(|wallet| wallet.address)
            .collect())
    }

    async fn positions(
        &self,
        chat_id: i64,
        wallet: Address,
        token: Option<Address>,
    ) -> RpcResult<Position> {
        let wallet = self.require_wallet(chat_id, wallet).await?;

        let native_balance = self
            .chain
            .native_balance(wallet.address)
            .await
            .map_err(|err| internal_rpc(err.to_string()))?;
        let token_balance = match token {
            Some(token) => Some(
                self.chain
                    .erc20_balance(token, wallet.address)
                    .await
                    .map_err(|err| internal_rpc(err.to_string()))?,
            ),
            None => None,
        };

        Ok(Position { wallet: wallet.address, native_balance, token, token_balance })
    }

    async fn set_gas_price(&self, chat_id: i64, gwei: u64) -> RpcResult<()> {
        if gwei == 0 {
            return Err(invalid_params("gas price must be positive"));
        }
        self.storage.set_gas_preference(chat_id, gwei).await.to_rpc_result()
    }

    async fn quote_buy(&self, chat_id: i64, eth_amount: Decimal) -> RpcResult<FeeQuote> {
        let gas_price_gwei = self
            .storage
            .gas_preference(chat_id)
            .await
            .to_rpc_result()?
            .unwrap_or(self.config.gas_price.buy_gwei);
        quote_total_fees(eth_amount, self.config.fees.rate_bps, gas_price_gwei, &BUY_GAS_LIMITS)
            .to_rpc_result()
    }

    async fn buy(
        &self,
        chat_id: i64,
        wallet: Address,
        token: Address,
        eth_amount: Decimal,
    ) -> RpcResult<TxHash> {
        let wallet = self.require_wallet(chat_id, wallet).await?;
        let gas_price_gwei = self.storage.gas_preference(chat_id).await.to_rpc_result()?;

        let tx_hash = self.engine.buy(&wallet, token, eth_amount, gas_price_gwei).await.to_rpc_result()?;

        // Session bookkeeping; a failure here does not undo a completed buy.
        let _ = self.storage.set_last_token(chat_id, wallet.address, token).await;
        if wallet.initial_investment.is_none() {
            if let Ok(balance) = self.chain.erc20_balance(token, wallet.address).await {
                let _ =
                    self.storage.set_initial_investment(chat_id, wallet.address, balance).await;
            }
        }

        Ok(tx_hash)
    }

    async fn sell(
        &self,
        chat_id: i64,
        wallet: Address,
        token: Address,
        amount: SellAmount,
    ) -> RpcResult<TxHash> {
        let wallet = self.require_wallet(chat_id, wallet).await?;
        let gas_price_gwei = self.storage.gas_preference(chat_id).await.to_rpc_result()?;

        self.engine.sell(&wallet, token, amount, gas_price_gwei).await.to_rpc_result()
    }
}
