//! Desk storage

mod api;
pub use api::StorageApi;
mod memory;
pub use memory::InMemoryStorage;

use crate::types::Wallet;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

/// Desk storage handle.
#[derive(Debug, Clone)]
pub struct DeskStorage {
    inner: Arc<dyn StorageApi>,
}

impl DeskStorage {
    /// Creates storage with the in-memory backend.
    pub fn in_memory() -> Self {
        Self { inner: Arc::new(InMemoryStorage::default()) }
    }

    /// Creates storage over a custom backend.
    pub fn new(inner: Arc<dyn StorageApi>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageApi for DeskStorage {
    async fn add_wallet(&self, wallet: Wallet) -> api::Result<()> {
        self.inner.add_wallet(wallet).await
    }

    async fn wallets(&self, chat_id: i64) -> api::Result<Vec<Wallet>> {
        self.inner.wallets(chat_id).await
    }

    async fn wallet(&self, chat_id: i64, address: Address) -> api::Result<Option<Wallet>> {
        self.inner.wallet(chat_id, address).await
    }

    async fn set_last_token(
        &self,
        chat_id: i64,
        address: Address,
        token: Address,
    ) -> api::Result<()> {
        self.inner.set_last_token(chat_id, address, token).await
    }

    async fn set_initial_investment(
        &self,
        chat_id: i64,
        address: Address,
        amount: U256,
    ) -> api::Result<()> {
        self.inner.set_initial_investment(chat_id, address, amount).await
    }

    async fn set_gas_preference(&self, chat_id: i64, gwei: u64) -> api::Result<()> {
        self.inner.set_gas_preference(chat_id, gwei).await
    }

    async fn gas_preference(&self, chat_id: i64) -> api::Result<Option<u64>> {
        self.inner.gas_preference(chat_id).await
    }
}
