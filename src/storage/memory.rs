//! Desk storage implementation in-memory.
//!
//! Wallets and preferences are process-local and lost on shutdown. This is a
//! known limitation of the service, not of this backend alone: no durable
//! wallet custody is provided anywhere.

use super::{StorageApi, api::Result};
use crate::{error::StorageError, types::Wallet};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use dashmap::DashMap;

/// [`StorageApi`] implementation in-memory.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    wallets: DashMap<i64, Vec<Wallet>>,
    gas_preferences: DashMap<i64, u64>,
}

impl InMemoryStorage {
    fn update_wallet(
        &self,
        chat_id: i64,
        address: Address,
        update: impl FnOnce(&mut Wallet),
    ) -> Result<()> {
        let mut wallets =
            self.wallets.get_mut(&chat_id).ok_or(StorageError::UnknownChat(chat_id))?;
        let wallet = wallets
            .iter_mut()
            .find(|wallet| wallet.address == address)
            .ok_or(StorageError::UnknownWallet { chat_id, wallet: address })?;
        update(wallet);
        Ok(())
    }
}

#[async_trait]
impl StorageApi for InMemoryStorage {
    async fn add_wallet(&self, wallet: Wallet) -> Result<()> {
        self.wallets.entry(wallet.chat_id).or_default().push(wallet);
        Ok(())
    }

    async fn wallets(&self, chat_id: i64) -> Result<Vec<Wallet>> {
        Ok(self.wallets.get(&chat_id).map(|wallets| wallets.clone()).unwrap_or_default())
    }

    async fn wallet(&self, chat_id: i64, address: Address) -> Result<Option<Wallet>> {
        Ok(self
            .wallets
            .get(&chat_id)
            .and_then(|wallets| wallets.iter().find(|wallet| wallet.address == address).cloned()))
    }

    async fn set_last_token(&self, chat_id: i64, address: Address, token: Address) -> Result<()> {
        self.update_wallet(chat_id, address, |wallet| wallet.last_token = Some(token))
    }

    async fn set_initial_investment(
        &self,
        chat_id: i64,
        address: Address,
        amount: U256,
    ) -> Result<()> {
        self.update_wallet(chat_id, address, |wallet| wallet.initial_investment = Some(amount))
    }

    async fn set_gas_preference(&self, chat_id: i64, gwei: u64) -> Result<()> {
        self.gas_preferences.insert(chat_id, gwei);
        Ok(())
    }

    async fn gas_preference(&self, chat_id: i64) -> Result<Option<u64>> {
        Ok(self.gas_preferences.get(&chat_id).map(|gwei| *gwei))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wallets_are_scoped_by_chat() {
        let storage = InMemoryStorage::default();
        let wallet = Wallet::random(1);
        let address = wallet.address;
        storage.add_wallet(wallet).await.unwrap();

        assert_eq!(storage.wallets(1).await.unwrap().len(), 1);
        assert!(storage.wallets(2).await.unwrap().is_empty());
        assert!(storage.wallet(2, address).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_fields_update_in_place() {
        let storage = InMemoryStorage::default();
        let wallet = Wallet::random(1);
        let address = wallet.address;
        storage.add_wallet(wallet).await.unwrap();

        let token = Address::repeat_byte(0xaa);
        storage.set_last_token(1, address, token).await.unwrap();
        storage.set_initial_investment(1, address, U256::from(500)).await.unwrap();

        let wallet = storage.wallet(1, address).await.unwrap().unwrap();
        assert_eq!(wallet.last_token, Some(token));
        assert_eq!(wallet.initial_investment, Some(U256::from(500)));
    }

    #[tokio::test]
    async fn updates_against_unknown_wallets_fail() {
        let storage = InMemoryStorage::default();
        let err = storage.set_last_token(9, Address::ZERO, Address::ZERO).await.unwrap_err();
        assert!(matches!(err, StorageError::UnknownChat(9)));
    }

    #[tokio::test]
    async fn gas_preference_roundtrip() {
        let storage = InMemoryStorage::default();
        assert_eq!(storage.gas_preference(1).await.unwrap(), None);
        storage.set_gas_preference(1, 5).await.unwrap();
        assert_eq!(storage.gas_preference(1).await.unwrap(), Some(5));
    }
}
