//! Desk storage api.

use crate::{error::StorageError, types::Wallet};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::fmt::Debug;

/// Type alias for `Result<T, StorageError>`
pub type Result<T> = core::result::Result<T, StorageError>;

/// Storage API.
///
/// Wallets and preferences are keyed by chat session. The swap engine never
/// touches storage; callers resolve wallets and preferences here and hand
/// the engine plain values.
#[async_trait]
pub trait StorageApi: Debug + Send + Sync {
    /// Adds a wallet to a chat session.
    async fn add_wallet(&self, wallet: Wallet) -> Result<()>;

    /// Lists the wallets of a chat session.
    async fn wallets(&self, chat_id: i64) -> Result<Vec<Wallet>>;

    /// Reads one wallet of a chat session by address.
    async fn wallet(&self, chat_id: i64, address: Address) -> Result<Option<Wallet>>;

    /// Records the token a wallet last traded.
    async fn set_last_token(&self, chat_id: i64, address: Address, token: Address) -> Result<()>;

    /// Records the cost basis used by "sell initials".
    async fn set_initial_investment(
        &self,
        chat_id: i64,
        address: Address,
        amount: U256,
    ) -> Result<()>;

    /// Stores a chat's preferred gas price, in gwei.
    async fn set_gas_preference(&self, chat_id: i64, gwei: u64) -> Result<()>;

    /// Reads a chat's preferred gas price, if any.
    async fn gas_preference(&self, chat_id: i64) -> Result<Option<u64>>;
}
