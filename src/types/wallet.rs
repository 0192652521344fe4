//! Custodial wallet records.

use crate::error::StorageError;
use alloy::{
    network::EthereumWallet,
    primitives::{Address, B256, U256},
    signers::local::PrivateKeySigner,
};
use chrono::{DateTime, Utc};
use std::fmt;

/// A custodial wallet held on behalf of a chat session.
///
/// The secret key only leaves this type through [`Wallet::signer`], scoped
/// to producing signatures. Malformed key material is rejected here, at the
/// boundary, not somewhere deep inside a flow.
#[derive(Clone)]
pub struct Wallet {
    /// Account address, derived from the key.
    pub address: Address,
    /// Secret key material.
    secret: B256,
    /// Chat session this wallet belongs to.
    pub chat_id: i64,
    /// Token the wallet last traded.
    pub last_token: Option<Address>,
    /// Recorded cost basis for "sell initials", in target-token units.
    pub initial_investment: Option<U256>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// Generates a wallet with a fresh random key.
    pub fn random(chat_id: i64) -> Self {
        let signer = PrivateKeySigner::random();
        Self {
            address: signer.address(),
            secret: signer.to_bytes(),
            chat_id,
            last_token: None,
            initial_investment: None,
            created_at: Utc::now(),
        }
    }

    /// Reconstructs a wallet from existing key material.
    pub fn from_secret(chat_id: i64, secret: B256) -> Result<Self, StorageError> {
        let signer =
            PrivateKeySigner::from_bytes(&secret).map_err(|_| StorageError::InvalidKeyMaterial)?;
        Ok(Self {
            address: signer.address(),
            secret,
            chat_id,
            last_token: None,
            initial_investment: None,
            created_at: Utc::now(),
        })
    }

    /// Returns a signing wallet for this account.
    pub fn signer(&self) -> Result<EthereumWallet, StorageError> {
        let signer = PrivateKeySigner::from_bytes(&self.secret)
            .map_err(|_| StorageError::InvalidKeyMaterial)?;
        Ok(EthereumWallet::new(signer))
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("chat_id", &self.chat_id)
            .field("last_token", &self.last_token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_wallets_are_distinct() {
        let a = Wallet::random(1);
        let b = Wallet::random(1);
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn secret_reconstructs_same_address() {
        let wallet = Wallet::random(7);
        let again = Wallet::from_secret(7, wallet.secret).unwrap();
        assert_eq!(wallet.address, again.address);
    }

    #[test]
    fn debug_redacts_the_secret() {
        let wallet = Wallet::random(1);
        let rendered = format!("{wallet:?}");
        assert!(!rendered.contains(&format!("{:x}", wallet.secret)));
    }
}
