//! Desk error types.
use crate::swap::{Stage, TransactionRecord};
use alloy::{
    primitives::{Address, TxHash, U256},
    transports::{RpcError, TransportErrorKind},
};
use core::fmt;
use jsonrpsee::core::RpcResult;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// Errors that may occur while executing a single step of a flow.
#[derive(Debug, Error)]
pub enum StepError {
    /// The wallet does not hold enough of the step's input asset.
    #[error("insufficient balance of {token}: have {available}, need {required}")]
    InsufficientBalance {
        /// Asset the step consumes.
        token: Address,
        /// Balance held by the wallet.
        available: U256,
        /// Balance the step needs.
        required: U256,
    },
    /// The transaction was included but reverted.
    #[error("transaction {tx_hash} reverted")]
    Reverted {
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
    },
    /// Confirmation was not observed within the wait bound.
    ///
    /// This does not prove the transaction failed on-chain, only that it was
    /// not seen confirmed in time.
    #[error("no confirmation for {tx_hash} within {timeout:?}")]
    Timeout {
        /// Hash of the broadcast transaction.
        tx_hash: TxHash,
        /// The wait bound that elapsed.
        timeout: Duration,
    },
    /// The node rejected the broadcast because the nonce was already used.
    ///
    /// Surfaced as-is: retrying with a bumped nonce could resubmit over an
    /// externally pending transaction.
    #[error("nonce {nonce} already used for {sender}")]
    NonceConflict {
        /// Account the transaction was sent from.
        sender: Address,
        /// The rejected nonce.
        nonce: u64,
    },
    /// Error occurred while signing the transaction.
    #[error(transparent)]
    Sign(#[from] alloy::signers::Error),
    /// RPC error.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
}

/// The overarching error type returned by buy and sell flows.
#[derive(Debug, Error)]
pub enum SwapError {
    /// The requested amount is not positive.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),
    /// The wallet holds nothing to sell.
    #[error("no position in {token}")]
    NoPositionFound {
        /// The token that was to be sold.
        token: Address,
    },
    /// A step failed and the remaining plan was abandoned.
    ///
    /// Steps confirmed before the failure are not compensated; `confirmed`
    /// records how far the flow got.
    #[error("swap aborted at {stage}: {cause}")]
    Aborted {
        /// Stage at which the flow stopped.
        stage: Stage,
        /// Steps that confirmed before the failure.
        confirmed: Vec<TransactionRecord>,
        /// The failure itself.
        #[source]
        cause: StepError,
    },
    /// The wallet record is malformed.
    #[error(transparent)]
    Wallet(#[from] StorageError),
    /// The chain client failed before any transaction was broadcast.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
}

/// Storage errors.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// No wallets are known for this chat.
    #[error("unknown chat {0}")]
    UnknownChat(i64),
    /// The chat has no wallet with this address.
    #[error("no wallet {wallet} for chat {chat_id}")]
    UnknownWallet {
        /// Chat the lookup ran against.
        chat_id: i64,
        /// Address that was looked up.
        wallet: Address,
    },
    /// The secret key material does not parse to a valid key.
    #[error("malformed secret key material")]
    InvalidKeyMaterial,
}

impl From<SwapError> for jsonrpsee::types::error::ErrorObject<'static> {
    fn from(err: SwapError) -> Self {
        match &err {
            SwapError::InvalidAmount(_) | SwapError::NoPositionFound { .. } => {
                invalid_params(err.to_string())
            }
            SwapError::Aborted { confirmed, .. } => rpc_err(
                jsonrpsee::types::error::INTERNAL_ERROR_CODE,
                err.to_string(),
                serde_json::to_value(confirmed).ok(),
            ),
            SwapError::Wallet(inner) => inner.clone().into(),
            SwapError::Rpc(_) => internal_rpc(err.to_string()),
        }
    }
}

impl From<StorageError> for jsonrpsee::types::error::ErrorObject<'static> {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnknownChat(_) | StorageError::UnknownWallet { .. } => {
                invalid_params(err.to_string())
            }
            StorageError::InvalidKeyMaterial => internal_rpc(err.to_string()),
        }
    }
}

/// A helper trait to provide an RPC error code.
pub trait ToRpcResult<Ok, Err>: Sized {
    /// Converts result to [`RpcResult`] by converting error variant to
    /// [`jsonrpsee::types::error::ErrorObject`]
    fn to_rpc_result(self) -> RpcResult<Ok>
    where
        Err: fmt::Display;
}

macro_rules! impl_error_helpers {
    ($err:ty) => {
        impl<Ok> ToRpcResult<Ok, $err> for Result<Ok, $err> {
            fn to_rpc_result(self) -> RpcResult<Ok> {
                self.map_err(|err| err.into())
            }
        }

        impl From<$err> for String {
            fn from(err: $err) -> Self {
                err.to_string()
            }
        }
    };
}

impl_error_helpers!(SwapError);
impl_error_helpers!(StorageError);

/// Constructs an invalid params JSON‑RPC error.
pub(crate) fn invalid_params(msg: impl Into<String>) -> jsonrpsee::types::error::ErrorObject<'static> {
    rpc_err(jsonrpsee::types::error::INVALID_PARAMS_CODE, msg, None)
}

/// Constructs an internal JSON‑RPC error.
pub(crate) fn internal_rpc(msg: impl Into<String>) -> jsonrpsee::types::error::ErrorObject<'static> {
    rpc_err(jsonrpsee::types::error::INTERNAL_ERROR_CODE, msg, None)
}

/// Constructs a JSON‑RPC error with `code`, `message` and optional `data`.
fn rpc_err(
    code: i32,
    msg: impl Into<String>,
    data: Option<serde_json::Value>,
) -> jsonrpsee::types::error::ErrorObject<'static> {
    jsonrpsee::types::error::ErrorObject::owned(code, msg.into(), data)
}
