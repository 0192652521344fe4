//! # Desk
//!
//! Library for the implementation of the Desk trading service: a custodial
//! bot that executes buy and sell swaps for chat-session wallets through a
//! fixed on-chain route (ETH ⇄ WETH ⇄ VIRTUAL ⇄ target token).

pub mod chain;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod fees;
pub mod metrics;
pub mod rpc;
pub mod storage;
pub mod swap;
pub mod types;
pub mod version;
