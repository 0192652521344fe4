//! Desk types.

pub mod contracts;

mod intent;
pub use intent::{SellAmount, SwapAction, SwapIntent};

mod wallet;
pub use wallet::Wallet;
