//! Desk configuration.
use crate::constants::{
    BASE_MAINNET_CHAIN_ID, DEFAULT_BUY_GAS_PRICE_GWEI, DEFAULT_CONFIRMATION_TIMEOUT_SECS,
    DEFAULT_FEE_RATE_BPS, DEFAULT_ROUTER, DEFAULT_ROUTER_FEE_TIER, DEFAULT_SELL_GAS_PRICE_GWEI,
    DEFAULT_TRADING_TOKEN, DEFAULT_WRAPPED_NATIVE,
};
use alloy::primitives::Address;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Desk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Chain id of the target network.
    pub chain_id: u64,
    /// Contract addresses of the fixed route.
    pub contracts: ContractsConfig,
    /// Service-fee configuration.
    pub fees: FeeConfig,
    /// Default gas prices by flow direction, in gwei.
    pub gas_price: GasPriceConfig,
    /// How long to wait for router and unwrap confirmations, in seconds.
    pub confirmation_timeout_secs: u64,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            chain_id: BASE_MAINNET_CHAIN_ID,
            contracts: ContractsConfig::default(),
            fees: FeeConfig::default(),
            gas_price: GasPriceConfig::default(),
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        }
    }
}

impl DeskConfig {
    /// Loads the configuration from `path`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to open config file: {}", path.display()))?;
        serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Writes the configuration to `path` as YAML.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), content)
            .wrap_err_with(|| format!("failed to write config file: {}", path.as_ref().display()))
    }
}

/// Contracts of the fixed swap route.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Exchange router exposing the single-hop exact-input entry point.
    pub router: Address,
    /// Wrapped native asset.
    pub wrapped_native: Address,
    /// Intermediate asset every route goes through.
    pub trading_token: Address,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            router: DEFAULT_ROUTER,
            wrapped_native: DEFAULT_WRAPPED_NATIVE,
            trading_token: DEFAULT_TRADING_TOKEN,
        }
    }
}

/// Service-fee parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Recipient of the service fee. Must be configured; the zero address
    /// burns fees.
    pub recipient: Address,
    /// Fee rate in basis points (100 = 1%).
    pub rate_bps: u32,
    /// Router pool fee tier (3000 = 0.3%).
    pub router_fee_tier: u32,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            recipient: Address::ZERO,
            rate_bps: DEFAULT_FEE_RATE_BPS,
            router_fee_tier: DEFAULT_ROUTER_FEE_TIER,
        }
    }
}

/// Default gas prices by flow direction, in gwei.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GasPriceConfig {
    /// Gas price for buy flows.
    pub buy_gwei: u64,
    /// Gas price for sell flows.
    pub sell_gwei: u64,
}

impl Default for GasPriceConfig {
    fn default() -> Self {
        Self { buy_gwei: DEFAULT_BUY_GAS_PRICE_GWEI, sell_gwei: DEFAULT_SELL_GAS_PRICE_GWEI }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_roundtrip() {
        let config = DeskConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let from_yaml = serde_yaml::from_str::<DeskConfig>(&yaml).unwrap();
        assert_eq!(yaml, serde_yaml::to_string(&from_yaml).unwrap());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config = serde_yaml::from_str::<DeskConfig>(
            r#"
fees:
  recipient: "0x00000000000000000000000000000000deadbeef"
"#,
        )
        .unwrap();
        assert_ne!(config.fees.recipient, Address::ZERO);
        assert_eq!(config.fees.rate_bps, DEFAULT_FEE_RATE_BPS);
        assert_eq!(config.chain_id, BASE_MAINNET_CHAIN_ID);
        assert_eq!(config.gas_price.buy_gwei, DEFAULT_BUY_GAS_PRICE_GWEI);
    }
}
