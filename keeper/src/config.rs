//! Keeper configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC URL for the base cluster
    pub rpc_url: String,

    /// WebSocket URL for the base cluster
    pub ws_url: String,

    /// RPC URL of the ephemeral venue
    pub ephemeral_rpc_url: String,

    /// Pool program ID
    pub pool_program: Pubkey,

    /// Keeper wallet keypair path (`~` is expanded)
    pub keypair_path: String,

    /// Polling interval in seconds
    pub poll_interval_secs: u64,

    /// Maximum settlement transactions per tick
    pub max_settlements_per_batch: usize,

    /// Age after which a pending receipt is treated as orphaned
    pub reconcile_after_secs: i64,

    /// Refund orphaned receipts automatically. Requires the keeper wallet
    /// to be the pool authority; otherwise orphans are only reported.
    pub auto_refund_orphans: bool,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("KEEPER_CONFIG")
            .unwrap_or_else(|_| "keeper-config.toml".to_string());

        let config_str = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        Self::from_toml(&config_str)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse config TOML")
    }

    /// Create default configuration
    pub fn default_devnet() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            ws_url: "wss://api.devnet.solana.com".to_string(),
            ephemeral_rpc_url: "https://devnet.magicblock.app".to_string(),
            pool_program: Pubkey::new_from_array(ephemeral_pool::ID),
            keypair_path: "~/.config/solana/id.json".to_string(),
            poll_interval_secs: 5,
            max_settlements_per_batch: 8,
            reconcile_after_secs: pool_model::RECONCILE_TIMEOUT_SECS,
            auto_refund_orphans: false,
        }
    }

    /// Keypair path with `~` and env vars expanded
    pub fn expanded_keypair_path(&self) -> Result<String> {
        let expanded = shellexpand::full(&self.keypair_path)
            .context(format!("Failed to expand keypair path {}", self.keypair_path))?;
        Ok(expanded.into_owned())
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_devnet();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
