//! Multicall configuration.
use crate::chains::MulticallAddresses;
use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, map::HashMap},
};
use alloy_chains::Chain;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use url::Url;

/// Default time to wait for a sent batch to be included.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Multicall configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticallConfig {
    /// The RPC endpoint of the chain to batch calls on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Url>,
    /// Aggregator addresses per chain, overriding the known deployments.
    #[serde(default, with = "crate::serde::hash_map")]
    pub multicall: HashMap<Chain, Address>,
    /// The block read batches are executed at. Defaults to the latest block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockNumberOrTag>,
    /// Write batch configuration.
    #[serde(default)]
    pub transactions: TransactionConfig,
}

impl MulticallConfig {
    /// Sets the RPC endpoint.
    pub fn with_endpoint(mut self, endpoint: Option<Url>) -> Self {
        self.endpoint = endpoint.or(self.endpoint);
        self
    }

    /// Sets the aggregator address used on `chain`.
    pub fn with_multicall(mut self, chain: Chain, address: Address) -> Self {
        self.multicall.insert(chain, address);
        self
    }

    /// Sets the block read batches are executed at.
    pub fn with_block(mut self, block: Option<BlockNumberOrTag>) -> Self {
        self.block = block.or(self.block);
        self
    }

    /// Sets the number of confirmations to wait for after sending a batch.
    pub const fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.transactions.confirmations = confirmations;
        self
    }

    /// Sets the time to wait for a sent batch to be included.
    pub const fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.transactions.receipt_timeout = timeout;
        self
    }

    /// Aggregator addresses including the configured overrides.
    pub fn addresses(&self) -> MulticallAddresses {
        MulticallAddresses::from_chains(&self.multicall)
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load from a YAML file if it exists, otherwise use the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Write batch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Confirmations to wait for after sending a batch.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    /// Time to wait for a sent batch to be included, in seconds.
    #[serde(with = "crate::serde::duration", default = "default_receipt_timeout")]
    pub receipt_timeout: Duration,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self { confirmations: default_confirmations(), receipt_timeout: DEFAULT_RECEIPT_TIMEOUT }
    }
}

const fn default_confirmations() -> u64 {
    1
}

const fn default_receipt_timeout() -> Duration {
    DEFAULT_RECEIPT_TIMEOUT
}
