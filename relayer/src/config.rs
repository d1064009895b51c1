use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Full configuration of one relayer process tree, deserialized from TOML.
/// All delays are in seconds.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RelayerConfig {
    pub xrpl: XrplConfig,
    pub coreum: CoreumConfig,
    pub processes: ProcessesConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XrplConfig {
    pub rpc: XrplRpcConfig,
    pub scanner: ScannerConfig,
    // Name of the XRPL multisigner key in the operator's keyring
    pub multi_signer_key_name: String,
}

impl Default for XrplConfig {
    fn default() -> Self {
        Self {
            rpc: XrplRpcConfig::default(),
            scanner: ScannerConfig::default(),
            multi_signer_key_name: "xrpl-relayer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XrplRpcConfig {
    pub url: String,
}

impl Default for XrplRpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5005".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerConfig {
    pub retry_delay: u64,
    // How many of the most recent validated ledgers each recent scan covers
    pub recent_scan_window: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            retry_delay: 10,
            recent_scan_window: 10_000,
        }
    }
}

impl ScannerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreumConfig {
    pub grpc: GrpcConfig,
    pub network: NetworkConfig,
    pub contract: ContractConfig,
    // Name of the relayer's Coreum key in the operator's keyring
    pub relayer_key_name: String,
}

impl Default for CoreumConfig {
    fn default() -> Self {
        Self {
            grpc: GrpcConfig::default(),
            network: NetworkConfig::default(),
            contract: ContractConfig::default(),
            relayer_key_name: "coreum-relayer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrpcConfig {
    pub url: String,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub chain_id: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: "coreum-mainnet-1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractConfig {
    pub address: String,
    pub gas_adjustment: f64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            gas_adjustment: 1.4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessesConfig {
    // Whether the first fatal process error exits the whole relayer
    pub exit_on_error: bool,
    pub coreum_to_xrpl_process: ProcessConfig,
    pub xrpl_tx_submitter: ProcessConfig,
}

impl Default for ProcessesConfig {
    fn default() -> Self {
        Self {
            exit_on_error: true,
            coreum_to_xrpl_process: ProcessConfig { repeat_delay: 10 },
            xrpl_tx_submitter: ProcessConfig { repeat_delay: 10 },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessConfig {
    pub repeat_delay: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self { repeat_delay: 10 }
    }
}

impl ProcessConfig {
    pub fn repeat_delay(&self) -> Duration {
        Duration::from_secs(self.repeat_delay)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub periodic_collector: PeriodicCollectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeriodicCollectorConfig {
    pub repeat_delay: u64,
    // Decimal places kept when exporting XRPL balances as float gauges
    pub float_truncation_precision: u32,
}

impl Default for PeriodicCollectorConfig {
    fn default() -> Self {
        Self {
            repeat_delay: 60,
            float_truncation_precision: 6,
        }
    }
}

impl PeriodicCollectorConfig {
    pub fn repeat_delay(&self) -> Duration {
        Duration::from_secs(self.repeat_delay)
    }
}

impl RelayerConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config(e.to_string()))?;
        Self::from_toml(&raw)
    }
}
