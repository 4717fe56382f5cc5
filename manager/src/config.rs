use crate::logging::LogFormat;
use crate::ManagerError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use valset_types::{Address, Amount, ValidatorParams};

/// One bootstrap validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisEntry {
    pub signer: Address,
    pub staker: Address,
}

/// Deployment configuration for a validator-set manager.
///
/// Loaded from TOML via [`ManagerConfig::from_toml_file`] or
/// [`ManagerConfig::from_toml_str`]. Missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Deployment constants.
    #[serde(default)]
    pub params: ValidatorParams,

    /// Initial validator set, in registry order.
    #[serde(default)]
    pub genesis: Vec<GenesisEntry>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ManagerConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ManagerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ManagerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ManagerError> {
        let config: Self = toml::from_str(s).map_err(|e| ManagerError::Config(e.to_string()))?;
        config.params.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ManagerError> {
        toml::to_string_pretty(self).map_err(|e| ManagerError::Config(e.to_string()))
    }

    pub fn genesis_signers(&self) -> Vec<Address> {
        self.genesis.iter().map(|e| e.signer).collect()
    }

    pub fn genesis_stakers(&self) -> Vec<Address> {
        self.genesis.iter().map(|e| e.staker).collect()
    }

    /// Aggregate value the genesis deployment must attach.
    pub fn genesis_value(&self) -> Amount {
        self.params
            .stake_amount
            .saturating_mul(self.genesis.len() as Amount)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: ValidatorParams::default(),
            genesis: Vec::new(),
        }
    }
}
