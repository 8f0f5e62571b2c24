use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;

pub const DEVELOPMENT_NETWORK: &str = "development";
pub const SKALE_NETWORK: &str = "skale";

fn any_network() -> String {
    "*".to_string()
}

/// One deployment target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint.
    pub url: String,
    /// Network id the deployment is bound to; "*" matches any.
    #[serde(default = "any_network")]
    pub network_id: String,
    /// Fixed gas price, if the chain wants one (SKALE runs at 0).
    #[serde(default)]
    pub gas_price: Option<u64>,
}

impl NetworkConfig {
    pub fn development() -> Self {
        Self {
            url: "http://127.0.0.1:8546".to_string(),
            network_id: any_network(),
            gas_price: None,
        }
    }
}

/// Deployment configuration: named networks plus the one used by default.
///
/// Loaded from a TOML blob in the DEMAND_CONFIG_TOML environment variable
/// (or a file), shaped like:
///
/// default_network = "development"
///
/// [networks.development]
/// url        = "http://127.0.0.1:8546"
/// network_id = "*"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_network_name")]
    pub default_network: String,
    #[serde(default)]
    pub networks: HashMap<String, NetworkConfig>,
}

fn default_network_name() -> String {
    DEVELOPMENT_NETWORK.to_string()
}

impl Default for DeployConfig {
    fn default() -> Self {
        let mut networks = HashMap::new();
        networks.insert(DEVELOPMENT_NETWORK.to_string(), NetworkConfig::development());
        Self {
            default_network: default_network_name(),
            networks,
        }
    }
}

/// Secrets and endpoints that only ever come from the environment (or .env).
///
/// - PRIVATE_KEY: base58-encoded 64-byte deployer keypair
/// - SKALE_CHAIN: SKALE endpoint URL; enables the `skale` network
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvSecrets {
    pub private_key: Option<String>,
    pub skale_chain: Option<String>,
}

impl EnvSecrets {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        match envy::from_env::<EnvSecrets>() {
            Ok(secrets) => secrets,
            Err(err) => {
                warn!("Failed to read deployment secrets from env: {}", err);
                EnvSecrets::default()
            }
        }
    }

    /// Decodes PRIVATE_KEY into a keypair.
    pub fn deployer_keypair(&self) -> Result<Keypair> {
        let raw = self
            .private_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("PRIVATE_KEY is not set"))?;
        let bytes = bs58::decode(raw)
            .into_vec()
            .context("PRIVATE_KEY is not valid base58")?;
        Keypair::try_from(bytes.as_slice())
            .map_err(|e| anyhow!("PRIVATE_KEY is not a keypair: {}", e))
    }

    pub fn deployer_pubkey(&self) -> Result<Pubkey> {
        Ok(self.deployer_keypair()?.pubkey())
    }
}

impl DeployConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut cfg: DeployConfig = toml::from_str(raw).context("parsing deploy config TOML")?;
        cfg.networks
            .entry(DEVELOPMENT_NETWORK.to_string())
            .or_insert_with(NetworkConfig::development);
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading deploy config {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    /// Layers the env-only settings on top: SKALE_CHAIN adds (or replaces)
    /// the `skale` network with a zero gas price.
    pub fn with_secrets(mut self, secrets: &EnvSecrets) -> Self {
        if let Some(url) = secrets.skale_chain.as_deref().filter(|s| !s.trim().is_empty()) {
            self.networks.insert(
                SKALE_NETWORK.to_string(),
                NetworkConfig {
                    url: url.trim().to_string(),
                    network_id: any_network(),
                    gas_price: Some(0),
                },
            );
        }
        self
    }

    /// Builds the config from an optional TOML blob plus secrets. A blob
    /// that fails to parse is logged and ignored.
    pub fn from_sources(toml_blob: Option<&str>, secrets: &EnvSecrets) -> Self {
        let base = match toml_blob {
            Some(raw) if !raw.trim().is_empty() => match Self::from_toml_str(raw) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse DEMAND_CONFIG_TOML: {:#}", err);
                    DeployConfig::default()
                }
            },
            _ => DeployConfig::default(),
        };
        base.with_secrets(secrets)
    }

    /// Load from DEMAND_CONFIG_TOML plus PRIVATE_KEY / SKALE_CHAIN.
    pub fn from_env_or_default() -> Self {
        let secrets = EnvSecrets::from_env();
        let blob = env::var("DEMAND_CONFIG_TOML").ok();
        Self::from_sources(blob.as_deref(), &secrets)
    }

    /// Network by name, or the default network when `name` is None.
    pub fn network(&self, name: Option<&str>) -> Option<&NetworkConfig> {
        self.networks.get(name.unwrap_or(&self.default_network))
    }
}

/// Global deployment configuration, read once from the environment.
pub static GLOBAL_DEPLOY_CONFIG: Lazy<DeployConfig> = Lazy::new(DeployConfig::from_env_or_default);

#[inline]
pub fn get_deploy_config() -> &'static DeployConfig {
    &GLOBAL_DEPLOY_CONFIG
}
