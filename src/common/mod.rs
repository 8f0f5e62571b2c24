pub mod config;
pub mod logger;

pub use config::{get_deploy_config, DeployConfig, EnvSecrets, NetworkConfig};
