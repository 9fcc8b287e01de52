use std::{env, path::PathBuf};

use log::*;
use processor_tools::ProcessorConfig;
use relay_common::env_flag;

const DEFAULT_RELAY_HOST: &str = "127.0.0.1";
const DEFAULT_RELAY_PORT: u16 = 3000;
const DEFAULT_STORE_PATH: &str = "payments.json";

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// The JSON file holding the latest known status of every payment.
    pub store_path: PathBuf,
    /// If false, webhook signatures are not checked and anyone can post payment events. **DANGER**
    pub webhook_checks: bool,
    /// Payment processor credentials and endpoints.
    pub processor: ProcessorConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RELAY_HOST.to_string(),
            port: DEFAULT_RELAY_PORT,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            webhook_checks: true,
            processor: ProcessorConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RELAY_HOST").ok().unwrap_or_else(|| DEFAULT_RELAY_HOST.into());
        let port = env::var("RELAY_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RELAY_PORT. {e} Using the default, {DEFAULT_RELAY_PORT}, \
                         instead."
                    );
                    DEFAULT_RELAY_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RELAY_PORT);
        let store_path = env::var("RELAY_STORE_PATH").map(PathBuf::from).unwrap_or_else(|_| {
            info!("🪛️ RELAY_STORE_PATH is not set. Payment statuses will be saved to {DEFAULT_STORE_PATH}.");
            PathBuf::from(DEFAULT_STORE_PATH)
        });
        let webhook_checks = env_flag("RELAY_WEBHOOK_CHECKS", true);
        if !webhook_checks {
            warn!(
                "🚨️🚨️🚨️ Webhook signature checks are DISABLED. Anyone who can reach this server can forge payment \
                 statuses. Never run production like this. 🚨️🚨️🚨️"
            );
        }
        let processor = ProcessorConfig::new_from_env_or_default();
        info!("🪛️ Payment processor environment: {}", processor.environment);
        Self { host, port, store_path, webhook_checks, processor }
    }
}
