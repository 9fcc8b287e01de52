use std::{fmt::Display, str::FromStr};

use log::*;
use relay_common::Secret;

pub const DEFAULT_RETURN_URL: &str = "http://localhost:3000/payment-return";

const TEST_API_URL: &str = "https://test.dodopayments.com";
const LIVE_API_URL: &str = "https://live.dodopayments.com";
const TEST_CHECKOUT_URL: &str = "https://test.checkout.dodopayments.com";
const LIVE_CHECKOUT_URL: &str = "https://checkout.dodopayments.com";

/// Which of the processor's environments to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessorEnvironment {
    #[default]
    TestMode,
    LiveMode,
}

impl ProcessorEnvironment {
    pub fn api_url(&self) -> &'static str {
        match self {
            Self::TestMode => TEST_API_URL,
            Self::LiveMode => LIVE_API_URL,
        }
    }

    pub fn checkout_url(&self) -> &'static str {
        match self {
            Self::TestMode => TEST_CHECKOUT_URL,
            Self::LiveMode => LIVE_CHECKOUT_URL,
        }
    }
}

impl Display for ProcessorEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TestMode => f.write_str("test_mode"),
            Self::LiveMode => f.write_str("live_mode"),
        }
    }
}

impl FromStr for ProcessorEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "test_mode" | "test" => Ok(Self::TestMode),
            "live_mode" | "live" => Ok(Self::LiveMode),
            other => Err(format!("'{other}' is not a processor environment. Use test_mode or live_mode.")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessorConfig {
    /// Bearer token for the processor's REST API.
    pub api_key: Secret<String>,
    pub environment: ProcessorEnvironment,
    /// Where the processor sends customers after checkout.
    pub return_url: String,
    /// Signing secret for webhook deliveries, usually of the form `whsec_<base64>`.
    pub webhook_secret: Secret<String>,
    /// Overrides the REST API base url for the selected environment.
    pub api_url: Option<String>,
    /// Overrides the hosted checkout base url for the selected environment.
    pub checkout_url: Option<String>,
}

impl ProcessorConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_key = Secret::new(std::env::var("RELAY_PROCESSOR_API_KEY").unwrap_or_else(|_| {
            error!("🪛️ RELAY_PROCESSOR_API_KEY is not set. Dynamic checkout requests will be rejected by the processor.");
            String::default()
        }));
        let environment = match std::env::var("RELAY_PROCESSOR_ENVIRONMENT") {
            Ok(s) => s.parse().unwrap_or_else(|e| {
                warn!("🪛️ {e} Using test_mode.");
                ProcessorEnvironment::TestMode
            }),
            Err(_) => {
                warn!("🪛️ RELAY_PROCESSOR_ENVIRONMENT not set, using test_mode as default");
                ProcessorEnvironment::TestMode
            },
        };
        let return_url = std::env::var("RELAY_RETURN_URL").unwrap_or_else(|_| {
            warn!("🪛️ RELAY_RETURN_URL not set, using {DEFAULT_RETURN_URL}");
            DEFAULT_RETURN_URL.to_string()
        });
        let webhook_secret = Secret::new(std::env::var("RELAY_WEBHOOK_SECRET").unwrap_or_else(|_| {
            error!("🪛️ RELAY_WEBHOOK_SECRET is not set. Signed webhook deliveries cannot be verified.");
            String::default()
        }));
        let api_url = std::env::var("RELAY_PROCESSOR_API_URL").ok().filter(|s| !s.is_empty());
        let checkout_url = std::env::var("RELAY_PROCESSOR_CHECKOUT_URL").ok().filter(|s| !s.is_empty());
        Self { api_key, environment, return_url, webhook_secret, api_url, checkout_url }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or_else(|| self.environment.api_url()).trim_end_matches('/')
    }

    pub fn checkout_url(&self) -> &str {
        self.checkout_url.as_deref().unwrap_or_else(|| self.environment.checkout_url()).trim_end_matches('/')
    }
}
