//! Configuration
//!
//! Read once at startup from flags or the environment and validated before any sweep runs.

use crate::chain_client::Account;
use crate::error::ConfigError;
use alloy::primitives::Address;
use clap::Args;
use std::time::Duration;

pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY_ZERO_GAS";
pub const RECEIVER_VAR: &str = "RECEIVER_WALLET";

#[derive(Clone, Args)]
pub struct ConfigArgs {
    /// RPC endpoint of the node (http(s) polls for blocks, ws(s) subscribes)
    #[arg(long, env = "BSC_RPC_URL", default_value = "http://localhost:8545")]
    pub rpc_url: String,

    /// Private key of the compromised wallet being swept
    #[arg(long, env = PRIVATE_KEY_VAR, hide_env_values = true)]
    pub private_key: Option<String>,

    /// Address that receives swept funds
    #[arg(long, env = RECEIVER_VAR)]
    pub receiver: Option<String>,

    /// Block polling interval for http endpoints
    #[arg(long, env = "POLL_INTERVAL_MS", default_value = "4000")]
    pub poll_interval_ms: u64,

    /// Re-establish the block feed when it drops instead of exiting
    #[arg(long, env = "RESUBSCRIBE")]
    pub resubscribe: bool,

    /// Initial delay before resubscribing, doubled on each consecutive failure
    #[arg(long, env = "RESUBSCRIBE_DELAY_MS", default_value = "1000")]
    pub resubscribe_delay_ms: u64,

    /// Block notifications buffered while a sweep is in progress
    #[arg(long, default_value = "64")]
    pub feed_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub poll_interval: Duration,
    pub resubscribe_delay: Option<Duration>,
    pub capacity: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(4000),
            resubscribe_delay: None,
            capacity: 64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweeperConfig {
    pub rpc_url: String,
    pub account: Account,
    pub receiver: Address,
    pub feed: FeedSettings,
}

impl ConfigArgs {
    pub fn validate(self) -> Result<SweeperConfig, ConfigError> {
        let private_key = required(
            self.private_key,
            PRIVATE_KEY_VAR,
            ", corresponding to the compromised wallet.",
        )?;
        let receiver = required(self.receiver, RECEIVER_VAR, ".")?;

        let account = Account::from_private_key(&private_key)?;
        let receiver: Address = receiver
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidReceiver {
                address: receiver.clone(),
                reason: format!("{e}"),
            })?;

        let feed = FeedSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            resubscribe_delay: self
                .resubscribe
                .then(|| Duration::from_millis(self.resubscribe_delay_ms)),
            capacity: self.feed_capacity.max(1),
        };

        Ok(SweeperConfig {
            rpc_url: self.rpc_url,
            account,
            receiver,
            feed,
        })
    }
}

fn required(
    value: Option<String>,
    var: &'static str,
    hint: &'static str,
) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnvVar { var, hint }),
    }
}
