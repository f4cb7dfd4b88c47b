use tracing::info;

use crate::{Error, Result};

const CRYPTORG_ACCESS_ID: &str = "CRYPTORG_ACCESS_ID";
const CRYPTORG_API_KEY: &str = "CRYPTORG_API_KEY";
const CRYPTORG_SECRET: &str = "CRYPTORG_SECRET";
const CRYPTORG_TESTNET: &str = "CRYPTORG_TESTNET";
const BINANCE_API_KEY: &str = "BINANCE_API_KEY";
const BINANCE_SECRET: &str = "BINANCE_SECRET";
const BINANCE_TESTNET: &str = "BINANCE_TESTNET";
const DRY_RUN: &str = "DRY_RUN";

/// Cryptorg credentials and mode flags, loaded once at startup.
/// Read-only after construction.
#[derive(Debug, Clone)]
pub struct CryptorgConfig {
    pub access_id: String,
    pub api_key: String,
    pub secret: String,
    pub testnet: bool,
    pub dry_run: bool,
}

impl CryptorgConfig {
    /// Load from environment variables. Fails with an error naming the
    /// first missing or empty required variable.
    pub fn from_env() -> Result<Self> {
        let cfg = Self {
            access_id: required_env(CRYPTORG_ACCESS_ID)?,
            api_key: required_env(CRYPTORG_API_KEY)?,
            secret: required_env(CRYPTORG_SECRET)?,
            testnet: flag_env(CRYPTORG_TESTNET),
            dry_run: flag_env(DRY_RUN),
        };
        info!(
            access_id = %cfg.access_id,
            testnet = cfg.testnet,
            dry_run = cfg.dry_run,
            "Cryptorg config loaded"
        );
        Ok(cfg)
    }
}

/// Binance credentials and mode flags, loaded once at startup.
/// Read-only after construction.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub api_key: String,
    pub secret: String,
    pub testnet: bool,
    pub dry_run: bool,
}

impl BinanceConfig {
    /// Load from environment variables. Fails with an error naming the
    /// first missing or empty required variable.
    pub fn from_env() -> Result<Self> {
        let cfg = Self {
            api_key: required_env(BINANCE_API_KEY)?,
            secret: required_env(BINANCE_SECRET)?,
            testnet: flag_env(BINANCE_TESTNET),
            dry_run: flag_env(DRY_RUN),
        };
        info!(
            testnet = cfg.testnet,
            dry_run = cfg.dry_run,
            "Binance config loaded"
        );
        Ok(cfg)
    }
}

fn required_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Config(format!(
            "required environment variable '{key}' is not set"
        ))),
    }
}

/// True iff the variable is exactly `"1"` or `"true"` (case-sensitive).
/// Unset or any other value is false.
fn flag_env(key: &str) -> bool {
    matches!(std::env::var(key).as_deref(), Ok("1") | Ok("true"))
}
