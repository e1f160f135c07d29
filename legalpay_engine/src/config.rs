use std::{env, time::Duration};

use log::*;
use lp_common::parse_boolean_flag;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 40;
const DEFAULT_MAX_RETRIES: i64 = 3;
const DEFAULT_SWEEP_PERIOD_SECS: u64 = 300;

/// Tuning for the audit submission pipeline. Passed explicitly into [`crate::AuditApi`] at
/// construction; nothing in the audit path reads ambient state.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// When false, `submit` logs and returns without persisting anything (explicit no-op mode).
    pub enabled: bool,
    /// Network name recorded against every audit record.
    pub network: String,
    /// Delay between consecutive receipt polls for one transaction.
    pub poll_interval: Duration,
    /// Receipt polls per transaction before giving up. Bounds the watcher's total wait to
    /// `max_poll_attempts * poll_interval` (the default is 40 x 3 s, about two minutes).
    pub max_poll_attempts: u32,
    /// Sweeper retry ceiling. A `Failed` record at this count stays failed until an operator
    /// intervenes.
    pub max_retries: i64,
    /// How often the sweep worker runs.
    pub sweep_period: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            network: "polygon-amoy".to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            max_retries: DEFAULT_MAX_RETRIES,
            sweep_period: Duration::from_secs(DEFAULT_SWEEP_PERIOD_SECS),
        }
    }
}

impl AuditConfig {
    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let enabled = parse_boolean_flag(env::var("LP_AUDIT_ENABLED").ok(), true);
        let network = env::var("LP_AUDIT_NETWORK").unwrap_or(defaults.network);
        let poll_interval = env_u64("LP_AUDIT_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS);
        let max_poll_attempts = env_u64("LP_AUDIT_MAX_POLL_ATTEMPTS", u64::from(DEFAULT_MAX_POLL_ATTEMPTS)) as u32;
        let max_retries = env_u64("LP_AUDIT_MAX_RETRIES", DEFAULT_MAX_RETRIES as u64) as i64;
        let sweep_period = env_u64("LP_AUDIT_SWEEP_PERIOD_SECS", DEFAULT_SWEEP_PERIOD_SECS);
        Self {
            enabled,
            network,
            poll_interval: Duration::from_secs(poll_interval),
            max_poll_attempts,
            max_retries,
            sweep_period: Duration::from_secs(sweep_period),
        }
    }
}

fn env_u64(var: &str, default: u64) -> u64 {
    match env::var(var) {
        Ok(s) => s.parse::<u64>().unwrap_or_else(|e| {
            warn!("🪛️ {s} is not a valid value for {var}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}
