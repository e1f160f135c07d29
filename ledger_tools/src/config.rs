use log::*;
use lp_common::{parse_boolean_flag, Secret};

const DEFAULT_NETWORK: &str = "polygon-amoy";

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// When false, no transactions are ever broadcast. The audit subsystem runs in explicit no-op
    /// mode rather than erroring.
    pub enabled: bool,
    /// Human-readable network name, recorded against every audit record.
    pub network: String,
    pub rpc_url: String,
    /// Address of the audit-trail contract that receives `logEvent` calls.
    pub contract_address: String,
    /// Key used by the relay to sign transactions on our behalf.
    pub signing_key: Secret<String>,
    pub gas_price: u64,
    pub gas_limit: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            network: DEFAULT_NETWORK.to_string(),
            rpc_url: String::default(),
            contract_address: String::default(),
            signing_key: Secret::default(),
            gas_price: 1_000_000_000,
            gas_limit: 300_000,
        }
    }
}

impl LedgerConfig {
    pub fn new_from_env_or_default() -> Self {
        let enabled = parse_boolean_flag(std::env::var("LP_LEDGER_ENABLED").ok(), true);
        let network = std::env::var("LP_LEDGER_NETWORK").unwrap_or_else(|_| {
            warn!("LP_LEDGER_NETWORK not set, using {DEFAULT_NETWORK} as default");
            DEFAULT_NETWORK.to_string()
        });
        let rpc_url = std::env::var("LP_LEDGER_RPC_URL").unwrap_or_else(|_| {
            if enabled {
                error!("LP_LEDGER_RPC_URL is not set. Audit transactions will not be broadcast successfully.");
            }
            String::default()
        });
        let contract_address = std::env::var("LP_LEDGER_CONTRACT_ADDRESS").unwrap_or_else(|_| {
            if enabled {
                error!("LP_LEDGER_CONTRACT_ADDRESS is not set. Audit transactions will not be broadcast successfully.");
            }
            String::default()
        });
        let signing_key = Secret::new(std::env::var("LP_LEDGER_SIGNING_KEY").unwrap_or_default());
        let gas_price = std::env::var("LP_LEDGER_GAS_PRICE").ok().and_then(|s| s.parse().ok()).unwrap_or(1_000_000_000);
        let gas_limit = std::env::var("LP_LEDGER_GAS_LIMIT").ok().and_then(|s| s.parse().ok()).unwrap_or(300_000);
        Self { enabled, network, rpc_url, contract_address, signing_key, gas_price, gas_limit }
    }
}
