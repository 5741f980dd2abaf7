//! EVM ledger configuration.

use std::env;
use std::time::Duration;

use client_blockchain_core::{Address, LedgerConfig};

/// Well-known deployment of the lottery contract.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xB9e2A2008d3A58adD8CC1cE9c15BF6D4bB9C6d72";

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// EVM-specific configuration.
#[derive(Debug, Clone)]
pub struct EvmConfig {
    /// Label used in logs (e.g., "evm-local", "sepolia")
    pub network: String,

    /// JSON-RPC endpoint URL
    pub rpc_url: String,

    /// Deployed lottery contract
    pub contract: Address,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// How often log subscriptions poll for new blocks
    pub event_poll_interval: Duration,

    /// How often the wallet polls for account/chain changes
    pub wallet_poll_interval: Duration,

    /// How often a submission polls for its receipt
    pub receipt_poll_interval: Duration,

    /// Give up waiting for a receipt after this long
    pub receipt_timeout: Duration,

    /// Buffered deliveries per subscription
    pub subscription_buffer: usize,
}

impl EvmConfig {
    pub fn new(rpc_url: impl Into<String>, contract: Address) -> Self {
        Self {
            network: "evm-local".to_string(),
            rpc_url: rpc_url.into(),
            contract,
            request_timeout: Duration::from_secs(15),
            event_poll_interval: Duration::from_secs(2),
            wallet_poll_interval: Duration::from_secs(1),
            receipt_poll_interval: Duration::from_millis(500),
            receipt_timeout: Duration::from_secs(120),
            subscription_buffer: 64,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LOTTERY_NETWORK` - Network label for logs (default: evm-local)
    /// - `LOTTERY_RPC_URL` - JSON-RPC endpoint (default: http://127.0.0.1:8545)
    /// - `LOTTERY_CONTRACT_ADDRESS` - Deployed lottery contract
    /// - `LOTTERY_RPC_TIMEOUT_MS` - Per-request timeout (default: 15000)
    /// - `LOTTERY_EVENT_POLL_MS` - Log polling interval (default: 2000)
    /// - `LOTTERY_WALLET_POLL_MS` - Wallet polling interval (default: 1000)
    /// - `LOTTERY_RECEIPT_TIMEOUT_MS` - Receipt wait limit (default: 120000)
    pub fn from_env() -> Result<Self, String> {
        let rpc_url = env::var("LOTTERY_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());

        let contract_text = env::var("LOTTERY_CONTRACT_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_CONTRACT_ADDRESS.to_string());
        let contract = contract_text
            .parse::<Address>()
            .map_err(|e| format!("Invalid LOTTERY_CONTRACT_ADDRESS {}: {}", contract_text, e))?;

        let mut config = Self::new(rpc_url, contract);

        if let Ok(network) = env::var("LOTTERY_NETWORK") {
            config.network = network;
        }
        if let Some(ms) = read_millis("LOTTERY_RPC_TIMEOUT_MS") {
            config.request_timeout = ms;
        }
        if let Some(ms) = read_millis("LOTTERY_EVENT_POLL_MS") {
            config.event_poll_interval = ms;
        }
        if let Some(ms) = read_millis("LOTTERY_WALLET_POLL_MS") {
            config.wallet_poll_interval = ms;
        }
        if let Some(ms) = read_millis("LOTTERY_RECEIPT_TIMEOUT_MS") {
            config.receipt_timeout = ms;
        }

        Ok(config)
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn with_event_poll_interval(mut self, interval: Duration) -> Self {
        self.event_poll_interval = interval;
        self
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }
}

impl LedgerConfig for EvmConfig {
    fn network_name(&self) -> &str {
        &self.network
    }

    fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn validate(&self) -> Result<(), String> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(format!("Invalid RPC URL format: {}", self.rpc_url));
        }

        if self.contract.is_zero() {
            return Err("Contract address cannot be zero".to_string());
        }

        let intervals = [
            ("request timeout", self.request_timeout),
            ("event poll interval", self.event_poll_interval),
            ("wallet poll interval", self.wallet_poll_interval),
            ("receipt poll interval", self.receipt_poll_interval),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, d)| d.is_zero()) {
            return Err(format!("{} must be greater than 0", name));
        }

        Ok(())
    }
}

impl Default for EvmConfig {
    fn default() -> Self {
        let contract = DEFAULT_CONTRACT_ADDRESS
            .parse()
            .unwrap_or(Address::ZERO);
        Self::new(DEFAULT_RPC_URL, contract)
    }
}

fn read_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_millis)
}
