//! Client configuration assembled from the per-layer loaders.
use anyhow::{Result, anyhow};
use client_blockchain_evm::EvmConfig;
use client_frontend_core::FrontendConfig;
use runtime::RuntimeConfig;

/// Configuration required to bootstrap a session and its UI.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub evm: EvmConfig,
    pub runtime: RuntimeConfig,
    pub frontend: FrontendConfig,
}

impl ClientConfig {
    pub fn new(evm: EvmConfig) -> Self {
        Self {
            evm,
            runtime: RuntimeConfig::default(),
            frontend: FrontendConfig::default(),
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// See [`EvmConfig::from_env`], [`RuntimeConfig::from_env`] and
    /// [`FrontendConfig::from_env`] for the variables each layer reads.
    pub fn from_env() -> Result<Self> {
        let evm = EvmConfig::from_env().map_err(|e| anyhow!(e))?;

        Ok(Self {
            evm,
            runtime: RuntimeConfig::from_env(),
            frontend: FrontendConfig::from_env(),
        })
    }
}
