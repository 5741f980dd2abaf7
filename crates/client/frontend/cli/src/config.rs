//! CLI-specific configuration for the terminal frontend.
use std::env;

/// CLI terminal configuration.
///
/// This contains settings specific to the terminal interface,
/// separate from cross-frontend client configuration.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub ui: UiConfig,
}

impl CliConfig {
    /// Construct CLI configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LOTTERY_CLI_PROMPT` - Input prompt (default: `lottery> `)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(prompt) = env::var("LOTTERY_CLI_PROMPT") {
            config.ui.prompt = prompt;
        }

        config
    }
}

/// Display configuration.
#[derive(Clone, Debug)]
pub struct UiConfig {
    pub prompt: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            prompt: "lottery> ".to_string(),
        }
    }
}
