use std::env;

pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.elliot.ai";
pub const DEFAULT_EXCHANGE_URL: &str = "https://mainnet.zklighter.elliot.ai";

/// Service configuration derived from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the explorer serving `/api/search`.
    pub explorer_url: String,
    /// Base URL of the exchange serving `/api/v1/markets` and `/api/v1/account`.
    pub exchange_url: String,
    pub server_host: String,
    pub server_port: u16,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            explorer_url: env_str("LIGHTER_EXPLORER_URL", DEFAULT_EXPLORER_URL),
            exchange_url: env_str("LIGHTER_EXCHANGE_URL", DEFAULT_EXCHANGE_URL),
            server_host: env_str("SERVER_HOST", "0.0.0.0"),
            server_port: env_u16("SERVER_PORT", 8081),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            exchange_url: DEFAULT_EXCHANGE_URL.to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 8081,
        }
    }
}
