//! Configuration types for Orderline.
//!
//! `AppConfig` represents the `config.toml` read from the data directory.
//! Every section and field has a default, so an empty or missing file is a
//! valid configuration. Environment variables and CLI flags are layered on
//! top by the binary.

use secrecy::SecretString;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub bridge: BridgeConfig,
    pub order: OrderFormatConfig,
    pub events: EventsConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// The single origin allowed cross-origin access. `None` allows any.
    pub allowed_origin: Option<String>,
    /// Directory holding the operator page and static assets.
    pub web_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origin: None,
            web_dir: "web".to_string(),
        }
    }
}

/// Settings for the WhatsApp Web bridge.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Base URL of the bridge service.
    pub api_url: String,
    /// Global API key for the bridge. Never logged.
    pub api_key: SecretString,
    /// Fixed client identifier; names the bridge instance and the local
    /// session record so a restart reuses the authenticated session.
    pub client_id: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8085".to_string(),
            api_key: SecretString::from(String::new()),
            client_id: "pizza-order-bot".to_string(),
            poll_interval_secs: 5,
            request_timeout_secs: 60,
        }
    }
}

/// Order message rendering settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrderFormatConfig {
    pub currency_symbol: String,
    /// First line of every order message.
    pub title: String,
}

impl Default for OrderFormatConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            title: "🍕 *New Pizza Order*".to_string(),
        }
    }
}

/// Event bus settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast channel capacity per bus.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.server.allowed_origin.is_none());
        assert_eq!(config.server.web_dir, "web");
        assert_eq!(config.bridge.client_id, "pizza-order-bot");
        assert_eq!(config.bridge.poll_interval_secs, 5);
        assert_eq!(config.order.currency_symbol, "₹");
        assert_eq!(config.events.capacity, 64);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.bridge.api_url, "http://127.0.0.1:8085");
        assert!(config.bridge.api_key.expose_secret().is_empty());
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let toml_str = r#"
[server]
port = 8080
allowed_origin = "https://pizza.example.com"

[bridge]
api_url = "http://bridge:8080"
api_key = "s3cret"
client_id = "store-42"

[order]
currency_symbol = "$"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.server.allowed_origin.as_deref(),
            Some("https://pizza.example.com")
        );
        assert_eq!(config.bridge.api_url, "http://bridge:8080");
        assert_eq!(config.bridge.api_key.expose_secret(), "s3cret");
        assert_eq!(config.bridge.client_id, "store-42");
        assert_eq!(config.bridge.poll_interval_secs, 5);
        assert_eq!(config.order.currency_symbol, "$");
        assert_eq!(config.order.title, "🍕 *New Pizza Order*");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config: AppConfig = toml::from_str("[bridge]\napi_key = \"s3cret\"").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
    }
}
