//! Configuration loader for Orderline.
//!
//! Reads `config.toml` (from the data directory unless a path is given) and
//! deserializes it into [`AppConfig`]. Falls back to defaults when the file
//! is missing or malformed, so a bad config never keeps the server down.

use std::path::Path;

use orderline_types::config::AppConfig;

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
pub async fn load_app_config(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", path.display());
            config
        }
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_app_config(&tmp.path().join("config.toml")).await;
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.bridge.client_id, "pizza-order-bot");
    }

    #[tokio::test]
    async fn valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
[server]
port = 4000
allowed_origin = "https://order.example.com"

[bridge]
client_id = "branch-7"
poll_interval_secs = 2
"#,
        )
        .await
        .unwrap();

        let config = load_app_config(&path).await;
        assert_eq!(config.server.port, 4000);
        assert_eq!(
            config.server.allowed_origin.as_deref(),
            Some("https://order.example.com")
        );
        assert_eq!(config.bridge.client_id, "branch-7");
        assert_eq!(config.bridge.poll_interval_secs, 2);
    }

    #[tokio::test]
    async fn invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_app_config(&path).await;
        assert_eq!(config.server.port, 3000);
    }
}
