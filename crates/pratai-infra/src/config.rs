//! Client configuration loader.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`ClientConfig`]. Falls back to defaults when the file is missing or
//! malformed. Environment variables override file values.

use std::path::Path;

use pratai_types::config::ClientConfig;
use pratai_types::delivery::DeliveryMode;

/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "PRATAI_API_URL";

/// Environment variable overriding `delivery_mode`.
pub const DELIVERY_MODE_ENV: &str = "PRATAI_DELIVERY_MODE";

/// Load configuration from `{data_dir}/config.toml`, then apply environment
/// overrides.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let mut config = read_config_file(data_dir).await;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config
}

async fn read_config_file(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

/// Apply overrides from a variable lookup. Invalid values are logged and
/// ignored.
pub fn apply_env_overrides(config: &mut ClientConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }
    if let Some(raw) = lookup(DELIVERY_MODE_ENV) {
        match raw.parse::<DeliveryMode>() {
            Ok(mode) => config.delivery_mode = mode,
            Err(err) => tracing::warn!("Ignoring {DELIVERY_MODE_ENV}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pratai_types::delivery::RevealUnit;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_file(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
    }

    #[tokio::test]
    async fn valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
api_base_url = "http://chat.internal:9000/api"
delivery_mode = "simulated"
reveal_unit = "word"
reveal_delay_ms = 5
"#,
        )
        .await
        .unwrap();

        let config = read_config_file(tmp.path()).await;
        assert_eq!(config.api_base_url, "http://chat.internal:9000/api");
        assert_eq!(config.delivery_mode, DeliveryMode::Simulated);
        assert_eq!(config.reveal_unit, RevealUnit::Word);
        assert_eq!(config.reveal_delay_ms, 5);
        assert_eq!(config.history_limit, 50);
    }

    #[tokio::test]
    async fn invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = read_config_file(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, |name| match name {
            API_URL_ENV => Some("http://other:8000/api".to_string()),
            DELIVERY_MODE_ENV => Some("single-shot".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://other:8000/api");
        assert_eq!(config.delivery_mode, DeliveryMode::SingleShot);
    }

    #[test]
    fn invalid_env_mode_is_ignored() {
        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, |name| {
            (name == DELIVERY_MODE_ENV).then(|| "carrier-pigeon".to_string())
        });
        assert_eq!(config.delivery_mode, DeliveryMode::Streaming);
    }
}
