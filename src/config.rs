use serde::Deserialize;
use config::builder::DefaultState;
use config::{Config as ConfigLoader, ConfigBuilder, Environment, File};
use url::Url;

use crate::error::{AppError, Result};
use crate::http::rate_limiter::WindowUnit;

pub const DEFAULT_API_URL: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // General
    pub log_level: String,

    // Endpoint
    pub api_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,

    // Rate limiting: at most `request_limit` submissions per one `window_unit`
    pub window_unit: WindowUnit,
    pub request_limit: i64,

    // HTTP
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub https_only: bool,
    pub submit_retries: u32,
}

impl Config {
    /// Layers defaults, an optional `crpt.*` file and `CRPT_*` environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self::defaults()?
            .add_source(File::with_name("crpt").required(false))
            .add_source(Environment::with_prefix("CRPT").try_parsing(true))
            .build()?;

        Self::from_settings(settings)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = ConfigLoader::builder()
            .set_default("log_level", "info")?
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("window_unit", "seconds")?
            .set_default("request_limit", 10_i64)?
            .set_default("request_timeout_ms", 5_000_i64)?
            .set_default("connect_timeout_ms", 2_000_i64)?
            .set_default("https_only", true)?
            .set_default("submit_retries", 3_i64)?;

        Ok(builder)
    }

    fn from_settings(settings: ConfigLoader) -> Result<Self> {
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_limit <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "request_limit must be positive, got {}",
                self.request_limit
            )));
        }

        let url = Url::parse(&self.api_url)
            .map_err(|e| AppError::InvalidArgument(format!("Invalid api_url {}: {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::InvalidArgument(format!(
                "api_url must use http or https, got {}",
                url.scheme()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn load_with(overrides: &str) -> Result<Config> {
        let settings = Config::defaults()?
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()?;
        Config::from_settings(settings)
    }

    #[test]
    fn test_defaults() {
        let config = load_with("").unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.window_unit, WindowUnit::Seconds);
        assert_eq!(config.request_limit, 10);
        assert!(config.https_only);
        assert!(config.auth_token.is_none());
        assert_eq!(config.submit_retries, 3);
    }

    #[test]
    fn test_overrides() {
        let config = load_with(
            r#"
            window_unit = "minutes"
            request_limit = 120
            auth_token = "secret"
            https_only = false
            "#,
        )
        .unwrap();

        assert_eq!(config.window_unit, WindowUnit::Minutes);
        assert_eq!(config.request_limit, 120);
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert!(!config.https_only);
    }

    #[test]
    fn test_rejects_non_positive_limit() {
        for limit in ["0", "-3"] {
            let result = load_with(&format!("request_limit = {}", limit));
            assert!(matches!(result, Err(AppError::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_rejects_bad_url() {
        let result = load_with(r#"api_url = "not a url""#);
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));

        let result = load_with(r#"api_url = "ftp://ismp.crpt.ru/create""#);
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_unknown_window_unit() {
        let result = load_with(r#"window_unit = "fortnights""#);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
