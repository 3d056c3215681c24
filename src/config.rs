//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;
use strum::{Display, EnumString};

/// Runtime mode. Controls error envelope detail and request logging.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Verbose errors, request logging.
    #[default]
    Development,
    /// Internal details are never sent to clients.
    Production,
    /// Test runs.
    Test,
}

impl Mode {
    /// Check if running in production.
    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production)
    }

    /// Check if running in development.
    pub fn is_development(&self) -> bool {
        matches!(self, Mode::Development)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server ===
    /// Runtime mode (`APP_ENV`, or `NODE_ENV` for compatibility).
    ///
    /// Resolved by [`Config::from_vars`]; `APP_ENV` wins when both are set.
    #[serde(skip)]
    pub app_env: Mode,

    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as static files.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Page size used when a request omits `limit`.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u64,

    // === Rate Limiting ===
    /// Requests allowed per client within one window.
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    /// Rate limit window length in minutes.
    #[serde(default = "default_rate_limit_window_min")]
    pub rate_limit_window_min: u64,

    // === Database ===
    /// Connection URL template with `<username>`, `<password>` and `<DB>`
    /// placeholders.
    #[serde(default)]
    pub database_uri: Option<String>,

    /// Database name used in development mode.
    #[serde(default)]
    pub database_dev: Option<String>,

    /// Database name used in production mode.
    #[serde(default)]
    pub database_prod: Option<String>,

    /// Database name used in any other mode.
    #[serde(default)]
    pub database_test: Option<String>,

    /// Database username.
    #[serde(default)]
    pub database_username: Option<String>,

    /// Database password.
    #[serde(default)]
    pub database_password: Option<String>,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

/// Mode variables, read separately so both may be set at once.
#[derive(Debug, Deserialize)]
struct ModeVars {
    #[serde(default)]
    app_env: Option<Mode>,
    #[serde(default)]
    node_env: Option<Mode>,
}

impl ModeVars {
    fn resolve(self) -> Mode {
        self.app_env.or(self.node_env).unwrap_or_default()
    }
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_body_limit() -> usize {
    10 * 1024 // 10kb
}

fn default_page_limit() -> u64 {
    25
}

fn default_rate_limit_max() -> u32 {
    100
}

fn default_rate_limit_window_min() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_env: Mode::default(),
            port: default_port(),
            static_dir: default_static_dir(),
            body_limit_bytes: default_body_limit(),
            default_page_limit: default_page_limit(),
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_min: default_rate_limit_window_min(),
            database_uri: None,
            database_dev: None,
            database_prod: None,
            database_test: None,
            database_username: None,
            database_password: None,
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from `(NAME, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let mut config: Config = envy::from_iter(vars.clone())?;
        config.app_env = envy::from_iter::<_, ModeVars>(vars)?.resolve();
        Ok(config)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.rate_limit_max == 0 {
            return Err("RATE_LIMIT_MAX must be at least 1".to_string());
        }

        if self.rate_limit_window_min == 0 {
            return Err("RATE_LIMIT_WINDOW_MIN must be at least 1".to_string());
        }

        if self.body_limit_bytes == 0 {
            return Err("BODY_LIMIT_BYTES must be greater than 0".to_string());
        }

        if self.default_page_limit == 0 {
            return Err("DEFAULT_PAGE_LIMIT must be at least 1".to_string());
        }

        Ok(())
    }

    /// Database name for the current mode.
    pub fn database_name(&self) -> &str {
        let name = match self.app_env {
            Mode::Development => &self.database_dev,
            Mode::Production => &self.database_prod,
            Mode::Test => &self.database_test,
        };
        name.as_deref().unwrap_or_default()
    }

    /// Rate limit window as a duration.
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_min.saturating_mul(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config, envy::Error> {
        Config::from_vars(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn default_values_are_sensible() {
        let config = from_vars(&[]).unwrap();

        assert_eq!(config.app_env, Mode::Development);
        assert_eq!(config.port, 3000);
        assert_eq!(config.body_limit_bytes, 10 * 1024);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_mode_and_port_from_environment() {
        let config = from_vars(&[("APP_ENV", "production"), ("PORT", "8081")]).unwrap();

        assert_eq!(config.app_env, Mode::Production);
        assert!(config.app_env.is_production());
        assert_eq!(config.port, 8081);
    }

    #[test]
    fn accepts_node_env_alias() {
        let config = from_vars(&[("NODE_ENV", "test")]).unwrap();
        assert_eq!(config.app_env, Mode::Test);
    }

    #[test]
    fn app_env_wins_over_node_env() {
        let config = from_vars(&[("APP_ENV", "production"), ("NODE_ENV", "development")]).unwrap();
        assert_eq!(config.app_env, Mode::Production);

        let config = from_vars(&[("APP_ENV", "test"), ("NODE_ENV", "test")]).unwrap();
        assert_eq!(config.app_env, Mode::Test);
    }

    #[test]
    fn huge_window_saturates() {
        let config = Config {
            rate_limit_window_min: u64::MAX / 2,
            ..Config::default()
        };

        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit_window(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn selects_database_by_mode() {
        let vars = [
            ("DATABASE_DEV", "app_dev"),
            ("DATABASE_PROD", "app_prod"),
            ("DATABASE_TEST", "app_test"),
        ];

        let mut config = from_vars(&vars).unwrap();
        assert_eq!(config.database_name(), "app_dev");

        config.app_env = Mode::Production;
        assert_eq!(config.database_name(), "app_prod");

        config.app_env = Mode::Test;
        assert_eq!(config.database_name(), "app_test");
    }

    #[test]
    fn validate_rejects_zero_rate_limit() {
        let config = Config {
            rate_limit_max: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_window() {
        let config = Config {
            rate_limit_window_min: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn mode_parses_from_lowercase_strings() {
        assert_eq!("production".parse::<Mode>().unwrap(), Mode::Production);
        assert_eq!(Mode::Development.to_string(), "development");
    }
}
