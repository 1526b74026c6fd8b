use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use pricing_engine::RateProviderConfig;
use serde::Deserialize;
use tracing::Level;

/// Environment variable selecting the deployment profile
pub const PROFILE_ENV: &str = "PRICING_ENV";

/// Deployment profile, picks the config overlay file and default log level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Devel,
    Test,
    Staging,
    Production,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Devel => "devel",
            Profile::Test => "test",
            Profile::Staging => "staging",
            Profile::Production => "production",
        }
    }

    pub fn default_log_level(&self) -> Level {
        match self {
            Profile::Devel | Profile::Test => Level::DEBUG,
            Profile::Staging => Level::WARN,
            Profile::Production => Level::ERROR,
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "devel" => Ok(Profile::Devel),
            "test" => Ok(Profile::Test),
            "staging" => Ok(Profile::Staging),
            "production" => Ok(Profile::Production),
            other => Err(ConfigError::Message(format!(
                "Unknown {PROFILE_ENV} profile: {other}"
            ))),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub rates: RatesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(skip)]
    pub profile: Profile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("Invalid server address: {e}")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Path of the JSON catalog (`prices` + `vat_bands`)
    pub path: PathBuf,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Base URL of the currency converter API
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub currencies_ttl_secs: u64,
    pub rate_ttl_secs: u64,
}

impl RatesConfig {
    pub fn provider_config(&self) -> RateProviderConfig {
        RateProviderConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            currencies_ttl: Duration::from_secs(self.currencies_ttl_secs),
            rate_ttl: Duration::from_secs(self.rate_ttl_secs),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Overrides the profile's default level
    #[serde(default)]
    pub level: Option<String>,
}

impl AppConfig {
    /// Load from `config/` using the profile named by `PRICING_ENV`
    pub fn load() -> Result<Self, ConfigError> {
        let profile = match std::env::var(PROFILE_ENV) {
            Ok(name) => name.parse()?,
            Err(_) => Profile::default(),
        };
        Self::load_from(Path::new("config"), profile)
    }

    /// Defaults, then `default.toml`, then `<profile>.toml`, then
    /// `PRICING__SECTION__KEY` environment variables.
    pub fn load_from(config_dir: &Path, profile: Profile) -> Result<Self, ConfigError> {
        let defaults = RateProviderConfig::default();

        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("catalog.path", "pricing.json")?
            .set_default("catalog.ttl_secs", 60 * 60)?
            .set_default("rates.base_url", defaults.base_url)?
            .set_default("rates.timeout_secs", defaults.timeout.as_secs())?
            .set_default("rates.currencies_ttl_secs", defaults.currencies_ttl.as_secs())?
            .set_default("rates.rate_ttl_secs", defaults.rate_ttl.as_secs())?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", profile.as_str())))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("PRICING")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.profile = profile;
        Ok(config)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        match &self.logging.level {
            Some(level) => level
                .parse()
                .map_err(|_| ConfigError::Message(format!("Invalid logging level: {level}"))),
            None => Ok(self.profile.default_log_level()),
        }
    }
}
