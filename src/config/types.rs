//! The configuration structs used to build the AppConfig, and their impls.
use std::{net::SocketAddr, path::Path, time::Duration};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use lazy_regex::regex_is_match;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub store_config: StoreConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_uri: SecretString,
    pub pool_size: usize,
    pub connection_timeout_secs: u64,
    #[serde(default)]
    pub insert_mode: InsertMode,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

/// How a new subscriber record gets written.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// Read the key, write only if it was vacant. Two concurrent submissions of the same
    /// address can both see a vacant key, in which case the later write wins.
    #[default]
    CheckThenPut,
    /// A single conditional "create if not exists" write.
    PutIfAbsent,
}

// ###################################
// ->   IMPLs
// ###################################
impl AppConfig {
    /// Layers `base.toml`, then `{environment}.toml` from `config_dir`, then `APP_`-prefixed
    /// environment variables (`__` separates nested keys, e.g. `APP_NET_CONFIG__APP_PORT`).
    pub fn load_from(config_dir: &Path, environment: Environment) -> ConfigResult<Self> {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let config: AppConfig = Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        config.store_config.validate()?;

        Ok(config)
    }
}

impl NetConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.app_port))
    }
}

impl StoreConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if matches!(self.backend, StoreBackend::Redis)
            && !regex_is_match!(r"^rediss?://[^\s]+$", self.redis_uri.expose_secret())
        {
            return Err(ConfigError::InvalidRedisUri);
        }
        Ok(())
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

// ###################################
// ->   TRY FROMs
// ###################################

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}

// ###################################
// ->   TESTS
// ###################################
