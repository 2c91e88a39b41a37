//! The configuration structs used to build the AppConfig, and their impls.
use std::{net::SocketAddr, path::Path};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};
use crate::web::types::ValidEmail;

/// Prefix of the environment variables that override values from the config files.
/// Nested keys are separated by `__`, e.g. `APP_NET_CONFIG__APP_PORT=9000`.
const ENV_PREFIX: &str = "APP_";

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub subscriber_config: SubscriberConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SubscriberConfig {
    /// Addresses that are already subscribed when the process starts.
    #[serde(default)]
    pub seed_emails: Vec<String>,
}

// ###################################
// ->   IMPLs
// ###################################
impl AppConfig {
    /// Layers `base.toml`, then `{environment}.toml` from `config_dir`, then the `APP_` env variables.
    pub fn load(config_dir: impl AsRef<Path>, environment: Environment) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let config = Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}

impl NetConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.app_port))
    }
}

impl SubscriberConfig {
    /// Parses every seed address, failing on the first one that isn't a valid email.
    pub fn valid_seeds(&self) -> ConfigResult<Vec<ValidEmail>> {
        self.seed_emails
            .iter()
            .map(|email| {
                ValidEmail::parse(email).map_err(|er| ConfigError::InvalidEmail {
                    email: email.clone(),
                    reason: er.to_string(),
                })
            })
            .collect()
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
