use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_RELEASE_TIMEOUT_SECS: u64 = 30;

pub fn compose_config<'de, CFG: Deserialize<'de>>(external_path: &str, env_prefix: &str) -> Result<CFG, ConfigError> {
    Config::builder()

        // Add in a local configuration file
        .add_source(File::with_name(external_path).required(false))

        // Add in settings from the environment (HIVEUTIL_LOG_LEVEL, ...)
        .add_source(Environment::with_prefix(env_prefix))

        .build()?
        .try_deserialize()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HiveutilConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_release_timeout_secs")]
    pub release_timeout_secs: u64,
}

impl HiveutilConfig {
    pub fn release_timeout(&self) -> Duration {
        Duration::from_secs(self.release_timeout_secs)
    }
}

impl Default for HiveutilConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            release_timeout_secs: default_release_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    String::from(DEFAULT_LOG_LEVEL)
}

fn default_release_timeout_secs() -> u64 {
    DEFAULT_RELEASE_TIMEOUT_SECS
}
