use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::AspenError;

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "ASPEN_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub basic: BasicConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    pub max_connections: u32,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8001".to_string(),
            database_url: "sqlite:data/aspen.db".to_string(),
            loglevel: "info".to_string(),
            max_connections: 8,
        }
    }
}

/// `Cache-Control: public, max-age=N` values, in seconds, per endpoint family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CacheConfig {
    pub schools_max_age: u64,
    pub student_max_age: u64,
    pub students_max_age: u64,
    pub filters_max_age: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            schools_max_age: 300,
            student_max_age: 300,
            students_max_age: 120,
            filters_max_age: 600,
        }
    }
}

impl CacheConfig {
    pub fn schools(&self) -> Duration {
        Duration::from_secs(self.schools_max_age)
    }

    pub fn student(&self) -> Duration {
        Duration::from_secs(self.student_max_age)
    }

    pub fn students(&self) -> Duration {
        Duration::from_secs(self.students_max_age)
    }

    pub fn filters(&self) -> Duration {
        Duration::from_secs(self.filters_max_age)
    }
}

impl Config {
    /// Layering: built-in defaults, then `config.toml` if present, then `ASPEN_*` env vars.
    /// Nested keys use `__`, e.g. `ASPEN_BASIC__DATABASE_URL`.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self, AspenError> {
        Ok(Self::figment().extract()?)
    }
}
