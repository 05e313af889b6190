use std::time::Duration;

use dyn_solver::{ApiSettings, DynSolver};
use rocket::figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "dyn-webhook.toml";
pub const SYSTEM_CONFIG_FILENAME: &str = "/etc/dyn-webhook/dyn-webhook.toml";
pub const DEFAULT_CONFIG: &str = include_str!("../dyn-webhook.toml");

/// Solver settings, read from the `core` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_url: String,
    #[serde(with = "serde_duration")]
    pub request_timeout: Duration,
    #[serde(with = "serde_duration")]
    pub settle_delay: Duration,
}

impl Config {
    pub fn build_solver(&self) -> DynSolver {
        DynSolver::builder()
            .api(ApiSettings {
                url: self.api_url.clone(),
                timeout: self.request_timeout,
            })
            .settle_delay(self.settle_delay)
            .build()
    }
}

pub fn load_config_figment(config_file: Option<&str>) -> Figment {
    let leaf_config = match config_file {
        Some(path) => Toml::file(path).nested(),
        None => Toml::file(CONFIG_FILENAME).nested(),
    };
    Figment::from(rocket::Config::default())
        .merge(Toml::string(DEFAULT_CONFIG).nested())
        .merge(Toml::file(SYSTEM_CONFIG_FILENAME).nested())
        .merge(leaf_config)
        .merge(Env::prefixed("DYN_WEBHOOK_").split("__").global())
}
