use core::fmt::{Debug, Display};
use core::num::NonZeroU32;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "voting.toml";
pub const ENV_PREFIX: &str = "VOTING_";

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VotingModeKind {
    #[default]
    Selection,
    Rating,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    pub admin_password: String,
    #[serde(default)]
    pub voting_mode: VotingModeKind,
    /// Only meaningful in selection mode.
    #[serde(default = "default_required_selections")]
    pub required_selections: NonZeroU32,
    /// JSON file of the shape `{"presentations": [...]}` loaded at startup.
    #[serde(default)]
    pub roster_file: Option<PathBuf>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default = "default_selected_theme")]
    pub selected_theme: u8,
    #[serde(default)]
    pub random_theme: bool,
}

const fn default_listen_address() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3000))
}

const fn default_required_selections() -> NonZeroU32 {
    match NonZeroU32::new(5) {
        Some(value) => value,
        None => unreachable!(),
    }
}

const fn default_max_body_bytes() -> usize {
    64 * 1024
}

const fn default_selected_theme() -> u8 {
    6
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
    #[error("admin_password must not be empty")]
    EmptyAdminPassword,
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

pub fn get_config() -> Result<Config, ConfigError> {
    get_config_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// Later providers win, so environment variables override the file.
pub fn get_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    if config.admin_password.trim().is_empty() {
        return Err(ConfigError::EmptyAdminPassword);
    }
    Ok(config)
}
