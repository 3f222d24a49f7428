//! Server configuration read from the environment.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const STORE_PATH_VAR: &str = "PEOPLE_STORE_PATH";
pub const ADDR_VAR: &str = "PEOPLE_STORE_ADDR";

const DEFAULT_STORE_PATH: &str = "person.json";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub addr: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve the config through `lookup`, falling back to defaults for
    /// unset or empty variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let get = |name| lookup(name).filter(|value| !value.trim().is_empty());

        let store_path = get(STORE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));

        let addr = get(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        if !is_listen_addr(&addr) {
            return Err(ConfigError::InvalidValue {
                name: ADDR_VAR,
                value: addr,
            });
        }

        Ok(Config { store_path, addr })
    }
}

/// Either a socket address (`0.0.0.0:8080`, `[::1]:80`) or `host:port`.
/// Host names are resolved when the listener binds, not here.
fn is_listen_addr(addr: &str) -> bool {
    if addr.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && !host.contains(|c: char| c.is_whitespace() || c == ':' || c == '/')
                && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { name, value } => {
                write!(f, "invalid value for {}: {:?}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
