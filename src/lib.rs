mod config;
mod person;
mod store;

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
pub mod http;

pub use config::{Config, ConfigError};
pub use person::{People, Person};
pub use store::{PersonStore, StoreError};
