//! Command-line configuration: built-in defaults, an optional TOML file and
//! command-line flags, merged in that order of increasing precedence.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_store_config;
pub use models::StoreAppConfig;
