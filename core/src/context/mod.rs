mod config;
mod error;

pub use config::{CurseConfig, CurseConfigExt, config_path};
pub use error::ConfigError;
