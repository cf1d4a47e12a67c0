//! Utility helpers shared by the Dispatch engine and CLI.

pub mod config;

pub use config::{CONFIG_PATH_ENV, ConfigError, FormConfig, default_config_path, expand_tilde};
