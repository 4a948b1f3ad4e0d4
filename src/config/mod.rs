//! Configuration module for askdata.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, CompressSettings, DatasetSettings, OracleSettings, ServerSettings, Settings,
    SettingsError,
};
