//! Configuration module for Tally.
//!
//! Loads `tally.toml` settings and converts them into engine, discovery and
//! refinement options.

mod settings;

pub use settings::{
    expand_env_vars, CurrencySettings, DiscoverySettings, EngineSettings, RefineSettings,
    Settings, SettingsError, CONFIG_ENV_VAR,
};
