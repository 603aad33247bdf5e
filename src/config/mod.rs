//! Configuration module
//!
//! Settings for the engine, the remote catalog and logging, loaded from a
//! TOML file in the user's config directory.

pub mod config;

pub use config::{CatalogConfig, Config, EngineConfig, LoggingConfig};
