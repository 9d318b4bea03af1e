//! formpilot CLI library
//!
//! Exposes the command layer and configuration for integration testing.

pub mod cli;
pub mod config;

pub use config::{AutomationConfig, Config, ConfigError};
