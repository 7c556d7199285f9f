//! Shared utilities for the equity research pipeline
//!
//! This crate provides common functionality used across the workspace:
//! logging setup and helpers for reading configuration from the environment.

pub mod config;
pub mod logging;

pub use config::{ConfigError, EnvLookup, env_lookup};
pub use logging::{init_tracing, init_tracing_with_default};
