//! Shared utilities for the stock analysis dashboard
//!
//! This crate provides the ambient pieces used by every binary in the
//! workspace: tracing setup and the log configuration that drives it.

pub mod config;
pub mod logging;

pub use config::{LogConfig, LogFormat};
pub use logging::{init_tracing, init_tracing_with};
