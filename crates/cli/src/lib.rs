//! # webterm-cli
//!
//! Pieces of the `webterm` binary that are worth testing on their own: the
//! TOML configuration, logging setup and the sample commands.

pub mod commands;
pub mod config;
pub mod logging;

pub use commands::register_demo_commands;
pub use config::{AppConfig, Overrides};
pub use logging::{init_logging, LogConfig, LogFormat};
