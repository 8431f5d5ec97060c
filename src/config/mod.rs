//! # Configuration
//!
//! TOML configuration files for the failover balancer.
//!
//! ## Example Configuration
//!
//! ```toml
//! not_modified_tolerance = "8s"
//! strict_topology = false
//!
//! [paths]
//! "/live/main.m3u8" = ["http://edge-1", "http://edge-2"]
//! ```

mod error;
mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
