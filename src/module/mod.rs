//! # Module Contract
//!
//! Lifecycle interface for components hosted by a control plane: identity
//! (manifest), configuration, start/stop, status, and metrics.

mod config;
mod contract;
mod error;
mod manifest;
mod status;

pub use config::ModuleConfig;
pub use contract::{MetricsPayload, ModuleContract};
pub use error::{ModuleError, ModuleResult};
pub use manifest::{Capability, ModuleManifest};
pub use status::ModuleStatus;
