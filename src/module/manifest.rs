//! Module manifest and capability declarations.

use std::collections::HashSet;

/// Capabilities that a module can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Picks one active origin per resource and fails over between mirrors.
    Failover,

    /// Demotes origins that stop producing fresh content.
    StalenessDetection,

    /// Module supports hot configuration reload.
    HotReload,

    /// Module exports metrics.
    Metrics,
}

/// Identity and capabilities a module reports to its host.
#[derive(Debug, Clone)]
pub struct ModuleManifest {
    /// Unique name of the module.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Crate version the module was built from.
    pub version: &'static str,

    /// Capabilities provided by this module.
    pub capabilities: HashSet<Capability>,
}

impl ModuleManifest {
    /// Manifest stamped with this crate's version and no capabilities.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: env!("CARGO_PKG_VERSION"),
            capabilities: HashSet::new(),
        }
    }

    /// Declare capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    /// Checks if the module has a specific capability.
    #[must_use]
    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }
}
