//! Module configuration handed over by the control plane.

use std::collections::HashMap;

/// Configuration for a module.
///
/// Either a raw TOML document or named string entries; modules pick the
/// TOML body from the `config` entry first and fall back to the raw body.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
    values: HashMap<String, String>,
    raw: Option<String>,
}

impl ModuleConfig {
    /// Creates a new empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from a raw TOML string.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            values: HashMap::new(),
            raw: Some(raw.into()),
        }
    }

    /// Sets a string value.
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Gets a string value.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Gets the raw configuration string.
    #[must_use]
    pub fn raw_config(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// The TOML document to parse: the `config` entry, else the raw body.
    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.get_string("config").or_else(|| self.raw_config())
    }

    /// Returns `true` if the configuration carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.raw.is_none()
    }
}
