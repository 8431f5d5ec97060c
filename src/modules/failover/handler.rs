//! Failover module implementing `ModuleContract`.

use super::balancer::{Balancer, UpdateSummary};
use super::clock::{Clock, SystemClock};
use super::config::FailoverConfig;
use super::error::{FailoverError, FailoverResult};
use super::topology::Topology;
use crate::config::ConfigLoader;
use crate::module::{
    Capability, MetricsPayload, ModuleConfig, ModuleContract, ModuleError, ModuleManifest,
    ModuleResult, ModuleStatus,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Hosts a [`Balancer`] under the module lifecycle.
///
/// Request handlers obtain the shared balancer through
/// [`balancer`](Self::balancer); discovery feeds it through
/// [`apply_topology`](Self::apply_topology).
pub struct FailoverModule {
    config: FailoverConfig,
    balancer: Arc<Balancer>,
    status: ModuleStatus,
}

impl std::fmt::Debug for FailoverModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverModule")
            .field("status", &self.status)
            .field("balancer", &self.balancer)
            .finish()
    }
}

impl FailoverModule {
    /// Create a module with default configuration and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a module whose balancer reads time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let config = FailoverConfig::default();
        Self {
            balancer: Arc::new(Balancer::with_clock(config.not_modified_tolerance, clock)),
            config,
            status: ModuleStatus::Stopped,
        }
    }

    /// Shared handle to the balancer.
    #[must_use]
    pub fn balancer(&self) -> Arc<Balancer> {
        Arc::clone(&self.balancer)
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &FailoverConfig {
        &self.config
    }

    /// Feed a topology from discovery into the balancer.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `FailoverError::EmptyServerList` for the first
    /// path without servers; nothing is applied in that case.
    pub fn apply_topology(&mut self, topology: &Topology) -> FailoverResult<UpdateSummary> {
        if self.config.strict_topology {
            if let Some(path) = topology.empty_paths().next() {
                warn!(path = %path, "Rejecting topology with empty server list");
                return Err(FailoverError::EmptyServerList(path.to_string()));
            }
        }

        let summary = self.balancer.update(topology);
        self.refresh_status();
        Ok(summary)
    }

    fn parse_config(config: &ModuleConfig) -> ModuleResult<FailoverConfig> {
        match config.document() {
            Some(raw) => ConfigLoader::new()
                .load_str(raw)
                .map_err(|e| ModuleError::ConfigError(e.to_string())),
            None => Ok(FailoverConfig::default()),
        }
    }

    /// Adopt `config`. Its static `[paths]` are merged into the tracked
    /// topology: a listed path takes the configured servers, every other
    /// tracked path (for example one added by discovery) is left as is.
    fn apply_config(&mut self, config: FailoverConfig) {
        self.balancer.set_tolerance(config.not_modified_tolerance);

        if !config.paths.is_empty() {
            let mut topology = self.balancer.topology();
            for (path, servers) in config.paths.iter() {
                topology.insert(path, servers.iter().cloned());
            }
            self.balancer.update(&topology);
        }

        self.config = config;
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        if !self.status.is_operational() {
            return;
        }

        self.status = if self.balancer.is_empty() {
            ModuleStatus::Degraded {
                reason: "no paths tracked".to_string(),
            }
        } else {
            ModuleStatus::Running
        };
    }
}

impl Default for FailoverModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleContract for FailoverModule {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::new(
            "playlist_failover",
            "Active origin selection with error and staleness failover",
        )
        .with_capabilities([
            Capability::Failover,
            Capability::StalenessDetection,
            Capability::HotReload,
            Capability::Metrics,
        ])
    }

    fn init(&mut self, config: ModuleConfig) -> ModuleResult<()> {
        info!("Initializing failover module");
        self.status = ModuleStatus::Initializing;

        let failover_config = match Self::parse_config(&config) {
            Ok(c) => c,
            Err(e) => {
                self.status = ModuleStatus::Error {
                    message: e.to_string(),
                };
                return Err(e);
            },
        };

        if failover_config.paths.is_empty() {
            warn!("No static paths configured, waiting for discovery");
        }

        self.apply_config(failover_config);

        info!(
            tolerance = ?self.config.not_modified_tolerance,
            paths = self.balancer.len(),
            "Failover module initialized"
        );
        Ok(())
    }

    fn start(&mut self) -> ModuleResult<()> {
        if self.status.is_operational() || matches!(self.status, ModuleStatus::Error { .. }) {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "stopped or initializing".to_string(),
            });
        }

        self.status = ModuleStatus::Running;
        self.refresh_status();

        info!(status = %self.status, "Failover module started");
        Ok(())
    }

    fn stop(&mut self) -> ModuleResult<()> {
        if !self.status.is_operational() {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "running".to_string(),
            });
        }

        self.status = ModuleStatus::Stopped;

        info!("Failover module stopped");
        Ok(())
    }

    fn reload(&mut self, config: ModuleConfig) -> ModuleResult<()> {
        info!("Reloading failover configuration");

        let failover_config = Self::parse_config(&config)?;
        self.apply_config(failover_config);

        info!(
            tolerance = ?self.config.not_modified_tolerance,
            "Failover configuration reloaded"
        );
        Ok(())
    }

    fn status(&self) -> ModuleStatus {
        self.status.clone()
    }

    fn metrics(&self) -> MetricsPayload {
        let stats = self.balancer.stats();
        let mut metrics = MetricsPayload::new();

        metrics.counter(
            "topology_updates_total",
            stats.topology_updates.load(Ordering::Relaxed),
        );
        metrics.counter(
            "error_rotations_total",
            stats.error_rotations.load(Ordering::Relaxed),
        );
        metrics.counter(
            "stale_rotations_total",
            stats.stale_rotations.load(Ordering::Relaxed),
        );
        metrics.counter(
            "ignored_errors_total",
            stats.ignored_errors.load(Ordering::Relaxed),
        );
        metrics.counter(
            "modified_notifications_total",
            stats.modified_notifications.load(Ordering::Relaxed),
        );
        metrics.gauge("paths", self.balancer.len() as f64);
        metrics.gauge(
            "tolerance_seconds",
            self.balancer.tolerance().as_secs_f64(),
        );

        metrics
    }
}
