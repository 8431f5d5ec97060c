//! Active-server selection with staleness and error failover.

use super::clock::{Clock, SystemClock};
use super::config::DEFAULT_NOT_MODIFIED_TOLERANCE;
use super::rotation::{PathState, Reconciled};
use super::topology::{PlaylistResource, Server, Topology};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Failover statistics.
#[derive(Debug, Default)]
pub struct FailoverStats {
    /// Topology updates applied.
    pub topology_updates: AtomicU64,
    /// Rotations caused by an error on the active server.
    pub error_rotations: AtomicU64,
    /// Rotations caused by the active server going stale.
    pub stale_rotations: AtomicU64,
    /// Error reports ignored because the server was not active.
    pub ignored_errors: AtomicU64,
    /// Fresh playlist notifications recorded.
    pub modified_notifications: AtomicU64,
}

impl FailoverStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Total rotations for any reason.
    #[must_use]
    pub fn total_rotations(&self) -> u64 {
        self.error_rotations.load(Ordering::Relaxed) + self.stale_rotations.load(Ordering::Relaxed)
    }
}

/// What an [`Balancer::update`] call did to the tracked paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Paths seen for the first time.
    pub added: usize,
    /// Known paths whose active server survived.
    pub kept: usize,
    /// Known paths whose active server was no longer offered.
    pub reassigned: usize,
    /// Paths whose state was dropped.
    pub removed: usize,
    /// Paths listed without servers.
    pub skipped: usize,
}

/// Iterator over the routing decisions of one [`Balancer::actives`] call.
pub type Actives = std::vec::IntoIter<PlaylistResource>;

struct Inner {
    paths: BTreeMap<String, PathState>,
    tolerance: Duration,
}

/// Decides which origin server is active for every playlist path.
///
/// Each path owns a ring of candidate servers whose head is the active one.
/// The head moves on when the active server reports an error
/// ([`notify_error`](Self::notify_error)) or when it has not served a changed
/// playlist for longer than the tolerance, which is checked when
/// [`actives`](Self::actives) is read.
///
/// All state sits behind one mutex, so the balancer can be shared through an
/// `Arc` between a discovery task and request handlers.
pub struct Balancer {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    stats: Arc<FailoverStats>,
}

impl std::fmt::Debug for Balancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Balancer")
            .field("paths", &inner.paths.keys().collect::<Vec<_>>())
            .field("tolerance", &inner.tolerance)
            .field("clock", &self.clock)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Balancer {
    /// Create a balancer with the default tolerance and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_NOT_MODIFIED_TOLERANCE)
    }

    /// Create a balancer with a custom staleness tolerance.
    #[must_use]
    pub fn with_tolerance(tolerance: Duration) -> Self {
        Self::with_clock(tolerance, Arc::new(SystemClock))
    }

    /// Create a balancer reading time from `clock`.
    #[must_use]
    pub fn with_clock(tolerance: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                paths: BTreeMap::new(),
                tolerance,
            }),
            clock,
            stats: Arc::new(FailoverStats::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("balancer lock poisoned")
    }

    /// Get failover statistics.
    #[must_use]
    pub fn stats(&self) -> &Arc<FailoverStats> {
        &self.stats
    }

    /// Current staleness tolerance.
    #[must_use]
    pub fn tolerance(&self) -> Duration {
        self.lock().tolerance
    }

    /// Change the staleness tolerance. Existing freshness marks are kept.
    pub fn set_tolerance(&self, tolerance: Duration) {
        self.lock().tolerance = tolerance;
    }

    /// Reconcile tracked paths with a new topology.
    ///
    /// Paths missing from `topology` are forgotten. A known path whose active
    /// server is still listed keeps it active, followed by the other listed
    /// servers in their new order, and keeps its freshness. Any other path
    /// takes the list as given, first server active, freshness cleared.
    ///
    /// A path listed with no servers is treated as absent.
    pub fn update(&self, topology: &Topology) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        let mut inner = self.lock();

        let before = inner.paths.len();
        inner
            .paths
            .retain(|path, _| topology.servers(path).is_some_and(|s| !s.is_empty()));
        summary.removed = before - inner.paths.len();

        for (path, servers) in topology.iter() {
            if servers.is_empty() {
                warn!(path = %path, "Path listed without servers, skipping");
                summary.skipped += 1;
                continue;
            }

            if let Some(state) = inner.paths.get_mut(path) {
                let previous = state.active().clone();
                match state.reconcile(servers) {
                    Reconciled::KeptActive => summary.kept += 1,
                    Reconciled::Reassigned => {
                        info!(
                            path = %path,
                            from = %previous,
                            to = %state.active(),
                            reason = "topology",
                            "Active server changed"
                        );
                        summary.reassigned += 1;
                    },
                }
            } else if let Some(state) = PathState::new(servers) {
                debug!(
                    path = %path,
                    active = %state.active(),
                    servers = state.len(),
                    "Tracking new path"
                );
                inner.paths.insert(path.to_string(), state);
                summary.added += 1;
            }
        }

        FailoverStats::bump(&self.stats.topology_updates);
        info!(
            paths = inner.paths.len(),
            added = summary.added,
            kept = summary.kept,
            reassigned = summary.reassigned,
            removed = summary.removed,
            skipped = summary.skipped,
            "Topology updated"
        );

        summary
    }

    /// Record that `server` just served a changed playlist for `path`.
    ///
    /// The server is not checked against the active one. Unknown paths are
    /// ignored.
    pub fn notify_modified(&self, server: &Server, path: &str) {
        let mut inner = self.lock();
        let now = self.clock.now();

        match inner.paths.get_mut(path) {
            Some(state) => {
                state.mark_fresh(now);
                FailoverStats::bump(&self.stats.modified_notifications);
                debug!(path = %path, server = %server, "Playlist modified");
            },
            None => {
                debug!(path = %path, server = %server, "Modification for unknown path ignored");
            },
        }
    }

    /// Report that `server` failed to serve `path`.
    ///
    /// Rotates to the next server only when `server` is the active one, so
    /// late reports about an already demoted server change nothing. Returns
    /// whether a rotation happened.
    pub fn notify_error(&self, server: &Server, path: &str) -> bool {
        let mut inner = self.lock();

        let Some(state) = inner.paths.get_mut(path) else {
            debug!(path = %path, server = %server, "Error for unknown path ignored");
            return false;
        };

        if state.active() != server {
            FailoverStats::bump(&self.stats.ignored_errors);
            debug!(
                path = %path,
                server = %server,
                active = %state.active(),
                "Error from inactive server ignored"
            );
            return false;
        }

        state.rotate();
        FailoverStats::bump(&self.stats.error_rotations);
        info!(
            path = %path,
            from = %server,
            to = %state.active(),
            reason = "error",
            "Active server changed"
        );
        true
    }

    /// Current routing decision for every path, in path order.
    ///
    /// This read has side effects: every path whose active server is stale is
    /// rotated first, all under a single lock acquisition. Each call
    /// re-evaluates staleness.
    pub fn actives(&self) -> Actives {
        let mut inner = self.lock();
        let now = self.clock.now();
        Self::rotate_stale(&mut inner, now, &self.stats);
        Self::snapshot(&inner).into_iter()
    }

    /// Rotate every stale path without reading the result.
    ///
    /// Returns the number of paths rotated.
    pub fn reconcile_staleness(&self) -> usize {
        let mut inner = self.lock();
        let now = self.clock.now();
        Self::rotate_stale(&mut inner, now, &self.stats)
    }

    /// Routing decisions as they stand, without any staleness check.
    #[must_use]
    pub fn peek_actives(&self) -> Vec<PlaylistResource> {
        Self::snapshot(&self.lock())
    }

    /// Active server of a path, without any staleness check.
    #[must_use]
    pub fn active_for(&self, path: &str) -> Option<Server> {
        self.lock().paths.get(path).map(|s| s.active().clone())
    }

    /// Servers of a path in failover order, active first.
    #[must_use]
    pub fn rotation_for(&self, path: &str) -> Option<Vec<Server>> {
        self.lock()
            .paths
            .get(path)
            .map(|s| s.ordered().cloned().collect())
    }

    /// Tracked paths as a topology, each list in failover order.
    ///
    /// Feeding the result back into [`update`](Self::update) changes nothing.
    #[must_use]
    pub fn topology(&self) -> Topology {
        self.lock()
            .paths
            .iter()
            .map(|(path, state)| (path.clone(), state.ordered().cloned().collect::<Vec<_>>()))
            .collect()
    }

    /// Last freshness confirmation of a path's active server.
    #[must_use]
    pub fn fresh_at(&self, path: &str) -> Option<Instant> {
        self.lock().paths.get(path).and_then(PathState::fresh_at)
    }

    /// Tracked paths, in order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.lock().paths.keys().cloned().collect()
    }

    /// Whether a path is tracked.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.lock().paths.contains_key(path)
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().paths.len()
    }

    /// Returns `true` if no path is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().paths.is_empty()
    }

    fn rotate_stale(inner: &mut Inner, now: Instant, stats: &FailoverStats) -> usize {
        let tolerance = inner.tolerance;
        let mut rotated = 0;

        for (path, state) in &mut inner.paths {
            if !state.is_stale(now, tolerance) {
                continue;
            }

            let previous = state.active().clone();
            state.rotate();
            rotated += 1;
            FailoverStats::bump(&stats.stale_rotations);
            info!(
                path = %path,
                from = %previous,
                to = %state.active(),
                reason = "stale",
                tolerance = ?tolerance,
                "Active server changed"
            );
        }

        rotated
    }

    fn snapshot(inner: &Inner) -> Vec<PlaylistResource> {
        inner
            .paths
            .iter()
            .map(|(path, state)| PlaylistResource::new(state.active().clone(), path.as_str()))
            .collect()
    }
}

impl Default for Balancer {
    fn default() -> Self {
        Self::new()
    }
}
