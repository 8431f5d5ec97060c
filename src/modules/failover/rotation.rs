//! Per-path rotation ring and freshness tracking.

use super::topology::Server;
use std::time::{Duration, Instant};

/// Outcome of reconciling a path with a new server list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The active server is still offered and stays active.
    KeptActive,
    /// The active server was dropped; the first listed server took over.
    Reassigned,
}

/// Rotation state of one path.
///
/// Servers form a ring addressed by `head`; the server at `head` is the
/// active one. Rotation and freshness live in the same record so they are
/// created and dropped together.
#[derive(Debug, Clone)]
pub struct PathState {
    servers: Vec<Server>,
    head: usize,
    fresh_at: Option<Instant>,
}

impl PathState {
    /// Build a ring from a server list, first server active.
    ///
    /// Duplicates are collapsed keeping the first occurrence. Returns `None`
    /// for an empty list.
    #[must_use]
    pub fn new<'a>(servers: impl IntoIterator<Item = &'a Server>) -> Option<Self> {
        let servers = unique(servers);
        if servers.is_empty() {
            return None;
        }

        Some(Self {
            servers,
            head: 0,
            fresh_at: None,
        })
    }

    /// The active server.
    #[must_use]
    pub fn active(&self) -> &Server {
        &self.servers[self.head]
    }

    /// Servers in failover order, active first.
    pub fn ordered(&self) -> impl Iterator<Item = &Server> {
        self.servers[self.head..]
            .iter()
            .chain(self.servers[..self.head].iter())
    }

    /// Number of servers in the ring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Always `false`: an empty ring is never constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Last time the active server confirmed a fresh playlist.
    #[must_use]
    pub fn fresh_at(&self) -> Option<Instant> {
        self.fresh_at
    }

    /// Record that the active server served a changed playlist at `at`.
    pub fn mark_fresh(&mut self, at: Instant) {
        self.fresh_at = Some(at);
    }

    /// Hand the active role to the next server and clear freshness.
    ///
    /// A single-server ring keeps its server but still loses freshness, which
    /// grants it a new grace period.
    pub fn rotate(&mut self) {
        self.head = (self.head + 1) % self.servers.len();
        self.fresh_at = None;
    }

    /// Whether the active server has gone longer than `tolerance` without
    /// serving a fresh playlist. Never true before the first confirmation.
    #[must_use]
    pub fn is_stale(&self, now: Instant, tolerance: Duration) -> bool {
        match self.fresh_at {
            Some(fresh_at) => now.saturating_duration_since(fresh_at) > tolerance,
            None => false,
        }
    }

    /// Replace the server set while keeping the active server if possible.
    ///
    /// `servers` must not be empty.
    pub fn reconcile(&mut self, servers: &[Server]) -> Reconciled {
        debug_assert!(!servers.is_empty());

        let active = self.active().clone();
        if servers.contains(&active) {
            let rest = servers.iter().filter(|s| **s != active);
            self.servers = unique(std::iter::once(&active).chain(rest));
            self.head = 0;
            Reconciled::KeptActive
        } else {
            self.servers = unique(servers);
            self.head = 0;
            self.fresh_at = None;
            Reconciled::Reassigned
        }
    }
}

fn unique<'a>(servers: impl IntoIterator<Item = &'a Server>) -> Vec<Server> {
    let mut out: Vec<Server> = Vec::new();
    for server in servers {
        if !out.contains(server) {
            out.push(server.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servers(ids: &[&str]) -> Vec<Server> {
        ids.iter().map(|id| Server::from(*id)).collect()
    }

    fn ordered(state: &PathState) -> Vec<&str> {
        state.ordered().map(Server::as_str).collect()
    }

    #[test]
    fn test_empty_list_builds_nothing() {
        assert!(PathState::new(&Vec::<Server>::new()).is_none());
    }

    #[test]
    fn test_duplicates_collapsed() {
        let state = PathState::new(&servers(&["a", "b", "a", "c", "b"])).unwrap();
        assert_eq!(ordered(&state), vec!["a", "b", "c"]);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_rotate_cycles() {
        let mut state = PathState::new(&servers(&["a", "b", "c"])).unwrap();
        assert_eq!(state.active().as_str(), "a");

        state.rotate();
        assert_eq!(ordered(&state), vec!["b", "c", "a"]);
        state.rotate();
        assert_eq!(state.active().as_str(), "c");
        state.rotate();
        assert_eq!(state.active().as_str(), "a");
    }

    #[test]
    fn test_rotate_clears_freshness() {
        let mut state = PathState::new(&servers(&["solo"])).unwrap();
        state.mark_fresh(Instant::now());

        state.rotate();
        assert_eq!(state.active().as_str(), "solo");
        assert!(state.fresh_at().is_none());
    }

    #[test]
    fn test_staleness_requires_confirmation() {
        let mut state = PathState::new(&servers(&["a", "b"])).unwrap();
        let start = Instant::now();
        let tolerance = Duration::from_secs(8);

        assert!(!state.is_stale(start + Duration::from_secs(3600), tolerance));

        state.mark_fresh(start);
        assert!(!state.is_stale(start + Duration::from_secs(8), tolerance));
        assert!(state.is_stale(start + Duration::from_millis(8001), tolerance));
    }

    #[test]
    fn test_reconcile_keeps_active() {
        let mut state = PathState::new(&servers(&["a", "b", "c"])).unwrap();
        state.rotate();
        let fresh = Instant::now();
        state.mark_fresh(fresh);

        let outcome = state.reconcile(&servers(&["d", "c", "b"]));
        assert_eq!(outcome, Reconciled::KeptActive);
        assert_eq!(ordered(&state), vec!["b", "d", "c"]);
        assert_eq!(state.fresh_at(), Some(fresh));
    }

    #[test]
    fn test_reconcile_replaces_dropped_active() {
        let mut state = PathState::new(&servers(&["a", "b"])).unwrap();
        state.mark_fresh(Instant::now());

        let outcome = state.reconcile(&servers(&["c", "b"]));
        assert_eq!(outcome, Reconciled::Reassigned);
        assert_eq!(ordered(&state), vec!["c", "b"]);
        assert!(state.fresh_at().is_none());
    }

    #[test]
    fn test_reconcile_collapses_duplicates() {
        let mut state = PathState::new(&servers(&["a", "b"])).unwrap();

        let outcome = state.reconcile(&servers(&["b", "a", "b", "c", "a"]));
        assert_eq!(outcome, Reconciled::KeptActive);
        assert_eq!(ordered(&state), vec!["a", "b", "c"]);
        assert_eq!(state.len(), 3);

        let outcome = state.reconcile(&servers(&["d", "c", "d", "c"]));
        assert_eq!(outcome, Reconciled::Reassigned);
        assert_eq!(ordered(&state), vec!["d", "c"]);
        assert_eq!(state.len(), 2);
    }
}
