//! Servers, paths, and the topology produced by discovery.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier of an origin server mirroring one or more playlists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Server(String);

impl Server {
    /// Create a server identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Server {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Server {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Routing decision for one path: send requests for `path` to `server`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistResource {
    /// Currently active server.
    pub server: Server,
    /// Playlist path.
    pub path: String,
}

impl PlaylistResource {
    /// Create a routing decision.
    #[must_use]
    pub fn new(server: Server, path: impl Into<String>) -> Self {
        Self {
            server,
            path: path.into(),
        }
    }
}

impl fmt::Display for PlaylistResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.server, self.path)
    }
}

/// Mapping from playlist path to its ordered list of candidate servers.
///
/// The order of servers is a preference hint: it decides the first active
/// server of a brand-new path and the failover order after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topology {
    paths: BTreeMap<String, Vec<Server>>,
}

impl Topology {
    /// Create an empty topology.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path with its servers.
    #[must_use]
    pub fn with_path<S>(
        mut self,
        path: impl Into<String>,
        servers: impl IntoIterator<Item = S>,
    ) -> Self
    where
        S: Into<Server>,
    {
        self.insert(path, servers);
        self
    }

    /// Insert or replace the servers of a path.
    pub fn insert<S>(&mut self, path: impl Into<String>, servers: impl IntoIterator<Item = S>)
    where
        S: Into<Server>,
    {
        self.paths
            .insert(path.into(), servers.into_iter().map(Into::into).collect());
    }

    /// Servers listed for a path.
    #[must_use]
    pub fn servers(&self, path: &str) -> Option<&[Server]> {
        self.paths.get(path).map(Vec::as_slice)
    }

    /// Whether the path is listed.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains_key(path)
    }

    /// Iterate over `(path, servers)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Server])> {
        self.paths
            .iter()
            .map(|(path, servers)| (path.as_str(), servers.as_slice()))
    }

    /// Paths listed with no servers at all.
    pub fn empty_paths(&self) -> impl Iterator<Item = &str> {
        self.paths
            .iter()
            .filter(|(_, servers)| servers.is_empty())
            .map(|(path, _)| path.as_str())
    }

    /// Number of paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no path is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<P, S> FromIterator<(P, Vec<S>)> for Topology
where
    P: Into<String>,
    S: Into<Server>,
{
    fn from_iter<I: IntoIterator<Item = (P, Vec<S>)>>(iter: I) -> Self {
        let mut topology = Self::new();
        for (path, servers) in iter {
            topology.insert(path, servers);
        }
        topology
    }
}
