//! # Playlist Failover
//!
//! Decides which of several redundant origin servers is active for each
//! mirrored HLS playlist, and demotes the active server when it errors or
//! stops serving fresh playlists.
//!
//! ## Overview
//!
//! The [`modules::failover::Balancer`] tracks one rotation of servers per
//! playlist path. Discovery feeds it topology updates, the request layer
//! reads the routing decisions with
//! [`actives`](modules::failover::Balancer::actives) and reports outcomes
//! back through `notify_modified` / `notify_error`.
//!
//! ```
//! use playlist_failover::modules::failover::{Balancer, Server, Topology};
//!
//! let balancer = Balancer::new();
//! balancer.update(&Topology::new().with_path("/live.m3u8", ["edge-1", "edge-2"]));
//!
//! let edge_1 = Server::from("edge-1");
//! balancer.notify_error(&edge_1, "/live.m3u8");
//!
//! let active = balancer.actives().next().unwrap();
//! assert_eq!(active.server.as_str(), "edge-2");
//! ```
//!
//! The balancer can also be hosted as a [`module::ModuleContract`] through
//! [`modules::failover::FailoverModule`], configured from TOML via
//! [`config::ConfigLoader`].

pub mod config;
pub mod module;
pub mod modules;
