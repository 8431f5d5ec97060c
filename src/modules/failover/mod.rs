//! # Failover Module
//!
//! Chooses which of several mirrored origin servers is active for each
//! playlist path, and moves on to the next mirror when the active one fails
//! or stops producing fresh playlists.
//!
//! ## Features
//!
//! - **Ordered rotation**: each path cycles through its servers in the order
//!   discovery listed them
//! - **Error failover**: an error on the active server demotes it at once;
//!   late errors about demoted servers are ignored
//! - **Staleness failover**: an active server that has not served a changed
//!   playlist within the tolerance is demoted on the next read
//! - **Topology reconciliation**: updates keep the active server whenever it
//!   is still offered
//!
//! ## Architecture
//!
//! ```text
//! discovery ───── update ─────▶ ┌─────────────────────┐
//!                               │      Balancer       │
//! request layer ◀── actives ────│  path ─▶ PathState  │◀── Clock
//!       │                       │  (ring + fresh_at)  │
//!       └── notify_modified ───▶│                     │
//!           notify_error        └─────────────────────┘
//! ```

pub mod balancer;
pub mod clock;
pub mod config;
pub mod error;
pub mod handler;
pub mod rotation;
pub mod topology;

pub use balancer::{Actives, Balancer, FailoverStats, UpdateSummary};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FailoverConfig, DEFAULT_NOT_MODIFIED_TOLERANCE};
pub use error::{FailoverError, FailoverResult};
pub use handler::FailoverModule;
pub use rotation::{PathState, Reconciled};
pub use topology::{PlaylistResource, Server, Topology};
