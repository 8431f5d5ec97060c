//! # Modules
//!
//! Built-in modules. Each implements the [`ModuleContract`] trait for uniform
//! lifecycle management.
//!
//! - [`failover`] - Active origin selection for mirrored playlists
//!
//! [`ModuleContract`]: crate::module::ModuleContract

pub mod failover;
