//! # Domain Models
//!
//! Plain data shared across the workspace: the server configuration tree, the
//! configuration seeds it carries, and the events published on the bus.
//! Keep it lean: `serde` only, no I/O, no logic beyond defaults.

pub mod config;
pub mod constants;
pub mod events;
