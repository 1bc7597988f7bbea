//! # Configuration container
//!
//! Turns plain form requests into commands against a registry of named,
//! in-memory configurations and tells every registered listener what changed.
//!
//! * [`Container`] owns the [`Registry`] and the [`Listeners`] and dispatches requests.
//! * [`Outcome`] is what a request produced; rendering it is the caller's job.
//! * [`ContainerListener`] is the observer seam. [`AuditListener`], [`SnapshotListener`]
//!   and [`BusListener`] ship with the crate.
//!
//! ```rust
//! use cfgd_container::{Container, MemoryConfiguration, Method, Outcome, Registry, RequestParams};
//!
//! let registry = Registry::new();
//! registry.insert(MemoryConfiguration::new("db", "Database").with_property("url", "mem://"));
//! let container = Container::new(registry);
//!
//! let params = RequestParams::from_iter([
//!     ("config_id", "db"), ("command", "UPDATE"), ("url", "pg://"),
//! ]);
//! let outcome = container.dispatch(Method::Post, &params);
//! assert!(matches!(outcome, Outcome::MutationAck { ref changed, .. } if changed == &["url"]));
//! ```

mod command;
mod configuration;
mod dispatcher;
mod error;
mod listener;
mod outcome;
mod params;
mod registry;

pub use crate::command::Command;
pub use crate::configuration::{Configuration, ConfigurationSnapshot, MemoryConfiguration};
pub use crate::dispatcher::{Container, Method};
pub use crate::error::{DispatchError, DispatchErrorExt};
pub use crate::listener::{
    AuditListener, BusListener, ContainerListener, ListenerError, ListenerErrorExt, Listeners,
    Notification, SnapshotListener,
};
pub use crate::outcome::{ConfigurationView, Outcome, Property};
pub use crate::params::{PARAM_COMMAND, PARAM_CONFIG, PARAM_CONFIG_ID, PARAM_KEY, PARAM_VALUE, RequestParams};
pub use crate::registry::{Registry, RegistryEntry, SharedConfiguration};
