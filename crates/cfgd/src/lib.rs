//! Facade crate for cfgd.
//! Re-exports domain/kernel/container primitives and assembles the [`Container`]
//! from the loaded configuration. Keep this crate thin: it composes other crates.
//!
//! ## Usage
//! - Add `cfgd` with the `server` feature for the HTTP surface.
//! - Call [`init`] with the loaded [`ApiConfig`] and the shared [`EventBus`].

mod error;

pub use crate::error::{BootstrapError, BootstrapErrorExt};
pub use cfgd_container as container;
pub use cfgd_domain as domain;
pub use cfgd_event_bus as events;
pub use cfgd_kernel as kernel;

use cfgd_container::{
    AuditListener, BusListener, Configuration, Container, MemoryConfiguration, Registry,
    SnapshotListener,
};
use cfgd_domain::config::{ApiConfig, ConfigurationSeed};
use cfgd_event_bus::EventBus;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use cfgd_kernel::server::router::system_router;
    }
}

/// Builds the container described by `config`.
///
/// 1. Registers every `[[configurations]]` seed.
/// 2. With `[persistence] dir`, restores stored snapshots over the seeds and
///    persists every later mutation.
/// 3. Attaches the audit log and the event bus bridge.
///
/// # Errors
/// * [`BootstrapError::Validation`] for blank or duplicate seed identifiers.
/// * [`BootstrapError::Listener`] if the snapshot directory cannot be used.
pub fn init(config: &ApiConfig, events: &EventBus) -> Result<Container, BootstrapError> {
    validate_seeds(&config.configurations)?;

    let registry = Registry::new();
    registry.replace_all(
        config
            .configurations
            .iter()
            .map(|seed| Box::new(MemoryConfiguration::from(seed)) as Box<dyn Configuration>),
    );

    let container = Container::new(registry);

    if let Some(dir) = &config.persistence.dir {
        let snapshots = SnapshotListener::new(dir).context("Opening snapshot directory")?;
        snapshots.restore(container.registry()).context("Restoring snapshots")?;
        container.add_listener(Arc::new(snapshots));
    }

    container.add_listener(Arc::new(AuditListener));
    container.add_listener(Arc::new(BusListener::new(events.clone())));

    info!(
        configurations = container.registry().len(),
        listeners = container.listeners().len(),
        persistence = config.persistence.dir.is_some(),
        "Container initialized"
    );
    Ok(container)
}

fn validate_seeds(seeds: &[ConfigurationSeed]) -> Result<(), BootstrapError> {
    let mut seen = BTreeSet::new();
    for seed in seeds {
        if seed.id.trim().is_empty() {
            return Err(BootstrapError::Validation {
                message: "configuration id cannot be blank".into(),
                context: None,
            });
        }
        if !seen.insert(seed.id.as_str()) {
            return Err(BootstrapError::Validation {
                message: format!("duplicate configuration id '{}'", seed.id).into(),
                context: None,
            });
        }
    }
    Ok(())
}
