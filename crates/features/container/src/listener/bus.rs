use super::{ContainerListener, ListenerError, ListenerErrorExt};
use crate::command::Command;
use crate::configuration::Configuration;
use cfgd_domain::events::{ChangeKind, ConfigurationChanged, ShutdownRequested};
use cfgd_event_bus::EventBus;

/// Bridges container activity onto the [`EventBus`].
///
/// Mutations become [`ConfigurationChanged`] broadcasts; `EXIT` sets the
/// [`ShutdownRequested`] watch value the server waits on.
#[derive(Debug, Clone)]
pub struct BusListener {
    events: EventBus,
}

impl BusListener {
    #[must_use]
    pub const fn new(events: EventBus) -> Self {
        Self { events }
    }

    fn changed(
        &self,
        config: &dyn Configuration,
        key: &str,
        change: ChangeKind,
    ) -> Result<(), ListenerError> {
        let event = ConfigurationChanged {
            config_id: config.id().to_owned(),
            key: key.to_owned(),
            change,
            value: config.get_property(key).map(str::to_owned),
        };
        self.events.publish(event).context("Publishing configuration change")?;
        Ok(())
    }
}

impl ContainerListener for BusListener {
    fn on_add(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
        self.changed(config, key, ChangeKind::Added)
    }

    fn on_delete(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
        self.changed(config, key, ChangeKind::Deleted)
    }

    fn on_modified(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
        self.changed(config, key, ChangeKind::Modified)
    }

    fn on_command(&self, command: Command) -> Result<(), ListenerError> {
        if command == Command::Exit {
            self.events
                .publish_watch(ShutdownRequested(true))
                .context("Publishing shutdown request")?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bus"
    }
}
