use super::{ContainerListener, ListenerError};
use crate::command::Command;
use crate::configuration::Configuration;
use tracing::info;

/// Writes every notification to the `cfgd::audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditListener;

impl ContainerListener for AuditListener {
    fn on_add(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
        info!(
            target: "cfgd::audit",
            config = config.id(),
            key,
            value = config.get_property(key).unwrap_or_default(),
            "Property added"
        );
        Ok(())
    }

    fn on_delete(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
        info!(target: "cfgd::audit", config = config.id(), key, "Property deleted");
        Ok(())
    }

    fn on_modified(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
        info!(
            target: "cfgd::audit",
            config = config.id(),
            key,
            value = config.get_property(key).unwrap_or_default(),
            "Property modified"
        );
        Ok(())
    }

    fn on_command(&self, command: Command) -> Result<(), ListenerError> {
        info!(target: "cfgd::audit", command = %command, "Server command received");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "audit"
    }
}
