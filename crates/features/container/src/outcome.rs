use crate::command::Command;
use crate::configuration::Configuration;
use crate::error::DispatchError;
use crate::registry::RegistryEntry;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

/// Read-only copy of a configuration taken while handling a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationView {
    pub id: String,
    pub display_name: String,
    pub properties: Vec<Property>,
}

impl ConfigurationView {
    #[must_use]
    pub fn of(config: &dyn Configuration) -> Self {
        Self {
            id: config.id().to_owned(),
            display_name: config.display_name().to_owned(),
            properties: config
                .properties()
                .into_iter()
                .map(|(key, value)| Property { key, value })
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.iter().find(|p| p.key == key).map(|p| p.value.as_str())
    }
}

/// What a single request produced. Renderers turn it into a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Every registered configuration plus the server-level commands.
    Index { entries: Vec<RegistryEntry>, commands: Vec<Command> },
    ConfigView { config: ConfigurationView, commands: Vec<Command> },
    AddForm { config: ConfigurationView },
    UpdateFormRequested { config: ConfigurationView },
    DeleteFormRequested { config: ConfigurationView },
    /// EXIT was accepted and forwarded to the listeners.
    Stopped,
    /// A POST was applied; `changed` lists the keys actually touched, in request order.
    MutationAck { id: String, command: Command, changed: Vec<String> },
    /// `id` is `None` when the request named no configuration at all.
    ConfigNotFound { id: Option<String> },
    InvalidCommand { reason: String },
    UnknownCommand { token: String },
}

impl Outcome {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::InvalidCommand { .. } | Self::UnknownCommand { .. }
        )
    }
}

impl From<DispatchError> for Outcome {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::UnknownCommand { message, .. } => {
                Self::UnknownCommand { token: message.into_owned() }
            },
            DispatchError::ConfigNotFound { id, .. } => Self::ConfigNotFound { id },
            DispatchError::InvalidCommand { message, .. } => {
                Self::InvalidCommand { reason: message.into_owned() }
            },
        }
    }
}
