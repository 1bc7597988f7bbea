use crate::command::Command;
use crate::error::DispatchError;
use crate::listener::{ContainerListener, Listeners, Notification};
use crate::outcome::{ConfigurationView, Outcome};
use crate::params::{PARAM_COMMAND, PARAM_CONFIG, PARAM_CONFIG_ID, PARAM_KEY, PARAM_VALUE, RequestParams};
use crate::registry::{Registry, SharedConfiguration};
use std::sync::Arc;
use strum_macros::Display;
use tracing::{debug, info};

/// Request method as far as the container cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    /// Navigation and reads.
    Get,
    /// Mutations.
    Post,
}

/// The request dispatcher: owns the registry and the listeners.
///
/// Cloning is cheap; clones share both.
#[derive(Debug, Clone, Default)]
pub struct Container {
    registry: Registry,
    listeners: Listeners,
}

impl Container {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self { registry, listeners: Listeners::new() }
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub const fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Registers an observer. Listeners are never removed.
    pub fn add_listener(&self, listener: Arc<dyn ContainerListener>) {
        self.listeners.add(listener);
    }

    pub fn dispatch(&self, method: Method, params: &RequestParams) -> Outcome {
        match method {
            Method::Get => self.handle_get(params),
            Method::Post => self.handle_post(params),
        }
    }

    /// Navigation: index, configuration views, forms and `EXIT`. Never mutates.
    pub fn handle_get(&self, params: &RequestParams) -> Outcome {
        self.get(params).unwrap_or_else(|err| reject(Method::Get, err))
    }

    /// Mutations: `ADD`, `UPDATE`, `DELETE` against `config_id`.
    pub fn handle_post(&self, params: &RequestParams) -> Outcome {
        self.post(params).unwrap_or_else(|err| reject(Method::Post, err))
    }

    fn get(&self, params: &RequestParams) -> Result<Outcome, DispatchError> {
        let Some(id) = params.get(PARAM_CONFIG) else {
            return match Command::resolve(params.get(PARAM_COMMAND))? {
                Command::Exit => Ok(self.stop()),
                _ => Ok(Outcome::Index {
                    entries: self.registry.entries(),
                    commands: Command::server_commands(),
                }),
            };
        };

        let shared = self.lookup(id)?;
        let command = Command::resolve(params.get(PARAM_COMMAND))?;
        debug!(config = id, %command, "Handling GET");

        if command == Command::Exit {
            return Ok(self.stop());
        }

        let config = ConfigurationView::of(&**shared.lock());
        Ok(match command {
            Command::Add => Outcome::AddForm { config },
            Command::Update => Outcome::UpdateFormRequested { config },
            Command::Delete => Outcome::DeleteFormRequested { config },
            Command::View | Command::Exit => {
                Outcome::ConfigView { config, commands: Command::actions() }
            },
        })
    }

    fn post(&self, params: &RequestParams) -> Result<Outcome, DispatchError> {
        let id = params.get(PARAM_CONFIG_ID).ok_or_else(|| DispatchError::ConfigNotFound {
            id: None,
            context: Some("no config specified".into()),
        })?;
        let shared = self.lookup(id)?;
        let command = Command::resolve(params.get(PARAM_COMMAND))?;
        debug!(config = id, %command, "Handling POST");

        let changed = match command {
            Command::Add => {
                let key = params
                    .get(PARAM_KEY)
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| DispatchError::InvalidCommand {
                        message: "ADD requires a non-empty 'key' field".into(),
                        context: None,
                    })?;
                let value = params.get(PARAM_VALUE).unwrap_or_default();
                self.add(&shared, key, value)
            },
            Command::Update => self.update(&shared, params),
            Command::Delete => self.delete(&shared, params),
            Command::View | Command::Exit => {
                return Err(DispatchError::InvalidCommand {
                    message: format!("{command} cannot be submitted").into(),
                    context: None,
                });
            },
        };

        info!(config = id, %command, changed = changed.len(), "Configuration mutated");
        Ok(Outcome::MutationAck { id: id.to_owned(), command, changed })
    }

    fn lookup(&self, id: &str) -> Result<SharedConfiguration, DispatchError> {
        self.registry.get(id).ok_or_else(|| DispatchError::ConfigNotFound {
            id: Some(id.to_owned()),
            context: None,
        })
    }

    fn stop(&self) -> Outcome {
        info!("EXIT received, notifying listeners");
        self.listeners.broadcast(Notification::Command(Command::Exit));
        Outcome::Stopped
    }

    fn add(&self, shared: &SharedConfiguration, key: &str, value: &str) -> Vec<String> {
        let mut config = shared.lock();
        config.set_property(key, value);
        self.listeners.broadcast(Notification::Added { config: &**config, key });
        vec![key.to_owned()]
    }

    fn update(&self, shared: &SharedConfiguration, params: &RequestParams) -> Vec<String> {
        let mut config = shared.lock();
        let mut changed = Vec::new();
        for (key, value) in params.payload() {
            if !config.has_property(key) {
                continue;
            }
            config.set_property(key, value);
            self.listeners.broadcast(Notification::Modified { config: &**config, key });
            changed.push(key.to_owned());
        }
        changed
    }

    fn delete(&self, shared: &SharedConfiguration, params: &RequestParams) -> Vec<String> {
        let mut config = shared.lock();
        let mut changed = Vec::new();
        for (key, _) in params.payload() {
            if config.remove_property(key) {
                self.listeners.broadcast(Notification::Deleted { config: &**config, key });
                changed.push(key.to_owned());
            }
        }
        changed
    }
}

fn reject(method: Method, err: DispatchError) -> Outcome {
    debug!(%method, kind = err.kind(), error = %err, "Request rejected");
    Outcome::from(err)
}
