//! Change observers and their registry.

mod audit;
mod bus;
mod error;
mod snapshot;

pub use self::audit::AuditListener;
pub use self::bus::BusListener;
pub use self::error::{ListenerError, ListenerErrorExt};
pub use self::snapshot::SnapshotListener;

use crate::command::Command;
use crate::configuration::Configuration;
use parking_lot::RwLock;
use std::any::{Any, type_name};
use std::fmt::Debug;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{trace, warn};

/// Observer of container activity.
///
/// Every reaction defaults to doing nothing. Mutation callbacks run while the
/// configuration is still locked by the request that changed it, so `config` already
/// reflects the write. Implementations must not reach back into the registry for the
/// same configuration.
pub trait ContainerListener: Send + Sync + Debug {
    fn on_add(&self, _config: &dyn Configuration, _key: &str) -> Result<(), ListenerError> {
        Ok(())
    }

    fn on_delete(&self, _config: &dyn Configuration, _key: &str) -> Result<(), ListenerError> {
        Ok(())
    }

    fn on_modified(&self, _config: &dyn Configuration, _key: &str) -> Result<(), ListenerError> {
        Ok(())
    }

    fn on_command(&self, _command: Command) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Label used in logs.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// One notification, delivered to every listener.
#[derive(Debug, Clone, Copy)]
pub enum Notification<'a> {
    Added { config: &'a dyn Configuration, key: &'a str },
    Deleted { config: &'a dyn Configuration, key: &'a str },
    Modified { config: &'a dyn Configuration, key: &'a str },
    Command(Command),
}

impl Notification<'_> {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Deleted { .. } => "deleted",
            Self::Modified { .. } => "modified",
            Self::Command(_) => "command",
        }
    }

    fn deliver(self, listener: &dyn ContainerListener) -> Result<(), ListenerError> {
        match self {
            Self::Added { config, key } => listener.on_add(config, key),
            Self::Deleted { config, key } => listener.on_delete(config, key),
            Self::Modified { config, key } => listener.on_modified(config, key),
            Self::Command(command) => listener.on_command(command),
        }
    }
}

/// Append-only set of listeners. Cloning is cheap; clones share the set.
#[derive(Debug, Clone, Default)]
pub struct Listeners {
    inner: Arc<RwLock<Vec<Arc<dyn ContainerListener>>>>,
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn ContainerListener>) {
        trace!(listener = listener.name(), "Listener registered");
        self.inner.write().push(listener);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Notifies every listener registered at call time.
    ///
    /// A listener that returns an error or panics is logged and skipped; the rest
    /// are still notified. Returns how many listeners failed.
    pub fn broadcast(&self, notification: Notification<'_>) -> usize {
        let snapshot: Vec<_> = self.inner.read().clone();

        let mut failed = 0;
        for listener in &snapshot {
            match catch_unwind(AssertUnwindSafe(|| notification.deliver(listener.as_ref()))) {
                Ok(Ok(())) => {},
                Ok(Err(err)) => {
                    failed += 1;
                    warn!(
                        listener = listener.name(),
                        notification = notification.label(),
                        kind = err.kind(),
                        error = %err,
                        "Listener failed"
                    );
                },
                Err(payload) => {
                    failed += 1;
                    warn!(
                        listener = listener.name(),
                        notification = notification.label(),
                        panic = panic_message(payload.as_ref()),
                        "Listener panicked"
                    );
                },
            }
        }
        failed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::MemoryConfiguration;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct Counting {
        seen: Mutex<Vec<String>>,
    }

    impl ContainerListener for Counting {
        fn on_add(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
            self.seen.lock().push(format!("{}:{key}", config.id()));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl ContainerListener for Failing {
        fn on_add(&self, _config: &dyn Configuration, _key: &str) -> Result<(), ListenerError> {
            Err("broken".into())
        }
    }

    #[test]
    fn failing_listener_does_not_stop_the_others() {
        let listeners = Listeners::new();
        let counting = Arc::new(Counting::default());
        listeners.add(Arc::new(Failing));
        listeners.add(counting.clone());

        let config = MemoryConfiguration::new("db", "Database");
        let failed = listeners.broadcast(Notification::Added { config: &config, key: "url" });

        assert_eq!(failed, 1);
        assert_eq!(*counting.seen.lock(), vec!["db:url".to_owned()]);
    }

    #[derive(Debug)]
    struct Panicking;

    impl ContainerListener for Panicking {
        fn on_add(&self, _config: &dyn Configuration, _key: &str) -> Result<(), ListenerError> {
            panic!("listener bug");
        }
    }

    #[test]
    fn panicking_listener_counts_as_failed() {
        let listeners = Listeners::new();
        let counting = Arc::new(Counting::default());
        listeners.add(Arc::new(Panicking));
        listeners.add(counting.clone());

        let config = MemoryConfiguration::new("db", "Database");
        let failed = listeners.broadcast(Notification::Added { config: &config, key: "url" });

        assert_eq!(failed, 1);
        assert_eq!(*counting.seen.lock(), vec!["db:url".to_owned()]);
    }

    #[test]
    fn panic_payloads_are_readable() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("boom"));
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_message(&*owned), "boom");
        assert_eq!(panic_message(&*other), "non-string panic payload");
    }

    #[test]
    fn default_reactions_are_no_ops() {
        let listeners = Listeners::new();
        listeners.add(Arc::new(Counting::default()));

        assert_eq!(listeners.broadcast(Notification::Command(Command::Exit)), 0);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn name_defaults_to_type_name() {
        assert!(Failing.name().ends_with("Failing"));
    }
}
