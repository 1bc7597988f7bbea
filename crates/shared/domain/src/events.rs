//! Events published on the bus by the container.

/// What happened to a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// A single property of a configuration changed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConfigurationChanged {
    pub config_id: String,
    pub key: String,
    pub change: ChangeKind,
    /// Value after the change; `None` for deletions.
    pub value: Option<String>,
}

/// Latest-value signal asking the server to stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownRequested(pub bool);

impl ShutdownRequested {
    #[must_use]
    pub const fn is_requested(self) -> bool {
        self.0
    }
}
