use super::{ContainerListener, ListenerError, ListenerErrorExt};
use crate::configuration::{Configuration, ConfigurationSnapshot, MemoryConfiguration};
use crate::registry::Registry;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SNAPSHOT_EXTENSION: &str = "json";

/// Everything but `[A-Za-z0-9_-]` is escaped, `.` and `%` included.
const FILE_STEM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Persists a configuration to `<dir>/<id>.json` after every mutation.
///
/// Files are written to a temporary sibling and renamed into place, so readers never
/// observe a half-written snapshot. Identifiers are percent-encoded into file names, so
/// distinct identifiers never share a file.
#[derive(Debug, Clone)]
pub struct SnapshotListener {
    dir: PathBuf,
}

impl SnapshotListener {
    /// Uses `dir`, creating it if needed.
    ///
    /// # Errors
    /// Returns [`ListenerError::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ListenerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .context(format!("Failed to create snapshot directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the snapshot for `id` lives.
    #[must_use]
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{SNAPSHOT_EXTENSION}", file_stem(id)))
    }

    /// Writes the current state of `config`.
    ///
    /// # Errors
    /// Returns [`ListenerError::Serialize`] or [`ListenerError::Io`].
    pub fn write(&self, config: &dyn Configuration) -> Result<(), ListenerError> {
        let path = self.path_for(config.id());
        let tmp = path.with_extension(format!("{SNAPSHOT_EXTENSION}.tmp"));

        let body = serde_json::to_vec_pretty(&config.snapshot())
            .context(format!("Serializing snapshot of '{}'", config.id()))?;
        fs::write(&tmp, body).context(format!("Writing {}", tmp.display()))?;
        fs::rename(&tmp, &path).context(format!("Renaming {}", tmp.display()))?;

        debug!(config = config.id(), path = %path.display(), "Snapshot written");
        Ok(())
    }

    /// Reads every snapshot in the directory, sorted by identifier.
    ///
    /// Unreadable or malformed files are logged and skipped.
    ///
    /// # Errors
    /// Returns [`ListenerError::Io`] if the directory cannot be listed.
    pub fn load_all(&self) -> Result<Vec<ConfigurationSnapshot>, ListenerError> {
        let mut snapshots = Vec::new();
        let dir = fs::read_dir(&self.dir)
            .context(format!("Listing snapshot directory {}", self.dir.display()))?;

        for entry in dir {
            let path = entry.context("Reading snapshot directory entry")?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            match read_snapshot(&path) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping snapshot"),
            }
        }

        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(snapshots)
    }

    /// Registers every stored snapshot, replacing same-id entries already in `registry`.
    ///
    /// Returns the number of restored configurations.
    ///
    /// # Errors
    /// See [`SnapshotListener::load_all`].
    pub fn restore(&self, registry: &Registry) -> Result<usize, ListenerError> {
        let snapshots = self.load_all()?;
        let restored = snapshots.len();
        for snapshot in snapshots {
            registry.insert(MemoryConfiguration::from(snapshot));
        }
        info!(restored, dir = %self.dir.display(), "Snapshots restored");
        Ok(restored)
    }
}

impl ContainerListener for SnapshotListener {
    fn on_add(&self, config: &dyn Configuration, _key: &str) -> Result<(), ListenerError> {
        self.write(config)
    }

    fn on_delete(&self, config: &dyn Configuration, _key: &str) -> Result<(), ListenerError> {
        self.write(config)
    }

    fn on_modified(&self, config: &dyn Configuration, _key: &str) -> Result<(), ListenerError> {
        self.write(config)
    }

    fn name(&self) -> &'static str {
        "snapshot"
    }
}

fn read_snapshot(path: &Path) -> Result<ConfigurationSnapshot, ListenerError> {
    let raw = fs::read(path).context(format!("Reading {}", path.display()))?;
    let snapshot: ConfigurationSnapshot =
        serde_json::from_slice(&raw).context(format!("Parsing {}", path.display()))?;
    Ok(snapshot)
}

fn file_stem(id: &str) -> String {
    // A lone `%` is never produced by encoding a non-empty identifier.
    if id.is_empty() {
        return "%".to_owned();
    }
    utf8_percent_encode(id, FILE_STEM).to_string()
}
