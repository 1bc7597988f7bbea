use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level server configuration (`server.toml` + `CFGD__*` overrides).
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub persistence: PersistenceConfig,
    pub configurations: Vec<ConfigurationSeed>,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    /// Seconds in-flight requests get to finish once shutdown starts.
    pub shutdown_grace_seconds: u64,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Logging output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level name (`trace` … `error`, `off`).
    pub level: String,
    /// Extra `EnvFilter` directives, e.g. `cfgd_container=debug`.
    pub filter: Option<String>,
    pub console: bool,
    /// Rolling log file directory; no file output when absent.
    pub dir: Option<PathBuf>,
    pub json: bool,
}

/// Snapshot persistence of configurations.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Directory holding `<id>.json` snapshots; persistence is off when absent.
    pub dir: Option<PathBuf>,
}

/// A configuration to register at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigurationSeed {
    pub id: String,
    /// Defaults to `id` when omitted.
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl ConfigurationSeed {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4583,
            ssl: None,
            shutdown_grace_seconds: 10,
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, console: true, dir: None, json: false }
    }
}
