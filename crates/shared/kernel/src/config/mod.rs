use cfgd_domain::constants::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Custom error type for config loading.
#[cfgd_derive::cfgd_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a config file overlaid with `CFGD__*` environment variables.
///
/// 1. **Base file**: `path`, or `server` in the working directory when `None`. The
///    extension may be omitted; any format the `config` crate understands is accepted.
/// 2. **Environment overrides**: variables prefixed with `CFGD__`, nested with `__`
///    (`CFGD__SERVER__PORT=9000` maps to `server.port`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing, unreadable, or does not
/// match the structure of `T`.
///
/// # Example
/// ```rust
/// use cfgd_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// The config file to load: `$CFGD_CONFIG` when set and non-empty, else `server`.
#[must_use]
pub fn config_path() -> PathBuf {
    config_path_from(std::env::var(CONFIG_PATH_ENV).ok())
}

fn config_path_from(value: Option<String>) -> PathBuf {
    value
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_falls_back_to_default() {
        assert_eq!(config_path_from(None), PathBuf::from("server"));
        assert_eq!(config_path_from(Some("  ".to_owned())), PathBuf::from("server"));
        assert_eq!(config_path_from(Some("/etc/cfgd.toml".to_owned())), PathBuf::from("/etc/cfgd.toml"));
    }
}
