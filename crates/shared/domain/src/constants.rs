/// `OpenAPI` tag for operational endpoints (`/health`).
pub const SYSTEM_TAG: &str = "System";

/// `OpenAPI` tag for the configuration container endpoints.
pub const CONTAINER_TAG: &str = "Container";

/// Environment variable prefix for configuration overrides (`CFGD__SERVER__PORT`).
pub const ENV_PREFIX: &str = "CFGD";

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "CFGD_CONFIG";

/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "server";
