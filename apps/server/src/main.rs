use anyhow::Context;
use cfgd::domain::config::{ApiConfig, LoggingConfig};
use cfgd::kernel::config::{config_path, load_config};
use cfgd_logger::{Logger, parse_level};
use cfgd_server::Server;

#[cfgd_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig =
        load_config(Some(config_path())).context("Critical: Configuration is malformed")?;

    let _log = init_logger(&cfg.logging)?;

    Server::builder().config(cfg).build()?.run().await
}

fn init_logger(logging: &LoggingConfig) -> anyhow::Result<Logger> {
    let mut builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(parse_level(&logging.level)?)
        .console(logging.console)
        .json(logging.json);

    if let Some(filter) = &logging.filter {
        builder = builder.env_filter(filter.clone());
    }
    if let Some(dir) = &logging.dir {
        builder = builder.file(dir);
    }

    builder.init().context("Failed to initialize logging")
}
