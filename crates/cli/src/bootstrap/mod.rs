use polydns_domain::config::CliOverrides;
use polydns_domain::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;
    Ok(config)
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(config)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.logging.format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }

    info!(
        level = %config.logging.level,
        format = %config.logging.format,
        "Logging initialized"
    );
}

fn log_directives(config: &Config) -> String {
    let level = config.logging.level.trim();
    let level = if level.is_empty() { "info" } else { level };
    if config.dns.debug {
        format!("{},polydns=debug", level)
    } else {
        level.to_string()
    }
}
