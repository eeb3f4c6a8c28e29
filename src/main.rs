use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use calc_api::config::{Config, LogFormat};
use calc_api::server;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments (env vars as fallback)
    let config = Config::parse();
    init_tracing(config.log_format);

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        return Err(e.into());
    }

    info!(
        host = %config.host,
        port = config.port,
        read_timeout = ?config.read_timeout,
        write_timeout = ?config.write_timeout,
        idle_timeout = ?config.idle_timeout,
        shutdown_timeout = ?config.shutdown_timeout,
        request_timeout = ?config.request_timeout,
        rate_limit_rpm = config.rate_limit_rpm,
        rate_limit_burst = config.rate_limit_burst,
        "starting calc api"
    );

    server::run(config).await
}
