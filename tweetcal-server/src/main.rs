use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tweetcal_common::observability::{LogConfig, LogFormat, init_logging};
use tweetcal_config::{ServiceConfig, ServiceConfigLoader};

const DEFAULT_CONFIG_FILE: &str = "tweetcal.yaml";

/// Turn a tweet URL into a pre-filled Google Calendar link.
#[derive(Debug, Parser)]
#[command(name = "tweetcal-server", version, about)]
struct Args {
    /// Config file; must exist when given. Defaults to ./tweetcal.yaml if present.
    #[arg(long, env = "TWEETCAL_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`.
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Emit JSON logs.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_path = init_logging(LogConfig {
        emit_stderr: true,
        format: if args.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..LogConfig::default()
    })?;
    tracing::info!(log_file = %log_path.display(), "tweetcal-server starting");

    let loader = match &args.config {
        Some(path) => ServiceConfigLoader::new().with_file(path),
        None => ServiceConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let mut cfg: ServiceConfig = loader.load()?;
    if let Some(bind) = args.bind {
        cfg.server.bind = bind;
    }
    cfg.validate()?;

    tweetcal_server::startup::serve(&cfg).await
}
