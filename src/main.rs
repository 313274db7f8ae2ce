//! compose-middleware - HTTP remote control for docker-compose services
//!
//! This is the main CLI entry point.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use compose_middleware::compose::ServiceRegistry;
use compose_middleware::config::{Settings, StatusPolicy, DEFAULT_COMPOSE_FILE, DEFAULT_PORT};
use compose_middleware::daemon::{ApiHandler, MiddlewareDaemon};
use compose_middleware::dispatch::{ComposeCli, Dispatcher, DEFAULT_COMPOSE_BIN};
use compose_middleware::SERVICE_NAME;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info_span, Instrument};
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

/// compose-middleware - run docker-compose commands over HTTP
#[derive(Parser)]
#[command(name = "compose-middleware")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "HTTP remote control for docker-compose services", long_about = None)]
struct Cli {
    /// Path to docker-compose file (or a directory containing one)
    #[arg(short, long, env = "COMPOSE_MIDDLEWARE_CONFIG", default_value = DEFAULT_COMPOSE_FILE)]
    config: PathBuf,

    /// Port for http service
    #[arg(short, long, env = "COMPOSE_MIDDLEWARE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address to listen on
    #[arg(long, env = "COMPOSE_MIDDLEWARE_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// docker-compose binary to invoke
    #[arg(long, env = "COMPOSE_MIDDLEWARE_BIN", default_value = DEFAULT_COMPOSE_BIN)]
    compose_bin: String,

    /// Working directory for docker-compose invocations
    #[arg(long, default_value = "./")]
    workdir: PathBuf,

    /// Answer unknown services with 200 and command failures with 500
    #[arg(long)]
    legacy_status: bool,

    /// Print the loaded service names as YAML and exit
    #[arg(long)]
    print: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            compose_file: self.config.clone(),
            bind: self.bind,
            port: self.port,
            compose_bin: self.compose_bin.clone(),
            workdir: self.workdir.clone(),
            status_policy: if self.legacy_status {
                StatusPolicy::Legacy
            } else {
                StatusPolicy::Strict
            },
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    match cli.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let root = info_span!(
        "service",
        service = SERVICE_NAME,
        version = env!("CARGO_PKG_VERSION")
    );

    match run(cli).instrument(root.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            root.in_scope(|| error!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings();

    let registry = ServiceRegistry::load(&settings.compose_file).with_context(|| {
        format!("parse file error: {}", settings.compose_file.display())
    })?;

    if cli.print {
        print!("{}", registry.to_yaml()?);
        return Ok(());
    }

    let runner = ComposeCli::new(settings.compose_bin.clone(), settings.workdir.clone());
    let dispatcher = Dispatcher::new(Arc::new(registry), Arc::new(runner));
    let api_handler = ApiHandler::new(dispatcher, settings.status_policy);

    let daemon = MiddlewareDaemon::bind(settings.listen_addr(), api_handler)
        .await
        .with_context(|| format!("failed to listen on {}", settings.listen_addr()))?;

    daemon
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
