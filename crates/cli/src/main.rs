use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use webterm_cli::{init_logging, register_demo_commands, AppConfig, LogFormat, Overrides};
use webterm_core::{Pipeline, Services};
use webterm_server::{bind, router, serve};

#[derive(Parser, Debug)]
#[command(name = "webterm", version, about = "Serve a browser terminal over HTTP")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "webterm.toml", value_name = "PATH")]
    config: PathBuf,

    /// Overrides the bind address.
    #[arg(long, value_name = "ADDR")]
    bind: Option<IpAddr>,

    /// Overrides the listening port.
    #[arg(long, env = "WEBTERM_PORT", value_name = "PORT")]
    port: Option<u16>,

    /// Sends full error details to the terminal instead of a generic message.
    #[arg(long)]
    display_exceptions: bool,

    /// Overrides the log filter (also settable through RUST_LOG).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    #[arg(long, value_enum, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Skips the sample commands.
    #[arg(long)]
    no_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)?;
    config.apply(Overrides {
        bind: cli.bind,
        port: cli.port,
        display_exceptions: cli.display_exceptions,
        log_level: cli.log_level.clone(),
        log_format: cli.log_format,
    });
    init_logging(&config.logging)?;

    if !cli.config.exists() {
        warn!(
            target: "webterm",
            path = %cli.config.display(),
            "configuration file not found, using defaults"
        );
    }

    let services = Services::builder()
        .settings(config.terminal.clone())
        .build()
        .context("failed to register built-in commands")?;
    if !cli.no_demo {
        register_demo_commands(services.registry()).context("failed to register sample commands")?;
    }
    info!(
        target: "webterm",
        commands = services.registry().len(),
        job_ttl_secs = config.terminal.job_ttl_secs,
        "command registry ready"
    );

    let purge = services.jobs().ttl().map(|_| {
        services
            .jobs()
            .spawn_purge_task(config.terminal.job_purge_interval())
    });

    let listener = bind(&config.server).await?;
    let app = router(Pipeline::new(services), config.server.clone());

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!(target: "webterm", "shutdown signal received (Ctrl+C)"),
            Err(err) => {
                error!(target: "webterm", error = %err, "failed to wait for shutdown signal")
            }
        }
    };
    serve(listener, app, shutdown).await?;

    if let Some(purge) = purge {
        purge.shutdown().await;
    }
    Ok(())
}
