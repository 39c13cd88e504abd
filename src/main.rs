//! MegaRAID Operator
//!
//! Host-local RAID management service. Wires the StorCLI client, the OS
//! inventory, and the lifecycle orchestrator together and serves the
//! JSON API until interrupted.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use megaraid_operator::{
    ApiServer, ApiServerConfig, Error, InventoryService, LifecycleOrchestrator, OsConfig,
    OsInventory, ResourceLocks, Result, StorcliClient, StorcliConfig, StorcliGrammar,
    SudoCommandRunner, DEFAULT_DETAIL_CONCURRENCY,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// MegaRAID Operator - host-local RAID controller management service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// REST API bind address
    #[arg(long, env = "API_ADDR", default_value = "0.0.0.0:8090")]
    api_addr: String,

    /// Path to the storcli binary
    #[arg(
        long,
        env = "STORCLI_PATH",
        default_value = "/opt/MegaRAID/storcli/storcli64"
    )]
    storcli_path: String,

    /// Controller index addressed by every command
    #[arg(long, env = "CONTROLLER_INDEX", default_value = "0")]
    controller_index: u32,

    /// Run storcli and OS utilities without sudo
    #[arg(long, env = "NO_SUDO")]
    no_sudo: bool,

    /// Timeout for inventory queries in seconds
    #[arg(long, env = "QUERY_TIMEOUT", default_value = "30")]
    query_timeout_secs: u64,

    /// Timeout for array create/delete commands in seconds
    #[arg(long, env = "MUTATE_TIMEOUT", default_value = "60")]
    mutate_timeout_secs: u64,

    /// Timeout for filesystem creation in seconds
    #[arg(long, env = "FORMAT_TIMEOUT", default_value = "300")]
    format_timeout_secs: u64,

    /// Concurrent per-array and per-slot detail queries
    #[arg(long, env = "DETAIL_CONCURRENCY", default_value_t = DEFAULT_DETAIL_CONCURRENCY)]
    detail_concurrency: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting MegaRAID Operator");
    info!("  Version: {}", megaraid_operator::VERSION);
    info!("  REST API: {}", args.api_addr);
    info!("  StorCLI: {}", args.storcli_path);
    info!("  Controller: /c{}", args.controller_index);
    info!("  Sudo: {}", !args.no_sudo);

    let runner = Arc::new(SudoCommandRunner::new(!args.no_sudo));

    let storcli_config = StorcliConfig {
        path: args.storcli_path.clone(),
        controller_index: args.controller_index,
        query_timeout: Duration::from_secs(args.query_timeout_secs),
        mutate_timeout: Duration::from_secs(args.mutate_timeout_secs),
    };
    let client = Arc::new(StorcliClient::new(
        runner.clone(),
        Arc::new(StorcliGrammar::new()),
        storcli_config,
    ));

    let os_config = OsConfig {
        op_timeout: Duration::from_secs(args.query_timeout_secs),
        format_timeout: Duration::from_secs(args.format_timeout_secs),
    };
    let os = Arc::new(OsInventory::new(runner, os_config));

    let locks = Arc::new(ResourceLocks::new());

    let inventory = Arc::new(InventoryService::new(
        client.clone(),
        os.clone(),
        locks.clone(),
        args.detail_concurrency,
    ));
    let lifecycle = Arc::new(LifecycleOrchestrator::new(client, os, locks));

    let api_config = ApiServerConfig {
        rest_addr: args
            .api_addr
            .parse()
            .map_err(|e| Error::Configuration(format!("Invalid REST API address: {}", e)))?,
        ..Default::default()
    };

    let api_server = Arc::new(ApiServer::new(api_config, inventory, lifecycle));

    // Ctrl-C triggers graceful shutdown
    let shutdown_server = api_server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            shutdown_server.shutdown();
        }
    });

    api_server.run().await?;

    info!("Shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("tower=warn".parse().unwrap())
        .add_directive("axum=info".parse().unwrap());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
