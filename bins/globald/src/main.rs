//! GlobalD CLI and Server Binary
//!
//! Entry point for initializing, validating, seeding, and serving the
//! machine registry.

use anyhow::{Context, Result};
use cli::{Cli, Commands, LogFormatArg};
use config::{
    generate_default_config, load_config, save_config, validate_config, GlobaldConfig,
    ValidationReport,
};
use observability::{init_logging, init_metrics, LogFormat};
use registry::api::{create_api_state, create_router};
use registry::{connect, MachineManager, SqliteMachineStore};
use server::{HttpServer, ServerConfig, ServerExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start {
            config,
            http,
            database_url,
            seed,
        } => {
            let mut config = load_checked_config(&config, cli.log_format)?;
            apply_overrides(&mut config, http, database_url);
            start_registry(config, seed).await
        }
        Commands::Seed {
            config,
            database_url,
        } => {
            let mut config = load_checked_config(&config, cli.log_format)?;
            apply_overrides(&mut config, None, database_url);
            seed_command(config).await
        }
        Commands::Validate { config } => {
            init_cli_logging(cli.log_format)?;
            validate_command(config)
        }
        Commands::Init { output } => {
            init_cli_logging(cli.log_format)?;
            init_command(output)
        }
    }
}

/// Logging for commands that run before or without a config file
fn init_cli_logging(format: Option<LogFormatArg>) -> Result<()> {
    let format = format
        .and_then(|f| LogFormat::parse(f.as_str()))
        .unwrap_or_default();
    init_logging("globald", format, "info")
}

/// Load the config, install logging from it, and refuse to continue on errors
fn load_checked_config(path: &Path, format_override: Option<LogFormatArg>) -> Result<GlobaldConfig> {
    let config = load_config(path)?;

    let format = match format_override {
        Some(f) => f.as_str(),
        None => config.observability.log_format.as_str(),
    };
    init_logging(
        &config.service.name,
        LogFormat::parse(format).unwrap_or_default(),
        &config.observability.log_level,
    )?;
    info!(path = ?path, service = %config.service.name, "Configuration loaded");

    let report = validate_config(&config);
    log_report(&report);
    if !report.is_valid() {
        anyhow::bail!(
            "Configuration has {} error(s), refusing to continue",
            report.errors.len()
        );
    }

    Ok(config)
}

fn log_report(report: &ValidationReport) {
    for default in &report.defaults_applied {
        debug!(field = %default.field, value = %default.value, "Default applied");
    }
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }
    for err in &report.errors {
        error!("{}", err);
    }
}

fn apply_overrides(config: &mut GlobaldConfig, http: Option<u16>, database_url: Option<String>) {
    if let Some(port) = http {
        debug!(port, "Overriding HTTP port from command line");
        config.server.http_port = port;
    }
    if let Some(url) = database_url {
        debug!("Overriding database URL from command line");
        config.database.url = url;
    }
}

/// Connect, create the schema, and wrap the store in a manager
async fn open_registry(config: &GlobaldConfig) -> Result<MachineManager> {
    let pool = connect(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to open database")?;

    let store = SqliteMachineStore::new(pool);
    store
        .init_schema()
        .await
        .context("Failed to initialize schema")?;

    Ok(MachineManager::new(Arc::new(store)))
}

async fn start_registry(config: GlobaldConfig, seed: bool) -> Result<()> {
    if let Some(port) = config.observability.metrics_port {
        init_metrics(port)?;
    }

    let manager = open_registry(&config).await?;

    if seed || config.database.seed_sample_data {
        let inserted = manager.seed_sample_data().await?;
        info!(inserted, "Sample data check complete");
    }

    let machines = manager.machine_count().await?;
    info!(
        service = %config.service.name,
        version = %config.service.version,
        machines,
        "Starting registry"
    );

    let state = create_api_state(
        manager,
        config.service.name.clone(),
        config.service.version.clone(),
    );
    let router = create_router(state);

    let server_config = ServerConfig::new(config.server.host.clone(), config.server.http_port);
    HttpServer::new(server_config, router)
        .run_with_ctrl_c()
        .await?;

    info!("Registry stopped");
    Ok(())
}

async fn seed_command(config: GlobaldConfig) -> Result<()> {
    let manager = open_registry(&config).await?;
    let inserted = manager.seed_sample_data().await?;

    if inserted == 0 {
        println!("[ok] Database already contains machines, nothing inserted");
    } else {
        println!("[ok] Inserted {} sample machines", inserted);
    }
    println!("Database: {}", config.database.url);
    Ok(())
}

fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = load_config(&config_path).map_err(|e| {
        error!(%e, "Failed to load configuration");
        e
    })?;

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Service: {} {}", config.service.name, config.service.version);
    println!("Listen: {}:{}", config.server.host, config.server.http_port);
    println!("Database: {}", config.database.url);
    match config.observability.metrics_port {
        Some(port) => println!("Metrics: port {}", port),
        None => println!("Metrics: disabled"),
    }

    Ok(())
}

fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file (database URL, listen port)");
    println!(
        "  2. Run 'globald validate --config {:?}' to check it",
        output_path
    );
    println!(
        "  3. Run 'globald start --config {:?} --seed' to serve with sample data",
        output_path
    );

    Ok(())
}
