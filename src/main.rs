// Badge Access Controller - Main Entry Point
//
// Run against a local directory file, typing badge identifiers on stdin:
//
// ```console
// $ cargo build --release
// $ ./target/release/badge-access-controller --zone IT --directory-file staff.json --audit-log audit.jsonl
// ```
//
// Or with a configuration file:
//
// ```console
// $ ./target/release/badge-access-controller --config controller.json --verbose
// ```

use std::process;

use anyhow::{Context, Result};
use badge_access_controller::access::{AccessController, Peripherals};
use badge_access_controller::adapters::{
    ConsoleDisplay, FirestoreAuditLog, FirestoreDirectory, JsonlAuditLog, LocalDirectory,
    LoggingDoor, StdinBadgeReader, SystemClock,
};
use badge_access_controller::ports::{AuditLogger, DirectoryClient};
use badge_access_controller::runtime::{
    ControlLoop, ControllerError, ControllerResult, LoggingConfig,
};
use badge_access_controller::types::{CliArgs, ControllerConfig, DirectoryBackend};
use clap::Parser;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match ControllerConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let _logging = match LoggingConfig::from_cli_args(&args).init() {
        Ok(guard) => Some(guard),
        Err(e) if e.is_recoverable() => {
            eprintln!("{} error: {}; continuing without logs", e.category(), e);
            None
        }
        Err(e) => {
            eprintln!("{} error: {}", e.category(), e);
            process::exit(1);
        }
    };

    info!("Starting Badge Access Controller");

    let config = match load_config(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!(category = e.category(), "{}", e);
            eprintln!("{} error: {}", e.category(), e);
            process::exit(1);
        }
    };

    info!("Configuration loaded and validated successfully");

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - controller will not be started.");
        print_configuration_summary(&config);
        return;
    }

    print_startup_banner(&config);

    if let Err(e) = run(&config) {
        error!("Access controller failed: {:#}", e);
        eprintln!("Access controller failed: {:#}", e);
        process::exit(1);
    }

    info!("Badge Access Controller stopped");
}

/// Load the layered configuration and validate it
fn load_config(args: CliArgs) -> ControllerResult<ControllerConfig> {
    let config = ControllerConfig::from_cli_args(args)?;
    config.validate()?;
    Ok(config)
}

/// Build the backend and console peripherals, then run until input ends
fn run(config: &ControllerConfig) -> Result<()> {
    let (directory, audit) = build_backend(config)
        .with_context(|| format!("Failed to set up the {} backend", config.backend))?;

    let reader = StdinBadgeReader::spawn();
    let shutdown = reader.shutdown_flag();

    let peripherals = Peripherals {
        clock: Box::new(SystemClock::new()),
        reader: Box::new(reader),
        directory,
        audit,
        door: Box::new(LoggingDoor::new()),
        display: Box::new(ConsoleDisplay::new()),
    };

    let mut controller = AccessController::new(config, peripherals);
    let stats = ControlLoop::from_timing(&config.timing).run(&mut controller, &shutdown);

    eprintln!();
    eprintln!("{}", stats.summary());
    Ok(())
}

type Backend = (Box<dyn DirectoryClient>, Box<dyn AuditLogger>);

fn build_backend(config: &ControllerConfig) -> ControllerResult<Backend> {
    let timeout = config.timing.network_timeout();
    match config.backend {
        DirectoryBackend::File => {
            let directory = LocalDirectory::load(&config.local.directory_path)?;
            let audit = JsonlAuditLog::new(&config.local.audit_log_path);
            let backend: Backend = (Box::new(directory), Box::new(audit));
            Ok(backend)
        }
        DirectoryBackend::Firestore => {
            let directory = FirestoreDirectory::new(&config.firestore, timeout).map_err(|e| {
                ControllerError::backend_setup(format!("Firestore directory client: {}", e))
            })?;
            let audit = FirestoreAuditLog::new(&config.firestore, timeout).map_err(|e| {
                ControllerError::backend_setup(format!("Firestore audit client: {}", e))
            })?;
            let backend: Backend = (Box::new(directory), Box::new(audit));
            Ok(backend)
        }
    }
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &ControllerConfig) {
    eprintln!("Badge Access Controller");
    eprintln!("=======================");
    eprintln!("Type a badge identifier (hex) and press Enter to scan; 'quit' to stop.");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &ControllerConfig) {
    eprintln!("Configuration:");
    eprintln!("  Zone: {}", config.zone);
    if config.admin_badge_id.trim().is_empty() {
        eprintln!("  Admin Badge: (bypass disabled)");
    } else {
        eprintln!("  Admin Badge: {}", config.admin_badge_id.to_uppercase());
    }
    eprintln!("  Backend: {}", config.backend);
    match config.backend {
        DirectoryBackend::File => {
            eprintln!("  Directory File: {}", config.local.directory_path);
            eprintln!("  Audit Log: {}", config.local.audit_log_path);
        }
        DirectoryBackend::Firestore => {
            eprintln!("  Firestore Project: {}", config.firestore.project_id);
            eprintln!("  Directory Collection: {}", config.firestore.directory_collection);
            eprintln!("  Audit Collection: {}", config.firestore.audit_collection);
        }
    }
    eprintln!("\nTiming:");
    eprintln!("  Scan Interval: {} ms", config.timing.scan_interval_ms);
    eprintln!("  Display Message: {} ms", config.timing.display_message_ms);
    eprintln!("  Door Open: {} ms", config.timing.door_open_ms);
    eprintln!("  Deny Pulse: {} ms", config.timing.deny_pulse_ms);
    eprintln!("  Network Timeout: {} ms", config.timing.network_timeout_ms);
    eprintln!();
}
