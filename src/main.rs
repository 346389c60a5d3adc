//! topparse - version 0.1.0
//!
//! Reporting front end for `top -b -n 1` snapshots with tracing logging.
//! This is the main entry point that resolves configuration and dispatches subcommands.

mod cli;
mod commands;
mod config;

use clap::{CommandFactory, Parser};
use tracing::{debug, info, Level};

use cli::{Args, Commands, LogLevel};
use commands::{
    command_children, command_config, command_find, command_generate_snapshot, command_groups,
    command_summary, command_unique, command_walk,
};
use config::{parse_log_level, resolve_config, show_config, validate_effective_config, Config};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) {
    let level = config
        .log_level
        .as_deref()
        .and_then(parse_log_level)
        .unwrap_or(LogLevel::Info);

    if level == LogLevel::Off {
        return;
    }

    let max_level = match level {
        LogLevel::Off | LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {:?}", level);
    debug!("Build: {}", cli::LONG_VERSION);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.check_config {
        let config = load_validated_config(&args)?;
        println!("✅ Configuration valid");
        if args.show_config {
            show_config(&config, args.config_format.clone())?;
        }
        return Ok(());
    }

    let config = load_validated_config(&args)?;

    if args.show_config {
        return show_config(&config, args.config_format.clone());
    }

    setup_logging(&config);

    let command = match args.command {
        Some(c) => c,
        None => {
            Args::command().print_help()?;
            std::process::exit(2);
        }
    };

    match command {
        Commands::Summary { file, format } => command_summary(&file, format, &config),
        Commands::Walk {
            file,
            order,
            limit,
            format,
        } => command_walk(&file, order, limit, format, &config),
        Commands::UniqueCommands { file } => command_unique(&file, &config),
        Commands::Groups { file, order } => command_groups(&file, order, &config),
        Commands::Find {
            file,
            command,
            format,
        } => command_find(&file, &command, format, &config),
        Commands::Children { file, ppid, format } => {
            command_children(&file, ppid, format, &config)
        }
        Commands::Config {
            output,
            format,
            commented,
        } => command_config(output, format, commented),
        Commands::GenerateSnapshot {
            output,
            count,
            seed,
        } => command_generate_snapshot(output, count, seed),
    }
}
