//! sensorwatch - sensor threshold watcher
//!
//! A command-line tool that samples sensor readings in the background and
//! raises rate-limited alerts when configured thresholds are crossed.

use clap::Parser;
use sensorwatch::cli::args::{generate_completions, Cli, Commands};
use sensorwatch::commands::{run_check, run_config, run_watch, verbose_enabled};
use sensorwatch::error::{AppError, ConfigError, ServiceError, StreamError};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; -v or [general] verbose raises the default level
    let default_level = if verbose_enabled(cli.verbose, cli.config.as_deref()) {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Watch(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(run_watch(args, cli.format, config_path));
            // Don't wait for a replay still blocked on stdin
            runtime.shutdown_background();
            result
        }

        Commands::Check(args) => run_check(args, cli.format, config_path),

        Commands::Config(args) => run_config(args, cli.format, config_path),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Create one with 'sensorwatch config init'.");
        }
        AppError::Stream(StreamError::Read(_)) => {
            eprintln!();
            eprintln!("Hint: Pass a JSON-lines file with --input, or pipe readings on stdin.");
        }
        AppError::Service(ServiceError::InvalidConfiguration(_)) | AppError::Domain(_) => {
            eprintln!();
            eprintln!("Hint: Check the effective settings with 'sensorwatch config show'.");
        }
        _ => {}
    }
}
