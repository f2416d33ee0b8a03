//! Config validation CLI tool
//!
//! Validates a halbridge configuration file and reports any errors.

use halbridge_config::EngineConfig;
use halbridge_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a halbridge configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match halbridge_config::load_config(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", halbridge_config::CURRENT_CONFIG_VERSION);
            println!("  Log level: {}", config.service.log_level);
            println!("  Autostart: {}", config.service.autostart);
            println!("  Dispatcher thread: {}", config.service.dispatcher_thread);
            println!("  Event loop thread: {}", config.service.event_loop_thread);
            match config.engine {
                EngineConfig::Simulated { init_status } => {
                    println!("  Engine: simulated (initialize -> {})", init_status)
                }
                EngineConfig::Unsupported => println!("  Engine: unsupported stub table"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match e {
                halbridge_config::ConfigError::ValidationFailed { errors } => {
                    for error in errors {
                        eprintln!("  - {}", error);
                    }
                }
                other => eprintln!("  {}", other),
            }
            ExitCode::from(1)
        }
    }
}
