use clap::Parser;
use storefront_harness::cli::args::{Cli, Commands};
use storefront_harness::cli::commands::{
    RunOptions, cmd_check_config, cmd_list, cmd_run, cmd_validate,
};
use storefront_harness::error::{ErrorKind, HarnessError};
use tracing_subscriber::EnvFilter;

const EXIT_FAILURES: i32 = 1;
const EXIT_CONFIG: i32 = 2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Run {
            scenarios,
            workers,
            format,
            output,
            trace,
            base_url,
            headless,
        } => {
            let options = RunOptions {
                scenarios: &scenarios,
                workers,
                format,
                output: output.as_deref(),
                trace: trace.as_deref(),
                base_url: base_url.as_deref(),
                headless,
            };
            cmd_run(config, &options)
        }
        Commands::Validate { snapshot, format } => cmd_validate(&snapshot, format),
        Commands::List => {
            cmd_list();
            Ok(true)
        }
        Commands::CheckConfig => cmd_check_config(config).map(|()| true),
    };

    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(EXIT_FAILURES),
        Err(e) => exit_on_config_error(e),
    }
}

/// Configuration errors exit with their own code; anything else bubbles up.
fn exit_on_config_error(e: HarnessError) -> Result<(), Box<dyn std::error::Error>> {
    if e.kind() == ErrorKind::Configuration {
        eprintln!("Configuration error: {}", e);
        std::process::exit(EXIT_CONFIG);
    }
    Err(Box::new(e))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
