use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "storefront-harness",
    version,
    about = "End-to-end UI test harness for the demo storefront"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: harness.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run storefront scenarios against a live browser
    Run {
        /// Scenario to run (repeatable; default: all)
        #[arg(long = "scenario")]
        scenarios: Vec<String>,

        /// Number of tests to run concurrently
        #[arg(long, default_value_t = 1)]
        workers: usize,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        format: ReportFormat,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append one JSON line per finished test to this file
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Override `base_url` from the config file
        #[arg(long)]
        base_url: Option<String>,

        /// Override `browser.headless` from the config file
        #[arg(long, action = clap::ArgAction::Set)]
        headless: Option<bool>,
    },

    /// Validate prices in a saved item snapshot without a browser
    Validate {
        /// JSON or YAML list of `{name, raw_price}` entries
        #[arg(long)]
        snapshot: PathBuf,

        /// Output format for the validation report
        #[arg(long, value_enum, default_value_t = SnapshotFormat::Json)]
        format: SnapshotFormat,
    },

    /// List built-in scenarios
    List,

    /// Load and check the config file, then exit
    CheckConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Junit,
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}
