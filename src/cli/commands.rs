use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::browser::automation::SharedEngine;
use crate::browser::session::NodeBrowserEngine;
use crate::cli::args::{ReportFormat, SnapshotFormat};
use crate::config::settings::load_config;
use crate::error::{ConfigError, HarnessError};
use crate::inventory::validator::{ItemSnapshot, validate};
use crate::lifecycle::env::HarnessEnv;
use crate::lifecycle::suite::TestSuite;
use crate::report::console::format_console_report;
use crate::report::html::generate_html_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::TestSuiteReport;
use crate::scenarios::catalog::{scenario_names, select};
use crate::trace::logger::TraceLogger;

const SUITE_NAME: &str = "Storefront";

/// Options of the `run` subcommand.
#[derive(Debug, Clone)]
pub struct RunOptions<'a> {
    pub scenarios: &'a [String],
    pub workers: usize,
    pub format: ReportFormat,
    pub output: Option<&'a Path>,
    pub trace: Option<&'a Path>,
    pub base_url: Option<&'a str>,
    pub headless: Option<bool>,
}

// ============================================================================
// run subcommand
// ============================================================================

/// Run scenarios and return whether all passed.
pub fn cmd_run(config_path: Option<&Path>, options: &RunOptions<'_>) -> Result<bool, HarnessError> {
    let mut loaded = load_config(config_path)?;
    loaded.config = loaded.config.with_overrides(options.base_url, options.headless)?;

    // Resolve the selection before launching anything
    let cases = select(options.scenarios)?;
    if options.workers == 0 {
        return Err(HarnessError::Configuration(ConfigError::Invalid {
            key: "workers".to_string(),
            reason: "must be at least 1".to_string(),
        }));
    }

    let engine: SharedEngine = Arc::new(NodeBrowserEngine::launch(loaded.config.driver_settings())?);
    let trace = options
        .trace
        .map(TraceLogger::new)
        .unwrap_or_else(TraceLogger::disabled);
    let suite = TestSuite::start(engine, HarnessEnv::from_loaded(loaded)).with_trace(trace);

    info!(
        "Running {} scenario(s) on {} worker(s)",
        cases.len(),
        options.workers
    );
    let start = Instant::now();
    let outcomes = suite.run_all(&cases, options.workers);
    let duration = start.elapsed().as_millis();
    suite.finish()?;

    let report = TestSuiteReport::from_outcomes(SUITE_NAME, outcomes).with_duration(duration);
    write_output(&render_report(&report, options.format), options.output)?;
    Ok(report.all_passed())
}

pub fn render_report(report: &TestSuiteReport, format: ReportFormat) -> String {
    match format {
        ReportFormat::Console => format_console_report(report),
        ReportFormat::Junit => generate_junit_xml(report),
        ReportFormat::Html => generate_html_report(report),
    }
}

// ============================================================================
// validate subcommand
// ============================================================================

/// Validate a saved snapshot. Returns `false` when any price is missing or
/// malformed.
pub fn cmd_validate(snapshot_path: &Path, format: SnapshotFormat) -> Result<bool, HarnessError> {
    let content = std::fs::read_to_string(snapshot_path).map_err(|e| ConfigError::Read {
        path: snapshot_path.to_path_buf(),
        source: e,
    })?;

    // YAML is a superset of JSON, so one parser reads both
    let snapshot: ItemSnapshot =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: snapshot_path.to_path_buf(),
            source: e,
        })?;

    let report = validate(&snapshot);
    let rendered = match format {
        SnapshotFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|e| HarnessError::Programming(format!("serialize report: {}", e)))?,
        SnapshotFormat::Yaml => serde_yaml::to_string(&report)
            .map_err(|e| HarnessError::Programming(format!("serialize report: {}", e)))?,
    };
    println!("{}", rendered.trim_end());

    Ok(!report.has_missing_prices())
}

// ============================================================================
// list / check-config subcommands
// ============================================================================

pub fn cmd_list() {
    for name in scenario_names() {
        println!("{}", name);
    }
}

pub fn cmd_check_config(config_path: Option<&Path>) -> Result<(), HarnessError> {
    let loaded = load_config(config_path)?;
    let config = &loaded.config;

    println!("base_url: {}", config.base_url);
    println!(
        "browser: headless={} timeout={}ms slow_mo={}ms",
        config.browser.headless, config.browser.timeout_ms, config.browser.slow_mo_ms
    );
    println!(
        "retry: {} attempt(s), {}ms delay",
        config.retry.count, config.retry.delay_ms
    );
    println!("ignored error patterns: {}", loaded.classifier.len());
    println!(
        "known users: {}",
        loaded.credentials.available_users().join(", ")
    );
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn write_output(content: &str, output: Option<&Path>) -> Result<(), HarnessError> {
    match output {
        Some(path) => std::fs::write(path, content).map_err(|e| {
            HarnessError::Configuration(ConfigError::Invalid {
                key: "output".to_string(),
                reason: format!("cannot write {}: {}", path.display(), e),
            })
        }),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
