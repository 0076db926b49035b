use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::browser::automation::ContextOptions;
use crate::browser::session::DriverSettings;
use crate::config::credentials::CredentialStore;
use crate::error::ConfigError;
use crate::monitor::classifier::ErrorClassifier;
use crate::retry::executor::RetryPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "harness.yaml";

// ============================================================================
// Config file model (YAML)
// ============================================================================

/// `harness.yaml`. Every key without a serde default is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessConfig {
    pub base_url: String,
    pub credentials: CredentialsConfig,
    pub browser: BrowserConfig,
    pub retry: RetryConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialsConfig {
    pub valid: Credential,
    pub invalid: Credential,

    /// Optional store of additional users (`users: {name: password}`)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default)]
    pub slow_mo_ms: u64,

    /// Default timeout for navigation, actions and network-idle waits
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    pub count: u32,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    pub ignored_error_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverConfig {
    #[serde(default = "default_node")]
    pub node: String,

    #[serde(default = "default_script")]
    pub script: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            node: default_node(),
            script: default_script(),
        }
    }
}

// Serde default helpers
fn default_true() -> bool { true }
fn default_node() -> String { "node".to_string() }
fn default_script() -> String { "node/browser_driver.js".to_string() }

// ============================================================================
// Loading
// ============================================================================

impl HarnessConfig {
    /// Parse and check a config document. `origin` only labels errors.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: HarnessConfig =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                path: origin.to_path_buf(),
                source: e,
            })?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(invalid("base_url", "must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(invalid("base_url", "must start with http:// or https://"));
        }
        if self.retry.count == 0 {
            return Err(invalid("retry.count", "must be at least 1"));
        }
        if self.browser.timeout_ms == 0 {
            return Err(invalid("browser.timeout_ms", "must be greater than 0"));
        }
        Ok(())
    }

    /// Apply command-line overrides and check the result again.
    pub fn with_overrides(
        mut self,
        base_url: Option<&str>,
        headless: Option<bool>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = base_url {
            self.base_url = url.to_string();
        }
        if let Some(headless) = headless {
            self.browser.headless = headless;
        }
        self.check()?;
        Ok(self)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.count,
            delay: Duration::from_millis(self.retry.delay_ms),
            idle_timeout: self.timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.browser.timeout_ms)
    }

    pub fn context_options(&self) -> ContextOptions {
        ContextOptions {
            default_timeout: self.timeout(),
            ignore_https_errors: true,
        }
    }

    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            node: self.driver.node.clone(),
            script: self.driver.script.clone(),
            headless: self.browser.headless,
            slow_mo_ms: self.browser.slow_mo_ms,
        }
    }

    pub fn classifier(&self) -> Result<ErrorClassifier, ConfigError> {
        ErrorClassifier::new(&self.network.ignored_error_patterns)
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Everything the harness needs, loaded once before the first test.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: HarnessConfig,
    pub classifier: ErrorClassifier,
    pub credentials: CredentialStore,
}

/// Load the config file, the ignore patterns and the credential store.
///
/// Any failure here is fatal for the run.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    let content = std::fs::read_to_string(path).map_err(|e| {
        error!("Error loading configuration from {}: {}", path.display(), e);
        ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    let config = HarnessConfig::from_yaml(&content, path)?;
    let classifier = config.classifier()?;

    let credentials = match &config.credentials.file {
        Some(file) => {
            // Relative store paths are resolved next to the config file
            let resolved = match path.parent() {
                Some(dir) if file.is_relative() => dir.join(file),
                _ => file.clone(),
            };
            CredentialStore::load(&resolved)?
        }
        None => CredentialStore::default(),
    }
    .with_user(&config.credentials.valid);

    info!("Configuration loaded successfully from {}", path.display());
    Ok(LoadedConfig {
        config,
        classifier,
        credentials,
    })
}
