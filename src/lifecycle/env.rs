use std::sync::Arc;

use crate::browser::automation::ContextOptions;
use crate::config::credentials::CredentialStore;
use crate::config::settings::{Credential, LoadedConfig};
use crate::monitor::classifier::ErrorClassifier;
use crate::retry::executor::RetryPolicy;

/// Read-only settings shared by every test of a run.
#[derive(Debug, Clone)]
pub struct HarnessEnv {
    pub base_url: String,
    pub valid: Credential,
    pub invalid: Credential,
    pub credentials: CredentialStore,
    pub retry: RetryPolicy,
    pub context: ContextOptions,
    pub classifier: Arc<ErrorClassifier>,
}

impl HarnessEnv {
    pub fn from_loaded(loaded: LoadedConfig) -> Self {
        let LoadedConfig {
            config,
            classifier,
            credentials,
        } = loaded;

        Self {
            retry: config.retry_policy(),
            context: config.context_options(),
            base_url: config.base_url,
            valid: config.credentials.valid,
            invalid: config.credentials.invalid,
            credentials,
            classifier: Arc::new(classifier),
        }
    }
}
