use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::settings::Credential;
use crate::error::ConfigError;

/// Passwords of the storefront's test users, kept out of the main config.
///
/// File format:
/// ```yaml
/// users:
///   standard_user: secret_sauce
///   locked_out_user: secret_sauce
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default)]
    users: BTreeMap<String, String>,
}

impl CredentialStore {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            error!(
                "Credentials file not found at {}. Copy credentials.example.yaml and fill in the values.",
                path.display()
            );
            ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        let store: CredentialStore =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;

        info!("Credentials loaded successfully ({} users)", store.users.len());
        Ok(store)
    }

    /// Add a user unless the store already knows it.
    pub fn with_user(mut self, credential: &Credential) -> Self {
        self.users
            .entry(credential.username.clone())
            .or_insert_with(|| credential.password.clone());
        self
    }

    pub fn password_for(&self, username: &str) -> Result<&str, ConfigError> {
        self.users.get(username).map(String::as_str).ok_or_else(|| {
            error!("No password found for user: {}", username);
            ConfigError::UnknownUser(username.to_string())
        })
    }

    pub fn user_exists(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Usernames in sorted order.
    pub fn available_users(&self) -> Vec<&str> {
        self.users.keys().map(String::as_str).collect()
    }
}
