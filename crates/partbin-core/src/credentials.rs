//! GitHub credential pair
//!
//! The access token and the `owner/name` repository identifier are stored
//! as two separate entries in the local key-value store. They are read
//! once at startup into a [`Credentials`] value, which is then passed to
//! whatever needs it.
//!
//! A pair with either half missing counts as "not configured". That is a
//! normal state, not an error: the inventory simply stays local.

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::storage::{KeyValueStore, StorageError};

/// Key holding the access token
pub const TOKEN_KEY: &str = "github_token";

/// Key holding the repository identifier
pub const REPOSITORY_KEY: &str = "github_repo";

/// Environment variable overriding the stored token
pub const TOKEN_ENV: &str = "PARTBIN_GITHUB_TOKEN";

/// Environment variable overriding the stored repository
pub const REPOSITORY_ENV: &str = "PARTBIN_GITHUB_REPO";

/// Errors from changing the stored credentials
#[derive(Error, Debug)]
pub enum CredentialError {
    /// One or both fields were blank
    #[error("Both a token and a repository are required (missing: {missing})")]
    Incomplete { missing: &'static str },

    /// Writing to the local store failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Token and repository for the remote document store
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Opaque access token
    pub token: String,
    /// Repository identifier, `owner/name`
    pub repository: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            repository: repository.into(),
        }
    }

    /// True iff both fields are non-empty
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty() && !self.repository.trim().is_empty()
    }

    /// Token with all but the last four characters hidden, for display
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.token.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

// Keep the token out of logs and panic messages
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.masked_token())
            .field("repository", &self.repository)
            .finish()
    }
}

/// Reads and writes the stored credential pair
#[derive(Debug, Clone)]
pub struct CredentialStore {
    kv: KeyValueStore,
}

impl CredentialStore {
    pub fn new(kv: KeyValueStore) -> Self {
        Self { kv }
    }

    /// Read the stored pair. Missing or unreadable fields become empty strings.
    pub fn get(&self) -> Credentials {
        Credentials {
            token: self.read_field(TOKEN_KEY),
            repository: self.read_field(REPOSITORY_KEY),
        }
    }

    /// Read the stored pair, then apply non-empty environment overrides
    pub fn get_with_env(&self) -> Credentials {
        let mut credentials = self.get();
        if let Some(token) = non_empty_env(TOKEN_ENV) {
            credentials.token = token;
        }
        if let Some(repository) = non_empty_env(REPOSITORY_ENV) {
            credentials.repository = repository;
        }
        credentials
    }

    /// Store both fields. Values are trimmed; a blank field rejects the
    /// whole call and nothing is written.
    pub fn set(&self, token: &str, repository: &str) -> Result<Credentials, CredentialError> {
        let token = token.trim();
        let repository = repository.trim();

        let missing = match (token.is_empty(), repository.is_empty()) {
            (true, true) => Some("token and repository"),
            (true, false) => Some("token"),
            (false, true) => Some("repository"),
            (false, false) => None,
        };
        if let Some(missing) = missing {
            return Err(CredentialError::Incomplete { missing });
        }

        let previous_token = self.kv.get(TOKEN_KEY).ok().flatten();
        self.kv.set(TOKEN_KEY, token)?;

        if let Err(e) = self.kv.set(REPOSITORY_KEY, repository) {
            // Roll back so a half-written pair is never left behind
            let rollback = match previous_token {
                Some(previous) => self.kv.set(TOKEN_KEY, &previous),
                None => self.kv.remove(TOKEN_KEY),
            };
            if let Err(rollback_err) = rollback {
                warn!("Failed to roll back token after error: {}", rollback_err);
            }
            return Err(e.into());
        }

        info!(repository, "stored GitHub credentials");
        Ok(Credentials::new(token, repository))
    }

    /// Remove both fields
    pub fn clear(&self) -> Result<(), CredentialError> {
        self.kv.remove(TOKEN_KEY)?;
        self.kv.remove(REPOSITORY_KEY)?;
        info!("cleared GitHub credentials");
        Ok(())
    }

    fn read_field(&self, key: &str) -> String {
        match self.kv.get(key) {
            Ok(value) => value.map(|v| v.trim().to_string()).unwrap_or_default(),
            Err(e) => {
                warn!("Could not read {}: {}", key, e);
                String::new()
            }
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
