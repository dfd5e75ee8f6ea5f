//! Connection settings for the CouchDB store.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::backend::errors::StoreError;

pub const ENV_URL: &str = "COUCHDB_URL";
pub const ENV_DATABASE: &str = "COUCHDB_DATABASE";
pub const ENV_USER: &str = "COUCHDB_USER";
pub const ENV_PASSWORD: &str = "COUCHDB_PASSWORD";
pub const ENV_TIMEOUT_SECS: &str = "COUCHDB_TIMEOUT_SECS";

/// Where and how to reach a CouchDB-compatible server.
///
/// `timeout_secs` is the per-call timeout of the HTTP client; the resolution
/// policies add no timeout of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouchDbConfig {
    /// Server root, e.g. `http://localhost:5984`.
    pub url: String,
    /// Database name.
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl CouchDbConfig {
    /// Config for `database` at `url`, without credentials.
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            username: None,
            password: None,
            timeout_secs: None,
        }
    }

    /// Sets basic-auth credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the per-call timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Reads the configuration from `COUCHDB_URL`, `COUCHDB_DATABASE`, `COUCHDB_USER`,
    /// `COUCHDB_PASSWORD` and `COUCHDB_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, keyed by the `COUCHDB_*` names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| StoreError::InvalidConfig {
                reason: format!("{key} is not set"),
            })
        };
        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => Some(raw.parse().map_err(|_| StoreError::InvalidConfig {
                reason: format!("{ENV_TIMEOUT_SECS} is not a number of seconds: {raw}"),
            })?),
            None => None,
        };
        Ok(Self {
            url: required(ENV_URL)?,
            database: required(ENV_DATABASE)?,
            username: lookup(ENV_USER),
            password: lookup(ENV_PASSWORD),
            timeout_secs,
        })
    }
}
