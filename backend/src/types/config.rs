//! Immutable service configuration, built once at startup

use std::{env, fmt, sync::Arc};

use catalog_storage::book::{
    BookStorageResult, BookStore, InMemoryBookStore, PostgrestBookStore, DEFAULT_TABLE_NAME,
};
use sha2::{Digest, Sha512};
use thiserror::Error;
use tower_sessions::cookie::Key;

use super::Environment;

/// Ceiling for request bodies, uploads included (16 MiB)
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_SESSION_SECRET: &str = "poli-biblioteca-secret-key-2024";

/// Errors raised while reading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `APP_ENV` holds an unknown stage
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// A variable required in this environment is not set
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),

    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidVar {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Where books are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Hosted `PostgREST` endpoint
    Hosted {
        /// Project URL
        url: String,
        /// Access key
        api_key: String,
        /// Collection name
        table_name: String,
    },
    /// Process-local store, development only
    InMemory,
}

impl StoreConfig {
    /// Builds the book store described by this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the hosted store client cannot be created
    pub fn connect(&self) -> BookStorageResult<Arc<dyn BookStore>> {
        match self {
            Self::Hosted {
                url,
                api_key,
                table_name,
            } => {
                tracing::info!(url = %url, table = %table_name, "Using hosted book store");
                Ok(Arc::new(PostgrestBookStore::new(url, api_key, table_name)?))
            }
            Self::InMemory => {
                tracing::warn!("SUPABASE_URL is not set, books are kept in memory");
                Ok(Arc::new(InMemoryBookStore::new()))
            }
        }
    }
}

/// The single administrator account
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    /// Creates the credential pair
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Plain comparison against the configured pair
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Service configuration shared read-only by every request
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Deployment stage
    pub environment: Environment,
    /// Book store location
    pub store: StoreConfig,
    /// Administrator account
    pub admin: AdminCredentials,
    /// Listen port
    pub port: u16,
    session_secret: String,
}

impl AppConfig {
    /// Reads the configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or malformed
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        Self::from_lookup(environment, |name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`
    ///
    /// Production and staging must provide the store endpoint and key, the admin
    /// password and the session secret. Development falls back to an in-memory store
    /// and fixed defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or malformed
    pub fn from_lookup(
        environment: Environment,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |names: &[&str]| {
            names
                .iter()
                .find_map(|&name| lookup(name).filter(|value| !value.trim().is_empty()))
        };
        let strict = environment.requires_explicit_settings();
        let with_default = |name: &'static str, default: &str| match var(&[name]) {
            Some(value) => Ok(value),
            None if strict => Err(ConfigError::MissingVar(name)),
            None => Ok(default.to_string()),
        };

        let store = match var(&["SUPABASE_URL", "VITE_SUPABASE_URL"]) {
            Some(url) => StoreConfig::Hosted {
                url,
                api_key: var(&["SUPABASE_KEY", "VITE_SUPABASE_ANON_KEY"])
                    .ok_or(ConfigError::MissingVar("SUPABASE_KEY"))?,
                table_name: var(&["BOOKS_TABLE"])
                    .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            },
            None if strict => return Err(ConfigError::MissingVar("SUPABASE_URL")),
            None => StoreConfig::InMemory,
        };

        let admin = AdminCredentials::new(
            var(&["ADMIN_USERNAME"]).unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
            with_default("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD)?,
        );

        let port = match var(&["PORT"]) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar {
                    name: "PORT",
                    value,
                })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            environment,
            store,
            admin,
            port,
            session_secret: with_default("SESSION_SECRET", DEFAULT_SESSION_SECRET)?,
        })
    }

    /// Configuration for tests and local tooling: development stage, in-memory store
    #[must_use]
    pub fn development(admin: AdminCredentials) -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig::InMemory,
            admin,
            port: DEFAULT_PORT,
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
        }
    }

    /// Cookie signing key derived from the session secret
    ///
    /// SHA-512 stretches any secret to the 64 bytes the signing key needs.
    #[must_use]
    pub fn session_key(&self) -> Key {
        let digest = Sha512::digest(self.session_secret.as_bytes());
        Key::from(digest.as_slice())
    }
}
