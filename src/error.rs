//! Error types for the scraper
//!
//! Each concern gets its own enum. Startup failures (`ConfigError`, `ProxyFileError`)
//! abort the run, `TransportError` is swallowed by the retry loop, and `FetchError`
//! is counted as a failed identifier by the coordinator.

use std::path::PathBuf;
use thiserror::Error;

/// Missing or invalid startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("please make sure to provide {key} in the .env file or environment")]
    MissingKey { key: String },

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("failed to load {}: {message}", path.display())]
    EnvFile { path: PathBuf, message: String },
}

/// Failure to decode, encode or validate a single proxy line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyLineError {
    #[error("incorrect proxy line format ({tokens} colon-separated tokens)")]
    MalformedProxyLine { tokens: usize },

    #[error("proxy port must be a number, got {value:?}")]
    InvalidPort { value: String },

    #[error("proxy with auth needs both a username and a password")]
    InvalidCredentials,

    #[error("proxy type {scheme:?} not supported")]
    UnsupportedScheme { scheme: String },

    #[error("proxy port must be between 0 and 65536, got {port}")]
    PortOutOfRange { port: i64 },
}

/// Failure while reading or validating the proxy list file
#[derive(Debug, Error)]
pub enum ProxyFileError {
    #[error("{} not found, create it, add proxies and try again", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no proxy found in {}, add some and try again", path.display())]
    EmptyProxyList { path: PathBuf },

    #[error("{}:{line_number}: please remove the empty line", path.display())]
    EmptyLine {
        path: PathBuf,
        line_number: usize,
        content: String,
    },

    #[error("{}:{line_number}: {source} in {content:?}", path.display())]
    InvalidLine {
        path: PathBuf,
        line_number: usize,
        content: String,
        #[source]
        source: ProxyLineError,
    },
}

/// Connection or proxy failure during one fetch attempt
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot use proxy {proxy}: {message}")]
    Proxy { proxy: String, message: String },

    #[error("request through {proxy} failed: {message}")]
    Request { proxy: String, message: String },

    #[error("failed to read response body: {message}")]
    Body { message: String },
}

/// Response body that cannot be turned into a profile
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("profile has no id")]
    MissingId,

    #[error("unparseable created timestamp {value:?}")]
    InvalidCreated { value: String },
}

/// Unexpected failure of a fetch worker, outside the retry classification
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Catalog(#[from] ProxyFileError),

    #[error("malformed profile for id {id}: {source}")]
    MalformedProfile {
        id: i64,
        #[source]
        source: ProfileError,
    },

    #[error("gave up on id {id} after {attempts} attempts")]
    RetriesExhausted { id: i64, attempts: u32 },
}

/// Persistence failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
