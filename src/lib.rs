//! Profile Scraper - sequential user-profile scraping through rotating proxies
//!
//! Scans consecutive user ids against a public users API, sends every request
//! through a proxy drawn at random from a proxy list file, and stores the
//! profiles it finds in SQLite.

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod proxy;
pub mod scraper;

pub use config::{AppConfig, ScrapeSettings};
pub use database::{ProfileDatabase, ProfileStore};
pub use error::{ConfigError, FetchError, ProxyFileError, ProxyLineError, TransportError};
pub use models::Profile;
pub use proxy::*;
pub use scraper::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
