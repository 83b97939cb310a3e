//! Proxy module for the proxy list
//!
//! This module provides functionality for:
//! - Encoding and decoding proxy lines (HOST:PORT, SCHEME:HOST:PORT:USER:PASS, etc.)
//! - Validating a proxy list file before scraping
//! - Drawing a random proxy for each request attempt

pub mod catalog;
pub mod models;
pub mod parser;

pub use catalog::ProxyCatalog;
pub use models::{ProxyAuth, ProxyRecord, ProxyType, MAX_PORT};
pub use parser::{ProxyLine, ProxyParser};
