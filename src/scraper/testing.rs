//! Test doubles shared by the scraper tests

use crate::error::TransportError;
use crate::proxy::{ProxyCatalog, ProxyRecord};
use crate::scraper::transport::{RawResponse, Transport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

type Responder = Box<dyn Fn(&str) -> Result<RawResponse, TransportError> + Send + Sync>;

/// Write a proxy list to a temp file and open a catalog on it
pub fn proxy_file(content: &str) -> (NamedTempFile, ProxyCatalog) {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write proxies");
    file.flush().expect("Failed to flush file");
    let catalog = ProxyCatalog::new(file.path());
    (file, catalog)
}

/// Transport replaying a fixed script, then falling back to a responder
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    fallback: Responder,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    /// Replay `script` in order; once exhausted every request gets a 404
    pub fn new(script: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Box::new(|_| Ok(RawResponse::new(404, "script exhausted"))),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request by URL
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `(url, proxy url)` pairs seen so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, proxy: &ProxyRecord) -> Result<RawResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), proxy.proxy_url()));

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => (self.fallback)(url),
        }
    }
}
