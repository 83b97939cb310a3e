//! Proxy list file access
//!
//! The catalog is read-through: every draw re-reads the file, so edits to the list
//! take effect on the next attempt and workers share no in-memory state.

use crate::error::{ProxyFileError, ProxyLineError};
use crate::proxy::models::ProxyRecord;
use crate::proxy::parser::ProxyParser;
use log::debug;
use rand::Rng;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File-backed proxy list
#[derive(Debug, Clone)]
pub struct ProxyCatalog {
    path: PathBuf,
}

impl ProxyCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty list file when missing.
    /// Returns `true` if the file was created.
    pub fn ensure_exists(&self) -> Result<bool, ProxyFileError> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, "").map_err(|e| self.io_error(e))?;
        Ok(true)
    }

    /// Pre-flight check of the whole file. Returns the number of proxy lines.
    pub fn validate_file(&self) -> Result<usize, ProxyFileError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        self.validate_content(&content)
    }

    /// Validate every line of a proxy list
    pub fn validate_content(&self, content: &str) -> Result<usize, ProxyFileError> {
        let mut count = 0;

        for (index, raw) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = ProxyParser::clean_line(raw);

            if line.is_empty() {
                return Err(ProxyFileError::EmptyLine {
                    path: self.path.clone(),
                    line_number,
                    content: raw.to_string(),
                });
            }

            ProxyParser::parse_line(&line)
                .map_err(|source| self.invalid_line(line_number, raw, source))?;
            count += 1;
        }

        if count == 0 {
            return Err(ProxyFileError::EmptyProxyList {
                path: self.path.clone(),
            });
        }

        Ok(count)
    }

    /// Re-read the file and pick one proxy uniformly among its distinct lines
    pub async fn draw_random(&self) -> Result<ProxyRecord, ProxyFileError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        self.select_random(&content)
    }

    /// Pick one proxy uniformly among the distinct non-blank lines of `content`
    pub fn select_random(&self, content: &str) -> Result<ProxyRecord, ProxyFileError> {
        // Distinct lines, remembering where each first appeared.
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for (index, raw) in content.lines().enumerate() {
            first_seen.entry(raw).or_insert(index + 1);
        }

        let candidates: Vec<(&str, usize)> = first_seen
            .into_iter()
            .filter(|(raw, _)| !ProxyParser::clean_line(raw).is_empty())
            .collect();

        if candidates.is_empty() {
            return Err(ProxyFileError::EmptyProxyList {
                path: self.path.clone(),
            });
        }

        let (raw, line_number) = candidates[rand::rng().random_range(0..candidates.len())];
        let proxy = ProxyParser::parse_line(raw)
            .map_err(|source| self.invalid_line(line_number, raw, source))?;

        debug!(
            "Drew proxy {} from line {} of {}",
            proxy,
            line_number,
            self.path.display()
        );
        Ok(proxy)
    }

    fn io_error(&self, source: io::Error) -> ProxyFileError {
        if source.kind() == io::ErrorKind::NotFound {
            ProxyFileError::FileNotFound {
                path: self.path.clone(),
            }
        } else {
            ProxyFileError::Io {
                path: self.path.clone(),
                source,
            }
        }
    }

    fn invalid_line(&self, line_number: usize, raw: &str, source: ProxyLineError) -> ProxyFileError {
        ProxyFileError::InvalidLine {
            path: self.path.clone(),
            line_number,
            content: raw.to_string(),
            source,
        }
    }
}
