//! Proxy line codec
//!
//! A proxy list line is `[scheme:]host:port[:user:pass]`. The `http` scheme is the
//! implicit default and is never written back out, every other scheme is.

use crate::error::ProxyLineError;
use crate::proxy::models::{ProxyAuth, ProxyRecord, ProxyType, MAX_PORT};

/// Raw tokens of a decoded proxy line, before scheme and port validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyLine {
    /// Lower-cased scheme, `http` when the line did not name one
    pub scheme: String,
    /// Whether the scheme was written in the line
    pub scheme_explicit: bool,
    pub host: String,
    pub port: i64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyLine {
    /// Check scheme and port bounds and build the proxy record
    pub fn validate(self) -> Result<ProxyRecord, ProxyLineError> {
        let proxy_type: ProxyType = self.scheme.parse()?;

        if !(0..=MAX_PORT).contains(&self.port) {
            return Err(ProxyLineError::PortOutOfRange { port: self.port });
        }
        // Bounded above, the cast cannot truncate.
        let port = self.port as u32;

        Ok(ProxyRecord {
            proxy_type,
            host: self.host,
            port,
            auth: ProxyAuth::from_parts(self.username, self.password)?,
        })
    }
}

/// Proxy line encoder and decoder
pub struct ProxyParser;

impl ProxyParser {
    /// Remove every whitespace character, including ones inside the line
    pub fn clean_line(line: &str) -> String {
        line.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Decode a proxy line
    ///
    /// Supports formats:
    /// - HOST:PORT
    /// - SCHEME:HOST:PORT
    /// - HOST:PORT:USER:PASS
    /// - SCHEME:HOST:PORT:USER:PASS
    pub fn decode(line: &str) -> Result<ProxyLine, ProxyLineError> {
        let line = Self::clean_line(line);
        let parts: Vec<&str> = line.split(':').collect();

        let (scheme, scheme_explicit, rest) = match parts.len() {
            2 | 4 => (ProxyType::Http.to_string(), false, &parts[..]),
            3 | 5 => (parts[0].to_lowercase(), true, &parts[1..]),
            tokens => return Err(ProxyLineError::MalformedProxyLine { tokens }),
        };

        let port = rest[1]
            .parse::<i64>()
            .map_err(|_| ProxyLineError::InvalidPort {
                value: rest[1].to_string(),
            })?;

        let (username, password) = match rest {
            [_, _, user, pass] => (Some(user.to_string()), Some(pass.to_string())),
            _ => (None, None),
        };

        Ok(ProxyLine {
            scheme,
            scheme_explicit,
            host: rest[0].to_string(),
            port,
            username,
            password,
        })
    }

    /// Decode and validate a proxy line in one step
    pub fn parse_line(line: &str) -> Result<ProxyRecord, ProxyLineError> {
        Self::decode(line)?.validate()
    }

    /// Encode proxy parts into a proxy list line
    pub fn encode(
        proxy_type: ProxyType,
        host: &str,
        port: u32,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<String, ProxyLineError> {
        let auth = ProxyAuth::from_parts(username.map(String::from), password.map(String::from))?;
        Ok(Self::encode_record(&ProxyRecord {
            proxy_type,
            host: host.to_string(),
            port,
            auth,
        }))
    }

    /// Encode a proxy record into a proxy list line
    pub fn encode_record(proxy: &ProxyRecord) -> String {
        let scheme_part = match proxy.proxy_type {
            ProxyType::Http => String::new(),
            other => format!("{}:", other),
        };
        let auth_part = proxy.auth.as_ref().map_or(String::new(), |auth| {
            format!(":{}:{}", auth.username, auth.password)
        });

        format!("{}{}:{}{}", scheme_part, proxy.host, proxy.port, auth_part)
    }
}
