//! Fetch worker: draw a proxy, request a profile, classify, retry

use crate::error::FetchError;
use crate::models::Profile;
use crate::proxy::ProxyCatalog;
use crate::scraper::retry::RetryPolicy;
use crate::scraper::transport::{RawResponse, Transport};
use log::{debug, warn};

/// Default upstream users API
pub const DEFAULT_BASE_URL: &str = "https://users.roblox.com";

/// HTTP status the upstream uses for rate limiting
const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Outcome of one fetch attempt
///
/// Only `Success` and `NotFound` are terminal; the worker loops on the others.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success {
        status_code: u16,
        body: String,
        profile: Profile,
    },
    /// Any completed response other than 200 and 429
    NotFound { status_code: u16, body: String },
    RateLimited,
    ProxyError { message: String },
}

impl FetchOutcome {
    /// Classify a completed response for identifier `id`
    pub fn classify(id: i64, response: RawResponse) -> Result<Self, FetchError> {
        match response.status {
            STATUS_TOO_MANY_REQUESTS => Ok(FetchOutcome::RateLimited),
            200 => {
                let profile = Profile::from_json(&response.body)
                    .map_err(|source| FetchError::MalformedProfile { id, source })?;
                Ok(FetchOutcome::Success {
                    status_code: response.status,
                    body: response.body,
                    profile,
                })
            }
            status_code => Ok(FetchOutcome::NotFound {
                status_code,
                body: response.body,
            }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FetchOutcome::Success { .. } | FetchOutcome::NotFound { .. }
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    /// Response text with its status, e.g. `{"id":1} HTTPStatus: 200`
    pub fn summary(&self) -> String {
        match self {
            FetchOutcome::Success {
                status_code, body, ..
            }
            | FetchOutcome::NotFound { status_code, body } => {
                format!("{} HTTPStatus: {}", body, status_code)
            }
            FetchOutcome::RateLimited => {
                format!("rate limited HTTPStatus: {}", STATUS_TOO_MANY_REQUESTS)
            }
            FetchOutcome::ProxyError { message } => format!("proxy error: {}", message),
        }
    }
}

/// Fetches one profile at a time through random proxies
pub struct FetchWorker<T> {
    catalog: ProxyCatalog,
    transport: T,
    base_url: String,
    policy: RetryPolicy,
}

impl<T: Transport> FetchWorker<T> {
    pub fn new(catalog: ProxyCatalog, transport: T) -> Self {
        Self {
            catalog,
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn profile_url(&self, id: i64) -> String {
        format!("{}/v1/users/{}", self.base_url.trim_end_matches('/'), id)
    }

    /// Make a single attempt with a freshly drawn proxy
    pub async fn attempt(&self, id: i64) -> Result<FetchOutcome, FetchError> {
        let proxy = self.catalog.draw_random().await?;
        debug!("Fetching id {} through {}", id, proxy);

        match self.transport.get(&self.profile_url(id), &proxy).await {
            Ok(response) => FetchOutcome::classify(id, response),
            Err(e) => Ok(FetchOutcome::ProxyError {
                message: e.to_string(),
            }),
        }
    }

    /// Retry until a terminal outcome or until the policy gives up
    pub async fn fetch(&self, id: i64) -> Result<FetchOutcome, FetchError> {
        let mut attempts: u32 = 0;
        let mut rate_limited: u32 = 0;

        loop {
            if !self.policy.allows_attempt(attempts.saturating_add(1)) {
                return Err(FetchError::RetriesExhausted { id, attempts });
            }
            attempts = attempts.saturating_add(1);

            match self.attempt(id).await? {
                FetchOutcome::ProxyError { message } => {
                    warn!("Proxy error: {} Retrying...", message);
                    if !self.policy.transport_delay.is_zero() {
                        tokio::time::sleep(self.policy.transport_delay).await;
                    }
                }
                FetchOutcome::RateLimited => {
                    rate_limited = rate_limited.saturating_add(1);
                    let delay = self.policy.rate_limit_delay_for(rate_limited);
                    warn!(
                        "Rate limited on id {}, retrying in {}ms...",
                        id,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                terminal => return Ok(terminal),
            }
        }
    }
}
