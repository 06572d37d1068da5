use async_trait::async_trait;
use helpercore::NodeError;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Configuration for page fetching
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Window in which fetches count as recent
    pub recency: Duration,
    /// Recent fetches above which a new fetch waits one window first
    pub threshold_wait: usize,
    /// Recent fetches above which fetching is disabled until reset
    pub threshold_abort: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            recency: Duration::from_millis(1000),
            threshold_wait: 3,
            threshold_abort: 10,
            timeout: Duration::from_secs(30),
            user_agent: concat!("helper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Capability to turn a URL into page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, NodeError>;
}

struct LimiterState {
    recent: VecDeque<Instant>,
    /// Incremented on every request; a throttled request only proceeds if
    /// nothing newer arrived while it waited
    latest_ticket: u64,
    allowed: bool,
}

/// Guards a fetcher against bursts of requests
pub struct RateLimiter {
    recency: Duration,
    threshold_wait: usize,
    threshold_abort: usize,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(recency: Duration, threshold_wait: usize, threshold_abort: usize) -> Self {
        Self {
            recency,
            threshold_wait,
            threshold_abort,
            state: Mutex::new(LimiterState {
                recent: VecDeque::new(),
                latest_ticket: 0,
                allowed: true,
            }),
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.recency, config.threshold_wait, config.threshold_abort)
    }

    /// Wait until a fetch of `url` may proceed, or refuse it
    pub async fn acquire(&self, url: &str) -> Result<(), NodeError> {
        let (ticket, throttled) = {
            let mut state = self.state.lock().await;
            let now = Instant::now();

            while let Some(oldest) = state.recent.front() {
                if now.duration_since(*oldest) > self.recency {
                    state.recent.pop_front();
                } else {
                    break;
                }
            }

            state.recent.push_back(now);
            state.latest_ticket += 1;

            if state.recent.len() > self.threshold_abort && state.allowed {
                state.allowed = false;
                tracing::error!("Recency threshold reached, content fetching disabled until reset");
            }

            if !state.allowed {
                return Err(disabled());
            }

            (state.latest_ticket, state.recent.len() > self.threshold_wait)
        };

        if throttled {
            tracing::warn!("Throttling fetch of {}", url);
            tokio::time::sleep(self.recency).await;

            let mut state = self.state.lock().await;
            if state.latest_ticket != ticket {
                return Err(NodeError::Fetch(format!("Ignored content fetch for '{}'", url)));
            }
            if !state.allowed {
                return Err(disabled());
            }
            state.recent.push_back(Instant::now());
        }

        Ok(())
    }

    /// Forget recent fetches and re-enable fetching
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.recent.clear();
        state.allowed = true;
        tracing::info!("Content fetching re-enabled");
    }

    pub async fn is_allowed(&self) -> bool {
        self.state.lock().await.allowed
    }
}

fn disabled() -> NodeError {
    NodeError::Fetch("content fetching disabled".to_string())
}

/// Fetches pages over HTTP behind a rate limiter
pub struct HttpFetcher {
    client: reqwest::Client,
    limiter: RateLimiter,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, NodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| NodeError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            limiter: RateLimiter::from_config(config),
        })
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, NodeError> {
        self.limiter.acquire(url).await?;

        tracing::debug!("GET {}", url);
        let response = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| NodeError::Fetch(format!("Unable to acquire page content for '{}': {}", url, e)))?
            .error_for_status()
            .map_err(|e| NodeError::Fetch(format!("Unable to acquire page content for '{}': {}", url, e)))?;

        response
            .text()
            .await
            .map_err(|e| NodeError::Fetch(format!("Failed to read response: {}", e)))
    }
}
