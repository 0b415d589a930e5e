//! Quota gate for outgoing requests.
//!
//! Habitica budgets requests per fixed window and reports the live budget in
//! `x-ratelimit-remaining` / `x-ratelimit-reset` response headers. The gate
//! owns the interpretation of those headers and defers any call that would
//! land in an exhausted window until the window resets.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Request budget assumed until the first response says otherwise.
pub const DEFAULT_REMAINING: u32 = 30;

/// Snapshot of the remote quota window as reported by the most recent
/// response. Last response wins; concurrent in-flight updates are not merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitState {
    /// Requests left in the current window
    pub remaining: u32,
    /// Instant the window resets, once a response has reported one
    pub next_reset: Option<DateTime<Utc>>,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remaining: DEFAULT_REMAINING,
            next_reset: None,
        }
    }
}

impl RateLimitState {
    /// Interpret the rate-limit headers of a response.
    ///
    /// An absent or unparseable remaining count falls back to the optimistic
    /// default; an absent or unparseable reset instant keeps the previous
    /// value so a transient header omission cannot flip the gate between
    /// optimistic and pessimistic behavior.
    pub fn update_from_headers(&mut self, headers: &HeaderMap) {
        self.remaining = headers
            .get(REMAINING_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_REMAINING);

        if let Some(value) = headers.get(RESET_HEADER) {
            match value.to_str().ok().and_then(parse_reset) {
                Some(instant) => self.next_reset = Some(instant),
                None => warn!(
                    value = ?value,
                    "unparseable {RESET_HEADER} header, keeping previous reset instant"
                ),
            }
        }
    }
}

/// Parse a reset instant from either RFC 3339 or epoch seconds.
#[allow(clippy::cast_possible_truncation)]
fn parse_reset(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
}

/// Serializes outgoing requests against the quota window.
///
/// `execute` takes a request *factory* rather than a request so that a
/// deferred call never leaks an already-in-flight request. All quota state
/// lives behind one lock; callers on any runtime thread observe the same
/// window.
pub struct RateLimitedGate {
    state: Mutex<RateLimitState>,
    buffer: Duration,
}

impl RateLimitedGate {
    /// Create a gate with the optimistic default state.
    #[must_use]
    pub fn new(buffer: Duration) -> Self {
        Self::with_state(RateLimitState::default(), buffer)
    }

    /// Create a gate resuming from a known quota state.
    #[must_use]
    pub fn with_state(state: RateLimitState, buffer: Duration) -> Self {
        Self {
            state: Mutex::new(state),
            buffer,
        }
    }

    /// Current quota snapshot.
    pub async fn state(&self) -> RateLimitState {
        *self.state.lock().await
    }

    /// Run one request under the gate.
    ///
    /// If the window is exhausted and a future reset instant is known, the
    /// call sleeps until that instant plus the configured buffer and then
    /// re-checks live state, since another caller may have consumed or
    /// refreshed the quota in the interim. With no reset instant known the
    /// call proceeds immediately. Headers of the response update the shared
    /// state whether or not the request succeeded at the HTTP level; failed
    /// calls are never retried here.
    pub async fn execute<F, Fut>(&self, factory: F) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut waited_for: Option<DateTime<Utc>> = None;
        loop {
            let pending_reset = {
                let state = self.state.lock().await;
                if state.remaining > 0 {
                    None
                } else {
                    match state.next_reset {
                        // A reset we already slept through means the window
                        // has turned over from our point of view; proceed
                        // unless a newer response moved the goalposts.
                        Some(reset) if reset > Utc::now() && waited_for != Some(reset) => {
                            Some(reset)
                        }
                        _ => None,
                    }
                }
            };
            let Some(reset) = pending_reset else { break };

            let delay = (reset - Utc::now()).to_std().unwrap_or_default() + self.buffer;
            debug!(delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "quota exhausted, deferring request until window reset");
            tokio::time::sleep(delay).await;
            waited_for = Some(reset);
        }

        let response = factory().await?;

        let mut state = self.state.lock().await;
        state.update_from_headers(response.headers());
        debug!(
            remaining = state.remaining,
            reset = ?state.next_reset,
            "rate limit state updated from response"
        );
        Ok(response)
    }
}
