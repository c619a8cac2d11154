//! Sliding-window request budget, tracked per API key.

use crate::config::RateLimitPolicy;
use crate::error::{CricketError, Result};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct RateLimiter {
    policy: RateLimitPolicy,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// A zero budget would never free a slot, so it is raised to one.
    pub fn new(mut policy: RateLimitPolicy) -> Self {
        if policy.max_requests == 0 {
            tracing::warn!("request budget of zero raised to one per window");
            policy.max_requests = 1;
        }
        Self {
            policy,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Reserve one request slot for `key`.
    ///
    /// Waits for the oldest request in the window to age out when the budget
    /// is spent. Fails with `RateLimitExceeded` if that wait, counted from the
    /// first call, would run past `max_wait`. The lock is released while
    /// sleeping.
    pub async fn acquire(&self, key: &str) -> Result<()> {
        let started = Instant::now();

        loop {
            let wait = {
                let mut windows = self.windows.lock().await;
                let window = windows.entry(key.to_string()).or_default();
                let now = Instant::now();

                while window
                    .front()
                    .is_some_and(|sent| now.duration_since(*sent) >= self.policy.window)
                {
                    window.pop_front();
                }

                if window.len() < self.policy.max_requests as usize {
                    window.push_back(now);
                    return Ok(());
                }

                match window.front() {
                    Some(oldest) => (*oldest + self.policy.window).saturating_duration_since(now),
                    None => Duration::ZERO,
                }
            };

            if let Some(max_wait) = self.policy.max_wait {
                if started.elapsed() + wait > max_wait {
                    return Err(CricketError::RateLimitExceeded { retry_after: wait });
                }
            }

            tracing::warn!(
                delay_ms = wait.as_millis() as u64,
                "API request budget spent; waiting for a free slot"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Requests still available to `key` in the current window.
    pub async fn remaining(&self, key: &str) -> u32 {
        let windows = self.windows.lock().await;
        let now = Instant::now();
        let used = windows
            .get(key)
            .map(|w| {
                w.iter()
                    .filter(|sent| now.duration_since(**sent) < self.policy.window)
                    .count()
            })
            .unwrap_or(0);
        self.policy.max_requests.saturating_sub(used as u32)
    }
}
