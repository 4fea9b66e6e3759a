//! Sliding-window limiter for Slack Web API calls.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

use crate::core::config::RateLimitConfig;

const BURST_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStats {
    pub calls_in_window: usize,
    pub calls_last_second: usize,
    pub calls_per_minute: usize,
    pub burst_limit: usize,
}

#[derive(Debug)]
pub struct RateLimiter {
    calls_per_minute: usize,
    burst_limit: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_window(config, Duration::from_secs(60))
    }

    #[must_use]
    pub fn with_window(config: RateLimitConfig, window: Duration) -> Self {
        let calls_per_minute = config.calls_per_minute.max(1);
        let burst_limit = config.burst_limit.max(1);
        Self {
            calls_per_minute,
            burst_limit,
            window,
            calls: Mutex::new(VecDeque::with_capacity(calls_per_minute.max(burst_limit))),
        }
    }

    /// Wait until another call is allowed, then record it. Returns how long we waited.
    pub async fn acquire(&self) -> Duration {
        let mut waited = Duration::ZERO;
        loop {
            let delay = {
                let mut calls = self.lock();
                let now = Instant::now();
                self.evict(&mut calls, now);
                match self.delay_for(&calls, now) {
                    None => {
                        calls.push_back(now);
                        return waited;
                    }
                    Some(delay) => delay,
                }
            };

            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            warn!(delay_ms, "Rate limit reached, waiting");
            tokio::time::sleep(delay).await;
            waited += delay;
        }
    }

    #[must_use]
    pub fn stats(&self) -> RateLimitStats {
        let mut calls = self.lock();
        let now = Instant::now();
        self.evict(&mut calls, now);
        RateLimitStats {
            calls_in_window: calls.len(),
            calls_last_second: count_since(&calls, now, BURST_WINDOW),
            calls_per_minute: self.calls_per_minute,
            burst_limit: self.burst_limit,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Instant>> {
        // The queue holds plain instants; a poisoned lock still has usable data.
        self.calls.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn evict(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while calls
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            calls.pop_front();
        }
    }

    fn delay_for(&self, calls: &VecDeque<Instant>, now: Instant) -> Option<Duration> {
        if calls.len() >= self.calls_per_minute {
            let oldest = *calls.front()?;
            return Some(
                self.window
                    .saturating_sub(now.duration_since(oldest))
                    .max(Duration::from_millis(1)),
            );
        }

        if count_since(calls, now, BURST_WINDOW) >= self.burst_limit {
            let first_in_burst = calls
                .iter()
                .find(|&&t| now.duration_since(t) < BURST_WINDOW)?;
            return Some(
                BURST_WINDOW
                    .saturating_sub(now.duration_since(*first_in_burst))
                    .max(Duration::from_millis(1)),
            );
        }

        None
    }
}

fn count_since(calls: &VecDeque<Instant>, now: Instant, span: Duration) -> usize {
    calls
        .iter()
        .filter(|&&t| now.duration_since(t) < span)
        .count()
}
