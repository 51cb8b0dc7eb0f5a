// src/services/rate_limiter.rs
// DOCUMENTATION: Delays between outbound Google calls
// PURPOSE: Short randomized pause before each call, longer fixed pause
// before following a continuation token

use crate::config::Config;
use rand::Rng;
use std::time::Duration;

/// Seconds to a Duration; negative or unrepresentable values become zero
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
        log::warn!("Ignoring unusable delay of {} seconds", secs);
        Duration::ZERO
    })
}

/// Inter-request delay policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiter {
    min_delay: Duration,
    max_delay: Duration,
    page_token_delay: Duration,
}

impl RateLimiter {
    /// Build a limiter; bounds are swapped if given inverted
    pub fn new(min_delay: Duration, max_delay: Duration, page_token_delay: Duration) -> Self {
        let (min_delay, max_delay) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            (max_delay, min_delay)
        };

        Self {
            min_delay,
            max_delay,
            page_token_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            seconds(config.request_delay_min),
            seconds(config.request_delay_max),
            seconds(config.page_token_delay),
        )
    }

    /// No waiting at all
    #[allow(dead_code)]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Uniform sample in [min_delay, max_delay]
    pub fn next_delay(&self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        let secs = rand::thread_rng()
            .gen_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Pause before a nearby-search or detail call
    pub async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Pause before a continuation-token search
    pub async fn wait_for_page_token(&self) {
        if !self.page_token_delay.is_zero() {
            log::debug!("Waiting {:?} for next_page_token", self.page_token_delay);
            tokio::time::sleep(self.page_token_delay).await;
        }
    }
}
