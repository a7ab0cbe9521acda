//! Adaptive pacing for admin API calls.
//!
//! Every call waits for [`RequestPacer::acquire`] before it is sent. The
//! pacer keeps a minimum spacing between calls and stretches it when the
//! shop's leaky bucket is filling up. REST responses report the bucket in
//! `X-Shopify-Shop-Api-Call-Limit` (`"32/40"`); GraphQL responses report it
//! in `extensions.cost.throttleStatus`.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Bucket usage above which calls are slowed down.
const HIGH_WATER: f64 = 0.8;

/// Multiplier applied to the minimum interval while above [`HIGH_WATER`].
const BACKPRESSURE_FACTOR: u32 = 4;

/// Upper bound for the extra spacing derived from a bucket report.
const MAX_PENALTY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Rest,
    GraphQl,
}

#[derive(Debug, Default)]
struct PacerState {
    /// Earliest instant the next call may be sent.
    next_allowed: Option<Instant>,
    /// Extra spacing from the last REST call-limit header.
    rest_penalty: Duration,
    /// Extra spacing from the last GraphQL `throttleStatus`.
    graphql_penalty: Duration,
}

impl PacerState {
    fn penalty(&self) -> Duration {
        self.rest_penalty.max(self.graphql_penalty)
    }
}

#[derive(Debug)]
pub(crate) struct RequestPacer {
    min_interval: Duration,
    state: Mutex<PacerState>,
}

impl RequestPacer {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Mutex::new(PacerState::default()),
        }
    }

    /// Waits until the next call is permitted and reserves the slot after it.
    pub(crate) async fn acquire(&self) {
        let wait = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let start = state.next_allowed.map_or(now, |at| at.max(now));
            state.next_allowed = Some(start + self.min_interval + state.penalty());
            start - now
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Records a REST `X-Shopify-Shop-Api-Call-Limit` header value.
    pub(crate) fn observe_call_limit(&self, header: Option<&str>) {
        let Some((used, max)) = header.and_then(parse_call_limit) else {
            return;
        };
        let penalty = if bucket_is_hot(f64::from(used), f64::from(max)) {
            self.min_interval * (BACKPRESSURE_FACTOR - 1)
        } else {
            Duration::ZERO
        };
        self.set_penalty(Bucket::Rest, penalty);
    }

    /// Records a GraphQL `throttleStatus`. When less than a fifth of the
    /// bucket is left, waits long enough for it to refill to that level,
    /// up to [`MAX_PENALTY`].
    pub(crate) fn observe_throttle_status(&self, available: f64, maximum: f64, restore_rate: f64) {
        let floor = maximum * (1.0 - HIGH_WATER);
        let penalty = if available < floor && restore_rate > 0.0 {
            Duration::try_from_secs_f64((floor - available) / restore_rate)
                .map_or(MAX_PENALTY, |d| d.min(MAX_PENALTY))
        } else {
            Duration::ZERO
        };
        self.set_penalty(Bucket::GraphQl, penalty);
    }

    /// Pushes the next permitted call out by at least `delay`.
    pub(crate) fn observe_retry_after(&self, delay: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let earliest = Instant::now() + delay;
        state.next_allowed = Some(state.next_allowed.map_or(earliest, |at| at.max(earliest)));
    }

    fn set_penalty(&self, bucket: Bucket, penalty: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = match bucket {
            Bucket::Rest => &mut state.rest_penalty,
            Bucket::GraphQl => &mut state.graphql_penalty,
        };
        if penalty > *slot {
            tracing::debug!(
                ?bucket,
                penalty_ms = penalty.as_millis(),
                "admin API bucket filling up, slowing down"
            );
        }
        *slot = penalty;
    }

    #[cfg(test)]
    fn penalty(&self) -> Duration {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .penalty()
    }
}

/// Parses `"used/max"`.
pub(crate) fn parse_call_limit(header: &str) -> Option<(u32, u32)> {
    let (used, max) = header.trim().split_once('/')?;
    let used = used.trim().parse().ok()?;
    let max = max.trim().parse().ok()?;
    (max > 0).then_some((used, max))
}

fn bucket_is_hot(used: f64, max: f64) -> bool {
    used >= max * HIGH_WATER
}

/// Parses a `Retry-After` header; Shopify sends fractional seconds (`"2.0"`).
pub(crate) fn parse_retry_after(header: Option<&str>) -> Option<Duration> {
    let secs: f64 = header?.trim().parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| Duration::from_secs_f64(secs))
}
