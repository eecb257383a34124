//! Timestamp window and replay checks
//!
//! A payload is accepted iff
//! ```text
//! -margin <= now - timestamp <= tolerance + margin
//! ```
//! and it is newer than the last accepted payload of the same XUID (older by
//! less than the margin is tolerated to absorb clock jitter between proxies).

use mini_moka::sync::Cache;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bedgate_core::config::HandshakeConfig;

use crate::error::{HandshakeError, HandshakeResult};

/// Minimum time an accepted timestamp is remembered per XUID.
const MIN_REPLAY_WINDOW: Duration = Duration::from_secs(10);

/// Source of the current time in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampPolicy {
    pub tolerance_ms: i64,
    pub margin_ms: i64,
}

impl Default for TimestampPolicy {
    fn default() -> Self {
        Self::from_config(&HandshakeConfig::default())
    }
}

impl TimestampPolicy {
    pub fn from_config(config: &HandshakeConfig) -> Self {
        Self {
            tolerance_ms: i64::try_from(config.timestamp_tolerance_ms).unwrap_or(i64::MAX),
            margin_ms: i64::try_from(config.error_margin_ms).unwrap_or(i64::MAX),
        }
    }

    /// Check that `timestamp` lies inside the acceptance window around `now`.
    pub fn check(&self, timestamp: i64, now: i64) -> HandshakeResult<()> {
        let difference = now.saturating_sub(timestamp);
        if difference > self.tolerance_ms.saturating_add(self.margin_ms) {
            return Err(HandshakeError::TimestampDenied {
                timestamp,
                now,
                reason: "payload expired",
            });
        }
        if difference < -self.margin_ms {
            return Err(HandshakeError::TimestampDenied {
                timestamp,
                now,
                reason: "payload issued in the future",
            });
        }
        Ok(())
    }

    /// How long an accepted timestamp must be remembered to catch replays.
    pub fn replay_window(&self) -> Duration {
        let window = self.tolerance_ms.saturating_add(self.margin_ms.saturating_mul(2));
        Duration::from_millis(u64::try_from(window).unwrap_or(0)).max(MIN_REPLAY_WINDOW)
    }
}

/// Last accepted timestamp per XUID.
#[derive(Clone)]
pub struct ReplayCache {
    seen: Cache<u64, i64>,
    margin_ms: i64,
}

impl ReplayCache {
    pub fn new(policy: &TimestampPolicy, capacity: u64) -> Self {
        let seen = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(policy.replay_window())
            .build();
        Self {
            seen,
            margin_ms: policy.margin_ms,
        }
    }

    /// Reject a reused or out-of-order timestamp, otherwise remember it.
    ///
    /// The newest accepted timestamp is kept; an older one let through as
    /// jitter never replaces it.
    pub fn check_and_record(&self, xuid: u64, timestamp: i64, now: i64) -> HandshakeResult<()> {
        let cached = self.seen.get(&xuid);
        if let Some(cached) = cached {
            let difference = timestamp.saturating_sub(cached);
            if difference == 0 {
                return Err(HandshakeError::TimestampDenied {
                    timestamp,
                    now,
                    reason: "payload already used",
                });
            }
            if difference < -self.margin_ms {
                return Err(HandshakeError::TimestampDenied {
                    timestamp,
                    now,
                    reason: "payload older than the last accepted one",
                });
            }
        }
        self.seen
            .insert(xuid, cached.map_or(timestamp, |cached| cached.max(timestamp)));
        Ok(())
    }
}

impl std::fmt::Debug for ReplayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayCache")
            .field("entries", &self.seen.entry_count())
            .field("margin_ms", &self.margin_ms)
            .finish()
    }
}
