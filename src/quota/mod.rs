//! Request quota tracking
//!
//! Enforces a rolling daily cap and a rolling 60-second cap on backend
//! requests. One tracker is constructed at startup and shared by reference
//! with every search client; all state lives behind a single mutex so
//! check-then-record sequences are atomic across concurrent searches.

use crate::config::RateLimitSettings;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const DAY_SECONDS: i64 = 86_400;
const MINUTE_MILLIS: i64 = 60_000;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Request ceilings, captured once at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLimits {
    pub per_day: u32,
    pub per_minute: u32,
}

impl From<&RateLimitSettings> for QuotaLimits {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            per_day: settings.max_requests_per_day,
            per_minute: settings.max_requests_per_minute,
        }
    }
}

/// Returned when the tracker refuses a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request quota exhausted, try again in {reset_in}")]
pub struct QuotaDenied {
    /// Human-readable time until a slot frees up
    pub reset_in: String,
}

/// Point-in-time view of quota usage
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuotaStatus {
    pub daily_requests_used: u32,
    pub daily_requests_limit: u32,
    pub minute_requests_used: u32,
    pub minute_requests_limit: u32,
    pub can_make_request: bool,
    pub seconds_until_daily_reset: i64,
}

impl QuotaStatus {
    /// Plain-language reading of the numbers
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();

        let daily_used = u64::from(self.daily_requests_used);
        let daily_limit = u64::from(self.daily_requests_limit);
        if daily_used >= daily_limit {
            messages.push("Daily quota exhausted".to_string());
        } else if daily_used * 10 >= daily_limit * 9 {
            messages.push("Daily quota nearly exhausted".to_string());
        } else {
            messages.push("Daily quota available".to_string());
        }

        if self.minute_requests_used >= self.minute_requests_limit {
            messages.push("Minute rate limit reached".to_string());
        } else {
            messages.push("Minute rate limit OK".to_string());
        }

        if self.can_make_request {
            messages.push("Ready to make requests".to_string());
        } else {
            messages.push("Cannot make requests due to rate limits".to_string());
        }

        messages
    }
}

#[derive(Debug)]
struct QuotaState {
    daily_count: u32,
    daily_window_start: DateTime<Utc>,
    minute_requests: Vec<DateTime<Utc>>,
}

impl QuotaState {
    /// Reclaim an expired daily window and drop minute entries older than 60s
    fn refresh(&mut self, now: DateTime<Utc>) {
        if now - self.daily_window_start > Duration::seconds(DAY_SECONDS) {
            self.daily_count = 0;
            self.daily_window_start = now;
        }
        self.minute_requests
            .retain(|t| (now - *t).num_milliseconds() < MINUTE_MILLIS);
    }

    fn daily_exhausted(&self, limits: &QuotaLimits) -> bool {
        self.daily_count >= limits.per_day
    }

    fn minute_exhausted(&self, limits: &QuotaLimits) -> bool {
        self.minute_requests.len() >= limits.per_minute as usize
    }

    fn allows(&self, limits: &QuotaLimits) -> bool {
        !self.daily_exhausted(limits) && !self.minute_exhausted(limits)
    }

    fn record(&mut self, now: DateTime<Utc>) {
        self.daily_count += 1;
        self.minute_requests.push(now);
    }

    fn reset_in(&self, limits: &QuotaLimits, now: DateTime<Utc>) -> String {
        if self.daily_exhausted(limits) {
            let secs = seconds_until_utc_midnight(now);
            return format!("{}h {}m", secs / 3600, (secs % 3600) / 60);
        }

        if self.minute_exhausted(limits) {
            if let Some(oldest) = self.minute_requests.iter().min() {
                let remaining = MINUTE_MILLIS - (now - *oldest).num_milliseconds();
                return format!("{}s", remaining.max(0) / 1000);
            }
        }

        "now".to_string()
    }
}

/// Shared daily/minute request budget
pub struct QuotaTracker {
    limits: QuotaLimits,
    clock: Arc<dyn Clock>,
    state: Mutex<QuotaState>,
}

impl std::fmt::Debug for QuotaTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaTracker")
            .field("limits", &self.limits)
            .field("state", &*self.lock())
            .finish()
    }
}

impl QuotaTracker {
    /// Create a tracker on the wall clock
    pub fn new(limits: QuotaLimits) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    /// Create a tracker on a custom clock
    pub fn with_clock(limits: QuotaLimits, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            limits,
            clock,
            state: Mutex::new(QuotaState {
                daily_count: 0,
                daily_window_start: now,
                minute_requests: Vec::new(),
            }),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(QuotaLimits::from(settings))
    }

    fn lock(&self) -> MutexGuard<'_, QuotaState> {
        // The state is plain counters; a panic elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request may be made right now
    pub fn can_proceed(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.lock();
        state.refresh(now);
        state.allows(&self.limits)
    }

    /// Count one dispatched request against both windows
    pub fn record(&self) {
        let now = self.clock.now();
        self.lock().record(now);
    }

    /// Check and record in one step. Two callers racing for the last slot
    /// cannot both succeed.
    pub fn try_acquire(&self) -> Result<(), QuotaDenied> {
        let now = self.clock.now();
        let mut state = self.lock();
        state.refresh(now);
        if state.allows(&self.limits) {
            state.record(now);
            Ok(())
        } else {
            Err(QuotaDenied {
                reset_in: state.reset_in(&self.limits, now),
            })
        }
    }

    /// Human-readable time until a request is possible again: `"<H>h <M>m"`
    /// when the daily cap is hit, `"<S>s"` for the minute cap, else `"now"`
    pub fn time_until_reset(&self) -> String {
        let now = self.clock.now();
        let mut state = self.lock();
        state.refresh(now);
        state.reset_in(&self.limits, now)
    }

    pub fn status(&self) -> QuotaStatus {
        let now = self.clock.now();
        let mut state = self.lock();
        state.refresh(now);

        let elapsed = (now - state.daily_window_start).num_seconds();
        QuotaStatus {
            daily_requests_used: state.daily_count,
            daily_requests_limit: self.limits.per_day,
            minute_requests_used: state.minute_requests.len() as u32,
            minute_requests_limit: self.limits.per_minute,
            can_make_request: state.allows(&self.limits),
            seconds_until_daily_reset: (DAY_SECONDS - elapsed).max(0),
        }
    }
}

fn seconds_until_utc_midnight(now: DateTime<Utc>) -> i64 {
    now.date_naive()
        .succ_opt()
        .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
        .map(|midnight| (Utc.from_utc_datetime(&midnight) - now).num_seconds())
        .unwrap_or(0)
}
