//! Statistics for a single sync run.
//!
//! One [`SyncStats`] instance is created per retrieval run, mutated
//! throughout the pagination loop, and finalized on every exit path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::UserStatus;

/// Counters and timestamps collected over one retrieval run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    /// When the run started.
    pub start_time: Option<DateTime<Utc>>,
    /// When the run finished (success or failure).
    pub end_time: Option<DateTime<Utc>>,
    /// Total users retrieved.
    pub total_users: u64,
    /// Users with ACTIVE status.
    pub active_users: u64,
    /// Users with SUSPENDED or DEPROVISIONED status.
    pub suspended_users: u64,
    /// HTTP requests attempted, including retries.
    pub api_calls: u64,
    /// Errors encountered (transport failures and unparseable records).
    pub errors: u64,
    /// Requests that received a 429 response.
    pub rate_limited: u64,
}

impl SyncStats {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the start of the run.
    pub fn mark_started(&mut self) {
        self.start_time = Some(Utc::now());
    }

    /// Stamps the end of the run.
    pub fn mark_finished(&mut self) {
        self.end_time = Some(Utc::now());
    }

    /// Increments the API call counter.
    pub fn increment_api_calls(&mut self) {
        self.api_calls += 1;
    }

    /// Increments the error counter.
    pub fn increment_errors(&mut self) {
        self.errors += 1;
    }

    /// Increments the rate limited counter.
    pub fn increment_rate_limited(&mut self) {
        self.rate_limited += 1;
    }

    /// Tallies a user into the active or suspended bucket by status.
    pub fn record_user(&mut self, status: UserStatus) {
        match status {
            UserStatus::Active => self.active_users += 1,
            UserStatus::Suspended | UserStatus::Deprovisioned => self.suspended_users += 1,
            _ => {}
        }
    }

    /// Sets the total user count.
    pub fn set_total_users(&mut self, count: u64) {
        self.total_users = count;
    }

    /// Returns the run duration, if both timestamps are set.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Returns the run duration in seconds, or zero when not finished.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.duration()
            .map_or(0.0, |d| d.num_milliseconds() as f64 / 1000.0)
    }

    /// Returns users retrieved per second over the run.
    #[must_use]
    pub fn users_per_second(&self) -> f64 {
        let secs = self.duration_secs();
        if secs <= 0.0 {
            0.0
        } else {
            self.total_users as f64 / secs
        }
    }

    /// Whether the run completed without errors.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    /// Resets all counters and timestamps.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Logs a human-readable summary of the run.
    pub fn log_summary(&self) {
        info!(
            "Sync summary: {} users ({} active, {} suspended) in {:.2}s, {} API calls, {} errors, {} rate limited",
            self.total_users,
            self.active_users,
            self.suspended_users,
            self.duration_secs(),
            self.api_calls,
            self.errors,
            self.rate_limited
        );
    }
}
