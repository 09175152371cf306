//! Process-wide moderation statistics.
//!
//! Counters live behind a mutex and roll over once the window is older than
//! 24 hours. The roll keeps the current hour's count and scales the flagged
//! count down proportionally.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

const HOUR_KEY_FORMAT: &str = "%Y-%m-%d %H:00";
const WINDOW_HOURS: i64 = 24;

#[derive(Debug)]
struct StatsWindow {
    total: u64,
    flagged: u64,
    moderation_time_ms: f64,
    since: DateTime<Utc>,
    hourly_counts: BTreeMap<String, u64>,
}

impl StatsWindow {
    fn fresh(since: DateTime<Utc>) -> Self {
        Self {
            total: 0,
            flagged: 0,
            moderation_time_ms: 0.0,
            since,
            hourly_counts: BTreeMap::new(),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsSnapshot {
    pub total_moderations: u64,
    pub flagged_content_count: u64,
    pub flagged_percentage: f64,
    pub avg_processing_time_ms: f64,
    pub hourly_counts: BTreeMap<String, u64>,
    pub stats_since: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ModerationStats {
    window: Mutex<StatsWindow>,
}

impl Default for ModerationStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ModerationStats {
    pub fn new() -> Self {
        Self {
            window: Mutex::new(StatsWindow::fresh(Utc::now())),
        }
    }

    fn window(&self) -> MutexGuard<'_, StatsWindow> {
        // Counters stay usable even if a holder panicked
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn increment(&self, was_flagged: bool, processing_time_ms: f64) {
        self.increment_at(Utc::now(), was_flagged, processing_time_ms);
    }

    pub fn increment_at(&self, now: DateTime<Utc>, was_flagged: bool, processing_time_ms: f64) {
        let mut window = self.window();

        window.total += 1;
        if was_flagged {
            window.flagged += 1;
        }
        window.moderation_time_ms += processing_time_ms;

        let hour_key = now.format(HOUR_KEY_FORMAT).to_string();
        *window.hourly_counts.entry(hour_key.clone()).or_insert(0) += 1;

        if now - window.since > Duration::hours(WINDOW_HOURS) {
            let old_total = window.total;
            let old_flagged = window.flagged;
            let old_time = window.moderation_time_ms;
            let current_hour = window.hourly_counts.get(&hour_key).copied().unwrap_or(0);

            let ratio = if old_total == 0 {
                1.0
            } else {
                current_hour as f64 / old_total as f64
            };

            *window = StatsWindow::fresh(now);
            window.total = current_hour;
            window.flagged = (old_flagged as f64 * ratio) as u64;
            window.moderation_time_ms = old_time * ratio;
            window.hourly_counts.insert(hour_key, current_hour);

            tracing::info!(
                carried_total = window.total,
                carried_flagged = window.flagged,
                "Moderation stats window rolled over"
            );
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let window = self.window();
        let (flagged_percentage, avg_processing_time_ms) = if window.total == 0 {
            (0.0, 0.0)
        } else {
            (
                window.flagged as f64 / window.total as f64 * 100.0,
                window.moderation_time_ms / window.total as f64,
            )
        };

        StatsSnapshot {
            total_moderations: window.total,
            flagged_content_count: window.flagged,
            flagged_percentage,
            avg_processing_time_ms,
            hourly_counts: window.hourly_counts.clone(),
            stats_since: window.since,
        }
    }

    pub fn reset(&self) {
        self.reset_at(Utc::now());
    }

    pub fn reset_at(&self, now: DateTime<Utc>) {
        *self.window() = StatsWindow::fresh(now);
    }
}
