//! Daily focus aggregation over the session log.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::session::Session;
use crate::timer::IntervalKind;

/// Per-day focus totals derived from the session log.
///
/// Days are keyed by the UTC calendar date of the session start,
/// formatted `%Y-%m-%d`; the fixed-width keys make lexicographic order
/// chronological. Pure recomputation with no stored intermediate state,
/// cheap enough to run on every display refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyFocus {
    /// Day key -> total focus seconds, ascending by day.
    pub totals: BTreeMap<String, u64>,
    /// Largest per-day total, 0 when there are no focus sessions.
    pub max_sec: u64,
}

impl DailyFocus {
    pub fn compute(sessions: &[Session]) -> Self {
        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for session in sessions.iter().filter(|s| s.kind == IntervalKind::Focus) {
            let day = session.start.format("%Y-%m-%d").to_string();
            *totals.entry(day).or_insert(0) += session.duration_sec;
        }
        let max_sec = totals.values().copied().max().unwrap_or(0);
        Self { totals, max_sec }
    }

    /// Day keys in ascending (chronological) order.
    pub fn days(&self) -> Vec<&str> {
        self.totals.keys().map(String::as_str).collect()
    }

    pub fn total_for(&self, day: &str) -> u64 {
        self.totals.get(day).copied().unwrap_or(0)
    }
}
