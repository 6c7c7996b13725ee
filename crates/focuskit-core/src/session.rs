//! Completed interval records and the append-only session log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::IntervalKind;

/// An immutable record of one fully expired interval.
///
/// `task_id` is a weak back-reference: it is present only for focus
/// intervals that had a task selected when the countdown started, and it
/// does not keep the task alive -- no cascading integrity is enforced if
/// task data is cleared externally.
///
/// Serialized camelCase (`taskId`, `durationSec`, and the kind as `type`)
/// to match the persisted layout; an absent task reference is omitted
/// rather than written as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `end - start` rounded to the nearest second; may be 0 if the clock
    /// barely advanced.
    pub duration_sec: u64,
    #[serde(rename = "type")]
    pub kind: IntervalKind,
}

/// Append-only, insertion-ordered collection of completed intervals.
///
/// Sessions are never mutated or removed once appended.
#[derive(Debug, Default)]
pub struct SessionLog {
    sessions: Vec<Session>,
}

impl SessionLog {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    pub fn append(&mut self, session: Session) {
        self.sessions.push(session);
    }

    /// Full log in insertion order.
    pub fn all(&self) -> &[Session] {
        &self.sessions
    }

    /// Newest first, for display.
    pub fn recent_first(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
