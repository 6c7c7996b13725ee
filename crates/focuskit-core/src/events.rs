use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::timer::IntervalKind;

/// Every timer command produces an Event.
/// The presentation layer consumes these; it issues commands and renders
/// the derived views, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: IntervalKind,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// The mode flipped without recording a session -- a manual switch, or
    /// the degenerate expiry that lost its start timestamp.
    ModeSwitched {
        mode: IntervalKind,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    /// A countdown ran to full expiry and produced an immutable record.
    IntervalCompleted {
        session: Session,
        at: DateTime<Utc>,
    },
}
