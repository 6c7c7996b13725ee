//! Timer engine implementation.
//!
//! The engine is a single-threaded countdown state machine. It does not
//! own a timer thread - the embedding runtime calls `tick()` once per
//! elapsed second while the countdown is running, and tears that cadence
//! down whenever the running flag drops. No missed-tick catch-up or
//! drift correction is performed.
//!
//! ## State Transitions
//!
//! ```text
//! {focus, break} x {running, paused}
//!
//! start  -> running            (focus requires a selected task)
//! pause  -> paused             (keeps seconds_left and the session start)
//! reset  -> paused, full countdown, session start cleared
//! switch -> paused, other mode, full countdown, session start cleared
//! tick   -> counts down; on the final second expires instead:
//!           records a Session, focus-with-task -> break, else -> focus
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(lengths, Arc::new(SystemClock));
//! engine.start(Some(task_id))?;
//! // Once per second:
//! engine.tick(); // Returns Some(Event::IntervalCompleted) on expiry
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::interval::{IntervalKind, IntervalLengths};
use crate::clock::Clock;
use crate::error::TimerError;
use crate::events::Event;
use crate::session::Session;

/// Core countdown state machine.
///
/// Ephemeral by design: timer state is never persisted, only the sessions
/// it produces are.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    lengths: IntervalLengths,
    mode: IntervalKind,
    /// Remaining whole seconds, clamped to `[0, lengths.of(mode)]`.
    seconds_left: u64,
    running: bool,
    /// Set when a countdown begins, cleared when it ends or is abandoned.
    /// Present iff the countdown is progressing toward a tracked expiry.
    session_start: Option<DateTime<Utc>>,
    /// Task the running focus interval is attributed to, captured at start.
    active_task: Option<String>,
    clock: Arc<dyn Clock>,
}

impl TimerEngine {
    /// Create a new engine: focus mode, paused, full focus countdown.
    pub fn new(lengths: IntervalLengths, clock: Arc<dyn Clock>) -> Self {
        Self {
            lengths,
            mode: IntervalKind::Focus,
            seconds_left: lengths.of(IntervalKind::Focus),
            running: false,
            session_start: None,
            active_task: None,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> IntervalKind {
        self.mode
    }

    pub fn seconds_left(&self) -> u64 {
        self.seconds_left
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session_start(&self) -> Option<DateTime<Utc>> {
        self.session_start
    }

    pub fn active_task(&self) -> Option<&str> {
        self.active_task.as_deref()
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn progress(&self) -> f64 {
        let total = self.lengths.of(self.mode);
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.seconds_left as f64 / total as f64)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the countdown.
    ///
    /// A focus countdown must be attributed to a task: `selected_task` is
    /// required in focus mode and ignored in break mode.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` if the countdown is in progress, `NoTaskSelected`
    /// for an unattributed focus start. Neither changes any state.
    pub fn start(&mut self, selected_task: Option<String>) -> Result<Event, TimerError> {
        if self.running {
            return Err(TimerError::AlreadyRunning);
        }
        if self.mode == IntervalKind::Focus && selected_task.is_none() {
            return Err(TimerError::NoTaskSelected);
        }
        let now = self.clock.now();
        self.running = true;
        self.session_start = Some(now);
        self.active_task = match self.mode {
            IntervalKind::Focus => selected_task,
            IntervalKind::Break => None,
        };
        Ok(Event::TimerStarted {
            mode: self.mode,
            seconds_left: self.seconds_left,
            at: now,
        })
    }

    /// Stop counting down without losing progress.
    ///
    /// Keeps `seconds_left` and the session start, so a later `start`
    /// resumes the countdown value (the start timestamp is re-taken).
    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            seconds_left: self.seconds_left,
            at: self.clock.now(),
        })
    }

    /// Abandon the countdown and restore the full interval length.
    /// Never records a session.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.session_start = None;
        self.active_task = None;
        self.seconds_left = self.lengths.of(self.mode);
        Event::TimerReset {
            at: self.clock.now(),
        }
    }

    /// Flip focus/break, abandoning any countdown in progress.
    /// The new mode starts with its full interval length.
    pub fn switch_mode(&mut self) -> Event {
        self.running = false;
        self.session_start = None;
        self.active_task = None;
        self.set_mode(self.mode.flipped());
        Event::ModeSwitched {
            mode: self.mode,
            seconds_left: self.seconds_left,
            at: self.clock.now(),
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Call once per elapsed second while running. Returns `None` while
    /// paused or mid-countdown; on the final second the interval expires
    /// and `Some(Event)` carries the outcome.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        if self.seconds_left > 1 {
            self.seconds_left -= 1;
            return None;
        }
        self.seconds_left = 0;
        Some(self.expire())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expire(&mut self) -> Event {
        self.running = false;
        let ended_at = self.clock.now();

        let Some(started_at) = self.session_start.take() else {
            // Lost the start timestamp: flip modes, record nothing.
            self.active_task = None;
            self.set_mode(self.mode.flipped());
            return Event::ModeSwitched {
                mode: self.mode,
                seconds_left: self.seconds_left,
                at: ended_at,
            };
        };

        let kind = self.mode;
        let task_id = match kind {
            IntervalKind::Focus => self.active_task.take(),
            IntervalKind::Break => {
                self.active_task = None;
                None
            }
        };
        let session = Session {
            id: Uuid::new_v4().to_string(),
            task_id,
            start: started_at,
            end: ended_at,
            duration_sec: rounded_secs(started_at, ended_at),
            kind,
        };

        let next = if kind == IntervalKind::Focus && session.task_id.is_some() {
            IntervalKind::Break
        } else {
            IntervalKind::Focus
        };
        self.set_mode(next);

        Event::IntervalCompleted {
            session,
            at: ended_at,
        }
    }

    fn set_mode(&mut self, mode: IntervalKind) {
        // Every mode change restores the full length for the new mode.
        self.mode = mode;
        self.seconds_left = self.lengths.of(mode);
    }

    #[cfg(test)]
    fn forget_session_start(&mut self) {
        self.session_start = None;
    }
}

/// `end - start` rounded to the nearest whole second.
fn rounded_secs(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let millis = (end - start).num_milliseconds().max(0);
    ((millis + 500) / 1000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;

    fn fixed_start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-16T12:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn engine_with(lengths: IntervalLengths) -> (TimerEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(fixed_start()));
        (TimerEngine::new(lengths, clock.clone()), clock)
    }

    fn short_lengths() -> IntervalLengths {
        IntervalLengths {
            focus_secs: 3,
            break_secs: 2,
        }
    }

    /// Advance the clock one second, then tick. Returns the expiry event
    /// once the countdown runs out.
    fn tick_secs(engine: &mut TimerEngine, clock: &ManualClock, n: u64) -> Option<Event> {
        let mut last = None;
        for _ in 0..n {
            clock.advance(Duration::seconds(1));
            last = engine.tick();
        }
        last
    }

    #[test]
    fn initial_state_is_paused_focus() {
        let (engine, _clock) = engine_with(IntervalLengths::default());
        assert_eq!(engine.mode(), IntervalKind::Focus);
        assert!(!engine.is_running());
        assert_eq!(engine.seconds_left(), 1500);
        assert!(engine.session_start().is_none());
    }

    #[test]
    fn focus_start_requires_a_task() {
        let (mut engine, _clock) = engine_with(short_lengths());
        assert_eq!(engine.start(None), Err(TimerError::NoTaskSelected));
        assert!(!engine.is_running());
        assert_eq!(engine.seconds_left(), 3);
        assert!(engine.session_start().is_none());
    }

    #[test]
    fn start_while_running_is_rejected() {
        let (mut engine, _clock) = engine_with(short_lengths());
        engine.start(Some("t1".into())).unwrap();
        assert_eq!(
            engine.start(Some("t1".into())),
            Err(TimerError::AlreadyRunning)
        );
    }

    #[test]
    fn break_start_needs_no_task() {
        let (mut engine, _clock) = engine_with(short_lengths());
        engine.switch_mode();
        assert!(engine.start(None).is_ok());
        assert!(engine.is_running());
        assert!(engine.active_task().is_none());
    }

    #[test]
    fn tick_counts_down_only_while_running() {
        let (mut engine, clock) = engine_with(short_lengths());
        assert!(tick_secs(&mut engine, &clock, 1).is_none());
        assert_eq!(engine.seconds_left(), 3);

        engine.start(Some("t1".into())).unwrap();
        assert!(tick_secs(&mut engine, &clock, 1).is_none());
        assert_eq!(engine.seconds_left(), 2);
    }

    #[test]
    fn pause_keeps_countdown_and_session_start() {
        let (mut engine, clock) = engine_with(short_lengths());
        engine.start(Some("t1".into())).unwrap();
        assert!(tick_secs(&mut engine, &clock, 1).is_none());

        let paused = engine.pause().unwrap();
        match paused {
            Event::TimerPaused { seconds_left, .. } => assert_eq!(seconds_left, 2),
            other => panic!("expected TimerPaused, got {other:?}"),
        }
        assert!(!engine.is_running());
        assert_eq!(engine.seconds_left(), 2);
        assert!(engine.session_start().is_some());
        assert!(engine.pause().is_none());
    }

    #[test]
    fn focus_expiry_records_session_and_moves_to_break() {
        let (mut engine, clock) = engine_with(short_lengths());
        engine.start(Some("t1".into())).unwrap();

        assert!(tick_secs(&mut engine, &clock, 2).is_none());
        let event = tick_secs(&mut engine, &clock, 1).expect("expiry on final second");

        let session = match event {
            Event::IntervalCompleted { session, .. } => session,
            other => panic!("expected IntervalCompleted, got {other:?}"),
        };
        assert_eq!(session.kind, IntervalKind::Focus);
        assert_eq!(session.task_id.as_deref(), Some("t1"));
        assert_eq!(session.duration_sec, 3);
        assert_eq!(session.start, fixed_start());
        assert_eq!(session.end, fixed_start() + Duration::seconds(3));

        assert!(!engine.is_running());
        assert_eq!(engine.mode(), IntervalKind::Break);
        assert_eq!(engine.seconds_left(), 2);
        assert!(engine.session_start().is_none());
        assert!(engine.active_task().is_none());
    }

    #[test]
    fn break_expiry_records_unattributed_session_and_moves_to_focus() {
        let (mut engine, clock) = engine_with(short_lengths());
        engine.switch_mode();
        engine.start(None).unwrap();

        let event = tick_secs(&mut engine, &clock, 2).expect("expiry");
        let session = match event {
            Event::IntervalCompleted { session, .. } => session,
            other => panic!("expected IntervalCompleted, got {other:?}"),
        };
        assert_eq!(session.kind, IntervalKind::Break);
        assert!(session.task_id.is_none());
        assert_eq!(session.duration_sec, 2);

        assert_eq!(engine.mode(), IntervalKind::Focus);
        assert_eq!(engine.seconds_left(), 3);
    }

    #[test]
    fn paused_time_is_not_counted_down_but_elapses_on_the_clock() {
        let (mut engine, clock) = engine_with(short_lengths());
        engine.start(Some("t1".into())).unwrap();
        assert!(tick_secs(&mut engine, &clock, 1).is_none());

        engine.pause().expect("was running");
        clock.advance(Duration::seconds(30));

        // Restarting re-takes the session start timestamp.
        engine.start(Some("t1".into())).unwrap();
        let event = tick_secs(&mut engine, &clock, 2).expect("expiry");
        match event {
            Event::IntervalCompleted { session, .. } => {
                assert_eq!(session.duration_sec, 2);
            }
            other => panic!("expected IntervalCompleted, got {other:?}"),
        }
    }

    #[test]
    fn reset_restores_full_length_and_records_nothing() {
        let (mut engine, clock) = engine_with(short_lengths());
        engine.start(Some("t1".into())).unwrap();
        assert!(tick_secs(&mut engine, &clock, 2).is_none());

        let event = engine.reset();
        assert!(matches!(event, Event::TimerReset { .. }));
        assert!(!engine.is_running());
        assert_eq!(engine.seconds_left(), 3);
        assert!(engine.session_start().is_none());
        assert!(engine.active_task().is_none());
    }

    #[test]
    fn switch_mode_abandons_interval_and_resets_to_new_length() {
        let (mut engine, clock) = engine_with(short_lengths());
        engine.start(Some("t1".into())).unwrap();
        assert!(tick_secs(&mut engine, &clock, 1).is_none());

        let event = engine.switch_mode();
        match event {
            Event::ModeSwitched { mode, seconds_left, .. } => {
                assert_eq!(mode, IntervalKind::Break);
                assert_eq!(seconds_left, 2);
            }
            other => panic!("expected ModeSwitched, got {other:?}"),
        }
        assert!(!engine.is_running());
        assert!(engine.session_start().is_none());

        engine.switch_mode();
        assert_eq!(engine.mode(), IntervalKind::Focus);
        assert_eq!(engine.seconds_left(), 3);
    }

    #[test]
    fn expiry_without_session_start_only_flips_mode() {
        let (mut engine, clock) = engine_with(short_lengths());
        engine.start(Some("t1".into())).unwrap();
        engine.forget_session_start();

        let event = tick_secs(&mut engine, &clock, 3).expect("expiry");
        match event {
            Event::ModeSwitched { mode, .. } => assert_eq!(mode, IntervalKind::Break),
            other => panic!("expected ModeSwitched, got {other:?}"),
        }
        assert_eq!(engine.seconds_left(), 2);
        assert!(!engine.is_running());
    }

    #[test]
    fn zero_elapsed_duration_rounds_to_zero() {
        let start = fixed_start();
        assert_eq!(rounded_secs(start, start), 0);
        assert_eq!(rounded_secs(start, start + Duration::milliseconds(499)), 0);
        assert_eq!(rounded_secs(start, start + Duration::milliseconds(500)), 1);
        assert_eq!(rounded_secs(start + Duration::seconds(5), start), 0);
    }

    #[test]
    fn progress_runs_zero_to_one() {
        let (mut engine, clock) = engine_with(IntervalLengths {
            focus_secs: 4,
            break_secs: 2,
        });
        assert_eq!(engine.progress(), 0.0);
        engine.start(Some("t1".into())).unwrap();
        assert!(tick_secs(&mut engine, &clock, 2).is_none());
        assert!((engine.progress() - 0.5).abs() < f64::EPSILON);
    }
}
