//! Command surface tying the engine, registry, log, and store together.
//!
//! The presentation layer issues the commands defined here and renders
//! the derived views; it holds no state of its own. Both collections are
//! persisted whole under their fixed key after every mutation -- the two
//! keys have disjoint single writers, so no write conflicts are possible.

use std::sync::Arc;

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, TimerError};
use crate::events::Event;
use crate::session::{Session, SessionLog};
use crate::stats::DailyFocus;
use crate::storage::{self, Config, KvStore, SqliteStore};
use crate::task::{Task, TaskRegistry};
use crate::timer::{IntervalKind, IntervalLengths, TimerEngine};

const TASKS_KEY: &str = "tasks";
const SESSIONS_KEY: &str = "sessions";

/// Read-only timer display state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerView {
    pub mode: IntervalKind,
    pub seconds_left: u64,
    pub running: bool,
    /// Remaining time formatted `MM:SS`.
    pub clock: String,
}

pub struct App {
    store: Box<dyn KvStore>,
    engine: TimerEngine,
    tasks: TaskRegistry,
    sessions: SessionLog,
}

impl App {
    /// Open with the on-disk store, wall clock, and configured lengths.
    ///
    /// # Errors
    /// Returns an error if the backing database cannot be opened.
    pub fn open() -> Result<Self, CoreError> {
        let store = SqliteStore::open()?;
        let config = Config::load_or_default();
        Ok(Self::new(
            Box::new(store),
            Arc::new(SystemClock),
            config.interval_lengths(),
        ))
    }

    /// Build with injected dependencies. Tasks and sessions are loaded
    /// from the store, falling back to empty collections on missing or
    /// unreadable data.
    pub fn new(store: Box<dyn KvStore>, clock: Arc<dyn Clock>, lengths: IntervalLengths) -> Self {
        let tasks: Vec<Task> = storage::load_or_default(store.as_ref(), TASKS_KEY);
        let sessions: Vec<Session> = storage::load_or_default(store.as_ref(), SESSIONS_KEY);
        Self {
            store,
            engine: TimerEngine::new(lengths, clock),
            tasks: TaskRegistry::new(tasks),
            sessions: SessionLog::new(sessions),
        }
    }

    // ── Task commands ────────────────────────────────────────────────

    /// Add a task from raw form input. Returns `None` (and stores
    /// nothing) when the title trims to empty.
    pub fn add_task(&mut self, title: &str, category: &str, estimate: &str) -> Option<Task> {
        let created = self.tasks.add(title, category, estimate)?.clone();
        self.persist_tasks();
        Some(created)
    }

    pub fn toggle_task_done(&mut self, id: &str) {
        if self.tasks.toggle_done(id) {
            self.persist_tasks();
        }
    }

    /// Set the selected task. Runtime state only -- not persisted, not
    /// validated against the registry.
    pub fn select_task(&mut self, id: &str) {
        self.tasks.select(id);
    }

    // ── Timer commands ───────────────────────────────────────────────

    /// Start the countdown, attributing a focus interval to the selected
    /// task.
    ///
    /// # Errors
    /// `NoTaskSelected` when starting focus mode without a selection --
    /// surface this to the user; nothing changed.
    pub fn start(&mut self) -> Result<Event, TimerError> {
        let selected = self.tasks.selected_id().map(str::to_string);
        self.engine.start(selected)
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause()
    }

    pub fn reset(&mut self) -> Event {
        self.engine.reset()
    }

    pub fn switch_mode(&mut self) -> Event {
        self.engine.switch_mode()
    }

    /// Drive the countdown; call once per elapsed second while running.
    ///
    /// On expiry the completed session is appended to the log, a focus
    /// session credits its task, and both collections are persisted.
    pub fn tick(&mut self) -> Option<Event> {
        let event = self.engine.tick()?;
        if let Event::IntervalCompleted { session, .. } = &event {
            self.sessions.append(session.clone());
            if session.kind == IntervalKind::Focus {
                if let Some(task_id) = session.task_id.clone() {
                    // Weak back-reference: a vanished task is a no-op.
                    self.tasks.increment_pomodoros(&task_id);
                    self.persist_tasks();
                }
            }
            self.persist_sessions();
        }
        Some(event)
    }

    // ── Views ────────────────────────────────────────────────────────

    pub fn timer(&self) -> TimerView {
        let seconds_left = self.engine.seconds_left();
        TimerView {
            mode: self.engine.mode(),
            seconds_left,
            running: self.engine.is_running(),
            clock: format_clock(seconds_left),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        self.tasks.selected_id()
    }

    /// Full session log in insertion order.
    pub fn sessions(&self) -> &[Session] {
        self.sessions.all()
    }

    /// Sessions newest first, for display.
    pub fn recent_sessions(&self) -> Vec<&Session> {
        self.sessions.recent_first().collect()
    }

    /// Recomputed from the session log on every call.
    pub fn daily_focus(&self) -> DailyFocus {
        DailyFocus::compute(self.sessions.all())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn persist_tasks(&self) {
        storage::save(self.store.as_ref(), TASKS_KEY, self.tasks.tasks());
    }

    fn persist_sessions(&self) {
        storage::save(self.store.as_ref(), SESSIONS_KEY, self.sessions.all());
    }
}

fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
