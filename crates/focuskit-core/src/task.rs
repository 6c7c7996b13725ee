//! Tasks and the ordered task registry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-defined unit of work that focus intervals are attributed to.
///
/// Tasks are created, toggled done, and credited with pomodoros; there is
/// no delete operation. `done` is independent of the pomodoro count.
/// Serialized camelCase to match the persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub category: String,
    /// Expected number of focus intervals. 0 when the raw input was not
    /// numeric.
    pub estimate: u32,
    pub done: bool,
    pub completed_pomodoros: u32,
}

/// Ordered collection of tasks plus the selected-task reference.
///
/// The selection is runtime state only; persistence covers the task
/// collection, nothing else.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    selected: Option<String>,
}

impl TaskRegistry {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            selected: None,
        }
    }

    /// Create a task from raw form input.
    ///
    /// The title is trimmed; an empty result is silently rejected and
    /// `None` is returned. The estimate is parsed from its raw string,
    /// falling back to 0 when non-numeric. The first task ever added
    /// becomes the selection automatically.
    pub fn add(&mut self, title: &str, category: &str, estimate: &str) -> Option<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            category: category.to_string(),
            estimate: estimate.trim().parse().unwrap_or(0),
            done: false,
            completed_pomodoros: 0,
        };
        if self.selected.is_none() {
            self.selected = Some(task.id.clone());
        }
        self.tasks.push(task);
        self.tasks.last()
    }

    /// Flip the done flag. No-op on an unknown id.
    pub fn toggle_done(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.done = !task.done;
                true
            }
            None => false,
        }
    }

    /// Credit one completed focus interval. No-op on an unknown id.
    pub fn increment_pomodoros(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed_pomodoros += 1;
                true
            }
            None => false,
        }
    }

    /// Set the selected-task reference. Any id is accepted; existence is
    /// not validated.
    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
