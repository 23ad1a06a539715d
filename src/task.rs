//! Editable tasks, owned by the task backend

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::CalendarDay;

/// The progress of a completed task
pub const COMPLETED_PROGRESS: u8 = 100;

/// A task of the user's own task list.
///
/// Tasks are created, updated and deleted by the backend (see [`crate::traits::TaskStore`]).
/// This crate only reads them, and hands changed copies back to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableTask {
    /// The key of this task in a view
    id: String,
    /// The key of this task in the backend
    orig_id: String,
    name: String,
    start: CalendarDay,
    end: CalendarDay,
    /// A percentage, from 0 to 100
    progress: u8,
}

impl EditableTask {
    /// Create a task, as read from the backend
    pub fn new(orig_id: String, name: String, start: CalendarDay, end: CalendarDay, progress: u8) -> Self {
        Self {
            id: orig_id.clone(),
            orig_id,
            name,
            start,
            end,
            progress: std::cmp::min(progress, COMPLETED_PROGRESS),
        }
    }

    pub fn id(&self) -> &str            { &self.id      }
    pub fn orig_id(&self) -> &str       { &self.orig_id }
    pub fn name(&self) -> &str          { &self.name    }
    pub fn start(&self) -> CalendarDay  { self.start    }
    pub fn end(&self) -> CalendarDay    { self.end      }
    pub fn progress(&self) -> u8        { self.progress }
    pub fn completed(&self) -> bool     { self.progress >= COMPLETED_PROGRESS }

    /// Apply a change. Fields that are `None` in `change` are left untouched
    pub fn apply(&mut self, change: &TaskChange) {
        if let Some(name) = &change.name {
            self.name = name.clone();
        }
        if let Some(start) = change.start {
            self.start = start;
        }
        if let Some(end) = change.end {
            self.end = end;
        }
        if let Some(progress) = change.progress {
            self.progress = std::cmp::min(progress, COMPLETED_PROGRESS);
        }
    }

    /// Mark as completed if it was not, or as not started otherwise
    pub fn toggle_completion(&mut self) {
        self.progress = if self.completed() { 0 } else { COMPLETED_PROGRESS };
    }
}


/// A set of changes to apply to a task
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskChange {
    pub name: Option<String>,
    pub start: Option<CalendarDay>,
    pub end: Option<CalendarDay>,
    pub progress: Option<u8>,
}

impl TaskChange {
    pub fn rename<S: ToString>(name: S) -> Self {
        Self { name: Some(name.to_string()), ..Self::default() }
    }

    pub fn reschedule(start: CalendarDay, end: CalendarDay) -> Self {
        Self { start: Some(start), end: Some(end), ..Self::default() }
    }

    pub fn set_progress(progress: u8) -> Self {
        Self { progress: Some(progress), ..Self::default() }
    }
}


/// The name of tasks created without one
pub const DEFAULT_TASK_NAME: &str = "task";

/// Generate the backend key of a new task, from its creation time.
///
/// The key is the creation time in Japan Standard Time, formatted as `YYMMDDhhmmss` followed by the first two
/// digits of the milliseconds (e.g. `25010509000012`).
pub fn new_task_id(now: DateTime<Utc>) -> String {
    let jst = now + Duration::hours(9);
    let mut id = jst.format("%y%m%d%H%M%S%3f").to_string();
    id.truncate(14);
    id
}

/// The name to give a new task, from what the user has typed
pub fn new_task_name(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        DEFAULT_TASK_NAME.to_string()
    } else {
        input.to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    fn sample_task() -> EditableTask {
        EditableTask::new("25010509000012".to_string(), "Write report".to_string(), day("2025-01-05"), day("2025-01-10"), 30)
    }

    #[test]
    fn test_apply_change() {
        let mut task = sample_task();
        task.apply(&TaskChange::rename("Write the report"));
        assert_eq!(task.name(), "Write the report");
        assert_eq!(task.start(), day("2025-01-05"));

        task.apply(&TaskChange::reschedule(day("2025-01-06"), day("2025-01-11")));
        assert_eq!(task.start(), day("2025-01-06"));
        assert_eq!(task.end(), day("2025-01-11"));
        assert_eq!(task.progress(), 30);

        task.apply(&TaskChange::set_progress(250));
        assert_eq!(task.progress(), 100);
    }

    #[test]
    fn test_toggle_completion() {
        let mut task = sample_task();
        task.toggle_completion();
        assert!(task.completed());
        task.toggle_completion();
        assert_eq!(task.progress(), 0);
    }

    #[test]
    fn test_new_task_id() {
        let now = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap() + chrono::Duration::milliseconds(123);
        assert_eq!(new_task_id(now), "25010509000012");
    }

    #[test]
    fn test_new_task_name() {
        assert_eq!(new_task_name("  "), "task");
        assert_eq!(new_task_name(" Groceries "), "Groceries");
    }
}
