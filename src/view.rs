//! Merges editable tasks and imported occurrences into a single, ordered view

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::item::MergedViewEntry;
use crate::occurrence::Occurrence;
use crate::task::{EditableTask, TaskChange};
use crate::window::DisplayWindow;
use crate::CalendarDay;

/// Why a view entry could not be changed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateError {
    /// The entry is an imported occurrence
    ReadOnly(String),
    /// No entry has this ID
    NotFound(String),
    /// The change would make the task end before it starts
    InvalidRange { start: CalendarDay, end: CalendarDay },
}

impl Display for UpdateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateError::ReadOnly(id) => write!(f, "{} is an imported event, it cannot be changed", id),
            UpdateError::NotFound(id) => write!(f, "No item with ID {}", id),
            UpdateError::InvalidRange { start, end } => write!(f, "A task cannot end ({}) before it starts ({})", end, start),
        }
    }
}

impl Error for UpdateError {}


/// The entries to display in a given window, sorted by start day
#[derive(Clone, Debug, PartialEq)]
pub struct MergedView {
    window: DisplayWindow,
    entries: Vec<MergedViewEntry>,
}

impl MergedView {
    /// Build a view.
    ///
    /// Tasks and occurrences whose end day is out of `window` are left out. The others are sorted by start day.
    /// Items that start on the same day keep their input order, tasks first.
    pub fn build<T, O>(window: DisplayWindow, tasks: T, occurrences: O) -> Self
    where
        T: IntoIterator<Item = EditableTask>,
        O: IntoIterator<Item = Occurrence>,
    {
        let mut entries: Vec<MergedViewEntry> = tasks
            .into_iter()
            .filter(|task| window.contains(task.end()))
            .map(MergedViewEntry::from)
            .chain(occurrences
                .into_iter()
                .filter(|occurrence| window.contains(occurrence.end()))
                .map(MergedViewEntry::from))
            .collect();

        entries.sort_by_key(|entry| entry.start());
        Self { window, entries }
    }

    pub fn window(&self) -> &DisplayWindow         { &self.window  }
    pub fn entries(&self) -> &[MergedViewEntry]    { &self.entries }
    pub fn len(&self) -> usize                     { self.entries.len() }
    pub fn is_empty(&self) -> bool                 { self.entries.is_empty() }

    pub fn get(&self, id: &str) -> Option<&MergedViewEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// The first entry (in view order) that is not over yet.
    /// This is where a display would scroll to
    pub fn first_visible(&self, today: CalendarDay) -> Option<(usize, &MergedViewEntry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.end() >= today)
    }

    /// Change an editable task.
    ///
    /// On success, the updated task is returned, so that the caller can send it to the task backend.
    /// Imported occurrences are never changed.
    pub fn update(&mut self, id: &str, change: &TaskChange) -> Result<&EditableTask, UpdateError> {
        let task = self.editable_mut(id)?;

        let start = change.start.unwrap_or_else(|| task.start());
        let end = change.end.unwrap_or_else(|| task.end());
        if end < start {
            return Err(UpdateError::InvalidRange { start, end });
        }

        task.apply(change);
        Ok(&*task)
    }

    /// Mark an editable task as completed, or as not completed if it already was
    pub fn toggle_completion(&mut self, id: &str) -> Result<&EditableTask, UpdateError> {
        let task = self.editable_mut(id)?;
        task.toggle_completion();
        Ok(&*task)
    }

    fn editable_mut(&mut self, id: &str) -> Result<&mut EditableTask, UpdateError> {
        match self.entries.iter_mut().find(|entry| entry.id() == id) {
            None => Err(UpdateError::NotFound(id.to_string())),
            Some(MergedViewEntry::Imported(_)) => {
                log::info!("Refusing to change {}: imported events are read-only", id);
                Err(UpdateError::ReadOnly(id.to_string()))
            },
            Some(MergedViewEntry::Editable(task)) => Ok(task),
        }
    }
}
