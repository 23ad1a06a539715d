//! Entries of a merged view (editable tasks and imported occurrences)

use serde::{Deserialize, Serialize};

use crate::occurrence::Occurrence;
use crate::task::EditableTask;
use crate::CalendarDay;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MergedViewEntry {
    /// A task from the backend, that the user can change
    Editable(EditableTask),
    /// An occurrence from an iCal feed, that cannot be changed
    Imported(Occurrence),
}

/// Returns `task.$property_name` or `occurrence.$property_name`, depending on the variant of self
macro_rules! synthetise_common_getter {
    ($property_name:ident, $return_type:ty) => {
        pub fn $property_name(&self) -> $return_type {
            match self {
                MergedViewEntry::Editable(t) => t.$property_name(),
                MergedViewEntry::Imported(o) => o.$property_name(),
            }
        }
    }
}

impl MergedViewEntry {
    synthetise_common_getter!(id, &str);
    synthetise_common_getter!(start, CalendarDay);
    synthetise_common_getter!(end, CalendarDay);

    pub fn name(&self) -> &str {
        match self {
            MergedViewEntry::Editable(t) => t.name(),
            MergedViewEntry::Imported(o) => o.summary(),
        }
    }

    /// Imported occurrences have no progress, they are reported as not started
    pub fn progress(&self) -> u8 {
        match self {
            MergedViewEntry::Editable(t) => t.progress(),
            MergedViewEntry::Imported(_) => 0,
        }
    }

    pub fn read_only(&self) -> bool {
        match self {
            MergedViewEntry::Editable(_) => false,
            MergedViewEntry::Imported(_) => true,
        }
    }

    /// Returns a reference to the inner task, if this entry is editable
    pub fn as_task(&self) -> Option<&EditableTask> {
        match self {
            MergedViewEntry::Editable(t) => Some(t),
            MergedViewEntry::Imported(_) => None,
        }
    }

    /// Returns a reference to the inner occurrence, if this entry is imported
    pub fn as_occurrence(&self) -> Option<&Occurrence> {
        match self {
            MergedViewEntry::Editable(_) => None,
            MergedViewEntry::Imported(o) => Some(o),
        }
    }
}

impl From<EditableTask> for MergedViewEntry {
    fn from(task: EditableTask) -> Self {
        Self::Editable(task)
    }
}

impl From<Occurrence> for MergedViewEntry {
    fn from(occurrence: Occurrence) -> Self {
        Self::Imported(occurrence)
    }
}
