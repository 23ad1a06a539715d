//! Tracking of an import: what went wrong, and where it is at

use std::fmt::{Display, Error, Formatter};

use crate::source::CalendarSource;

/// Something that went wrong during an import, and has been worked around
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// The calendar that could not be imported. `None` when the task store is at fault
    pub source: Option<CalendarSource>,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match &self.source {
            Some(source) => write!(f, "[{}] {}", source, self.message),
            None => write!(f, "[tasks] {}", self.message),
        }
    }
}


/// An event that happens during an import
#[derive(Clone, Debug, PartialEq)]
pub enum ImportEvent {
    NotStarted,
    /// Import has just started, no calendar has been downloaded yet
    Started{ n_sources: usize },
    Downloading{ source: CalendarSource },
    /// A calendar has been downloaded and parsed
    Imported{ source: CalendarSource, n_occurrences: usize },
    /// A calendar could not be imported. It will be displayed empty
    Skipped{ source: CalendarSource },
    Finished{ success: bool },
}

impl Display for ImportEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            ImportEvent::NotStarted => write!(f, "Not started"),
            ImportEvent::Started{n_sources} => write!(f, "Importing {} calendars...", n_sources),
            ImportEvent::Downloading{source} => write!(f, "[{}] downloading...", source),
            ImportEvent::Imported{source, n_occurrences} => write!(f, "[{}] {} events", source, n_occurrences),
            ImportEvent::Skipped{source} => write!(f, "[{}] skipped", source),
            ImportEvent::Finished{success: true} => write!(f, "Import successfully finished"),
            ImportEvent::Finished{success: false} => write!(f, "Import finished, some items could not be displayed"),
        }
    }
}

impl Default for ImportEvent {
    fn default() -> Self {
        Self::NotStarted
    }
}


/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<ImportEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<ImportEvent>;

/// Create a feeback channel, that can be used to retrieve the current progress of an import
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(ImportEvent::default())
}


/// Collects the diagnostics of an import, and forwards its progress to a listener (if any)
#[derive(Default)]
pub struct ImportProgress {
    diagnostics: Vec<Diagnostic>,
    feedback_channel: Option<FeedbackSender>,
}

impl ImportProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_feedback_channel(channel: FeedbackSender) -> Self {
        Self { diagnostics: Vec::new(), feedback_channel: Some(channel) }
    }

    /// Whether every calendar and the task store have been read
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Record that a calendar has been skipped
    pub fn source_failed(&mut self, source: &CalendarSource, message: String) {
        log::warn!("Unable to import calendar {}: {}. Skipping it this time.", source, message);
        self.diagnostics.push(Diagnostic { source: Some(source.clone()), message });
        self.feedback(ImportEvent::Skipped{ source: source.clone() });
    }

    /// Record that no task could be read
    pub fn tasks_unavailable(&mut self, message: String) {
        log::warn!("Unable to get the tasks: {}. Only imported events will be displayed", message);
        self.diagnostics.push(Diagnostic { source: None, message });
    }

    /// Send an event to the listener (if any)
    pub fn feedback(&mut self, event: ImportEvent) {
        if let Some(sender) = self.feedback_channel.as_ref() {
            // Nobody listening is not an error
            let _ = sender.send(event);
        }
    }
}
