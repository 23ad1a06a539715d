//! Support for library configuration options

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceLimit;
use crate::window::DisplayWindow;

/// The name given to imported events that have no `SUMMARY`
pub const DEFAULT_SUMMARY: &str = "ICSイベント";

/// Tunable parameters of an import.
///
/// Every field has a default, so that a settings file only needs to list what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How many days before today are displayed
    pub past_days: u32,
    /// How many days after today are displayed
    pub future_days: u32,
    /// The maximum count of instants within the window examined when expanding a single recurrence rule
    pub max_recurrence_candidates: usize,
    pub default_summary: String,
    /// Timeout of every request (feed downloads and backends), in seconds
    pub fetch_timeout_secs: u64,
    /// Base URL of the task backend, e.g. `https://tasks.example.com`
    pub api_base: Option<String>,
    /// URL of the subscription backend, e.g. `https://tasks.example.com/tasks_icsimport`
    pub sources_api_base: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            past_days: 14,
            future_days: 180,
            max_recurrence_candidates: RecurrenceLimit::DEFAULT.get(),
            default_summary: DEFAULT_SUMMARY.to_string(),
            fetch_timeout_secs: 30,
            api_base: None,
            sources_api_base: None,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let file = std::fs::File::open(path)
            .map_err(|err| format!("Unable to open file {:?}: {}", path, err))?;
        let settings = serde_json::from_reader(file)
            .map_err(|err| format!("Invalid settings in {:?}: {}", path, err))?;
        Ok(settings)
    }

    /// Read settings from a JSON file, or use the default ones if this fails
    pub fn from_file_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{}. Using default settings", err);
                Self::default()
            },
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn recurrence_limit(&self) -> RecurrenceLimit {
        RecurrenceLimit::new(self.max_recurrence_candidates)
    }

    /// The window to display today
    pub fn current_window(&self) -> DisplayWindow {
        DisplayWindow::around_today(self.past_days, self.future_days)
    }
}
