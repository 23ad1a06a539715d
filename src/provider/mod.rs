//! This modules gathers the imported calendars and the editable tasks, and merges them in a single view
//!
//! Every calendar source is handled on its own: a source that cannot be downloaded or read does not prevent the
//! others from being displayed.

use std::error::Error;

use crate::config::Settings;
use crate::occurrence::{parse_feed, Occurrence};
use crate::source::{CalendarSource, SourceList};
use crate::task::{EditableTask, TaskChange};
use crate::traits::{FeedFetcher, SourceStore, TaskStore};
use crate::view::MergedView;
use crate::window::DisplayWindow;

pub mod import_progress;
use import_progress::ImportProgress;
use import_progress::{Diagnostic, FeedbackSender, ImportEvent};


/// What has been imported from a single source
#[derive(Clone, Debug, PartialEq)]
pub struct SourceReport {
    pub source: CalendarSource,
    /// Empty if this source failed
    pub occurrences: Vec<Occurrence>,
    /// Why this source failed, if it did
    pub error: Option<String>,
}

impl SourceReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The result of an import
#[derive(Clone, Debug)]
pub struct Import {
    pub view: MergedView,
    /// One report per source, in the order of the source list
    pub reports: Vec<SourceReport>,
    /// What went wrong, in the order it happened
    pub diagnostics: Vec<Diagnostic>,
    /// Whether every source (and the task store) has been read without error
    pub success: bool,
}


/// Combines the calendar sources of a user with their task store.
///
/// `fetcher` is usually an [`HttpFetcher`](crate::client::HttpFetcher), `store` is usually a
/// [`RemoteTaskStore`](crate::client::RemoteTaskStore). Both are mocked in tests.
pub struct Provider<F, S>
where
    F: FeedFetcher + Sync + Send,
    S: TaskStore + Sync + Send,
{
    fetcher: F,
    store: S,
    sources: SourceList,
    settings: Settings,
}

impl<F, S> Provider<F, S>
where
    F: FeedFetcher + Sync + Send,
    S: TaskStore + Sync + Send,
{
    pub fn new(fetcher: F, store: S, sources: SourceList, settings: Settings) -> Self {
        Self { fetcher, store, sources, settings }
    }

    pub fn sources(&self) -> &SourceList { &self.sources }
    pub fn sources_mut(&mut self) -> &mut SourceList { &mut self.sources }
    pub fn settings(&self) -> &Settings { &self.settings }
    pub fn store(&self) -> &S { &self.store }
    pub fn store_mut(&mut self) -> &mut S { &mut self.store }

    /// Import every source and build the view of today's window, without giving any feedback.
    pub async fn refresh(&self) -> Import {
        let window = self.settings.current_window();
        let mut progress = ImportProgress::new();
        self.run_import(&window, &mut progress).await
    }

    /// Import every source and build the view of today's window, and provide feedback to the user about the progress.
    pub async fn refresh_with_feedback(&self, feedback_sender: FeedbackSender) -> Import {
        let window = self.settings.current_window();
        let mut progress = ImportProgress::new_with_feedback_channel(feedback_sender);
        self.run_import(&window, &mut progress).await
    }

    /// Import every source and build the view of a given window.
    ///
    /// This never fails. Errors are logged, and reported in the returned [`Import`].
    pub async fn import(&self, window: &DisplayWindow, progress: &mut ImportProgress) -> Import {
        self.run_import(window, progress).await
    }

    async fn run_import(&self, window: &DisplayWindow, progress: &mut ImportProgress) -> Import {
        log::info!("Starting an import of {} calendars.", self.sources.len());
        progress.feedback(ImportEvent::Started{ n_sources: self.sources.len() });

        let reports = self.import_sources(window, progress).await;

        let tasks = match self.store.get_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => {
                progress.tasks_unavailable(err.to_string());
                Vec::new()
            },
        };

        let occurrences: Vec<Occurrence> = reports
            .iter()
            .flat_map(|report| report.occurrences.iter().cloned())
            .collect();
        let view = MergedView::build(*window, tasks, occurrences);
        log::debug!("The view contains {} items", view.len());

        let success = progress.is_success();
        log::info!("Import ended");
        progress.feedback(ImportEvent::Finished{ success });
        Import { view, reports, diagnostics: progress.diagnostics().to_vec(), success }
    }

    /// Download and parse every source. A source that fails contributes no occurrence
    pub async fn import_sources(&self, window: &DisplayWindow, progress: &mut ImportProgress) -> Vec<SourceReport> {
        let mut reports = Vec::with_capacity(self.sources.len());

        for source in self.sources.sources() {
            progress.feedback(ImportEvent::Downloading{ source: source.clone() });

            let report = match self.fetcher.fetch(source).await {
                Err(err) => {
                    let message = err.to_string();
                    progress.source_failed(source, message.clone());
                    SourceReport { source: source.clone(), occurrences: Vec::new(), error: Some(message) }
                },
                Ok(content) => {
                    let occurrences = parse_feed(&content, source, window, &self.settings);
                    log::debug!("{} occurrences imported from {}", occurrences.len(), source);
                    progress.feedback(ImportEvent::Imported{ source: source.clone(), n_occurrences: occurrences.len() });
                    SourceReport { source: source.clone(), occurrences, error: None }
                },
            };
            reports.push(report);
        }

        reports
    }

    /// Replace the source list with the subscriptions saved in `source_store`.
    /// The current list is kept if they cannot be read.
    pub async fn load_sources<T>(&mut self, source_store: &T) -> Result<(), Box<dyn Error>>
    where
        T: SourceStore + Sync + Send,
    {
        let sources = source_store.get_sources().await?;
        log::info!("{} calendar subscriptions loaded", sources.len());
        self.sources = sources;
        Ok(())
    }

    /// Save a subscription to `source_store`, then add it to the source list.
    /// Returns whether it was not in the list yet
    pub async fn subscribe<T>(&mut self, source_store: &mut T, source: CalendarSource) -> Result<bool, Box<dyn Error>>
    where
        T: SourceStore + Sync + Send,
    {
        source_store.upsert_source(&source).await?;
        Ok(self.sources.upsert(source))
    }

    /// Delete a subscription from `source_store`, then remove it from the source list.
    /// Returns whether it was in the list
    pub async fn unsubscribe<T>(&mut self, source_store: &mut T, source: &CalendarSource) -> Result<bool, Box<dyn Error>>
    where
        T: SourceStore + Sync + Send,
    {
        source_store.delete_source(source).await?;
        Ok(self.sources.remove(source))
    }

    /// Change an editable task of `view`, and save it to the task store.
    ///
    /// Imported occurrences are refused with an [`UpdateError::ReadOnly`](crate::view::UpdateError::ReadOnly), and are left untouched.
    pub async fn update_task(&mut self, view: &mut MergedView, id: &str, change: &TaskChange) -> Result<(), Box<dyn Error>> {
        let updated = view.update(id, change)?.clone();
        self.store.update_task(&updated).await
    }

    /// Toggle the completion of an editable task of `view`, and save it to the task store.
    pub async fn toggle_completion(&mut self, view: &mut MergedView, id: &str) -> Result<(), Box<dyn Error>> {
        let updated = view.toggle_completion(id)?.clone();
        self.store.update_task(&updated).await
    }

    /// Create a new task in the task store. Call [`Self::refresh`] to have it displayed.
    pub async fn create_task(&mut self, task: &EditableTask) -> Result<(), Box<dyn Error>> {
        log::info!("Creating task {} ({})", task.name(), task.orig_id());
        self.store.create_task(task).await
    }

    /// Delete a task from the task store. Call [`Self::refresh`] to have it removed from the view.
    pub async fn delete_task(&mut self, orig_id: &str) -> Result<(), Box<dyn Error>> {
        log::info!("Deleting task {}", orig_id);
        self.store.delete_task(orig_id).await
    }
}
