//! Interfaces of the external collaborators: feed downloads, the subscription list and the task backend

use std::error::Error;

use async_trait::async_trait;

use crate::source::{CalendarSource, SourceList};
use crate::task::EditableTask;

/// Something that can download the raw content of an iCal feed
#[async_trait]
pub trait FeedFetcher {
    /// Returns the iCal text of `source`.
    /// This may be slow, or fail (e.g. in case of a network error)
    async fn fetch(&self, source: &CalendarSource) -> Result<String, Box<dyn Error>>;
}

/// The store that owns the editable tasks
#[async_trait]
pub trait TaskStore {
    /// Returns a snapshot of every task of the user
    async fn get_tasks(&self) -> Result<Vec<EditableTask>, Box<dyn Error>>;

    /// Add a new task. Its `orig_id` is used as the backend key
    async fn create_task(&mut self, task: &EditableTask) -> Result<(), Box<dyn Error>>;

    /// Replace the task that has the same `orig_id`
    async fn update_task(&mut self, task: &EditableTask) -> Result<(), Box<dyn Error>>;

    async fn delete_task(&mut self, orig_id: &str) -> Result<(), Box<dyn Error>>;
}

/// The store that keeps the calendars a user has subscribed to
#[async_trait]
pub trait SourceStore {
    async fn get_sources(&self) -> Result<SourceList, Box<dyn Error>>;

    /// Save a subscription. Saving an existing one is not an error
    async fn upsert_source(&mut self, source: &CalendarSource) -> Result<(), Box<dyn Error>>;

    async fn delete_source(&mut self, source: &CalendarSource) -> Result<(), Box<dyn Error>>;
}
