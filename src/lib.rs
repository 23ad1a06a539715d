//! This crate imports iCal feeds and displays them next to an editable task list.
//!
//! Feeds are parsed by the [`ical`] module into raw events, which are turned into read-only [`Occurrence`]s
//! (recurring events are expanded by the [`recurrence`] module). Each occurrence gets an ID derived from its content
//! (see [`identity`]), that stays the same from one download to the next.
//!
//! Occurrences and the user's [`EditableTask`]s are merged into a [`MergedView`](view::MergedView), restricted to a
//! [`DisplayWindow`]. Only editable tasks can be changed through the view.
//!
//! Downloading feeds and reading tasks are done through the traits of the [`traits`] module. \
//! A [`Provider`] runs a whole import using these traits, and makes sure a broken source never prevents the others
//! from being displayed.

pub mod traits;

pub mod ical;
pub mod recurrence;
pub mod identity;
mod occurrence;
pub use occurrence::{occurrences_of, parse_feed, Occurrence};
mod task;
pub use task::{EditableTask, TaskChange};
pub use task::{new_task_id, new_task_name};
mod item;
pub use item::MergedViewEntry;
pub mod window;
pub use window::DisplayWindow;
pub mod view;
pub mod source;
pub use source::{CalendarSource, SourceList};
pub mod provider;
pub use provider::Provider;

pub mod client;
pub mod cache;

pub mod config;
pub mod utils;

/// A day, with no time of day. Displayed as `YYYY-MM-DD`
pub type CalendarDay = chrono::NaiveDate;

/// A provider that downloads feeds over HTTP and reads tasks from the REST backend
pub type HttpProvider = Provider<client::HttpFetcher, client::RemoteTaskStore>;
