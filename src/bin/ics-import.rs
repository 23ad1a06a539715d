//! Download some iCal feeds and print what would be displayed today.
//!
//! Usage: `ics-import <URL>...`
//!
//! Settings are read from the JSON file named by `ICS_OVERLAY_SETTINGS`, if any.
//! When they contain an `api_base`, the tasks of the user named by `ICS_OVERLAY_USER` are displayed as well.
//! When they contain a `sources_api_base`, the calendars this user has subscribed to are imported along with `<URL>`s.

use std::error::Error;
use std::path::Path;

use async_trait::async_trait;

use ics_overlay::client::{HttpFetcher, RemoteSourceStore, RemoteTaskStore};
use ics_overlay::config::Settings;
use ics_overlay::traits::{SourceStore, TaskStore};
use ics_overlay::{CalendarSource, EditableTask, Provider, SourceList};

/// Used when no task backend is configured
struct NoTaskStore;

#[async_trait]
impl TaskStore for NoTaskStore {
    async fn get_tasks(&self) -> Result<Vec<EditableTask>, Box<dyn Error>> {
        Ok(Vec::new())
    }
    async fn create_task(&mut self, _task: &EditableTask) -> Result<(), Box<dyn Error>> {
        Err("No task backend is configured".into())
    }
    async fn update_task(&mut self, _task: &EditableTask) -> Result<(), Box<dyn Error>> {
        Err("No task backend is configured".into())
    }
    async fn delete_task(&mut self, _orig_id: &str) -> Result<(), Box<dyn Error>> {
        Err("No task backend is configured".into())
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let settings = match std::env::var("ICS_OVERLAY_SETTINGS") {
        Ok(path) => Settings::from_file_or_default(Path::new(&path)),
        Err(_) => Settings::default(),
    };

    let username = std::env::var("ICS_OVERLAY_USER").ok();

    let mut sources = match (settings.sources_api_base.as_deref(), username.as_deref()) {
        (Some(sources_api_base), Some(username)) => load_subscriptions(sources_api_base, username, &settings).await,
        _ => SourceList::new(),
    };
    let arguments: SourceList = std::env::args()
        .skip(1)
        .filter_map(|arg| match CalendarSource::parse(&arg) {
            Ok(source) => Some(source),
            Err(err) => {
                log::error!("{}", err);
                None
            },
        })
        .collect();
    for source in arguments.sources() {
        sources.upsert(source.clone());
    }
    if sources.is_empty() {
        eprintln!("Usage: ics-import <URL>...");
        std::process::exit(2);
    }

    let fetcher = match HttpFetcher::new(settings.timeout()) {
        Ok(fetcher) => fetcher,
        Err(err) => {
            log::error!("Unable to create an HTTP client: {}", err);
            std::process::exit(1);
        },
    };

    let import = match (settings.api_base.clone(), username) {
        (Some(api_base), Some(username)) => match RemoteTaskStore::new(&api_base, username, settings.timeout()) {
            Ok(store) => Provider::new(fetcher, store, sources, settings).refresh().await,
            Err(err) => {
                log::error!("Invalid task backend {:?}: {}", api_base, err);
                std::process::exit(1);
            },
        },
        _ => Provider::new(fetcher, NoTaskStore, sources, settings).refresh().await,
    };

    ics_overlay::utils::print_reports(&import.reports);
    println!("---- view -----");
    ics_overlay::utils::print_view(&import.view);
    if let Some((_, entry)) = import.view.first_visible(chrono::Local::now().date_naive()) {
        println!("First item not over yet: {}", entry.name());
    }

    for diagnostic in &import.diagnostics {
        log::warn!("{}", diagnostic);
    }
}

async fn load_subscriptions(sources_api_base: &str, username: &str, settings: &Settings) -> SourceList {
    let subscriptions = match RemoteSourceStore::new(sources_api_base, username, settings.timeout()) {
        Ok(store) => store.get_sources().await,
        Err(err) => Err(err),
    };
    match subscriptions {
        Ok(sources) => sources,
        Err(err) => {
            log::error!("Unable to load the subscriptions of {}: {}", username, err);
            SourceList::new()
        },
    }
}
