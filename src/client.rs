//! HTTP implementations of the external collaborators

use std::error::Error;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::source::{CalendarSource, SourceList};
use crate::task::EditableTask;
use crate::traits::{FeedFetcher, SourceStore, TaskStore};
use crate::CalendarDay;


/// Downloads iCal feeds over HTTP(S)
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher. Each download will fail if it takes longer than `timeout`
    pub fn new(timeout: Duration) -> Result<Self, Box<dyn Error>> {
        Ok(Self { client: http_client(timeout)? })
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, Box<dyn Error>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Make sure `api_base` ends with a `/`, so that relative paths are appended to it
fn base_url(api_base: &str) -> Result<Url, Box<dyn Error>> {
    let mut url = Url::parse(api_base)?;
    if url.path().ends_with('/') == false {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, source: &CalendarSource) -> Result<String, Box<dyn Error>> {
        let response = self.client
            .get(source.url().clone())
            .header("Accept", "text/calendar")
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?} for {}", response.status(), source).into());
        }

        let text = response.text().await?;
        log::debug!("Downloaded {} bytes from {}", text.len(), source);
        Ok(text)
    }
}


/// A task, as sent and received by the task backend
#[derive(Debug, Serialize, Deserialize)]
struct BackendTask {
    #[serde(rename = "ID")]
    id: String,
    name: String,
    start: CalendarDay,
    end: CalendarDay,
    #[serde(default)]
    progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

impl BackendTask {
    fn from_task(task: &EditableTask, username: &str) -> Self {
        Self {
            id: task.orig_id().to_string(),
            name: task.name().to_string(),
            start: task.start(),
            end: task.end(),
            progress: task.progress(),
            user: Some(username.to_string()),
        }
    }

    fn into_task(self) -> EditableTask {
        EditableTask::new(self.id, self.name, self.start, self.end, self.progress)
    }
}


/// A task backend reached over its REST API
pub struct RemoteTaskStore {
    client: reqwest::Client,
    api_base: Url,
    username: String,
}

impl RemoteTaskStore {
    /// Create a store. This does not start a connection. Each request will fail if it takes longer than `timeout`
    pub fn new<S: AsRef<str>, T: ToString>(api_base: S, username: T, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            client: http_client(timeout)?,
            api_base: base_url(api_base.as_ref())?,
            username: username.to_string(),
        })
    }

    fn tasks_url(&self) -> Result<Url, Box<dyn Error>> {
        Ok(self.api_base.join("tasks")?)
    }

    fn task_url(&self, orig_id: &str) -> Result<Url, Box<dyn Error>> {
        let mut url = self.tasks_url()?;
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot be a base URL", self.api_base))?
            .push(orig_id);
        Ok(url)
    }

    async fn send_task(&self, method: reqwest::Method, url: Url, task: &EditableTask) -> Result<(), Box<dyn Error>> {
        let body = serde_json::to_string(&BackendTask::from_task(task, &self.username))?;
        let response = self.client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?} for task {}", response.status(), task.orig_id()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for RemoteTaskStore {
    async fn get_tasks(&self) -> Result<Vec<EditableTask>, Box<dyn Error>> {
        let url = Url::parse_with_params(self.tasks_url()?.as_str(), &[("username", &self.username)])?;
        let response = self.client
            .get(url)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?} when listing tasks", response.status()).into());
        }

        let text = response.text().await?;
        parse_task_list(&text)
    }

    async fn create_task(&mut self, task: &EditableTask) -> Result<(), Box<dyn Error>> {
        let url = self.tasks_url()?;
        self.send_task(reqwest::Method::POST, url, task).await
    }

    async fn update_task(&mut self, task: &EditableTask) -> Result<(), Box<dyn Error>> {
        let url = self.task_url(task.orig_id())?;
        self.send_task(reqwest::Method::PUT, url, task).await
    }

    async fn delete_task(&mut self, orig_id: &str) -> Result<(), Box<dyn Error>> {
        let url = self.task_url(orig_id)?;
        let body = serde_json::json!({ "user": self.username }).to_string();
        let response = self.client
            .delete(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?} when deleting task {}", response.status(), orig_id).into());
        }
        Ok(())
    }
}

/// Parse the JSON task list of the backend. Invalid records are skipped
fn parse_task_list(text: &str) -> Result<Vec<EditableTask>, Box<dyn Error>> {
    let records: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let mut tasks = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<BackendTask>(record) {
            Ok(backend_task) => tasks.push(backend_task.into_task()),
            Err(err) => log::warn!("Ignoring an invalid task from the backend: {}", err),
        }
    }
    Ok(tasks)
}



/// A subscription, as sent and received by the subscription backend
#[derive(Debug, Serialize, Deserialize)]
struct BackendSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    ics_url: String,
}

/// The list of subscriptions. Older backends return a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BackendSubscriptionList {
    Items{ items: Vec<serde_json::Value> },
    Bare(Vec<serde_json::Value>),
}

/// A subscription backend reached over its REST API.
///
/// Subscriptions are keyed by user and URL: they are listed with `GET {api_base}?user=`, saved with `PUT {api_base}`
/// and deleted with `DELETE {api_base}`.
pub struct RemoteSourceStore {
    client: reqwest::Client,
    api_base: Url,
    username: String,
}

impl RemoteSourceStore {
    /// Create a store. This does not start a connection. Each request will fail if it takes longer than `timeout`
    pub fn new<S: AsRef<str>, T: ToString>(api_base: S, username: T, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            client: http_client(timeout)?,
            api_base: Url::parse(api_base.as_ref())?,
            username: username.to_string(),
        })
    }

    fn list_url(&self) -> Result<Url, Box<dyn Error>> {
        Ok(Url::parse_with_params(self.api_base.as_str(), &[("user", &self.username)])?)
    }

    async fn send_subscription(&self, method: reqwest::Method, source: &CalendarSource) -> Result<(), Box<dyn Error>> {
        let body = serde_json::to_string(&BackendSubscription {
            user: Some(self.username.clone()),
            ics_url: source.as_str().to_string(),
        })?;
        let response = self.client
            .request(method.clone(), self.api_base.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?} for {} {}", response.status(), method, source).into());
        }
        Ok(())
    }
}

#[async_trait]
impl SourceStore for RemoteSourceStore {
    async fn get_sources(&self) -> Result<SourceList, Box<dyn Error>> {
        let url = self.list_url()?;
        let response = self.client
            .get(url)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?} when listing subscriptions", response.status()).into());
        }

        let text = response.text().await?;
        parse_source_list(&text)
    }

    async fn upsert_source(&mut self, source: &CalendarSource) -> Result<(), Box<dyn Error>> {
        self.send_subscription(reqwest::Method::PUT, source).await
    }

    async fn delete_source(&mut self, source: &CalendarSource) -> Result<(), Box<dyn Error>> {
        self.send_subscription(reqwest::Method::DELETE, source).await
    }
}

/// Parse the JSON subscription list of the backend. Records with no valid `ics_url` are skipped
fn parse_source_list(text: &str) -> Result<SourceList, Box<dyn Error>> {
    let records = match serde_json::from_str(text)? {
        BackendSubscriptionList::Items{ items } => items,
        BackendSubscriptionList::Bare(items) => items,
    };

    let mut sources = SourceList::new();
    for record in records {
        let subscription = match serde_json::from_value::<BackendSubscription>(record) {
            Ok(subscription) => subscription,
            Err(err) => {
                log::warn!("Ignoring an invalid subscription from the backend: {}", err);
                continue;
            },
        };
        match CalendarSource::parse(&subscription.ics_url) {
            Ok(source) => { sources.upsert(source); },
            Err(err) => log::warn!("Ignoring subscription {:?}: {}", subscription.ics_url, err),
        }
    }
    Ok(sources)
}
