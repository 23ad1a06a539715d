//! Full imports, with mocked feeds, subscriptions and task store

use std::collections::HashMap;
use std::error::Error;

use async_trait::async_trait;

use ics_overlay::config::Settings;
use ics_overlay::provider::import_progress::{feedback_channel, ImportEvent, ImportProgress};
use ics_overlay::traits::{FeedFetcher, SourceStore, TaskStore};
use ics_overlay::view::UpdateError;
use ics_overlay::{CalendarDay, CalendarSource, DisplayWindow, EditableTask, Provider, SourceList, TaskChange};

const HOLIDAYS_URL: &str = "webcal://example.com/holidays.ics";
const TEAM_URL: &str = "https://example.com/team.ics";
const BROKEN_URL: &str = "https://broken.example.com/cal.ics";

const HOLIDAYS_ICAL: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:New year\r\n\
DTSTART;VALUE=DATE:20250101\r\n\
DTEND;VALUE=DATE:20250104\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Too old to be displayed\r\n\
DTSTART;VALUE=DATE:20240101\r\n\
DTEND;VALUE=DATE:20240102\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:No start date\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

const COURSE_URL: &str = "https://school.example.com/course.ics";
const COURSE_ICAL: &str = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Course\r\n\
DTSTART:20250106T100000Z\r\n\
DTEND:20250106T120000Z\r\n\
RRULE:FREQ=WEEKLY;UNTIL=20250127T090000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

const TEAM_ICAL: &str = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Weekly\r\n\
  sync\r\n\
DTSTART:20241007T100000Z\r\n\
DTEND:20241007T110000Z\r\n\
RRULE:FREQ=WEEKLY\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";


struct MockFetcher {
    feeds: HashMap<String, String>,
}

#[async_trait]
impl FeedFetcher for MockFetcher {
    async fn fetch(&self, source: &CalendarSource) -> Result<String, Box<dyn Error>> {
        match self.feeds.get(source.as_str()) {
            Some(content) => Ok(content.clone()),
            None => Err(format!("Connection refused ({})", source).into()),
        }
    }
}

#[derive(Default)]
struct MockStore {
    tasks: Vec<EditableTask>,
    fail: bool,
}

#[async_trait]
impl TaskStore for MockStore {
    async fn get_tasks(&self) -> Result<Vec<EditableTask>, Box<dyn Error>> {
        if self.fail {
            return Err("backend unavailable".into());
        }
        Ok(self.tasks.clone())
    }

    async fn create_task(&mut self, task: &EditableTask) -> Result<(), Box<dyn Error>> {
        self.tasks.push(task.clone());
        Ok(())
    }

    async fn update_task(&mut self, task: &EditableTask) -> Result<(), Box<dyn Error>> {
        match self.tasks.iter_mut().find(|t| t.orig_id() == task.orig_id()) {
            None => Err(format!("No task {}", task.orig_id()).into()),
            Some(t) => {
                *t = task.clone();
                Ok(())
            },
        }
    }

    async fn delete_task(&mut self, orig_id: &str) -> Result<(), Box<dyn Error>> {
        self.tasks.retain(|t| t.orig_id() != orig_id);
        Ok(())
    }
}

#[derive(Default)]
struct MockSourceStore {
    urls: Vec<String>,
}

#[async_trait]
impl SourceStore for MockSourceStore {
    async fn get_sources(&self) -> Result<SourceList, Box<dyn Error>> {
        let mut list = SourceList::new();
        for url in &self.urls {
            list.upsert(CalendarSource::parse(url)?);
        }
        Ok(list)
    }

    async fn upsert_source(&mut self, source: &CalendarSource) -> Result<(), Box<dyn Error>> {
        if self.urls.iter().any(|url| url == source.as_str()) == false {
            self.urls.push(source.as_str().to_string());
        }
        Ok(())
    }

    async fn delete_source(&mut self, source: &CalendarSource) -> Result<(), Box<dyn Error>> {
        self.urls.retain(|url| url != source.as_str());
        Ok(())
    }
}


fn day(s: &str) -> CalendarDay {
    s.parse().unwrap()
}

fn window() -> DisplayWindow {
    DisplayWindow::new(day("2025-01-01"), day("2025-01-31"))
}

fn sources(urls: &[&str]) -> SourceList {
    urls.iter().map(|url| CalendarSource::parse(url).unwrap()).collect()
}

fn fetcher() -> MockFetcher {
    let mut feeds = HashMap::new();
    feeds.insert("https://example.com/holidays.ics".to_string(), HOLIDAYS_ICAL.to_string());
    feeds.insert(TEAM_URL.to_string(), TEAM_ICAL.to_string());
    feeds.insert(COURSE_URL.to_string(), COURSE_ICAL.to_string());
    MockFetcher { feeds }
}

fn store() -> MockStore {
    MockStore {
        tasks: vec![
            EditableTask::new("1".to_string(), "Write report".to_string(), day("2025-01-20"), day("2025-01-24"), 0),
            EditableTask::new("2".to_string(), "Finished long ago".to_string(), day("2024-06-01"), day("2024-06-02"), 100),
        ],
        fail: false,
    }
}


#[tokio::test]
async fn test_full_import() {
    let _ = env_logger::builder().is_test(true).try_init();

    let provider = Provider::new(fetcher(), store(), sources(&[HOLIDAYS_URL, TEAM_URL]), Settings::default());
    let import = provider.import(&window(), &mut ImportProgress::new()).await;

    assert!(import.success);
    assert_eq!(import.reports.len(), 2);
    assert_eq!(import.reports[0].source.as_str(), "https://example.com/holidays.ics");

    let entries: Vec<(String, CalendarDay, CalendarDay, bool)> = import.view.entries()
        .iter()
        .map(|e| (e.name().to_string(), e.start(), e.end(), e.read_only()))
        .collect();
    assert_eq!(entries, vec![
        ("New year".to_string(),      day("2025-01-01"), day("2025-01-03"), true),
        ("Weekly sync".to_string(),   day("2025-01-06"), day("2025-01-06"), true),
        ("Weekly sync".to_string(),   day("2025-01-13"), day("2025-01-13"), true),
        ("Write report".to_string(),  day("2025-01-20"), day("2025-01-24"), false),
        ("Weekly sync".to_string(),   day("2025-01-20"), day("2025-01-20"), true),
        ("Weekly sync".to_string(),   day("2025-01-27"), day("2025-01-27"), true),
    ]);
}

#[tokio::test]
async fn test_ids_are_stable_across_imports() {
    let _ = env_logger::builder().is_test(true).try_init();

    let provider = Provider::new(fetcher(), store(), sources(&[HOLIDAYS_URL, TEAM_URL]), Settings::default());
    let first = provider.import(&window(), &mut ImportProgress::new()).await;
    let second = provider.import(&window(), &mut ImportProgress::new()).await;

    let ids = |import: &ics_overlay::provider::Import| -> Vec<String> {
        import.view.entries().iter().map(|e| e.id().to_string()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    for id in ids(&first) {
        assert!(ics_overlay::identity::is_token(&id) || id == "1");
    }
}

#[tokio::test]
async fn test_broken_source_does_not_block_the_others() {
    let _ = env_logger::builder().is_test(true).try_init();

    let provider = Provider::new(fetcher(), store(), sources(&[BROKEN_URL, HOLIDAYS_URL]), Settings::default());
    let import = provider.import(&window(), &mut ImportProgress::new()).await;

    assert!(import.success == false);
    assert_eq!(import.diagnostics.len(), 1);
    assert_eq!(import.diagnostics[0].source.as_ref().map(|s| s.as_str()), Some(BROKEN_URL));
    assert!(import.reports[0].error.is_some());
    assert!(import.reports[0].occurrences.is_empty());
    assert!(import.reports[1].is_success());
    // Both non-recurring holidays are reported, only one of them is in the window
    assert_eq!(import.reports[1].occurrences.len(), 2);

    let names: Vec<&str> = import.view.entries().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["New year", "Write report"]);
}

#[tokio::test]
async fn test_task_store_failure() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut failing_store = store();
    failing_store.fail = true;
    let provider = Provider::new(fetcher(), failing_store, sources(&[HOLIDAYS_URL]), Settings::default());
    let import = provider.import(&window(), &mut ImportProgress::new()).await;

    assert!(import.success == false);
    assert_eq!(import.diagnostics.len(), 1);
    assert!(import.diagnostics[0].source.is_none());
    assert_eq!(import.view.len(), 1);
    assert!(import.view.entries()[0].read_only());
}

#[tokio::test]
async fn test_updates_through_the_provider() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut provider = Provider::new(fetcher(), store(), sources(&[HOLIDAYS_URL]), Settings::default());
    let mut view = provider.import(&window(), &mut ImportProgress::new()).await.view;

    provider.update_task(&mut view, "1", &TaskChange::rename("Write the report")).await.unwrap();
    assert_eq!(provider.store().tasks[0].name(), "Write the report");

    provider.toggle_completion(&mut view, "1").await.unwrap();
    assert!(provider.store().tasks[0].completed());

    let imported_id = view.entries()[0].id().to_string();
    let before = view.entries()[0].clone();
    let err = provider.update_task(&mut view, &imported_id, &TaskChange::rename("Mine now")).await.unwrap_err();
    assert_eq!(err.downcast_ref::<UpdateError>(), Some(&UpdateError::ReadOnly(imported_id.clone())));
    assert_eq!(view.entries()[0], before);
}

#[tokio::test]
async fn test_recurrence_limit_is_a_setting() {
    let _ = env_logger::builder().is_test(true).try_init();

    let settings = Settings { max_recurrence_candidates: 3, ..Settings::default() };
    let provider = Provider::new(fetcher(), MockStore::default(), sources(&[TEAM_URL]), settings);
    let import = provider.import(&window(), &mut ImportProgress::new()).await;

    // The rule starts in October, but only the instants of January are counted
    assert!(import.success);
    let starts: Vec<CalendarDay> = import.view.entries().iter().map(|e| e.start()).collect();
    assert_eq!(starts, vec![day("2025-01-06"), day("2025-01-13"), day("2025-01-20")]);
}

#[tokio::test]
async fn test_timed_recurrence_until() {
    let _ = env_logger::builder().is_test(true).try_init();

    let provider = Provider::new(fetcher(), MockStore::default(), sources(&[COURSE_URL]), Settings::default());
    let import = provider.import(&window(), &mut ImportProgress::new()).await;

    // The course of 2025-01-27 starts at 10:00, after the end of the rule
    let starts: Vec<CalendarDay> = import.view.entries().iter().map(|e| e.start()).collect();
    assert_eq!(starts, vec![day("2025-01-06"), day("2025-01-13"), day("2025-01-20")]);
}

#[tokio::test]
async fn test_create_and_delete_tasks() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut provider = Provider::new(fetcher(), store(), SourceList::new(), Settings::default());
    let task = EditableTask::new("25010509000012".to_string(), "New one".to_string(), day("2025-01-10"), day("2025-01-12"), 0);
    provider.create_task(&task).await.unwrap();
    assert_eq!(provider.store().tasks.len(), 3);

    let names: Vec<String> = provider.import(&window(), &mut ImportProgress::new()).await
        .view.entries().iter().map(|e| e.name().to_string()).collect();
    assert_eq!(names, vec!["New one", "Write report"]);

    provider.delete_task("1").await.unwrap();
    let ids: Vec<String> = provider.import(&window(), &mut ImportProgress::new()).await
        .view.entries().iter().map(|e| e.id().to_string()).collect();
    assert_eq!(ids, vec!["25010509000012"]);
}

#[tokio::test]
async fn test_subscriptions() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut source_store = MockSourceStore { urls: vec![TEAM_URL.to_string()] };
    let mut provider = Provider::new(fetcher(), MockStore::default(), SourceList::new(), Settings::default());
    provider.load_sources(&source_store).await.unwrap();
    assert_eq!(provider.sources().len(), 1);

    let holidays = CalendarSource::parse(HOLIDAYS_URL).unwrap();
    assert!(provider.subscribe(&mut source_store, holidays.clone()).await.unwrap());
    assert!(provider.subscribe(&mut source_store, holidays.clone()).await.unwrap() == false);
    assert_eq!(source_store.urls, vec![TEAM_URL, "https://example.com/holidays.ics"]);

    let team = CalendarSource::parse(TEAM_URL).unwrap();
    assert!(provider.unsubscribe(&mut source_store, &team).await.unwrap());
    assert_eq!(source_store.urls, vec!["https://example.com/holidays.ics"]);
    assert_eq!(provider.sources().sources(), &[holidays]);
}

#[tokio::test]
async fn test_refresh_with_feedback() {
    let _ = env_logger::builder().is_test(true).try_init();

    let today = chrono::Local::now().date_naive();
    let task_store = MockStore {
        tasks: vec![EditableTask::new("today".to_string(), "Today's task".to_string(), today, today, 0)],
        fail: false,
    };
    let (sender, receiver) = feedback_channel();
    let provider = Provider::new(fetcher(), task_store, sources(&[TEAM_URL, BROKEN_URL]), Settings::default());
    let import = provider.refresh_with_feedback(sender).await;

    assert_eq!(*receiver.borrow(), ImportEvent::Finished{ success: false });
    assert_eq!(import.diagnostics.len(), 1);
    assert!(import.view.get("today").is_some());
    // A weekly rule that started in 2024 still has instants around today
    assert!(import.view.entries().iter().filter(|e| e.read_only()).count() >= 20);
}

#[tokio::test]
async fn test_feedback() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (sender, receiver) = feedback_channel();
    let provider = Provider::new(fetcher(), store(), sources(&[BROKEN_URL]), Settings::default());
    let mut progress = ImportProgress::new_with_feedback_channel(sender);
    let import = provider.import(&window(), &mut progress).await;

    assert!(import.success == false);
    assert_eq!(progress.diagnostics().len(), 1);
    assert_eq!(*receiver.borrow(), ImportEvent::Finished{ success: false });
}
