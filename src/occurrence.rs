//! Read-only occurrences imported from an iCal feed

use std::collections::HashSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::ical::{inclusive_end, RawEvent};
use crate::recurrence::{self, Span};
use crate::source::CalendarSource;
use crate::window::DisplayWindow;
use crate::CalendarDay;

/// One concrete instance of an imported event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    id: String,
    source_url: String,
    summary: String,
    start: CalendarDay,
    /// Inclusive. Never before `start`
    end: CalendarDay,
    all_day: bool,
}

impl Occurrence {
    /// Create an occurrence, and derive its ID from its content
    pub fn new(source: &CalendarSource, summary: String, start: CalendarDay, end: CalendarDay, all_day: bool) -> Self {
        let end = std::cmp::max(start, end);
        let id = crate::identity::occurrence_id(source.as_str(), start, end, &summary);
        Self {
            id,
            source_url: source.as_str().to_string(),
            summary,
            start,
            end,
            all_day,
        }
    }

    pub fn id(&self) -> &str             { &self.id         }
    pub fn source_url(&self) -> &str     { &self.source_url }
    pub fn summary(&self) -> &str        { &self.summary    }
    pub fn start(&self) -> CalendarDay   { self.start       }
    pub fn end(&self) -> CalendarDay     { self.end         }
    pub fn all_day(&self) -> bool        { self.all_day     }
}

/// Build the occurrences of a single event.
///
/// Non-recurring events give (at most) one occurrence, whether it is in the window or not.
/// Recurring events give their instances that start within `window`.
/// Events with a malformed date give nothing.
pub fn occurrences_of(event: &RawEvent, source: &CalendarSource, window: &DisplayWindow, settings: &Settings) -> Vec<Occurrence> {
    let summary = event.summary_or(&settings.default_summary);

    let start = match event.dtstart.as_ref().and_then(|d| d.to_day()) {
        Some(day) => day,
        None => {
            log::debug!("Ignoring event {:?}: invalid DTSTART {:?}", summary, event.dtstart);
            return Vec::new();
        },
    };
    let end = match &event.dtend {
        None => None,
        Some(raw) => match raw.to_day() {
            Some(day) => Some(day),
            None => {
                log::debug!("Ignoring event {:?}: invalid DTEND {:?}", summary, raw);
                return Vec::new();
            },
        },
    };
    let all_day = event.is_all_day();

    let spans = match &event.rrule {
        None => vec![Span { start, end: end.unwrap_or(start) }],
        Some(rule) => {
            let duration_days = end.map(|end| (end - start).num_days()).unwrap_or(0);
            let rule_start = match all_day {
                true => start.and_time(NaiveTime::MIN),
                false => event.dtstart
                    .as_ref()
                    .and_then(|d| d.to_date_time())
                    .unwrap_or_else(|| start.and_time(NaiveTime::MIN)),
            };
            match recurrence::expand(rule_start, rule, duration_days, window, settings.recurrence_limit()) {
                Ok(expansion) => expansion.spans,
                Err(err) => {
                    log::warn!("{}. Event {:?} is imported as a single occurrence", err, summary);
                    vec![Span { start, end: end.unwrap_or(start) }]
                },
            }
        },
    };

    spans
        .into_iter()
        .map(|span| {
            let end = inclusive_end(span.start, Some(span.end), all_day);
            Occurrence::new(source, summary.to_string(), span.start, end, all_day)
        })
        .collect()
}

/// Parse a whole iCal document fetched from `source`.
///
/// Occurrences are returned in file order (then rule order). Identical occurrences are only returned once.
pub fn parse_feed(content: &str, source: &CalendarSource, window: &DisplayWindow, settings: &Settings) -> Vec<Occurrence> {
    let mut seen_ids = HashSet::new();
    let mut occurrences = Vec::new();

    for event in crate::ical::parse(content) {
        for occurrence in occurrences_of(&event, source, window, settings) {
            if seen_ids.insert(occurrence.id().to_string()) {
                occurrences.push(occurrence);
            } else {
                log::trace!("Ignoring duplicate occurrence {} of {}", occurrence.id(), source);
            }
        }
    }

    log::debug!("Found {} occurrences in {}", occurrences.len(), source);
    occurrences
}
