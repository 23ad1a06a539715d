//! Expansion of `RRULE`s into concrete occurrences
//!
//! Rule instants are computed by the [`rrule`] crate. This module only decides which of them land in a [`DisplayWindow`],
//! and guarantees the expansion ends, even for rules that never do.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use rrule::RRuleSet;

use crate::window::DisplayWindow;
use crate::CalendarDay;

/// The maximum count of rule instants within the display window that will be examined for a single recurring event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecurrenceLimit(usize);

impl RecurrenceLimit {
    pub const DEFAULT: RecurrenceLimit = RecurrenceLimit(5000);

    pub fn new(max_candidates: usize) -> Self {
        Self(max_candidates)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for RecurrenceLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for RecurrenceLimit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} candidates", self.0)
    }
}

/// One expanded instance. `end` is `start` shifted by the duration of the original event, and has not been
/// adjusted for the all-day exclusive end yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: CalendarDay,
    pub end: CalendarDay,
}

/// The result of an expansion
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expansion {
    /// Instances whose start is in the window, in rule order
    pub spans: Vec<Span>,
    /// Whether the expansion has been stopped by its [`RecurrenceLimit`]
    pub truncated: bool,
}

/// Expand `rule` (the value of an `RRULE` property) for an event that starts at `start` and lasts `duration_days`.
///
/// `start` keeps the time of day of timed events (all-day events start at midnight), so that a date-time `UNTIL` is
/// compared with the actual instants of the rule. Instants are only truncated to their day once generated.
///
/// Only instants starting within `window` are returned. Instants before the window are skipped by the rrule crate,
/// the first instant after it ends the expansion. At most `limit` candidates are taken from the window: if this is
/// reached, the spans found so far are returned, and the result is flagged as `truncated`.
///
/// This fails only if the rule cannot be understood.
pub fn expand(
    start: NaiveDateTime,
    rule: &str,
    duration_days: i64,
    window: &DisplayWindow,
    limit: RecurrenceLimit,
) -> Result<Expansion, Box<dyn Error>> {
    let rrule_set = RRuleSet::from_str(&build_rrule_string(start, rule))
        .map_err(|err| format!("Invalid recurrence rule {:?}: {}", rule, err))?;
    let duration = Duration::days(std::cmp::max(duration_days, 0));

    // `after` and `before` are exclusive
    let tz: rrule::Tz = Utc.into();
    let after = (window.past().and_time(NaiveTime::MIN) - Duration::seconds(1)).and_utc().with_timezone(&tz);
    let before = (window.future() + Duration::days(1)).and_time(NaiveTime::MIN).and_utc().with_timezone(&tz);

    // One more instant than allowed is requested, to tell whether the limit has been reached
    let max_candidates = std::cmp::min(limit.get(), usize::from(u16::MAX) - 1);
    let result = rrule_set.after(after).before(before).all((max_candidates + 1) as u16);

    let mut expansion = Expansion::default();
    for (candidates, instant) in result.dates.iter().enumerate() {
        if candidates >= max_candidates {
            log::warn!("Recurrence rule {:?} reached the limit of {}. Ignoring further occurrences", rule, limit);
            expansion.truncated = true;
            break;
        }

        let day = instant.date_naive();
        if day > window.future() {
            break;
        }
        if window.contains(day) == false {
            continue;
        }
        expansion.spans.push(Span { start: day, end: day + duration });
    }

    Ok(expansion)
}

/// Build the text the rrule crate expects: a UTC `DTSTART` line followed by the rule.
///
/// The rrule crate requires `UNTIL` to be a UTC date-time when `DTSTART` is one. Date-only values are moved to the
/// end of their day, floating date-times are read as UTC.
fn build_rrule_string(start: NaiveDateTime, rule: &str) -> String {
    let rule = rule.trim();
    let rule = match rule.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &rule[6..],
        _ => rule,
    };

    let parts: Vec<String> = rule
        .split(';')
        .filter(|part| part.is_empty() == false)
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                format!("UNTIL={}", utc_until(value))
            },
            _ => part.to_string(),
        })
        .collect();

    format!("DTSTART:{}Z\nRRULE:{}", start.format("%Y%m%dT%H%M%S"), parts.join(";"))
}

fn utc_until(value: &str) -> String {
    if value.contains('T') == false {
        format!("{}T235959Z", value)
    } else if value.ends_with('Z') == false {
        format!("{}Z", value)
    } else {
        value.to_string()
    }
}
