//! Conversion of DTSTART/DTEND values into calendar days

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::CalendarDay;

/// A DTSTART or DTEND value, as found in the iCal file
#[derive(Clone, Debug, PartialEq)]
pub struct RawDate {
    pub value: String,
    /// Whether the property carried a `VALUE=DATE` parameter
    pub all_day: bool,
}

impl RawDate {
    pub fn new<S: ToString>(value: S, all_day: bool) -> Self {
        Self { value: value.to_string(), all_day }
    }

    /// Whether this value describes a whole day, either explicitly or because it has no time part
    pub fn is_all_day(&self) -> bool {
        self.all_day || is_date_only(self.value.trim())
    }

    pub fn to_day(&self) -> Option<CalendarDay> {
        normalize_date(&self.value, self.all_day)
    }

    pub fn to_date_time(&self) -> Option<NaiveDateTime> {
        normalize_date_time(&self.value, self.all_day)
    }
}

/// Convert a raw property value into a calendar day.
///
/// `YYYYMMDD` values (or any value flagged `VALUE=DATE`) are read as dates.
/// Other values must look like `YYYYMMDDT...`: only their date part is read, their time of day is discarded, without
/// any timezone conversion.
/// Returns `None` when no valid calendar date can be read.
pub fn normalize_date(value: &str, all_day: bool) -> Option<CalendarDay> {
    let value = value.trim();

    if all_day || is_date_only(value) {
        // A date-typed value is sliced as is, even if some garbage follows the date
        return value.get(0..8).and_then(parse_ymd);
    }

    let (date_part, _time_part) = value.split_once('T')?;
    parse_ymd(date_part)
}

/// Like [`normalize_date`], but keeps the time of day of timed values.
///
/// Dates, and time parts that are not `HHMMSS[Z]`, are placed at midnight.
pub fn normalize_date_time(value: &str, all_day: bool) -> Option<NaiveDateTime> {
    let day = normalize_date(value, all_day)?;
    let value = value.trim();
    if all_day || is_date_only(value) {
        return Some(day.and_time(NaiveTime::MIN));
    }

    let time = value.split_once('T').and_then(|(_, time_part)| parse_hms(time_part));
    Some(day.and_time(time.unwrap_or(NaiveTime::MIN)))
}

/// Apply the exclusive-end convention of all-day events.
///
/// A missing end means a zero-length event. When `all_day` is set and the end is after the start, the end is moved
/// back by one day so that it designates the last included day. The result never precedes `start`.
pub fn inclusive_end(start: CalendarDay, end: Option<CalendarDay>, all_day: bool) -> CalendarDay {
    let mut end = end.unwrap_or(start);
    if all_day && end > start {
        end = end - Duration::days(1);
    }
    std::cmp::max(start, end)
}

fn is_date_only(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_hms(value: &str) -> Option<NaiveTime> {
    let value = value.strip_suffix('Z').unwrap_or(value);
    if value.len() != 6 || value.bytes().all(|b| b.is_ascii_digit()) == false {
        return None;
    }
    NaiveTime::from_hms_opt(value[0..2].parse().ok()?, value[2..4].parse().ok()?, value[4..6].parse().ok()?)
}

fn parse_ymd(value: &str) -> Option<CalendarDay> {
    if is_date_only(value) == false {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
