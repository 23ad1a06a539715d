//! A module to parse ICal files

use crate::ical::date::RawDate;
use crate::ical::unfold::unfold;

/// A `VEVENT` block, as captured from an iCal file, before any date is interpreted
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawEvent {
    /// The `SUMMARY`, verbatim (escape sequences are not decoded)
    pub summary: Option<String>,
    pub dtstart: Option<RawDate>,
    pub dtend: Option<RawDate>,
    /// The `RRULE` value, e.g. `FREQ=WEEKLY;BYDAY=MO`
    pub rrule: Option<String>,
}

impl RawEvent {
    /// Returns the summary, or `default` if the event had none
    pub fn summary_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.summary.as_deref().unwrap_or(default)
    }

    /// Whether either bound of this event is a whole-day value
    pub fn is_all_day(&self) -> bool {
        self.dtstart.as_ref().map(|d| d.is_all_day()).unwrap_or(false)
            || self.dtend.as_ref().map(|d| d.is_all_day()).unwrap_or(false)
    }
}

enum ParserState {
    Idle,
    InEvent {
        event: RawEvent,
        /// How many sub-components (e.g. `VALARM`) are currently open inside this event
        depth: usize,
    },
}

/// Parse an iCal file and return its `VEVENT`s, in file order.
///
/// Events that are not terminated by `END:VEVENT`, or that have no `DTSTART`, are silently dropped.
pub fn parse(content: &str) -> Vec<RawEvent> {
    let mut events = Vec::new();
    let mut state = ParserState::Idle;

    for line in unfold(content) {
        let (name, params, value) = match split_property(&line) {
            None => continue,
            Some(parts) => parts,
        };

        state = match state {
            ParserState::Idle => {
                if is_component_delimiter(name, "BEGIN", value) {
                    ParserState::InEvent { event: RawEvent::default(), depth: 0 }
                } else {
                    ParserState::Idle
                }
            },

            ParserState::InEvent { mut event, mut depth } => {
                if is_component_delimiter(name, "BEGIN", value) {
                    log::debug!("Found a VEVENT that was not terminated. Ignoring it");
                    ParserState::InEvent { event: RawEvent::default(), depth: 0 }
                } else if is_component_delimiter(name, "END", value) {
                    if event.dtstart.is_some() {
                        events.push(event);
                    } else {
                        log::debug!("Ignoring an event with no DTSTART ({:?})", event.summary);
                    }
                    ParserState::Idle
                } else if name.eq_ignore_ascii_case("BEGIN") {
                    depth += 1;
                    ParserState::InEvent { event, depth }
                } else if name.eq_ignore_ascii_case("END") {
                    depth = depth.saturating_sub(1);
                    ParserState::InEvent { event, depth }
                } else {
                    if depth == 0 {
                        capture_property(&mut event, name, params, value);
                    }
                    ParserState::InEvent { event, depth }
                }
            },
        };
    }

    if let ParserState::InEvent { .. } = state {
        log::debug!("The iCal content ended in the middle of a VEVENT. Ignoring it");
    }

    events
}

fn is_component_delimiter(name: &str, keyword: &str, value: &str) -> bool {
    name.eq_ignore_ascii_case(keyword) && value.trim().eq_ignore_ascii_case("VEVENT")
}

fn capture_property(event: &mut RawEvent, name: &str, params: &str, value: &str) {
    match name.to_ascii_uppercase().as_str() {
        "SUMMARY" => event.summary = Some(value.to_string()),
        "DTSTART" => event.dtstart = Some(RawDate::new(value, has_date_value(params))),
        "DTEND" => event.dtend = Some(RawDate::new(value, has_date_value(params))),
        "RRULE" => event.rrule = Some(value.to_string()),
        _ => (),
    }
}

fn has_date_value(params: &str) -> bool {
    params
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("VALUE=DATE"))
}

/// Splits `NAME;PARAM=A;PARAM=B:VALUE` into its name, parameter segment (without the leading `;`) and value.
///
/// Colons inside double-quoted parameter values do not end the parameter segment.
fn split_property(line: &str) -> Option<(&str, &str, &str)> {
    let mut in_quotes = false;
    let mut colon = None;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if in_quotes == false => {
                colon = Some(i);
                break;
            },
            _ => (),
        }
    }
    let colon = colon?;

    let head = &line[..colon];
    let value = &line[colon + 1..];
    let (name, params) = match head.find(';') {
        Some(semicolon) => (&head[..semicolon], &head[semicolon + 1..]),
        None => (head, ""),
    };
    Some((name.trim(), params, value))
}
