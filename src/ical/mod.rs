//! This module handles the conversion of iCal files into raw events
//!
//! Only the few properties needed to place an event on a calendar are read (`SUMMARY`, `DTSTART`, `DTEND`, `RRULE`).

mod unfold;
pub use unfold::unfold;
mod parser;
pub use parser::{parse, RawEvent};
mod date;
pub use date::{inclusive_end, normalize_date, normalize_date_time, RawDate};
