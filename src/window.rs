//! The range of days that is displayed

use chrono::{Duration, Local};
use serde::{Deserialize, Serialize};

use crate::CalendarDay;

/// An inclusive range of days. Items are shown when their end day falls within this range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayWindow {
    past: CalendarDay,
    future: CalendarDay,
}

impl DisplayWindow {
    /// Create a window. Bounds are swapped if given in the wrong order
    pub fn new(past: CalendarDay, future: CalendarDay) -> Self {
        if future < past {
            Self { past: future, future: past }
        } else {
            Self { past, future }
        }
    }

    /// The window that spans from `past_days` before `today` to `future_days` after it
    pub fn around(today: CalendarDay, past_days: u32, future_days: u32) -> Self {
        Self::new(
            today - Duration::days(past_days.into()),
            today + Duration::days(future_days.into()),
        )
    }

    /// The window around the current local date.
    /// This is supposed to be recomputed each time a view is built
    pub fn around_today(past_days: u32, future_days: u32) -> Self {
        Self::around(Local::now().date_naive(), past_days, future_days)
    }

    pub fn past(&self) -> CalendarDay   { self.past   }
    pub fn future(&self) -> CalendarDay { self.future }

    pub fn contains(&self, day: CalendarDay) -> bool {
        self.past <= day && day <= self.future
    }
}
