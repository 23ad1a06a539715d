//! Calendar feeds a user has subscribed to

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// The URL of an iCal feed.
///
/// `webcal://` URLs are rewritten to `https://`. Only HTTP(S) URLs are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarSource {
    url: Url,
}

impl CalendarSource {
    /// Normalize and validate a user-provided URL
    pub fn parse(input: &str) -> Result<Self, Box<dyn Error>> {
        let input = input.trim();
        let normalized = match input.get(..9) {
            Some(scheme) if scheme.eq_ignore_ascii_case("webcal://") => format!("https://{}", &input[9..]),
            _ => input.to_string(),
        };

        let url = Url::parse(&normalized)
            .map_err(|err| format!("Invalid calendar URL {:?}: {}", input, err))?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> Result<Self, Box<dyn Error>> {
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => Err(format!("Unsupported scheme {:?} for calendar {}", other, url).into()),
        }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn as_str(&self) -> &str { self.url.as_str() }
}

impl FromStr for CalendarSource {
    type Err = Box<dyn Error>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for CalendarSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.url)
    }
}


/// The ordered list of calendars a user imports
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceList {
    sources: Vec<CalendarSource>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source, unless it is already present (after normalization).
    /// Returns whether it has actually been added
    pub fn upsert(&mut self, source: CalendarSource) -> bool {
        if self.sources.contains(&source) {
            log::debug!("Calendar {} is already imported", source);
            return false;
        }
        log::info!("Importing calendar {}", source);
        self.sources.push(source);
        true
    }

    /// Remove a source. Returns whether it was present
    pub fn remove(&mut self, source: &CalendarSource) -> bool {
        let len_before = self.sources.len();
        self.sources.retain(|s| s != source);
        self.sources.len() != len_before
    }

    pub fn sources(&self) -> &[CalendarSource] { &self.sources }
    pub fn len(&self) -> usize { self.sources.len() }
    pub fn is_empty(&self) -> bool { self.sources.is_empty() }
}

impl std::iter::FromIterator<CalendarSource> for SourceList {
    fn from_iter<I: IntoIterator<Item = CalendarSource>>(iter: I) -> Self {
        let mut list = Self::new();
        for source in iter {
            list.upsert(source);
        }
        list
    }
}
