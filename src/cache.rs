//! This module provides a local snapshot of the last imported occurrences, for diagnostic or caching use

use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::occurrence::Occurrence;
use crate::provider::SourceReport;


/// Occurrences of every source, as imported the last time, stored in a local file
#[derive(Debug, PartialEq)]
pub struct ImportCache {
    backing_file: PathBuf,
    data: CachedData,
}

#[derive(Default, Debug, PartialEq, Serialize, Deserialize)]
struct CachedData {
    sources: HashMap<Url, Vec<Occurrence>>,
    last_import: Option<DateTime<Utc>>,
}

impl ImportCache {
    /// Initialize a cache from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let data = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self{
            backing_file: PathBuf::from(path),
            data,
        })
    }

    /// Initialize a cache with the default contents
    pub fn new(path: &Path) -> Self {
        Self{
            backing_file: PathBuf::from(path),
            data: CachedData::default(),
        }
    }

    /// Store the current cache to its backing file
    pub fn save_to_file(&self) -> Result<(), Box<dyn Error>> {
        let path = &self.backing_file;
        let file = std::fs::File::create(path)
            .map_err(|err| format!("Unable to save file {:?}: {}", path, err))?;
        serde_json::to_writer(file, &self.data)?;
        Ok(())
    }

    /// Remember the occurrences of a successful import.
    /// Failed sources are skipped, so that their previous snapshot is kept
    pub fn update(&mut self, reports: &[SourceReport]) {
        for report in reports {
            if report.is_success() == false {
                log::debug!("Keeping the previous snapshot of {}", report.source);
                continue;
            }
            self.data.sources.insert(report.source.url().clone(), report.occurrences.clone());
        }
        self.data.last_import = Some(Utc::now());
    }

    /// The last known occurrences of a source
    pub fn occurrences(&self, source: &Url) -> Option<&[Occurrence]> {
        self.data.sources.get(source).map(|v| v.as_slice())
    }

    /// Forget a source, e.g. after it has been unsubscribed
    pub fn remove(&mut self, source: &Url) -> bool {
        self.data.sources.remove(source).is_some()
    }

    pub fn last_import(&self) -> Option<DateTime<Utc>> {
        self.data.last_import
    }
}
