/*!
 * E-Paper Directory
 * The set of published dates, newest first, and navigation over it
 */
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("No e-paper available for {0}")]
    NotPublished(NaiveDate),
    #[error("No papers available")]
    Empty,
    #[error("Already at the oldest edition")]
    AtOldest,
    #[error("Already at the newest edition")]
    AtNewest,
}

/// Where a date sits in the directory and which neighbours can be reached.
///
/// `previous` is the chronologically earlier edition (one index further
/// down the list), `next` the later one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub date: NaiveDate,
    pub index: usize,
    pub total: usize,
    pub previous: Option<NaiveDate>,
    pub next: Option<NaiveDate>,
}

/// Published dates, strictly descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpaperDirectory {
    dates: Vec<NaiveDate>,
}

impl EpaperDirectory {
    pub fn new(mut dates: Vec<NaiveDate>) -> Self {
        dates.sort_by(|a, b| b.cmp(a));
        dates.dedup();
        Self { dates }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The edition to show by default: today's, else the newest one.
    pub fn current(&self, today: NaiveDate) -> Option<NaiveDate> {
        if self.contains(today) {
            Some(today)
        } else {
            self.dates.first().copied()
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position(date).is_some()
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        // Descending order, so compare reversed.
        self.dates.binary_search_by(|probe| date.cmp(probe)).ok()
    }

    pub fn previous(&self, date: NaiveDate) -> Option<NaiveDate> {
        let index = self.position(date)?;
        self.dates.get(index + 1).copied()
    }

    pub fn next(&self, date: NaiveDate) -> Option<NaiveDate> {
        let index = self.position(date)?;
        index.checked_sub(1).map(|i| self.dates[i])
    }

    pub fn navigation(&self, date: NaiveDate) -> Result<Navigation, DirectoryError> {
        let index = self
            .position(date)
            .ok_or(DirectoryError::NotPublished(date))?;
        Ok(Navigation {
            date,
            index,
            total: self.dates.len(),
            previous: self.previous(date),
            next: self.next(date),
        })
    }
}

/// A reader's browsing session over the directory.
///
/// Client-facing model; the HTTP routes are stateless and use
/// [`EpaperDirectory`] directly.
///
/// Failed moves leave the displayed edition untouched.
#[derive(Debug, Clone, Default)]
pub struct EpaperReader {
    directory: EpaperDirectory,
    current: Option<NaiveDate>,
}

impl EpaperReader {
    pub fn new(directory: EpaperDirectory) -> Self {
        Self {
            directory,
            current: None,
        }
    }

    pub fn directory(&self) -> &EpaperDirectory {
        &self.directory
    }

    pub fn current(&self) -> Option<NaiveDate> {
        self.current
    }

    pub fn open_current(&mut self, today: NaiveDate) -> Result<NaiveDate, DirectoryError> {
        let date = self.directory.current(today).ok_or(DirectoryError::Empty)?;
        self.current = Some(date);
        Ok(date)
    }

    pub fn select(&mut self, date: NaiveDate) -> Result<NaiveDate, DirectoryError> {
        if !self.directory.contains(date) {
            return Err(DirectoryError::NotPublished(date));
        }
        self.current = Some(date);
        Ok(date)
    }

    pub fn go_previous(&mut self) -> Result<NaiveDate, DirectoryError> {
        let current = self.current.ok_or(DirectoryError::Empty)?;
        let date = self
            .directory
            .previous(current)
            .ok_or(DirectoryError::AtOldest)?;
        self.current = Some(date);
        Ok(date)
    }

    pub fn go_next(&mut self) -> Result<NaiveDate, DirectoryError> {
        let current = self.current.ok_or(DirectoryError::Empty)?;
        let date = self.directory.next(current).ok_or(DirectoryError::AtNewest)?;
        self.current = Some(date);
        Ok(date)
    }

    pub fn navigation(&self) -> Option<Navigation> {
        self.current
            .and_then(|date| self.directory.navigation(date).ok())
    }
}
