use chrono::{DateTime, Utc};

use crate::buffer::CowBuffer;

use super::classify::{is_source_entry, is_source_entry_wide};

/// A decoded library entry.
#[derive(Debug, Clone)]
pub struct Entry {
    pub mod_time: DateTime<Utc>,
    /// Whether the library stores comments and source as UTF-16.
    pub is_unicode: bool,
    /// Ansi or Utf16 text.
    pub comment: CowBuffer,
    /// Text for source entries, Binary otherwise.
    pub data: CowBuffer,
}

/// One line of a library listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Ansi or Utf16 text.
    pub name: CowBuffer,
    pub mod_time: DateTime<Utc>,
}

impl DirEntry {
    pub fn name_text(&self) -> String {
        self.name.to_text().unwrap_or_default()
    }

    /// Whether the named entry holds source text.
    pub fn is_source(&self) -> bool {
        if self.name.encoding().is_wide() {
            is_source_entry_wide(&self.name.wide_units())
        } else {
            is_source_entry(&self.name_text())
        }
    }
}

pub(crate) fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

pub(crate) fn to_unix(time: Option<DateTime<Utc>>) -> i64 {
    time.map(|t| t.timestamp()).unwrap_or(0)
}
