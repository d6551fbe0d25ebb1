//! Catalog entry identifiers and references

use crate::ArchiveError;
use serde::Serialize;
use std::fmt;

/// One catalog record as produced by enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntryRef {
    /// Numeric identifier, kept as the string the catalog uses
    pub id: String,

    /// Canonical detail-page URL
    pub url: String,
}

impl EntryRef {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Validated numeric entry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    /// Number of entries sharing one asset partition
    pub const BUCKET_SIZE: u64 = 1000;

    /// Parses an identifier made only of ASCII digits
    ///
    /// Signs, whitespace and anything that overflows a `u64` are rejected with
    /// [`ArchiveError::InvalidIdentifier`].
    pub fn parse(raw: &str) -> Result<Self, ArchiveError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArchiveError::InvalidIdentifier(raw.to_string()));
        }
        raw.parse::<u64>()
            .map(Self)
            .map_err(|_| ArchiveError::InvalidIdentifier(raw.to_string()))
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Asset partition: `floor(id / 1000)`
    pub fn bucket(&self) -> u64 {
        self.0 / Self::BUCKET_SIZE
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
