//! Gryff-Archive: a session-gated catalog archiver
//!
//! This crate archives catalog entries (gryffs) from an authenticated
//! browsing session: it extracts the structured fields of each entry's
//! detail page, downloads every referenced image, rewrites inline image
//! references to local copies and writes one self-contained directory with
//! an `info.json` manifest per entry.

pub mod archive;
pub mod catalog;
pub mod config;
pub mod entry;
pub mod extract;
pub mod listing;
pub mod output;
pub mod pipeline;
pub mod session;

use thiserror::Error;

/// Main error type for archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid entry identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("Write error: {0}")]
    Write(#[from] archive::StoreError),

    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

impl ArchiveError {
    /// Short, stable name of the error class, used in batch reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "invalid-identifier",
            Self::Parse(_) => "parse",
            Self::Fetch(_) => "fetch",
            Self::Write(_) => "write",
            Self::Session(_) => "session",
            Self::Config(_) => "config",
            Self::UrlParse(_) => "url",
        }
    }
}

/// Errors raised while extracting fields from a detail page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{field}: no element matches selector '{selector}'")]
    MissingElement {
        field: &'static str,
        selector: String,
    },

    #[error("{field}: text {text:?} does not match {pattern}")]
    Unmatched {
        field: &'static str,
        pattern: &'static str,
        text: String,
    },

    #[error("{field}: no text block matching {pattern} found")]
    NotFound {
        field: &'static str,
        pattern: &'static str,
    },

    #[error("{field}: {value:?} is not a valid non-negative integer")]
    InvalidInteger { field: &'static str, value: String },

    #[error("total battles overflow: {wins} wins + {losses} losses")]
    TotalOverflow { wins: u64, losses: u64 },
}

/// A failed asset download
#[derive(Debug, Error)]
#[error("Failed to download {url}: {reason}")]
pub struct FetchError {
    pub url: String,
    pub reason: FetchFailure,
}

impl FetchError {
    pub fn new(url: impl Into<String>, reason: FetchFailure) -> Self {
        Self {
            url: url.into(),
            reason,
        }
    }
}

/// Why a download failed
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("HTTP {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("{0}")]
    Transport(String),

    #[error("not a fetchable http(s) URL")]
    InvalidUrl,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for {name}: '{selector}'")]
    InvalidSelector { name: &'static str, selector: String },
}

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for field extraction
pub type ParseResult<T> = std::result::Result<T, ParseError>;

// Re-export commonly used types
pub use archive::{ArchiveRecord, ArchivedEntry};
pub use config::Config;
pub use entry::{EntryId, EntryRef};
pub use extract::ExtractedFields;
pub use pipeline::Archiver;
pub use session::{HttpSession, ReadySession, Session};
