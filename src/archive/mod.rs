//! Archive module for persisting entries
//!
//! This module handles:
//! - Downloading assets through the session (`downloader`)
//! - Rewriting description images to local copies (`rewrite`)
//! - The `info.json` manifest (`record`)
//! - Writing an entry's directory in dependency order (`writer`)
//! - The filesystem capability (`store`)

mod downloader;
mod record;
mod rewrite;
mod store;
mod writer;

pub use downloader::{download_to, AssetDownloader, AssetSource};
pub use record::{ArchiveRecord, InconsistentTotal};
pub use rewrite::{image_extension, rewrite_description, RewriteOutcome, DEFAULT_IMAGE_EXTENSION};
pub use store::{ArchiveStore, LocalStore, StoreError, StoreResult};
pub use writer::ArchiveWriter;

use crate::entry::EntryId;
use crate::FetchError;
use std::path::{Path, PathBuf};

/// File name of the primary image inside an entry directory
pub const PRIMARY_IMAGE_FILE: &str = "image.png";

/// File name of the manifest inside an entry directory
pub const MANIFEST_FILE: &str = "info.json";

/// Directory under the archive root shared by all thumbnails
pub const THUMBS_DIR: &str = "thumbs";

/// What an archived asset is to its entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRole {
    PrimaryImage,
    Thumbnail,
    /// Embedded description image, numbered from 1 in document order
    DescriptionImage { ordinal: usize },
}

/// A downloaded asset and where it was stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub remote_url: String,

    /// Path relative to the entry's archive directory
    pub local_path: String,

    pub role: AssetRole,
}

/// On-disk layout of an archive
///
/// ```text
/// <root>/<entity>/<id>/image.png
/// <root>/<entity>/<id>/desc_<n>.<ext>
/// <root>/<entity>/<id>/info.json
/// <root>/thumbs/<id>.png
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    root: PathBuf,
    entity_kind: String,
}

impl ArchiveLayout {
    pub fn new(root: impl Into<PathBuf>, entity_kind: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            entity_kind: entity_kind.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_dir(&self, id: &EntryId) -> PathBuf {
        self.root.join(&self.entity_kind).join(id.to_string())
    }

    pub fn thumbs_dir(&self) -> PathBuf {
        self.root.join(THUMBS_DIR)
    }

    pub fn thumbnail_path(&self, id: &EntryId) -> PathBuf {
        self.thumbs_dir().join(format!("{}.png", id))
    }

    /// Thumbnail location as seen from the entry directory
    pub fn thumbnail_ref(&self, id: &EntryId) -> String {
        format!("../../{}/{}.png", THUMBS_DIR, id)
    }
}

/// A successfully archived entry
#[derive(Debug)]
pub struct ArchivedEntry {
    /// The entry's archive directory
    pub dir: PathBuf,

    /// The manifest written to `info.json`
    pub record: ArchiveRecord,

    /// Every file written for the entry
    pub assets: Vec<AssetRef>,

    /// Description images left pointing at their remote URL
    pub description_failures: Vec<FetchError>,
}
