//! Asset resolution
//!
//! Primary image and thumbnail URLs are a pure function of the entry id.
//! Description images are whatever `<img>` tags the entry owner embedded.

use crate::catalog::Catalog;
use crate::entry::EntryId;
use crate::extract::PageSelectors;
use crate::{ArchiveError, ParseError, ParseResult};
use scraper::Html;
use url::Url;

/// Remote URLs of an entry's primary image and thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryAssets {
    pub primary_url: String,
    pub thumb_url: String,
}

/// One `<img>` occurrence inside the description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// The `src` attribute exactly as it appears in the markup
    pub src: String,

    /// `src` resolved against the page URL; `None` when it is not an
    /// http(s) URL
    pub url: Option<Url>,
}

impl EmbeddedImage {
    pub fn resolve(src: &str, page_url: &Url) -> Self {
        let url = page_url
            .join(src.trim())
            .ok()
            .filter(|u| u.scheme() == "http" || u.scheme() == "https");
        Self {
            src: src.to_string(),
            url,
        }
    }
}

/// Computes the primary image and thumbnail URLs of an entry
///
/// Assets are partitioned in buckets of 1000 ids:
/// `<base>/static/<entity>/<id / 1000>/<id>.png` and
/// `<base>/static/<entity>/thumbs/<id / 1000>/<id>.png`.
///
/// # Errors
///
/// [`ArchiveError::InvalidIdentifier`] when `entry_id` is not numeric.
///
/// # Example
///
/// ```
/// use gryff_archive::catalog::Catalog;
/// use gryff_archive::extract::resolve_primary_and_thumb;
///
/// let catalog = Catalog::new("https://gryffs.com", "gryffs").unwrap();
/// let assets = resolve_primary_and_thumb(&catalog, "5193").unwrap();
/// assert_eq!(assets.primary_url, "https://gryffs.com/static/gryffs/5/5193.png");
/// ```
pub fn resolve_primary_and_thumb(
    catalog: &Catalog,
    entry_id: &str,
) -> Result<PrimaryAssets, ArchiveError> {
    let id = EntryId::parse(entry_id)?;
    Ok(PrimaryAssets {
        primary_url: catalog.primary_image_url(&id),
        thumb_url: catalog.thumbnail_url(&id),
    })
}

/// Lists every image embedded in the description, in document order
///
/// Duplicates are kept: each occurrence is archived on its own.
pub fn extract_embedded_images(
    document: &Html,
    page_url: &Url,
    selectors: &PageSelectors,
) -> ParseResult<Vec<EmbeddedImage>> {
    let container = document
        .select(&selectors.description)
        .next()
        .ok_or_else(|| ParseError::MissingElement {
            field: "description",
            selector: selectors.sources.description.clone(),
        })?;

    Ok(container
        .select(&selectors.embedded_images)
        .filter_map(|img| img.value().attr("src"))
        .map(|src| EmbeddedImage::resolve(src, page_url))
        .collect())
}
