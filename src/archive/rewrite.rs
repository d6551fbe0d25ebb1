//! Description image archiving and markup rewriting
//!
//! Each embedded image is downloaded next to the manifest as
//! `desc_<n><ext>` and every `src` attribute holding its URL in the
//! description is replaced by the local reference. A failed download leaves the remote URL in
//! place; the description stays complete, just not fully local.

use crate::archive::downloader::AssetSource;
use crate::archive::store::ArchiveStore;
use crate::archive::{AssetRef, AssetRole};
use crate::extract::EmbeddedImage;
use crate::{ArchiveError, FetchError, FetchFailure};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Extension used when an image URL has none
pub const DEFAULT_IMAGE_EXTENSION: &str = ".png";

/// Result of rewriting one description
#[derive(Debug)]
pub struct RewriteOutcome {
    /// Description markup with archived images pointing at local files
    pub markup: String,

    /// Files written, one per distinct successfully downloaded `src`
    pub assets: Vec<AssetRef>,

    /// Occurrences left pointing at their remote URL
    pub failures: Vec<FetchError>,
}

impl RewriteOutcome {
    pub fn downloaded(&self) -> usize {
        self.assets.len()
    }
}

/// Downloads description images and rewrites the markup to local copies
///
/// Images are processed in document order. The ordinal in `desc_<n>` only
/// advances on a successful download, so local names stay contiguous when
/// some images fail. Substitution is literal and replaces every occurrence of
/// the `src`, so repeated images share one local file.
///
/// # Errors
///
/// Fetch failures are logged and collected in the outcome. A failure to
/// write a downloaded image is returned as [`ArchiveError::Write`].
pub async fn rewrite_description<A, St>(
    markup: &str,
    images: &[EmbeddedImage],
    source: &A,
    store: &St,
    entry_dir: &Path,
) -> Result<RewriteOutcome, ArchiveError>
where
    A: AssetSource + ?Sized,
    St: ArchiveStore + ?Sized,
{
    let mut markup = markup.to_string();
    let mut assets = Vec::new();
    let mut failures = Vec::new();
    let mut archived: HashMap<&str, String> = HashMap::new();
    let mut ordinal = 1usize;

    for image in images {
        if let Some(local) = archived.get(image.src.as_str()) {
            tracing::debug!("{} already archived as {}", image.src, local);
            continue;
        }

        let Some(url) = &image.url else {
            tracing::warn!("Skipping description image with unusable src: {}", image.src);
            failures.push(FetchError::new(image.src.clone(), FetchFailure::InvalidUrl));
            continue;
        };

        let bytes = match source.fetch_asset(url.as_str()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed description image: {}", e);
                failures.push(e);
                continue;
            }
        };

        let file_name = format!("desc_{}{}", ordinal, image_extension(url));
        store.write_bytes(&entry_dir.join(&file_name), &bytes).await?;

        let local_ref = format!("./{}", file_name);
        markup = replace_src(&markup, &image.src, &local_ref);
        tracing::debug!("Archived {} as {}", url, file_name);

        assets.push(AssetRef {
            remote_url: url.to_string(),
            local_path: file_name,
            role: AssetRole::DescriptionImage { ordinal },
        });
        archived.insert(image.src.as_str(), local_ref);
        ordinal += 1;
    }

    Ok(RewriteOutcome {
        markup,
        assets,
        failures,
    })
}

/// Extension of the URL path's last segment, dot included
///
/// Dotfiles and trailing dots count as no extension, matching
/// `path.extname` semantics; the fallback is `.png`.
pub fn image_extension(url: &Url) -> String {
    let last_segment = url.path().rsplit('/').next().unwrap_or("");
    match last_segment.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < last_segment.len() => last_segment[idx..].to_string(),
        _ => DEFAULT_IMAGE_EXTENSION.to_string(),
    }
}

/// Points every `src` attribute holding exactly `src` at `local_ref`
///
/// Only whole attribute values are replaced, so a short relative src never
/// rewrites part of a longer URL. Serialized markup escapes `&` in attribute
/// values, so the escaped spelling is matched too.
fn replace_src(markup: &str, src: &str, local_ref: &str) -> String {
    let mut spellings = vec![regex::escape(src)];
    if src.contains('&') {
        spellings.push(regex::escape(&src.replace('&', "&amp;")));
    }
    let value = spellings.join("|");
    let pattern = format!(
        r#"(\s(?i:src)\s*=\s*)(?:"(?:{value})"|'(?:{value})')"#,
        value = value
    );

    match Regex::new(&pattern) {
        Ok(re) => re
            .replace_all(markup, |caps: &Captures<'_>| {
                format!("{}\"{}\"", &caps[1], local_ref)
            })
            .into_owned(),
        Err(e) => {
            tracing::warn!("Cannot rewrite src {}: {}", src, e);
            markup.to_string()
        }
    }
}
