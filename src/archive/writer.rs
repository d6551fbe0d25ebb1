//! Archive writer
//!
//! Writes one entry's directory. Steps run in dependency order and stop at
//! the first fatal error; files written before that point are left in place.

use crate::archive::downloader::{download_to, AssetSource};
use crate::archive::rewrite::rewrite_description;
use crate::archive::store::ArchiveStore;
use crate::archive::{
    ArchiveLayout, ArchiveRecord, ArchivedEntry, AssetRef, AssetRole, MANIFEST_FILE,
    PRIMARY_IMAGE_FILE,
};
use crate::entry::{EntryId, EntryRef};
use crate::extract::{EmbeddedImage, ExtractedFields, PrimaryAssets};
use crate::ArchiveError;

/// Persists entries under an archive layout
pub struct ArchiveWriter<'a, A: ?Sized, St: ?Sized> {
    source: &'a A,
    store: &'a St,
    layout: &'a ArchiveLayout,
}

impl<'a, A, St> ArchiveWriter<'a, A, St>
where
    A: AssetSource + ?Sized,
    St: ArchiveStore + ?Sized,
{
    pub fn new(source: &'a A, store: &'a St, layout: &'a ArchiveLayout) -> Self {
        Self {
            source,
            store,
            layout,
        }
    }

    /// Writes the entry directory and its manifest
    ///
    /// 1. ensure `<root>/<entity>/<id>/`
    /// 2. primary image → `image.png`
    /// 3. ensure `<root>/thumbs/`
    /// 4. thumbnail → `<root>/thumbs/<id>.png`
    /// 5. description images → `desc_<n>.<ext>`, markup rewritten
    /// 6. manifest → `info.json`, overwriting any previous one
    ///
    /// Primary image and thumbnail failures are fatal; description image
    /// fetch failures are not.
    pub async fn write(
        &self,
        entry: &EntryRef,
        mut fields: ExtractedFields,
        primary: &PrimaryAssets,
        images: &[EmbeddedImage],
    ) -> Result<ArchivedEntry, ArchiveError> {
        let id = EntryId::parse(&entry.id)?;
        let entry_dir = self.layout.entry_dir(&id);
        let mut assets = Vec::with_capacity(images.len() + 2);

        self.store.ensure_dir(&entry_dir).await?;

        download_to(
            self.source,
            self.store,
            &primary.primary_url,
            &entry_dir.join(PRIMARY_IMAGE_FILE),
        )
        .await?;
        assets.push(AssetRef {
            remote_url: primary.primary_url.clone(),
            local_path: PRIMARY_IMAGE_FILE.to_string(),
            role: AssetRole::PrimaryImage,
        });

        self.store.ensure_dir(&self.layout.thumbs_dir()).await?;
        download_to(
            self.source,
            self.store,
            &primary.thumb_url,
            &self.layout.thumbnail_path(&id),
        )
        .await?;
        assets.push(AssetRef {
            remote_url: primary.thumb_url.clone(),
            local_path: self.layout.thumbnail_ref(&id),
            role: AssetRole::Thumbnail,
        });

        let outcome = rewrite_description(
            &fields.description_html,
            images,
            self.source,
            self.store,
            &entry_dir,
        )
        .await?;
        if !outcome.failures.is_empty() {
            tracing::warn!(
                "Entry {}: {} description image(s) left remote",
                id,
                outcome.failures.len()
            );
        }
        fields.description_html = outcome.markup;
        assets.extend(outcome.assets);

        let record = ArchiveRecord::new(entry, fields)?;
        self.store
            .write_json(&entry_dir.join(MANIFEST_FILE), &record)
            .await?;

        tracing::debug!("Wrote {}", entry_dir.join(MANIFEST_FILE).display());

        Ok(ArchivedEntry {
            dir: entry_dir,
            record,
            assets,
            description_failures: outcome.failures,
        })
    }
}
