//! Batch coordinator - per-entry archive orchestration
//!
//! Entries are archived one at a time, in the order given. A failing entry is
//! recorded in the report and the batch moves on to the next one.

use crate::archive::{
    ArchiveLayout, ArchiveStore, ArchiveWriter, ArchivedEntry, AssetDownloader, LocalStore,
};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::entry::{EntryId, EntryRef};
use crate::extract::{
    extract_embedded_images, extract_fields, resolve_primary_and_thumb, EmbeddedImage,
    ExtractedFields, PageSelectors,
};
use crate::listing;
use crate::output::BatchReport;
use crate::session::{ReadySession, RenderedPage, Session};
use crate::{ArchiveError, ParseResult};
use url::Url;

/// Archives catalog entries through a confirmed session
pub struct Archiver<S, St = LocalStore> {
    session: ReadySession<S>,
    store: St,
    catalog: Catalog,
    selectors: PageSelectors,
    layout: ArchiveLayout,
}

impl<S: Session> Archiver<S, LocalStore> {
    /// Creates an archiver writing to the local filesystem
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `session` - Session the operator confirmed as logged in
    ///
    /// # Returns
    ///
    /// * `Ok(Archiver)` - Ready to archive
    /// * `Err(ArchiveError)` - Catalog URL or selectors could not be built
    pub fn new(config: &Config, session: ReadySession<S>) -> Result<Self, ArchiveError> {
        Self::with_store(config, session, LocalStore)
    }
}

impl<S: Session, St: ArchiveStore> Archiver<S, St> {
    /// Creates an archiver writing through `store`
    pub fn with_store(
        config: &Config,
        session: ReadySession<S>,
        store: St,
    ) -> Result<Self, ArchiveError> {
        let catalog = Catalog::from_config(&config.catalog)?;
        let selectors = PageSelectors::from_config(&config.selectors)?;
        let layout = ArchiveLayout::new(&config.output.archive_root, catalog.entity_kind());

        Ok(Self {
            session,
            store,
            catalog,
            selectors,
            layout,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// Determines the logged-in user, failing when the session is logged out
    pub async fn discover_user_id(&self) -> Result<String, ArchiveError> {
        listing::discover_user_id(self.session.session(), &self.catalog, &self.selectors).await
    }

    /// Lists the entries of `user_id`
    pub async fn list_entries(&self, user_id: &str) -> Result<Vec<EntryRef>, ArchiveError> {
        listing::list_entries(
            self.session.session(),
            &self.catalog,
            &self.selectors,
            user_id,
        )
        .await
    }

    /// Builds the reference of an entry given by id on the command line
    pub fn entry_for_id(&self, raw: &str) -> Result<EntryRef, ArchiveError> {
        let id = EntryId::parse(raw.trim())?;
        Ok(self.catalog.entry_ref(&id))
    }

    /// Archives one entry
    ///
    /// Everything is extracted from the page before the first write, so an
    /// entry that fails to parse leaves nothing on disk.
    pub async fn archive_entry(&self, entry: &EntryRef) -> Result<ArchivedEntry, ArchiveError> {
        EntryId::parse(&entry.id)?;
        let url = Url::parse(&entry.url)?;
        let session = self.session.session();

        let page = session.navigate(&url).await?;
        let (fields, images) = self.analyze(&page)?;
        let primary = resolve_primary_and_thumb(&self.catalog, &entry.id)?;

        let downloader = AssetDownloader::new(session);
        let writer = ArchiveWriter::new(&downloader, &self.store, &self.layout);
        writer.write(entry, fields, &primary, &images).await
    }

    /// Archives every entry in order, isolating failures
    pub async fn archive_all(&self, entries: &[EntryRef]) -> BatchReport {
        let mut report = BatchReport::start();
        tracing::info!("Archiving {} entries", entries.len());

        for (index, entry) in entries.iter().enumerate() {
            tracing::debug!("Processing entry {} ({})", entry.id, entry.url);

            let result = self.archive_entry(entry).await;
            match &result {
                Ok(archived) if archived.description_failures.is_empty() => {
                    tracing::info!(
                        "[{}/{}] Archived {} ({})",
                        index + 1,
                        entries.len(),
                        entry.id,
                        archived.record.name()
                    );
                }
                Ok(archived) => {
                    tracing::warn!(
                        "[{}/{}] Archived {} ({}) with {} description image(s) left remote",
                        index + 1,
                        entries.len(),
                        entry.id,
                        archived.record.name(),
                        archived.description_failures.len()
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "[{}/{}] Error archiving {}: {}",
                        index + 1,
                        entries.len(),
                        entry.id,
                        e
                    );
                }
            }

            report.record(entry.clone(), result);
        }

        report.finish();
        tracing::info!(
            "Batch complete: {} archived, {} failed",
            report.archived_count(),
            report.failed_count()
        );
        report
    }

    /// Parses the page synchronously; the parsed document never crosses an await
    fn analyze(&self, page: &RenderedPage) -> ParseResult<(ExtractedFields, Vec<EmbeddedImage>)> {
        let document = page.document();
        let fields = extract_fields(&document, &self.selectors)?;
        let images = extract_embedded_images(&document, page.url(), &self.selectors)?;
        Ok((fields, images))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::session::{HttpResponse, SessionError, SessionResult};
    use crate::ParseError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory catalog keyed by absolute URL
    #[derive(Default)]
    struct FakeSession {
        pages: HashMap<String, String>,
        assets: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeSession {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn asset(mut self, url: &str, bytes: &[u8]) -> Self {
            self.assets.insert(url.to_string(), bytes.to_vec());
            self
        }

        fn requested(&self, url: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.as_str() == url)
                .count()
        }
    }

    #[async_trait]
    impl Session for FakeSession {
        async fn navigate(&self, url: &Url) -> SessionResult<RenderedPage> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url.as_str())
                .map(|html| RenderedPage::new(url.clone(), html.clone()))
                .ok_or_else(|| SessionError::Navigation {
                    url: url.to_string(),
                    status: 404,
                })
        }

        async fn authenticated_get(&self, url: &Url) -> SessionResult<HttpResponse> {
            self.requests.lock().unwrap().push(url.to_string());
            Ok(match self.assets.get(url.as_str()) {
                Some(body) => HttpResponse {
                    status: 200,
                    body: body.clone(),
                },
                None => HttpResponse {
                    status: 404,
                    body: Vec::new(),
                },
            })
        }
    }

    fn detail_page(stats: &str, description: &str) -> String {
        format!(
            r#"<html><body>
            <h1 class="page-title">Gryff - Luna</h1>
            <div class="pageSeparator">Forest Gryff Level 12 (3400 exp)</div>
            <div class="panel">
                <div class="stats">{}</div>
                <div class="hunt">87 Hunting Exp</div>
            </div>
            <div id="gryffsDesc">{}</div>
            </body></html>"#,
            stats, description
        )
    }

    fn config(root: &TempDir) -> Config {
        parse_config(&format!(
            "[catalog]\nbase-url = \"https://gryffs.com\"\n\n[output]\narchive-root = '{}'\n",
            root.path().display()
        ))
        .unwrap()
    }

    fn with_images(session: FakeSession, id: &str, bucket: &str) -> FakeSession {
        session
            .asset(
                &format!("https://gryffs.com/static/gryffs/{}/{}.png", bucket, id),
                b"primary",
            )
            .asset(
                &format!("https://gryffs.com/static/gryffs/thumbs/{}/{}.png", bucket, id),
                b"thumb",
            )
    }

    fn archiver(root: &TempDir, session: FakeSession) -> Archiver<FakeSession> {
        Archiver::new(&config(root), ReadySession::operator_confirmed(session)).unwrap()
    }

    #[tokio::test]
    async fn test_archive_entry_writes_directory() {
        let temp = TempDir::new().unwrap();
        let session = with_images(FakeSession::default(), "5193", "5")
            .page(
                "https://gryffs.com/gryff.php?id=5193",
                &detail_page(
                    "14 Wins / 6 Losses",
                    r#"<p><img src="https://img.example/a.gif"><img src="https://img.example/a.gif"></p>"#,
                ),
            )
            .asset("https://img.example/a.gif", b"GIF");
        let archiver = archiver(&temp, session);

        let entry = archiver.entry_for_id("5193").unwrap();
        let archived = archiver.archive_entry(&entry).await.unwrap();

        let dir = temp.path().join("gryffs").join("5193");
        assert_eq!(archived.dir, dir);
        assert_eq!(std::fs::read(dir.join("image.png")).unwrap(), b"primary");
        assert_eq!(std::fs::read(dir.join("desc_1.gif")).unwrap(), b"GIF");
        assert!(!dir.join("desc_2.gif").exists());
        assert_eq!(
            std::fs::read(temp.path().join("thumbs").join("5193.png")).unwrap(),
            b"thumb"
        );

        let manifest: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.join("info.json")).unwrap()).unwrap();
        assert_eq!(manifest["id"], "5193");
        assert_eq!(manifest["totalBattles"], 20);
        assert_eq!(manifest["sourceUrl"], "https://gryffs.com/gryff.php?id=5193");
        let description = manifest["descriptionHtml"].as_str().unwrap();
        assert_eq!(description.matches("./desc_1.gif").count(), 2);
        assert!(!description.contains("img.example"));

        assert_eq!(archiver.session.session().requested("https://img.example/a.gif"), 1);
    }

    #[tokio::test]
    async fn test_parse_error_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let session = with_images(FakeSession::default(), "77", "0").page(
            "https://gryffs.com/gryff.php?id=77",
            &detail_page("no battles yet", ""),
        );
        let archiver = archiver(&temp, session);

        let entry = archiver.entry_for_id("77").unwrap();
        let err = archiver.archive_entry(&entry).await.unwrap_err();

        assert!(matches!(err, ArchiveError::Parse(ParseError::NotFound { .. })));
        assert!(!temp.path().join("gryffs").join("77").exists());
        assert_eq!(
            archiver
                .session
                .session()
                .requested("https://gryffs.com/static/gryffs/0/77.png"),
            0
        );
    }

    #[tokio::test]
    async fn test_archive_all_isolates_failures() {
        let temp = TempDir::new().unwrap();
        let session = with_images(FakeSession::default(), "1", "0")
            .page(
                "https://gryffs.com/gryff.php?id=1",
                &detail_page("1 Wins / 0 Losses", ""),
            )
            .page(
                "https://gryffs.com/gryff.php?id=2",
                &detail_page("garbled", ""),
            );
        let session = with_images(session, "3", "0").page(
            "https://gryffs.com/gryff.php?id=3",
            &detail_page("0 Wins / 3 Losses", ""),
        );
        let archiver = archiver(&temp, session);

        let entries: Vec<_> = ["1", "2", "3", "4"]
            .iter()
            .map(|id| archiver.entry_for_id(id).unwrap())
            .collect();
        let report = archiver.archive_all(&entries).await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.archived_count(), 2);
        assert_eq!(report.outcome_for("2").unwrap().result.as_ref().unwrap_err().kind(), "parse");
        assert_eq!(
            report.outcome_for("4").unwrap().result.as_ref().unwrap_err().kind(),
            "session"
        );
        assert!(temp.path().join("gryffs/3/info.json").exists());
        assert!(report.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_missing_primary_image_is_fatal() {
        let temp = TempDir::new().unwrap();
        let session = FakeSession::default().page(
            "https://gryffs.com/gryff.php?id=9",
            &detail_page("1 Wins / 1 Losses", ""),
        );
        let archiver = archiver(&temp, session);

        let entry = archiver.entry_for_id("9").unwrap();
        let err = archiver.archive_entry(&entry).await.unwrap_err();

        match err {
            ArchiveError::Fetch(e) => {
                assert_eq!(e.url, "https://gryffs.com/static/gryffs/0/9.png");
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
        assert!(!temp.path().join("gryffs/9/info.json").exists());
    }

    #[tokio::test]
    async fn test_list_entries_and_discover_user() {
        let temp = TempDir::new().unwrap();
        let session = FakeSession::default()
            .page(
                "https://gryffs.com/",
                r#"<div class="profileArea"><div class="inner"><a href="/profile.php?id=42">Me</a></div></div>"#,
            )
            .page(
                "https://gryffs.com/ghf.php?id=42&box=-1",
                r#"<div id="ghfList"><div class="ghfGryff"><a href="gryff.php?id=10">A</a></div>
                   <div class="ghfGryff"><a href="gryff.php?id=11">B</a></div></div>"#,
            );
        let archiver = archiver(&temp, session);

        let user = archiver.discover_user_id().await.unwrap();
        assert_eq!(user, "42");

        let entries = archiver.list_entries(&user).await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "11"]);
    }

    #[tokio::test]
    async fn test_logged_out_session_is_rejected() {
        let temp = TempDir::new().unwrap();
        let session =
            FakeSession::default().page("https://gryffs.com/", r#"<a href="/login.php">Log in</a>"#);
        let archiver = archiver(&temp, session);

        let err = archiver.discover_user_id().await.unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::Session(SessionError::NotAuthenticated(_))
        ));
    }

    #[test]
    fn test_entry_for_id_rejects_non_numeric() {
        let temp = TempDir::new().unwrap();
        let archiver = archiver(&temp, FakeSession::default());
        assert!(matches!(
            archiver.entry_for_id("../etc"),
            Err(ArchiveError::InvalidIdentifier(_))
        ));
        assert_eq!(
            archiver.entry_for_id(" 12 ").unwrap().url,
            "https://gryffs.com/gryff.php?id=12"
        );
    }
}
