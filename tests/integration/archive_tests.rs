//! Integration tests for the archiver
//!
//! These tests use wiremock to serve a fake catalog (home page, listing,
//! detail pages and images) and run the real HTTP session end-to-end into a
//! temporary archive root.

use gryff_archive::config::{CatalogConfig, Config, OutputConfig, SelectorConfig, SessionConfig};
use gryff_archive::session::SessionError;
use gryff_archive::{ArchiveError, Archiver, HttpSession, ReadySession};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COOKIE: &str = "PHPSESSID=abc123";

/// Creates a test configuration pointing at the mock catalog
fn create_test_config(base_url: &str, archive_root: &TempDir) -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: base_url.to_string(),
            entity_kind: "gryffs".to_string(),
            user_id: None,
        },
        session: SessionConfig {
            timeout_secs: 5,
            connect_timeout_secs: 5,
            ..SessionConfig::default()
        },
        output: OutputConfig {
            archive_root: archive_root.path().display().to_string(),
            summary_path: None,
        },
        selectors: SelectorConfig::default(),
    }
}

fn connect(config: &Config, cookie: Option<&str>) -> Archiver<HttpSession> {
    let base_url = Url::parse(&config.catalog.base_url).expect("Failed to parse base URL");
    let session = HttpSession::new(&config.session, &base_url, cookie)
        .expect("Failed to build HTTP session");
    Archiver::new(config, ReadySession::operator_confirmed(session))
        .expect("Failed to build archiver")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn png(bytes: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(bytes.to_vec())
        .insert_header("content-type", "image/png")
}

fn detail_page(stats: &str, description: &str) -> String {
    format!(
        r#"<html><head><title>Gryff</title></head><body>
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

/// Mounts the home page: the profile link only shows with the session cookie
async fn mount_home(catalog: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", COOKIE))
        .respond_with(html(
            r#"<html><body><div class="profileArea"><div class="inner">
            <a href="/profile.php?id=42">Profile</a>
            </div></div></body></html>"#
                .to_string(),
        ))
        .mount(catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body><a href="/login.php">Log in</a></body></html>"#.to_string(),
        ))
        .mount(catalog)
        .await;
}

#[tokio::test]
async fn test_full_archive_run() {
    let catalog = MockServer::start().await;
    let image_host = MockServer::start().await;
    let archive_root = TempDir::new().expect("Failed to create temp dir");

    mount_home(&catalog).await;

    Mock::given(method("GET"))
        .and(path("/ghf.php"))
        .and(query_param("id", "42"))
        .and(query_param("box", "-1"))
        .and(header("cookie", COOKIE))
        .respond_with(html(
            r#"<html><body><div id="ghfList">
            <div class="ghfGryff"><a href="gryff.php?id=5193"><img src="t.png"></a>
                <a href="gryff.php?id=5193">Luna</a></div>
            <div class="ghfGryff"><a href="gryff.php?id=77">Sol</a></div>
            </div></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&catalog)
        .await;

    let description = format!(
        r#"<p>Hi <img src="{host}/pics/a.gif"> and <img src="{host}/pics/missing.png"></p>
        <p><img src="/uploads/b.jpg"> again <img src="{host}/pics/a.gif"></p>"#,
        host = image_host.uri()
    );
    Mock::given(method("GET"))
        .and(path("/gryff.php"))
        .and(query_param("id", "5193"))
        .and(header("cookie", COOKIE))
        .respond_with(html(detail_page("14 Wins / 6 Losses", &description)))
        .mount(&catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/gryff.php"))
        .and(query_param("id", "77"))
        .respond_with(html(detail_page("no battles yet", "")))
        .mount(&catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/static/gryffs/5/5193.png"))
        .and(header("cookie", COOKIE))
        .respond_with(png(b"primary-image"))
        .expect(1)
        .mount(&catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/static/gryffs/thumbs/5/5193.png"))
        .and(header("cookie", COOKIE))
        .respond_with(png(b"thumbnail"))
        .expect(1)
        .mount(&catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/uploads/b.jpg"))
        .respond_with(png(b"local-upload"))
        .expect(1)
        .mount(&catalog)
        .await;

    // The catalog cookie must never reach a third-party host
    Mock::given(method("GET"))
        .and(header_exists("cookie"))
        .respond_with(ResponseTemplate::new(403))
        .expect(0)
        .mount(&image_host)
        .await;

    Mock::given(method("GET"))
        .and(path("/pics/a.gif"))
        .respond_with(png(b"gif-bytes"))
        .expect(1)
        .mount(&image_host)
        .await;

    Mock::given(method("GET"))
        .and(path("/pics/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&image_host)
        .await;

    let config = create_test_config(&catalog.uri(), &archive_root);
    let archiver = connect(&config, Some(COOKIE));

    let user_id = archiver
        .discover_user_id()
        .await
        .expect("Failed to discover user");
    assert_eq!(user_id, "42");

    let entries = archiver
        .list_entries(&user_id)
        .await
        .expect("Failed to list entries");
    let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["5193", "77"]);

    let report = archiver.archive_all(&entries).await;
    assert_eq!(report.total(), 2);
    assert_eq!(report.archived_count(), 1);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.description_failure_count(), 1);

    // Entry 5193: complete directory with one tolerated image failure
    let entry_dir = archive_root.path().join("gryffs").join("5193");
    assert_eq!(
        std::fs::read(entry_dir.join("image.png")).unwrap(),
        b"primary-image"
    );
    assert_eq!(
        std::fs::read(archive_root.path().join("thumbs").join("5193.png")).unwrap(),
        b"thumbnail"
    );
    assert_eq!(std::fs::read(entry_dir.join("desc_1.gif")).unwrap(), b"gif-bytes");
    assert_eq!(
        std::fs::read(entry_dir.join("desc_2.jpg")).unwrap(),
        b"local-upload"
    );
    assert!(!entry_dir.join("desc_3.gif").exists());

    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(entry_dir.join("info.json")).unwrap()).unwrap();
    assert_eq!(manifest["id"], "5193");
    assert_eq!(manifest["name"], "Luna");
    assert_eq!(manifest["species"], "Forest");
    assert_eq!(manifest["level"], 12);
    assert_eq!(manifest["exp"], 3400);
    assert_eq!(manifest["wins"], 14);
    assert_eq!(manifest["losses"], 6);
    assert_eq!(manifest["totalBattles"], 20);
    assert_eq!(manifest["huntingExp"], 87);
    assert_eq!(
        manifest["sourceUrl"],
        format!("{}/gryff.php?id=5193", catalog.uri())
    );

    let description_html = manifest["descriptionHtml"].as_str().unwrap();
    assert_eq!(description_html.matches(r#"src="./desc_1.gif""#).count(), 2);
    assert!(description_html.contains(r#"src="./desc_2.jpg""#));
    assert!(description_html.contains(&format!("{}/pics/missing.png", image_host.uri())));

    // Entry 77: parse failure leaves nothing behind
    let failed = report.outcome_for("77").expect("missing outcome for 77");
    assert_eq!(failed.result.as_ref().unwrap_err().kind(), "parse");
    assert!(!archive_root.path().join("gryffs").join("77").exists());
}

#[tokio::test]
async fn test_logged_out_session_is_detected() {
    let catalog = MockServer::start().await;
    let archive_root = TempDir::new().expect("Failed to create temp dir");
    mount_home(&catalog).await;

    let config = create_test_config(&catalog.uri(), &archive_root);
    let archiver = connect(&config, None);

    let err = archiver.discover_user_id().await.unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::Session(SessionError::NotAuthenticated(_))
    ));
}

#[tokio::test]
async fn test_missing_thumbnail_aborts_entry() {
    let catalog = MockServer::start().await;
    let archive_root = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/gryff.php"))
        .and(query_param("id", "12"))
        .respond_with(html(detail_page("1 Wins / 0 Losses", "<p>plain</p>")))
        .mount(&catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/static/gryffs/0/12.png"))
        .respond_with(png(b"primary"))
        .mount(&catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/static/gryffs/thumbs/0/12.png"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&catalog)
        .await;

    let config = create_test_config(&catalog.uri(), &archive_root);
    let archiver = connect(&config, Some(COOKIE));

    let entry = archiver.entry_for_id("12").unwrap();
    let err = archiver.archive_entry(&entry).await.unwrap_err();

    match err {
        ArchiveError::Fetch(e) => {
            assert!(e.url.ends_with("/static/gryffs/thumbs/0/12.png"));
            assert_eq!(e.to_string(), format!("Failed to download {}: HTTP 500 Internal Server Error", e.url));
        }
        other => panic!("expected fetch error, got {:?}", other),
    }

    let entry_dir = archive_root.path().join("gryffs").join("12");
    assert!(entry_dir.join("image.png").exists());
    assert!(!entry_dir.join("info.json").exists());
}

#[tokio::test]
async fn test_rerun_overwrites_manifest() {
    let catalog = MockServer::start().await;
    let archive_root = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/gryff.php"))
        .and(query_param("id", "3"))
        .respond_with(html(detail_page("2 Wins / 2 Losses", "")))
        .up_to_n_times(1)
        .mount(&catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/gryff.php"))
        .and(query_param("id", "3"))
        .respond_with(html(detail_page("5 Wins / 2 Losses", "")))
        .mount(&catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/static/gryffs/0/3.png"))
        .respond_with(png(b"primary"))
        .mount(&catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/static/gryffs/thumbs/0/3.png"))
        .respond_with(png(b"thumb"))
        .mount(&catalog)
        .await;

    let config = create_test_config(&catalog.uri(), &archive_root);
    let archiver = connect(&config, None);
    let entry = archiver.entry_for_id("3").unwrap();

    archiver.archive_entry(&entry).await.expect("first run failed");
    let second = archiver.archive_entry(&entry).await.expect("second run failed");
    assert_eq!(second.record.total_battles(), 7);

    let manifest: serde_json::Value = serde_json::from_slice(
        &std::fs::read(archive_root.path().join("gryffs/3/info.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["wins"], 5);
    assert_eq!(manifest["totalBattles"], 7);
}
