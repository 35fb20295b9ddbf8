//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small profile site and run the full
//! crawl cycle end-to-end.

use drivelog::config::Config;
use drivelog::crawler::{run_crawl, Coordinator};
use drivelog::output::MemorySink;
use drivelog::spider::{Record, SkipReason};
use drivelog::storage::{open_storage, RunStatus, Storage};
use drivelog::{ConfigError, DrivelogError, PageKind};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration starting at `start_url`
fn create_test_config(username: Option<&str>, start_url: Option<String>) -> Config {
    let mut config = Config::default();
    config.crawler.minimum_time_on_page = 10; // Very short for testing
    config.crawler.max_retries = 0;
    config.start.username = username.map(String::from);
    config.start.start_url = start_url;
    config
}

async fn serve(server: &MockServer, page_path: &str, body: &str) {
    serve_times(server, page_path, body, 1).await;
}

async fn serve_times(server: &MockServer, page_path: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8"),
        )
        .expect(times)
        .mount(server)
        .await;
}

fn photo_post(author: &str, image: &str) -> String {
    format!(
        r#"<html><body>
          <meta itemprop="author" content="{author}">
          <div class="c-post-desc">Parked by the lake</div>
          <img itemprop="image" src="{image}">
        </body></html>"#
    )
}

/// Mounts alice's profile: one car with a logbook and a two-page album, a
/// profile-level album, and a personal blog. One photo in the car album was
/// uploaded by bob.
async fn mount_alice(server: &MockServer) {
    serve(
        server,
        "/users/alice/",
        r#"<html><body>
          <h1 class="x-title">alice</h1>
          <div class="c-user-card__about">BMW person</div>
          <a class="u-link-area" href="/r/bmw/x5/1/">BMW X5</a>
          <a class="u-link-area" href="/s/a/Trip0">Road trip</a>
          <a class="u-link-area" href="https://elsewhere.example/r/bmw/x5/9/">Mirror</a>
          <a class="c-user-blog-link" href="/users/alice/blog">Blog</a>
        </body></html>"#,
    )
    .await;

    serve(
        server,
        "/r/bmw/x5/1/",
        r#"<html><body>
          <h1 class="x-title">BMW X5</h1>
          <div class="c-car-desc">
            <meta itemprop="datePublished" content="2019-06-01">
            <div class="c-car-desc__text">3.0d</div>
          </div>
          <a class="c-lightbox-anchor" href="/img/car1.jpg">1</a>
          <h3><a class="c-link" href="/r/bmw/x5/1/logbook">Logbook</a></h3>
          <h3><a class="c-link" href="/s/a/Alb1">Photos</a></h3>
          <h3><a class="c-link" href="/about/rules">Rules</a></h3>
        </body></html>"#,
    )
    .await;

    serve(
        server,
        "/r/bmw/x5/1/logbook",
        r#"<html><body>
          <h1 class="x-title">X5 logbook</h1>
          <a class="c-post-preview__title" href="/l/501/">Oil change</a>
        </body></html>"#,
    )
    .await;

    serve(
        server,
        "/l/501/",
        r#"<html><body>
          <h1 class="x-title">Oil change</h1>
          <meta itemprop="datePublished" content="2020-02-02">
          <div itemprop="articleBody"><p>5W-30</p><img src="/img/oil.jpg"></div>
          <a class="c-post-tag">Service</a>
          <span class="c-post-meta__cost">4500 RUB</span>
          <span class="c-post-meta__mileage">120000 km</span>
        </body></html>"#,
    )
    .await;

    serve(
        server,
        "/s/a/Alb1",
        r#"<html><body>
          <h1 class="x-title">X5 photos</h1>
          <a class="c-photo-preview" href="/s/P1">1</a>
          <a class="c-photo-preview" href="/s/P2">2</a>
          <a rel="next" href="/s/a/Alb1/page2">Next</a>
        </body></html>"#,
    )
    .await;

    serve(
        server,
        "/s/a/Alb1/page2",
        r#"<html><body>
          <h1 class="x-title">X5 photos</h1>
          <a class="c-photo-preview" href="/s/P3">3</a>
        </body></html>"#,
    )
    .await;

    serve(server, "/s/P1", &photo_post("alice", "/img/p1.jpg")).await;
    serve(server, "/s/P2", &photo_post("bob", "/img/p2.jpg")).await;
    serve(server, "/s/P3", &photo_post("Alice", "/img/p3.jpg")).await;

    serve(
        server,
        "/s/a/Trip0",
        r#"<html><body><h1 class="x-title">Road trip</h1></body></html>"#,
    )
    .await;

    serve(
        server,
        "/users/alice/blog",
        r#"<html><body>
          <h1 class="x-title">alice's blog</h1>
          <h3><a class="c-link" href="/b/77/">Hello</a></h3>
        </body></html>"#,
    )
    .await;

    serve(
        server,
        "/b/77/",
        r#"<html><body>
          <h1 class="x-title">Hello</h1>
          <div itemprop="articleBody"><p>First post</p></div>
        </body></html>"#,
    )
    .await;
}

fn find<'a>(records: &'a [Record], url: &Url) -> &'a Record {
    records
        .iter()
        .find(|r| r.url() == url)
        .unwrap_or_else(|| panic!("no record for {}", url))
}

#[tokio::test]
async fn test_alice_profile_crawl_tags_parents() {
    let server = MockServer::start().await;
    mount_alice(&server).await;
    let base = Url::parse(&server.uri()).unwrap();
    let at = |p: &str| base.join(p).unwrap();

    let sink = MemorySink::new();
    let config = create_test_config(Some("alice"), Some(at("/users/alice/").to_string()));
    let report = Coordinator::new(config, Box::new(sink.clone()))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_fetched, 12);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(report.page_errors, 0);
    assert_eq!(report.status, Some(RunStatus::Completed));

    let records = sink.records().unwrap();
    let car = at("/r/bmw/x5/1/");
    let album = at("/s/a/Alb1");

    // Everything under the car carries it as parent
    for path in [
        "/r/bmw/x5/1/logbook",
        "/l/501/",
        "/img/oil.jpg",
        "/s/a/Alb1",
        "/s/P1",
        "/img/p1.jpg",
        "/s/P3",
        "/img/car1.jpg",
    ] {
        assert_eq!(find(&records, &at(path)).parent(), Some(&car), "{}", path);
    }

    // Photo posts on both album pages share the album's first page as origin
    assert_eq!(find(&records, &at("/s/P1")).origin(), Some(&album));
    assert_eq!(find(&records, &at("/s/P3")).origin(), Some(&album));
    assert_eq!(
        find(&records, &at("/l/501/")).origin(),
        Some(&at("/r/bmw/x5/1/logbook"))
    );

    // One album record, from page 1 only
    let albums: Vec<_> = records
        .iter()
        .filter(|r| r.kind() == PageKind::PhotoAlbum && r.url() == &album)
        .collect();
    assert_eq!(albums.len(), 1);

    // Profile-level content has no owning vehicle
    assert_eq!(find(&records, &at("/s/a/Trip0")).parent(), None);
    assert_eq!(find(&records, &at("/b/77/")).parent(), None);
    assert_eq!(
        find(&records, &at("/b/77/")).origin(),
        Some(&at("/users/alice/blog"))
    );

    match find(&records, &at("/l/501/")) {
        Record::BlogPost { cost, mileage, tag, .. } => {
            assert_eq!(cost.as_deref(), Some("4500 RUB"));
            assert_eq!(mileage.as_deref(), Some("120000 km"));
            assert_eq!(tag.as_deref(), Some("Service"));
        }
        other => panic!("unexpected {:?}", other),
    }

    // bob's photo post produced nothing
    assert!(records.iter().all(|r| r.url() != &at("/s/P2")));
    assert!(records.iter().all(|r| r.url() != &at("/img/p2.jpg")));

    let skips = sink.skips().unwrap();
    let reasons = |reason: SkipReason| skips.iter().filter(|s| s.reason == reason).count();
    assert_eq!(reasons(SkipReason::OwnershipMismatch), 1);
    assert_eq!(reasons(SkipReason::OffSite), 1);
    assert_eq!(reasons(SkipReason::Unrecognized), 1);
    assert_eq!(sink.status().unwrap(), Some(RunStatus::Completed));
}

#[tokio::test]
async fn test_run_crawl_writes_database_and_summary() {
    let server = MockServer::start().await;
    mount_alice(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("export.db");
    let summary_path = dir.path().join("summary.md");

    let mut config = create_test_config(
        Some("alice"),
        Some(format!("{}/users/alice/", server.uri())),
    );
    config.output.database_path = db_path.to_string_lossy().to_string();
    config.output.summary_path = Some(summary_path.to_string_lossy().to_string());

    let report = run_crawl(config, "test-hash").await.unwrap();

    let storage = open_storage(&db_path).unwrap();
    assert_eq!(storage.count_records().unwrap(), report.records_emitted);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.subject.as_deref(), Some("alice"));

    let car = format!("{}/r/bmw/x5/1/", server.uri());
    let stored = storage.get_record(&car).unwrap().unwrap();
    assert_eq!(stored.kind, PageKind::Vehicle);
    assert_eq!(stored.title.as_deref(), Some("BMW X5"));

    let skips = storage.count_skips_by_reason().unwrap();
    assert_eq!(skips.get(&SkipReason::OwnershipMismatch), Some(&1));

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("# Drivelog Export Summary"));
    assert!(summary.contains("BMW X5"));
}

#[tokio::test]
async fn test_missing_seed_touches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("export.db");
    let mut config = create_test_config(None, None);
    config.site.base_url = server.uri();
    config.output.database_path = db_path.to_string_lossy().to_string();

    let result = run_crawl(config, "hash").await;

    assert!(matches!(
        result,
        Err(DrivelogError::Config(ConfigError::MissingSeed))
    ));
    assert!(!db_path.exists());
}

#[tokio::test]
async fn test_username_only_seeds_profile() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/users/alice/",
        r#"<html><body><h1 class="x-title">alice</h1></body></html>"#,
    )
    .await;

    let sink = MemorySink::new();
    let mut config = create_test_config(Some("alice"), None);
    config.site.base_url = format!("{}/", server.uri());

    let report = Coordinator::new(config, Box::new(sink.clone()))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_fetched, 1);
    let records = sink.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind(), PageKind::UserProfile);
    assert_eq!(records[0].title(), Some("alice"));
}

#[tokio::test]
async fn test_redirected_album_anchors_posts_at_album_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s/a/Alb1"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/s/a/Alb1/"))
        .expect(1)
        .mount(&server)
        .await;
    serve(
        &server,
        "/s/a/Alb1/",
        r#"<html><body>
          <h1 class="x-title">X5 photos</h1>
          <a class="c-photo-preview" href="/s/P1">1</a>
          <a rel="next" href="/s/a/Alb1/page2">Next</a>
        </body></html>"#,
    )
    .await;
    serve(
        &server,
        "/s/a/Alb1/page2",
        r#"<html><body>
          <h1 class="x-title">X5 photos</h1>
          <a class="c-photo-preview" href="/s/P2">2</a>
        </body></html>"#,
    )
    .await;
    serve(&server, "/s/P1", &photo_post("alice", "/img/p1.jpg")).await;
    serve(&server, "/s/P2", &photo_post("alice", "/img/p2.jpg")).await;

    let base = Url::parse(&server.uri()).unwrap();
    let at = |p: &str| base.join(p).unwrap();

    let sink = MemorySink::new();
    let config = create_test_config(None, Some(at("/s/a/Alb1").to_string()));
    let report = Coordinator::new(config, Box::new(sink.clone()))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.fetch_failures, 0);

    let records = sink.records().unwrap();
    let albums: Vec<_> = records
        .iter()
        .filter(|r| r.kind() == PageKind::PhotoAlbum)
        .collect();
    assert_eq!(albums.len(), 1);
    let album = albums[0].url();
    assert_eq!(album, &at("/s/a/Alb1/"));

    for post in ["/s/P1", "/s/P2"] {
        assert_eq!(find(&records, &at(post)).origin(), Some(album), "{}", post);
    }
}

#[tokio::test]
async fn test_album_shared_with_profile_keeps_vehicle_parent() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/users/alice/",
        r#"<html><body>
          <h1 class="x-title">alice</h1>
          <a class="u-link-area" href="/s/a/Alb1">Photos</a>
          <a class="u-link-area" href="/r/bmw/x5/1/">BMW X5</a>
        </body></html>"#,
    )
    .await;
    serve(
        &server,
        "/r/bmw/x5/1/",
        r#"<html><body>
          <h1 class="x-title">BMW X5</h1>
          <h3><a class="c-link" href="/s/a/Alb1">Photos</a></h3>
        </body></html>"#,
    )
    .await;
    // Reached under two contexts, so fetched twice
    serve_times(
        &server,
        "/s/a/Alb1",
        r#"<html><body><h1 class="x-title">X5 photos</h1></body></html>"#,
        2,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("export.db");
    let mut config = create_test_config(
        Some("alice"),
        Some(format!("{}/users/alice/", server.uri())),
    );
    config.output.database_path = db_path.to_string_lossy().to_string();

    run_crawl(config, "hash").await.unwrap();

    let storage = open_storage(&db_path).unwrap();
    let album = format!("{}/s/a/Alb1", server.uri());
    let stored = storage.get_record(&album).unwrap().unwrap();
    assert_eq!(stored.kind, PageKind::PhotoAlbum);
    assert_eq!(stored.parent, Some(format!("{}/r/bmw/x5/1/", server.uri())));
}
