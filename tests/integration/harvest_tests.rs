use pagesweep::config::{Config, FetcherConfig, OutputConfig, TargetConfig};
use pagesweep::crawler::run_harvest;
use pagesweep::storage::{Category, CategoryRepository, CategoryStore, JsonFileStore, Record};
use pagesweep::RunSummary;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches category overview requests, which carry no page parameter
struct Overview;

impl Match for Overview {
    fn matches(&self, request: &Request) -> bool {
        request.url.query_pairs().all(|(key, _)| key != "page")
    }
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, output: &Path, categories: &[&str]) -> Config {
    Config {
        fetcher: FetcherConfig {
            concurrency_limit: 3,
            max_attempts: 3,
            request_timeout_ms: 2_000,
            retry_delay_ms: 10, // Very short for testing
        },
        target: TargetConfig {
            base_url: format!("{}/browse.php", server.uri()),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            ..TargetConfig::default()
        },
        output: OutputConfig {
            directory: output.display().to_string(),
            ..OutputConfig::default()
        },
        ..Config::default()
    }
}

fn overview_html(letter: &str, last_page: u32) -> String {
    format!(
        r#"<html><body>
        <div aria-label="Pagination">
          <a href="/browse.php?character={l}&page=2">2</a>
          <a href="/browse.php?character={l}&page={last}">Last</a>
        </div>
        </body></html>"#,
        l = letter,
        last = last_page
    )
}

fn page_html(prefix: &str, count: usize) -> String {
    let links: String = (0..count)
        .map(|i| {
            format!(
                r#"<li><a href="/define.php?term={p}{i}">{p}{i}</a></li>"#,
                p = prefix,
                i = i
            )
        })
        .collect();
    format!(
        r#"<html><body><section class="flex-1">
        <div class="bg-white dark:bg-yankees p-5 mb-5 rounded-md"><ul>{}</ul></div>
        </section></body></html>"#,
        links
    )
}

async fn mount_overview(server: &MockServer, letter: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/browse.php"))
        .and(query_param("character", letter))
        .and(Overview)
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(
    server: &MockServer,
    letter: &str,
    page: u32,
    response: ResponseTemplate,
    expected: u64,
) {
    Mock::given(method("GET"))
        .and(path("/browse.php"))
        .and(query_param("character", letter))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

fn read_summary(dir: &Path) -> RunSummary {
    let content = std::fs::read_to_string(dir.join("summary.json")).expect("summary written");
    serde_json::from_str(&content).expect("summary is valid JSON")
}

fn read_error_log(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("error_log.txt"))
        .expect("error log written")
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_resumed_category_fetches_only_new_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_overview(&server, "A", overview_html("A", 3)).await;
    mount_page(&server, "A", 1, ResponseTemplate::new(200), 0).await;
    mount_page(&server, "A", 2, ResponseTemplate::new(200), 0).await;
    mount_page(
        &server,
        "A",
        3,
        ResponseTemplate::new(200).set_body_string(page_html("a", 5)),
        1,
    )
    .await;

    // Pages 1 and 2 persisted by an earlier run
    let repository = JsonFileStore::new(dir.path());
    let category = Category::new("a");
    let mut earlier = CategoryStore::new();
    earlier.insert(1, vec![Record::new("a-one", "/define.php?term=a-one")]);
    earlier.insert(2, vec![Record::new("a-two", "/define.php?term=a-two")]);
    repository.save(&category, &earlier).unwrap();

    let config = create_test_config(&server, dir.path(), &["a"]);
    let summary = run_harvest(&config, &[]).await.expect("harvest succeeds");

    assert_eq!(summary.categories_processed, 1);
    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.pages_fetched, 1);
    assert!(summary.errors.is_empty());

    let store = repository.load(&category).unwrap();
    assert_eq!(store.pages().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(store.get(1), earlier.get(1));
    let page3 = store.get(3).unwrap();
    assert_eq!(page3.len(), 5);
    assert_eq!(page3[0], Record::new("a0", "/define.php?term=a0"));

    assert_eq!(read_summary(dir.path()), summary);
    assert!(read_error_log(dir.path()).is_empty());
}

#[tokio::test]
async fn test_failed_page_is_logged_per_attempt_and_left_out() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_overview(&server, "B", overview_html("B", 2)).await;
    mount_page(&server, "B", 1, ResponseTemplate::new(502), 3).await;
    mount_page(
        &server,
        "B",
        2,
        ResponseTemplate::new(200).set_body_string(page_html("b", 2)),
        1,
    )
    .await;

    let config = create_test_config(&server, dir.path(), &["b"]);
    let summary = run_harvest(&config, &[]).await.expect("harvest succeeds");

    assert_eq!(summary.categories_processed, 1);
    assert_eq!(summary.total_pages, 1);
    assert_eq!(summary.errors.len(), 3);

    let log = read_error_log(dir.path());
    assert_eq!(log.len(), 3);
    for (i, line) in log.iter().enumerate() {
        assert!(line.contains("page=1"), "unexpected entry: {}", line);
        assert!(line.contains(&format!("(Attempt {})", i + 1)));
        assert!(line.ends_with("HTTP 502"));
    }

    let store = JsonFileStore::new(dir.path())
        .load(&Category::new("b"))
        .unwrap();
    assert!(!store.contains(1));
    assert_eq!(store.get(2).map(<[Record]>::len), Some(2));
}

#[tokio::test]
async fn test_rerun_does_not_revisit_pages_below_frontier() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Page 1 is missing while page 2 is stored
    let repository = JsonFileStore::new(dir.path());
    let category = Category::new("b");
    let mut earlier = CategoryStore::new();
    earlier.insert(2, vec![Record::new("b0", "/define.php?term=b0")]);
    repository.save(&category, &earlier).unwrap();

    mount_overview(&server, "B", overview_html("B", 2)).await;
    mount_page(&server, "B", 1, ResponseTemplate::new(200), 0).await;
    mount_page(&server, "B", 2, ResponseTemplate::new(200), 0).await;

    let config = create_test_config(&server, dir.path(), &["b"]);
    let summary = run_harvest(&config, &[]).await.expect("harvest succeeds");

    assert_eq!(summary.categories_processed, 1);
    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(repository.load(&category).unwrap(), earlier);
}

#[tokio::test]
async fn test_category_without_pagination_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_overview(
        &server,
        "C",
        "<html><body><p>Nothing here</p></body></html>".to_string(),
    )
    .await;
    mount_overview(&server, "D", overview_html("D", 1)).await;
    mount_page(
        &server,
        "D",
        1,
        ResponseTemplate::new(200).set_body_string(page_html("d", 3)),
        1,
    )
    .await;

    let config = create_test_config(&server, dir.path(), &["c", "d"]);
    let summary = run_harvest(&config, &[]).await.expect("harvest succeeds");

    assert_eq!(summary.categories_processed, 1);
    assert_eq!(summary.total_pages, 1);
    assert!(!dir.path().join("C.json").exists());
    assert!(dir.path().join("D.json").exists());
}

#[tokio::test]
async fn test_unreachable_overview_does_not_stop_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("character", "E"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    mount_overview(&server, "F", overview_html("F", 2)).await;
    for page in 1..=2 {
        mount_page(
            &server,
            "F",
            page,
            ResponseTemplate::new(200).set_body_string(page_html("f", 1)),
            1,
        )
        .await;
    }

    let config = create_test_config(&server, dir.path(), &["e", "f"]);
    let summary = run_harvest(&config, &[]).await.expect("harvest succeeds");

    assert_eq!(summary.categories_processed, 1);
    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.errors.len(), 3);
}

#[tokio::test]
async fn test_category_override_restricts_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("character", "G"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_overview(&server, "H", overview_html("H", 1)).await;
    mount_page(
        &server,
        "H",
        1,
        ResponseTemplate::new(200).set_body_string(page_html("h", 1)),
        1,
    )
    .await;

    let config = create_test_config(&server, dir.path(), &["g", "h"]);
    let summary = run_harvest(&config, &["h".to_string()])
        .await
        .expect("harvest succeeds");

    assert_eq!(summary.categories_processed, 1);
}

#[tokio::test]
async fn test_every_fetch_failing_still_produces_artifacts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // A stale log from an earlier run is replaced
    std::fs::write(dir.path().join("error_log.txt"), "old entry\n").unwrap();

    let config = create_test_config(&server, dir.path(), &["x", "y"]);
    let summary = run_harvest(&config, &[]).await.expect("harvest succeeds");

    assert_eq!(summary.categories_processed, 0);
    assert_eq!(summary.total_pages, 0);
    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(summary.errors.len(), 6);

    let log = read_error_log(dir.path());
    assert_eq!(log.len(), 6);
    assert!(log.iter().all(|line| !line.contains("old entry")));
    assert_eq!(read_summary(dir.path()), summary);
}
