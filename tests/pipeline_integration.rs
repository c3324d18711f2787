//! End-to-end pipeline tests against mocked arXiv and GitHub endpoints.

#![allow(clippy::unwrap_used)]

mod support;
use support::socket_guard::start_mock_server_or_skip;

use std::fs;
use std::path::Path;

use arxiv_digest::{
    ArxivClient, CodeLookup, CodeSearch, Config, GithubCodeSearch, HttpSettings, LiteratureSource,
    NetworkError, PaperStore, build_fetcher, parse_config_str, run,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARXIV_PATH: &str = "/api/query";
const GITHUB_PATH: &str = "/search/repositories";

fn atom_feed(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, title, published)| {
            format!(
                r#"
  <entry>
    <id>http://arxiv.org/abs/{id}</id>
    <updated>{published}</updated>
    <published>{published}</published>
    <title>{title}</title>
    <summary>  An abstract
      spanning lines.
    </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name><arxiv:affiliation>Bletchley</arxiv:affiliation></author>
    <link href="http://arxiv.org/abs/{id}" rel="alternate" type="text/html"/>
    <arxiv:primary_category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query</title>
  <id>http://arxiv.org/api/xyz</id>
  <updated>2024-05-02T00:00:00-04:00</updated>
  <opensearch:totalResults>{}</opensearch:totalResults>
  <opensearch:startIndex>0</opensearch:startIndex>{body}
</feed>"#,
        entries.len()
    )
}

const ARXIV_ERROR_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: search_query=&amp;id_list=</title>
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234.12345</id>
    <title>Error</title>
    <summary>incorrect id format for 1234.12345</summary>
  </entry>
</feed>"#;

async fn mount_arxiv(server: &MockServer, query: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(ARXIV_PATH))
        .and(query_param("search_query", query))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_github(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(GITHUB_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

fn config(server: &MockServer, dir: &Path, keywords: &str) -> Config {
    let raw = format!(
        r#"
max_results: 1
show_badge: true
badge_repo: fierce/arxiv-digest
json_readme_path: {dir}/docs/readme.json
json_gitpage_path: {dir}/docs/gitpage.json
md_readme_path: {dir}/README.md
md_gitpage_path: {dir}/docs/index.md
arxiv_api_url: {uri}{ARXIV_PATH}
github_api_url: {uri}{GITHUB_PATH}
keywords:
{keywords}"#,
        dir = dir.display(),
        uri = server.uri(),
    );
    parse_config_str(&raw, Path::new("pipeline.yaml")).unwrap()
}

const FRAUD_ONLY: &str = r#"  Fraud:
    filters: ["fraud"]
"#;

#[tokio::test]
async fn test_single_topic_run_writes_store_and_report() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_arxiv(
        &server,
        "\"fraud\"",
        ResponseTemplate::new(200).set_body_string(atom_feed(&[(
            "2405.00001v1",
            "Fraud Detection via GNNs",
            "2024-05-01T17:59:59Z",
        )])),
    )
    .await;
    mount_github(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "items": [{"html_url": "https://github.com/someone/gnn-fraud"}]
        })),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path(), FRAUD_ONLY);
    let fetcher = build_fetcher(&config).unwrap();
    let summary = run(&config, &fetcher).await;

    assert_eq!(summary.topics_fetched, 1);
    assert_eq!(summary.papers, 1);
    assert!(summary.targets_failed.is_empty());

    let store = PaperStore::load(&config.json_readme_path).unwrap();
    let record = &store.topic("Fraud").unwrap()["2405.00001"];
    assert_eq!(record.domain_tags, vec!["Fraud"]);
    assert_eq!(record.published, "2024-05-01");
    assert_eq!(record.authors, "Ada Lovelace, Alan Turing");
    assert!(record.summary.starts_with("An abstract"));
    assert!(record.summary.ends_with("spanning lines."));
    assert!(!record.summary.contains('\n'));
    assert_eq!(
        record.code_url.as_deref(),
        Some("https://github.com/someone/gnn-fraud")
    );

    let raw = fs::read_to_string(&config.json_gitpage_path).unwrap();
    assert!(raw.contains("\"论文链接\": \"https://arxiv.org/abs/2405.00001\""));

    let report = fs::read_to_string(&config.md_readme_path).unwrap();
    assert!(report.contains("- [Fraud](#fraud)"));
    assert!(report.contains("#### Fraud"));
    assert!(report.contains(
        "| 2024-05-01 | Fraud Detection via GNNs | Ada Lovelace, Alan Turing | Fraud | \
         [PDF](https://arxiv.org/abs/2405.00001) | [Code](https://github.com/someone/gnn-fraud) |"
    ));
    assert!(report.contains("img.shields.io/github/stars/fierce/arxiv-digest"));
}

#[tokio::test]
async fn test_code_lookup_failure_renders_no_code_marker() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_arxiv(
        &server,
        "\"fraud\"",
        ResponseTemplate::new(200).set_body_string(atom_feed(&[(
            "2405.00001v1",
            "Fraud Detection via GNNs",
            "2024-05-01T00:00:00Z",
        )])),
    )
    .await;
    mount_github(&server, ResponseTemplate::new(500)).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path(), FRAUD_ONLY);
    let fetcher = build_fetcher(&config).unwrap();
    let summary = run(&config, &fetcher).await;
    assert!(summary.targets_failed.is_empty());

    let store = PaperStore::load(&config.json_readme_path).unwrap();
    assert_eq!(store.topic("Fraud").unwrap()["2405.00001"].code_url, None);

    let report = fs::read_to_string(&config.md_gitpage_path).unwrap();
    assert!(report.contains("| [PDF](https://arxiv.org/abs/2405.00001) | none |"));
}

#[tokio::test]
async fn test_failed_topic_does_not_abort_the_run() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_arxiv(
        &server,
        "\"fraud\"",
        ResponseTemplate::new(200).set_body_string(atom_feed(&[(
            "2405.00001v1",
            "Fraud Detection via GNNs",
            "2024-05-01T00:00:00Z",
        )])),
    )
    .await;
    mount_arxiv(&server, "\"outage\"", ResponseTemplate::new(500)).await;
    mount_arxiv(
        &server,
        "\"bad id\"",
        ResponseTemplate::new(200).set_body_string(ARXIV_ERROR_FEED),
    )
    .await;
    mount_github(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"total_count": 0, "items": []})),
    )
    .await;

    let keywords = r#"  Fraud:
    filters: ["fraud"]
  Outage:
    filters: ["outage"]
  Rejected:
    filters: ["bad id"]
"#;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path(), keywords);
    let fetcher = build_fetcher(&config).unwrap();
    let summary = run(&config, &fetcher).await;

    assert_eq!(summary.topics_fetched, 1);
    assert_eq!(summary.topics_failed, 2);
    assert_eq!(summary.targets_published, vec!["readme", "gitpage"]);

    let store = PaperStore::load(&config.json_readme_path).unwrap();
    assert!(store.topic("Fraud").is_some());
    assert!(store.topic("Outage").is_none());
    assert!(store.topic("Rejected").is_none());
}

#[tokio::test]
async fn test_rerun_keeps_earlier_topics_and_papers() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_arxiv(
        &server,
        "\"fraud\"",
        ResponseTemplate::new(200).set_body_string(atom_feed(&[(
            "2405.00002v3",
            "Newer Fraud Paper",
            "2024-05-02T00:00:00Z",
        )])),
    )
    .await;
    mount_github(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"total_count": 0})),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path(), FRAUD_ONLY);
    fs::create_dir_all(dir.path().join("docs")).unwrap();
    fs::write(
        &config.json_readme_path,
        r#"{
  "Fraud": {
    "2401.00001": {"标题": "Older Fraud Paper", "作者": "X", "摘要": "", "日期": "2024-01-01",
                   "领域标签": ["Fraud"], "论文链接": "https://arxiv.org/abs/2401.00001", "代码链接": null}
  },
  "Archive": {}
}"#,
    )
    .unwrap();

    let fetcher = build_fetcher(&config).unwrap();
    run(&config, &fetcher).await;

    let store = PaperStore::load(&config.json_readme_path).unwrap();
    let fraud = store.topic("Fraud").unwrap();
    assert_eq!(fraud.len(), 2);
    assert!(fraud.contains_key("2405.00002"));
    assert!(store.topic("Archive").is_some());

    let report = fs::read_to_string(&config.md_readme_path).unwrap();
    let newer = report.find("Newer Fraud Paper").unwrap();
    let older = report.find("Older Fraud Paper").unwrap();
    assert!(newer < older, "newest paper must be listed first");
}

#[tokio::test]
async fn test_arxiv_client_sends_sorted_query() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path(ARXIV_PATH))
        .and(query_param("search_query", "\"a\" OR \"b\""))
        .and(query_param("start", "0"))
        .and(query_param("max_results", "7"))
        .and(query_param("sortBy", "submittedDate"))
        .and(query_param("sortOrder", "descending"))
        .respond_with(ResponseTemplate::new(200).set_body_string(atom_feed(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ArxivClient::with_base_url(
        format!("{}{ARXIV_PATH}", server.uri()),
        HttpSettings::default(),
    )
    .unwrap();
    let papers = client.search("\"a\" OR \"b\"", 7).await.unwrap();
    assert!(papers.is_empty());
}

#[tokio::test]
async fn test_arxiv_client_maps_http_status() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path(ARXIV_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ArxivClient::with_base_url(
        format!("{}{ARXIV_PATH}", server.uri()),
        HttpSettings::default(),
    )
    .unwrap();
    let err = client.search("\"a\"", 1).await.unwrap_err();
    assert!(matches!(err, NetworkError::HttpStatus { status: 503, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_github_search_sends_star_sorted_query() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path(GITHUB_PATH))
        .and(query_param("q", "Fraud Detection via GNNs 2405.00001"))
        .and(query_param("sort", "stars"))
        .and(query_param("order", "desc"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "items": [
                {"html_url": "https://github.com/a/most-stars"},
                {"html_url": "https://github.com/a/fewer-stars"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let search = GithubCodeSearch::with_base_url(
        format!("{}{GITHUB_PATH}", server.uri()),
        HttpSettings::default(),
    )
    .unwrap();
    let outcome = search.lookup("Fraud Detection via GNNs 2405.00001").await;
    assert_eq!(
        outcome,
        CodeLookup::Found("https://github.com/a/most-stars".to_string())
    );
}

#[tokio::test]
async fn test_github_search_distinguishes_no_match_from_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path(GITHUB_PATH))
        .and(query_param("q", "nothing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_count": 0})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(GITHUB_PATH))
        .and(query_param("q", "limited"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(GITHUB_PATH))
        .and(query_param("q", "garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let search = GithubCodeSearch::with_base_url(
        format!("{}{GITHUB_PATH}", server.uri()),
        HttpSettings::default(),
    )
    .unwrap();
    assert_eq!(search.lookup("nothing").await, CodeLookup::NoMatch);
    assert!(matches!(search.lookup("limited").await, CodeLookup::Failed(_)));
    assert!(matches!(search.lookup("garbled").await, CodeLookup::Failed(_)));
}
