//! End-to-end generation tests over local and remote collectors

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use wyrd_ag::collector::{Exclusions, GitHubCollector, LocalDirCollector};
use wyrd_ag::pages::PageRenderer;
use wyrd_ag::{pipeline, Pipeline, SourceCollector};
use wyrd_common::artifact_io::read_json;
use wyrd_common::{ApiLayout, CatalogArtifact, CategoriesArtifact, PhenomenonRecord, StatsArtifact};

fn write_source(root: &Path, name: &str, contents: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("api.json"), contents).unwrap();
}

/// Four sources: nested, legacy, missing document, malformed JSON
fn seed_sources(root: &Path) {
    write_source(
        root,
        "mothman",
        &json!({
            "phenomenon": {
                "id": "mothman",
                "name": "Mothman",
                "category": "Cryptid",
                "description": { "summary": "Winged humanoid" },
                "danger_level": "moderate"
            },
            "distribution": {
                "range": { "regions": ["USA", "West Virginia"], "description": "Point Pleasant" },
                "temporal": { "first_recorded": { "date": "1966-11-15" } }
            }
        })
        .to_string(),
    );
    write_source(
        root,
        "nessie",
        &json!({ "id": "nessie", "name": "Nessie", "category": "cryptid", "regions": ["Scotland"] }).to_string(),
    );
    std::fs::create_dir_all(root.join("empty-repo")).unwrap();
    write_source(root, "broken", "{ not json");
    write_source(root, "wyrdness.github.io", r#"{"id":"site"}"#);
}

fn local_pipeline(sources: &Path, site: &Path) -> Pipeline {
    let exclusions = Exclusions::new(vec!["wyrdness.github.io".to_string()]);
    Pipeline::new(
        Box::new(LocalDirCollector::new(sources, "api.json", exclusions)),
        ApiLayout::new(site),
        "1.0.0",
    )
}

#[tokio::test]
async fn test_generate_from_local_sources() {
    let sources = TempDir::new().unwrap();
    let site = TempDir::new().unwrap();
    seed_sources(sources.path());

    let run = local_pipeline(sources.path(), site.path());
    let report = run.generate(&PageRenderer::builtin()).await.unwrap();

    assert_eq!(report.summary.processed, 4);
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.failed, 2);
    assert_eq!(report.pages, 2);

    let layout = ApiLayout::new(site.path());
    let catalog: CatalogArtifact = read_json(&layout.index_path()).unwrap();
    assert_eq!(catalog.total, 2);
    assert_eq!(catalog.phenomena.len(), catalog.total);
    assert_eq!(catalog.version, "1.0.0");

    // Local listing is sorted by directory name
    let ids: Vec<&str> = catalog.phenomena.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["mothman", "nessie"]);

    let mothman: PhenomenonRecord = read_json(&layout.record_path("mothman")).unwrap();
    assert_eq!(mothman.category, "cryptid");
    assert_eq!(mothman.description, "Winged humanoid");
    assert_eq!(mothman.origin, "Point Pleasant");
    assert_eq!(mothman.first_reported, "1966-11-15");
    assert_eq!(mothman, catalog.phenomena[0]);

    let categories: CategoriesArtifact = read_json(&layout.categories_path()).unwrap();
    assert_eq!(categories.total, 1);
    assert_eq!(categories.categories["cryptid"].count, 2);
    assert_eq!(categories.generated, catalog.generated);

    let stats: StatsArtifact = read_json(&layout.stats_path()).unwrap();
    assert_eq!(stats.total_phenomena, 2);
    assert_eq!(stats.by_region["Scotland"], 1);
    assert_eq!(stats.by_danger_level["moderate"], 1);
    assert_eq!(stats.by_danger_level["unknown"], 1);

    assert!(layout.page_path("nessie").exists());
    assert!(!layout.record_path("site").exists());
}

#[tokio::test]
async fn test_repeat_runs_produce_same_content() {
    let sources = TempDir::new().unwrap();
    let site = TempDir::new().unwrap();
    seed_sources(sources.path());

    let run = local_pipeline(sources.path(), site.path());
    let (first, _) = run.aggregate().await.unwrap();
    let (second, _) = run.aggregate().await.unwrap();

    assert!(first.same_content(&second));
    let on_disk: CatalogArtifact = read_json(&run.layout().index_path()).unwrap();
    assert!(on_disk.same_content(&first));
}

#[tokio::test]
async fn test_file_stages_match_in_memory_generation() {
    let sources = TempDir::new().unwrap();
    let site = TempDir::new().unwrap();
    seed_sources(sources.path());

    let run = local_pipeline(sources.path(), site.path());
    run.generate(&PageRenderer::builtin()).await.unwrap();
    let layout = run.layout();

    let in_memory: StatsArtifact = read_json(&layout.stats_path()).unwrap();
    let from_disk = pipeline::regenerate_stats(layout).unwrap();
    assert_eq!(in_memory, from_disk);

    let categories = pipeline::regenerate_categories(layout).unwrap();
    assert_eq!(categories.categories["cryptid"].phenomena.len(), 2);
    assert_eq!(pipeline::regenerate_pages(layout, &PageRenderer::builtin()).unwrap(), 2);
}

#[tokio::test]
async fn test_missing_source_root_fails_run() {
    let site = TempDir::new().unwrap();
    let run = local_pipeline(Path::new("/nonexistent/wyrdness-sources"), site.path());

    assert!(run.aggregate().await.is_err());
    assert!(!ApiLayout::new(site.path()).index_path().exists());
}

fn encoded(document: &Value) -> String {
    base64::engine::general_purpose::STANDARD.encode(document.to_string())
}

async fn list_repos(UrlPath(org): UrlPath<String>) -> Result<Json<Value>, StatusCode> {
    if org != "wyrdness" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!([
        { "name": "wyrdness.github.io" },
        { "name": "chupacabra" },
        { "name": "no-api" }
    ])))
}

async fn repo_contents(
    UrlPath((_org, repo, _document)): UrlPath<(String, String, String)>,
) -> Result<Json<Value>, StatusCode> {
    match repo.as_str() {
        "chupacabra" => Ok(Json(json!({
            "encoding": "base64",
            "content": encoded(&json!({
                "phenomenon": { "id": "chupacabra", "name": "Chupacabra", "category": "cryptid" },
                "distribution": { "range": { "countries": ["Puerto Rico", "Mexico"] } }
            }))
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn start_fake_api() -> String {
    let router = Router::new()
        .route("/orgs/:org/repos", get(list_repos))
        .route("/repos/:org/:repo/contents/:document", get(repo_contents));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_aggregate_from_remote_organisation() {
    let api_base = start_fake_api().await;
    let site = TempDir::new().unwrap();

    let exclusions = Exclusions::new(vec!["wyrdness.github.io".to_string()]);
    let collector = GitHubCollector::new("wyrdness", None, "api.json", exclusions)
        .unwrap()
        .with_api_base(api_base);
    let run = Pipeline::new(Box::new(collector), ApiLayout::new(site.path()), "1.0.0");

    let (catalog, summary) = run.aggregate().await.unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);

    assert_eq!(catalog.total, 1);
    assert_eq!(catalog.phenomena[0].id, "chupacabra");
    assert_eq!(catalog.phenomena[0].regions, vec!["Puerto Rico", "Mexico"]);
}

#[tokio::test]
async fn test_unknown_remote_organisation_fails_listing() {
    let api_base = start_fake_api().await;
    let site = TempDir::new().unwrap();

    let collector = GitHubCollector::new("nobody", None, "api.json", Exclusions::default())
        .unwrap()
        .with_api_base(api_base);
    let run = Pipeline::new(Box::new(collector), ApiLayout::new(site.path()), "1.0.0");

    assert!(run.aggregate().await.is_err());
}

/// Organisation with `repos` repositories, listed in GitHub-style pages
struct PagedOrg {
    repos: usize,
    page_requests: AtomicUsize,
}

async fn list_paged_repos(
    State(org): State<Arc<PagedOrg>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    org.page_requests.fetch_add(1, Ordering::SeqCst);
    let per_page: usize = params.get("per_page").and_then(|v| v.parse().ok()).unwrap_or(30);
    let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);

    let start = page.saturating_sub(1) * per_page;
    let end = (start + per_page).min(org.repos);
    let names: Vec<Value> = (start.min(end)..end)
        .map(|i| json!({ "name": format!("repo-{:03}", i) }))
        .collect();
    Json(Value::Array(names))
}

async fn list_all_pages(repos: usize) -> (Vec<String>, usize) {
    let org = Arc::new(PagedOrg {
        repos,
        page_requests: AtomicUsize::new(0),
    });
    let router = Router::new()
        .route("/orgs/:org/repos", get(list_paged_repos))
        .with_state(org.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let collector = GitHubCollector::new("wyrdness", None, "api.json", Exclusions::default())
        .unwrap()
        .with_api_base(format!("http://{}", addr));
    let names = collector.list_sources().await.unwrap();
    (names, org.page_requests.load(Ordering::SeqCst))
}

#[tokio::test]
async fn test_listing_follows_pages_until_short_page() {
    let (names, page_requests) = list_all_pages(203).await;

    assert_eq!(names.len(), 203);
    assert_eq!(page_requests, 3);
    assert_eq!(names.first().map(String::as_str), Some("repo-000"));
    assert_eq!(names.last().map(String::as_str), Some("repo-202"));
}

#[tokio::test]
async fn test_listing_of_exactly_one_full_page_stops_at_empty_page() {
    let (names, page_requests) = list_all_pages(100).await;

    assert_eq!(names.len(), 100);
    assert_eq!(page_requests, 2);
}
