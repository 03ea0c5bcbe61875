//! Integration tests for the visitor_map library.
//!
//! These tests drive the public API end to end against a file-backed store
//! and mock geolocation/atlas servers. They make no real network requests.

use tempfile::TempDir;
use visitor_map::config::REVEAL_FADE_IN;
use visitor_map::{
    render_svg, run_page_load, should_show_map, Config, DebugController, FileStorage,
    KeyValueStorage, MapRenderer, RecordOutcome, RenderEvent, VisibilityPolicy, VisitRecordStore,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ATLAS: &str = r#"{
    "type": "Topology",
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Polygon", "id": "250", "properties": {"name": "France"}, "arcs": [[0]]},
                {"type": "Polygon", "id": "276", "properties": {"name": "Germany"}, "arcs": [[1]]},
                {"type": "Polygon", "id": "724", "properties": {"name": "Spain"}, "arcs": [[2]]}
            ]
        }
    },
    "arcs": [
        [[0, 42], [8, 42], [8, 51], [0, 42]],
        [[6, 47], [15, 47], [15, 55], [6, 47]],
        [[-9, 36], [3, 36], [3, 43], [-9, 36]]
    ]
}"#;

async fn mock_collaborators(country_code: &str, country_name: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7",
            "country_code": country_code,
            "country_name": country_name
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/countries-110m.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ATLAS))
        .mount(&server)
        .await;
    server
}

fn config_for(server: &MockServer, dir: &TempDir) -> Config {
    Config {
        storage_path: dir.path().join("visits.json"),
        geolocation_url: format!("{}/json/", server.uri()),
        atlas_source: format!("{}/countries-110m.json", server.uri()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_first_page_load_records_and_stays_hidden() {
    let server = mock_collaborators("FR", "France").await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &dir);

    let report = run_page_load(&config).await.unwrap();

    assert!(report.outcome.is_recorded());
    assert!(report.atlas_loaded);
    assert_eq!(report.records.get("FR").unwrap().count, 1);
    assert_eq!(report.state.distinct_countries, 1);
    assert!(!report.renderer.is_visible());
    assert_eq!(report.renderer.regions().len(), 3);
    // Nothing transitioned and nothing is left queued on the renderer
    assert!(report.events.is_empty());
    let mut renderer = report.renderer;
    assert!(renderer.take_events().is_empty());
}

#[tokio::test]
async fn test_visits_accumulate_across_page_loads() {
    let server = mock_collaborators("DE", "Germany").await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &dir);

    for _ in 0..3 {
        run_page_load(&config).await.unwrap();
    }

    let store = VisitRecordStore::open(FileStorage::new(&config.storage_path));
    assert_eq!(store.get_all().get("DE").unwrap().count, 3);
}

#[tokio::test]
async fn test_crossing_thresholds_reveals_map() {
    let server = mock_collaborators("ES", "Spain").await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &dir);

    // 4 countries, 19 visits: one short on both thresholds
    let mut store = VisitRecordStore::open(FileStorage::new(&config.storage_path));
    store
        .try_seed([
            ("US", "United States", 7),
            ("FR", "France", 5),
            ("DE", "Germany", 4),
            ("GB", "United Kingdom", 3),
        ])
        .unwrap();
    assert!(!should_show_map(&store.get_all()));

    let report = run_page_load(&config).await.unwrap();

    assert_eq!(report.state.distinct_countries, 5);
    assert_eq!(report.state.total_visits, 20);
    assert!(report.state.is_map_visible);
    assert!(report.renderer.is_visible());
    assert_eq!(
        report.events,
        vec![RenderEvent::Revealed {
            fade_in: REVEAL_FADE_IN
        }]
    );

    let svg = render_svg(&report.renderer, 800, 200);
    assert!(svg.contains(r#"data-state="visible""#));
    let spain = svg
        .lines()
        .find(|l| l.contains(r#"id="country-724""#))
        .unwrap();
    assert!(spain.contains(r##"fill="#7de2ff""##));
}

#[tokio::test]
async fn test_collaborator_failures_degrade_silently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &dir);

    let report = run_page_load(&config).await.unwrap();

    assert_eq!(report.outcome, RecordOutcome::LookupFailed);
    assert!(!report.atlas_loaded);
    assert!(report.records.is_empty());
    assert!(!report.renderer.is_visible());
}

#[tokio::test]
async fn test_session_dedup_across_page_loads() {
    let server = mock_collaborators("JP", "Japan").await;
    let dir = TempDir::new().unwrap();
    let config = Config {
        dedup: visitor_map::DedupMode::Session,
        session_id: Some("tab-1".to_string()),
        ..config_for(&server, &dir)
    };

    let first = run_page_load(&config).await.unwrap();
    let second = run_page_load(&config).await.unwrap();

    assert!(first.outcome.is_recorded());
    assert_eq!(second.outcome, RecordOutcome::DuplicateSession);
    assert_eq!(second.records.get("JP").unwrap().count, 1);
}

#[test]
fn test_debug_sequence_on_file_store() {
    let dir = TempDir::new().unwrap();
    let mut store = VisitRecordStore::open(FileStorage::new(dir.path().join("visits.json")));
    let policy = VisibilityPolicy::default();
    let mut renderer = MapRenderer::new();
    let mut controller = DebugController::default();

    let activated: Vec<_> = "MDMD"
        .chars()
        .filter_map(|k| controller.handle_key(k, &mut store, &policy, &mut renderer))
        .collect();

    assert_eq!(activated.len(), 1);
    assert!(should_show_map(&store.get_all()));

    // Persisted for the next page load
    let reopened = VisitRecordStore::open(FileStorage::new(dir.path().join("visits.json")));
    assert_eq!(reopened.get_all().total_visits(), 21);
}

#[test]
fn test_reset_clears_persisted_state() {
    let dir = TempDir::new().unwrap();
    let mut store = VisitRecordStore::open(FileStorage::new(dir.path().join("visits.json")));
    store.record_visit("BR", "Brazil");
    assert!(store.reset());

    let storage = store.into_inner();
    assert!(storage.get_item("visitorMap").unwrap().is_none());
}
