// ABOUTME: Integration tests for the client runtime against a mock HTTP server
// ABOUTME: Config loading, node details caching, status polling, node mounts and the batch transport

use std::sync::Arc;
use std::time::Duration;

use diagram_client::loader::load_file;
use diagram_client::status::check_status;
use diagram_client::{
    ApiClient, BatchTransport, ConfigLoader, LoaderError, MetricError, MetricsBatcher,
    NodeDetailsResolver, NodeMount, NodeServices, StatusPoller, StatusState,
};
use diagram_config::FailurePolicy;
use diagram_core::{find_template, DiagramNode, MetricQuery, StatusConfig};
use diagram_storage::{LocalStore, Preferences};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn diagram_json() -> serde_json::Value {
    json!({
        "config": {"title": "Telemetry Processing", "layout": "horizontal"},
        "nodes": [
            {"name": "ingest", "displayName": "Ingest", "connectTo": ["store"]},
            {"name": "store", "displayName": "Store"}
        ]
    })
}

fn status_config(url: String) -> StatusConfig {
    StatusConfig {
        url,
        value_field: "status".to_string(),
        up_value: "UP".to_string(),
        down_value: "DOWN".to_string(),
        update_interval: 50,
    }
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

#[tokio::test]
async fn test_list_diagrams_accepts_array_and_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/diagrams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["a.json", "b.json"])))
        .mount(&server)
        .await;

    let loader = ConfigLoader::new(ApiClient::new(&server.uri()).unwrap());
    assert_eq!(loader.list_diagrams().await, vec!["a.json", "b.json"]);

    let legacy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/diagrams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"diagrams": ["c.json"]})))
        .mount(&legacy)
        .await;

    let loader = ConfigLoader::new(ApiClient::new(&legacy.uri()).unwrap());
    assert_eq!(loader.list_diagrams().await, vec!["c.json"]);
}

#[tokio::test]
async fn test_list_diagrams_falls_back_to_known_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/diagrams"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/diagrams/IMC-chatbot.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(diagram_json()))
        .mount(&server)
        .await;

    let loader = ConfigLoader::new(ApiClient::new(&server.uri()).unwrap());
    assert_eq!(loader.list_diagrams().await, vec!["IMC-chatbot.json"]);
}

#[tokio::test]
async fn test_load_fetches_and_validates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/diagrams/good.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(diagram_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/diagrams/dupes.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": {"title": "Dupes"},
            "nodes": [{"name": "x"}, {"name": "x"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/diagrams/broken.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"config\": 7}"))
        .mount(&server)
        .await;

    let loader = ConfigLoader::new(ApiClient::new(&server.uri()).unwrap());

    let loaded = loader.load("good.json").await.unwrap();
    assert_eq!(loaded.config.nodes.len(), 2);
    assert!(!loaded.bypass_positions);

    assert!(matches!(
        loader.load("dupes.json").await,
        Err(LoaderError::Invalid(_))
    ));
    assert!(matches!(
        loader.load("broken.json").await,
        Err(LoaderError::Parse { .. })
    ));
    assert!(matches!(
        loader.load("missing.json").await,
        Err(LoaderError::Fetch { .. })
    ));
}

#[tokio::test]
async fn test_pending_template_wins_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/diagrams/good.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(diagram_json()))
        .mount(&server)
        .await;

    let preferences = Preferences::new(LocalStore::open_in_memory().await.unwrap());
    let template = find_template("microservices").unwrap();
    preferences
        .set_pending_template(&template.config)
        .await
        .unwrap();

    let loader =
        ConfigLoader::new(ApiClient::new(&server.uri()).unwrap()).with_preferences(preferences);

    let first = loader.load("good.json").await.unwrap();
    assert!(first.bypass_positions);
    assert_eq!(first.config, template.config);

    let second = loader.load("good.json").await.unwrap();
    assert!(!second.bypass_positions);
    assert_eq!(second.config.config.title, "Telemetry Processing");
}

#[tokio::test]
async fn test_load_file_reads_disk() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("local.json");
    std::fs::write(&file, diagram_json().to_string()).unwrap();

    let config = load_file(&file).await.unwrap();
    assert_eq!(config.nodes[0].name, "ingest");
    assert!(matches!(
        load_file(&dir.path().join("absent.json")).await,
        Err(LoaderError::Io(_))
    ));
}

#[tokio::test]
async fn test_node_details_found_and_sanitized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/node-details/rabbitmq"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "RabbitMQ",
            "sections": "not-a-list",
            "links": [{"label": "UI", "url": "ftp://nope"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = NodeDetailsResolver::new(ApiClient::new(&server.uri()).unwrap());
    let details = resolver.load("rabbitmq").await.unwrap();
    assert_eq!(details.title.as_deref(), Some("RabbitMQ"));
    assert!(details.sections.is_empty());
    assert!(details.links.is_empty());

    // Served from cache
    assert!(resolver.load("rabbitmq").await.is_some());
}

#[tokio::test]
async fn test_node_details_absence_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/node-details/plain"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = NodeDetailsResolver::new(ApiClient::new(&server.uri()).unwrap());
    assert!(resolver.load("plain").await.is_none());
    assert!(resolver.is_cached("plain"));
    assert!(resolver.load("plain").await.is_none());
}

#[tokio::test]
async fn test_node_details_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/node-details/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = NodeDetailsResolver::new(ApiClient::new(&server.uri()).unwrap());
    assert!(resolver.load("flaky").await.is_none());
    assert!(!resolver.is_cached("flaky"));
    assert!(resolver.load("flaky").await.is_none());
}

#[tokio::test]
async fn test_concurrent_detail_loads_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/node-details/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"title": "Slow"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resolver = NodeDetailsResolver::new(ApiClient::new(&server.uri()).unwrap());
    let (a, b, c) = tokio::join!(
        resolver.load("slow"),
        resolver.load("slow"),
        resolver.load("slow")
    );
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(a.unwrap().title.as_deref(), Some("Slow"));
}

#[tokio::test]
async fn test_clear_and_preload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/node-details/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "A"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/node-details/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resolver = NodeDetailsResolver::new(ApiClient::new(&server.uri()).unwrap());
    resolver.preload(&["a", "b"]).await;
    assert!(resolver.is_cached("a"));
    assert!(resolver.is_cached("b"));

    resolver.clear(Some("a"));
    assert!(!resolver.is_cached("a"));
    assert!(resolver.is_cached("b"));
    assert!(resolver.load("a").await.is_some());

    resolver.clear(None);
    assert!(!resolver.is_cached("b"));
}

#[tokio::test]
async fn test_load_or_default_builds_page_from_node() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/node-details/gateway"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/node-details/broker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Broker"})))
        .mount(&server)
        .await;

    let resolver = NodeDetailsResolver::new(ApiClient::new(&server.uri()).unwrap());

    let mut gateway = DiagramNode::named("gateway");
    gateway.display_name = "Gateway".to_string();
    let fallback = resolver.load_or_default(&gateway).await;
    assert_eq!(fallback.title.as_deref(), Some("Gateway Details"));
    assert_eq!(fallback.sections.len(), 2);

    let broker = resolver.load_or_default(&DiagramNode::named("broker")).await;
    assert_eq!(broker.title.as_deref(), Some("Broker"));
    assert!(broker.sections.is_empty());
}

#[tokio::test]
async fn test_check_status_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "UP"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/odd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "MAYBE"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fail"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let check = |p: &str, policy| {
        let config = status_config(format!("{}{}", server.uri(), p));
        let client = client.clone();
        async move { check_status(&client, &config, policy).await }
    };

    assert_eq!(check("/up", FailurePolicy::Down).await, StatusState::Up);
    assert_eq!(check("/odd", FailurePolicy::Down).await, StatusState::Unknown);
    assert_eq!(check("/text", FailurePolicy::Down).await, StatusState::Unknown);
    assert_eq!(check("/fail", FailurePolicy::Down).await, StatusState::Down);
    assert_eq!(check("/fail", FailurePolicy::Up).await, StatusState::Up);
    assert_eq!(
        check("/fail", FailurePolicy::Unknown).await,
        StatusState::Unknown
    );
}

#[tokio::test]
async fn test_status_poller_publishes_and_stops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "DOWN"})))
        .mount(&server)
        .await;

    let poller = StatusPoller::spawn(
        reqwest::Client::new(),
        status_config(format!("{}/health", server.uri())),
        FailurePolicy::Up,
    );
    assert_eq!(poller.status().state, StatusState::Unknown);
    assert!(poller.status().last_checked.is_none());

    let mut updates = poller.subscribe();
    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .unwrap()
        .unwrap();

    let status = poller.status();
    assert_eq!(status.state, StatusState::Down);
    assert!(status.last_checked.is_some());

    poller.stop();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(poller.is_stopped());
}

#[tokio::test]
async fn test_unmount_stops_status_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "UP"})))
        .mount(&server)
        .await;

    let mut node = DiagramNode::named("svc");
    node.status = Some(status_config(format!("{}/health", server.uri())));
    let services = NodeServices {
        http: reqwest::Client::new(),
        batcher: MetricsBatcher::new(Arc::new(ApiClient::new(&server.uri()).unwrap())),
        failure_policy: FailurePolicy::default(),
    };

    let mount = NodeMount::mount(&node, &services);
    tokio::time::timeout(Duration::from_secs(5), async {
        while request_count(&server).await < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    mount.unmount();
    tokio::time::sleep(Duration::from_millis(60)).await;
    let after_unmount = request_count(&server).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(request_count(&server).await, after_unmount);
}

#[tokio::test]
async fn test_batch_transport_posts_queries() {
    let server = MockServer::start().await;
    let queries = vec![MetricQuery::new("db", "http://db/metrics")];
    Mock::given(method("POST"))
        .and(path("/api/metrics/batch"))
        .and(body_json(json!([
            {"url": "http://db/metrics", "node": "db", "key": "db-http://db/metrics"}
        ])))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"db-http://db/metrics": {"connections": 4}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = Arc::new(ApiClient::new(&server.uri()).unwrap());
    let results = api.fetch_batch(&queries).await.unwrap();
    assert_eq!(results["db-http://db/metrics"], json!({"connections": 4}));
}

#[tokio::test]
async fn test_batch_transport_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/metrics/batch"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let result = api
        .fetch_batch(&[MetricQuery::new("db", "http://db/metrics")])
        .await;
    assert_eq!(result, Err(MetricError::BatchFailed("502".to_string())));
}
