//! Integration tests for the Rester
//!
//! These tests use wiremock to stand in for the structure database service
//! and exercise the full request/response cycle and error mapping.

use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use structdb_client::rest::RestClientConfig;
use structdb_client::{
    CalculatorQuery, ComparatorQuery, EntryKind, Error, PropertyQuery, PrototypeQuery, Rester,
    ResterConfig, TokenPlacement,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "integration-token";

fn rester_for(server: &MockServer) -> Rester {
    Rester::with_config(TOKEN, ResterConfig::new(server.uri())).unwrap()
}

// =============================================================================
// Successful Request Tests
// =============================================================================

#[tokio::test]
async fn test_prototype_query_returns_mapping() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .and(body_partial_json(json!({"token": TOKEN})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "fcc"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let body = rester.query("prototypes", &HashMap::new()).await.unwrap();

    assert_eq!(body, json!({"id": 1, "name": "fcc"}));
}

#[tokio::test]
async fn test_parameters_travel_in_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/properties"))
        .and(body_partial_json(json!({
            "param_type": "EOS",
            "param_limit": "5",
            "cache_state": {},
            "token": TOKEN
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let mut params = HashMap::new();
    params.insert("param_type".to_string(), "EOS".to_string());
    params.insert("param_limit".to_string(), "5".to_string());

    let body = rester.query("properties", &params).await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_raw_path_is_get_with_query_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.0/status"))
        .and(query_param("token", TOKEN))
        .and(query_param("detail", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let mut params = HashMap::new();
    params.insert("detail".to_string(), "full".to_string());

    let body = rester.query("/api/v1.0/status", &params).await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_raw_path_with_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.0/status"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(query_param("detail", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ResterConfig::new(mock_server.uri()).with_token_placement(TokenPlacement::Bearer);
    let rester = Rester::with_config(TOKEN, config).unwrap();
    let mut params = HashMap::new();
    params.insert("detail".to_string(), "full".to_string());

    let body = rester.query("/api/v1.0/status", &params).await.unwrap();
    assert_eq!(body, json!({"ok": 1}));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].url.query_pairs().all(|(key, _)| key != "token"));
}

#[tokio::test]
async fn test_raw_path_with_named_query_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.0/status"))
        .and(query_param("api_key", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ResterConfig::new(mock_server.uri())
        .with_token_placement(TokenPlacement::QueryParam("api_key".to_string()));
    let rester = Rester::with_config(TOKEN, config).unwrap();

    let body = rester.query("/api/v1.0/status", &HashMap::new()).await.unwrap();
    assert_eq!(body, json!({"ok": 1}));
}

#[tokio::test]
async fn test_default_headers_reach_the_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .and(header("X-Client-Site", "lab-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "fcc"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rest_config = RestClientConfig::default().with_header("X-Client-Site", "lab-7");
    let config = ResterConfig::new(mock_server.uri()).with_rest_config(rest_config);
    let rester = Rester::with_config(TOKEN, config).unwrap();

    let body = rester.query("prototypes", &HashMap::new()).await.unwrap();
    assert_eq!(body["name"], "fcc");
}

#[tokio::test]
async fn test_bearer_token_placement() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/calculatortypes"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_dump": [{"__entry_type": "CalculatorType", "id": 3}],
            "cache_dump": {"CalculatorType": {"3": {"id": 3, "NAME": "VASP PBE"}}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ResterConfig::new(mock_server.uri()).with_token_placement(TokenPlacement::Bearer);
    let rester = Rester::with_config(TOKEN, config).unwrap();

    let calculators = rester.query_calculators(&CalculatorQuery::new()).await.unwrap();
    assert_eq!(calculators.len(), 1);
    assert_eq!(calculators[0].name(), Some("VASP PBE"));
}

#[tokio::test]
async fn test_typed_property_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/properties"))
        .and(body_partial_json(json!({
            "param_prototype_name": "fcc",
            "param_visible_for_comparison_only": true,
            "param_limit": 100
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_dump": [{"__entry_type": "Property", "id": 7}],
            "cache_dump": {
                "Property": {"7": {
                    "id": 7,
                    "NAME": "fcc_eos",
                    "COMPOSITION": "Al-4",
                    "TYPE": {"__entry_type": "PropertyType", "id": 2},
                    "STRUCTURES": {"initial": {"__entry_type": "StructureEntry", "id": 11}}
                }},
                "PropertyType": {"2": {"id": 2, "NAME": "EOS"}},
                "StructureEntry": {"11": {
                    "id": 11,
                    "COMPOSITION": "Al-1",
                    "OCCUPATION": ["Al"],
                    "LATTICE_VECTORS": [[0.0, 2.0, 2.0], [2.0, 0.0, 2.0], [2.0, 2.0, 0.0]],
                    "COORDINATES": [[0.0, 0.0, 0.0]],
                    "COORDINATES_TYPE": "relative"
                }}
            }
        })))
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let properties = rester
        .query_properties(&PropertyQuery::new().with_prototype_name("fcc"))
        .await
        .unwrap();

    assert_eq!(properties.len(), 1);
    let property = &properties[0];
    assert_eq!(property.to_string(), "<Property #7:EOS:Al-4:fcc_eos>");

    let structure = property.structures().unwrap()["initial"]
        .as_entry()
        .unwrap()
        .structure()
        .unwrap();
    assert_eq!(structure.symbols, vec!["Al".to_string()]);
    assert!((structure.volume() - 16.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_typed_prototype_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .and(body_partial_json(json!({"param_prototype_strukturbericht": "A1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_dump": [{"__entry_type": "GenericEntry", "id": 5}],
            "cache_dump": {"GenericEntry": {"5": {
                "id": 5,
                "COMPOSITION": "A-1",
                "STRUKTURBERICHT": "A1",
                "PROTOTYPE_NAME": "fcc"
            }}}
        })))
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let prototypes = rester
        .query_prototypes(&PrototypeQuery::new().with_strukturbericht("A1"))
        .await
        .unwrap();

    assert_eq!(prototypes.len(), 1);
    assert_eq!(prototypes[0].kind, EntryKind::GenericEntry);
    assert_eq!(prototypes[0].to_string(), "<GenericEntry #5:A-1>");
}

#[tokio::test]
async fn test_typed_comparator_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/comparisontypes"))
        .and(body_partial_json(json!({
            "param_type": "EOS",
            "param_name": "B0 difference",
            "cache_state": {},
            "token": TOKEN
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_dump": [{"__entry_type": "ComparisonType", "id": 4}],
            "cache_dump": {"ComparisonType": {"4": {"id": 4, "NAME": "B0 difference"}}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let comparators = rester
        .query_comparators(
            &ComparatorQuery::new()
                .with_property_type("EOS")
                .with_name("B0 difference"),
        )
        .await
        .unwrap();

    assert_eq!(comparators.len(), 1);
    assert_eq!(comparators[0].kind, EntryKind::ComparisonType);
    assert_eq!(comparators[0].to_string(), "<ComparisonType #4:B0 difference>");
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[tokio::test]
async fn test_401_is_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token"))
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let err = rester.query("prototypes", &HashMap::new()).await.unwrap_err();

    match err {
        Error::Authentication { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("Invalid token"));
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_403_is_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "Forbidden",
            "message": "Token revoked"
        })))
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let err = rester.query("prototypes", &HashMap::new()).await.unwrap_err();

    assert!(matches!(err, Error::Authentication { status: 403, ref message } if message == "Token revoked"));
}

#[tokio::test]
async fn test_404_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.0/nowhere"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let err = rester.query("/api/v1.0/nowhere", &HashMap::new()).await.unwrap_err();

    assert!(matches!(err, Error::NotFound { status: 404, .. }));
}

#[tokio::test]
async fn test_500_is_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal failure"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let err = rester.query("prototypes", &HashMap::new()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, Error::Service { .. }));
    assert!(err.to_string().contains("Internal failure"));
}

#[tokio::test]
async fn test_malformed_json_is_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let err = rester.query("prototypes", &HashMap::new()).await.unwrap_err();

    assert!(matches!(err, Error::Service { status: None, .. }));
    assert_eq!(err.status(), None);
    assert!(err.to_string().contains("Failed to parse JSON"));
}

#[tokio::test]
async fn test_timeout_is_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let rest_config = RestClientConfig::default().with_timeout(Duration::from_millis(100));
    let config = ResterConfig::new(mock_server.uri()).with_rest_config(rest_config);
    let rester = Rester::with_config(TOKEN, config).unwrap();

    let err = rester.query("prototypes", &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, Error::Service { status: None, .. }));
    assert!(err.to_string().contains("Timeout"));
}

#[tokio::test]
async fn test_connection_refused_is_service_error() {
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let rester = Rester::with_config(TOKEN, ResterConfig::new(uri)).unwrap();
    let err = rester.query("prototypes", &HashMap::new()).await.unwrap_err();

    assert!(matches!(err, Error::Service { status: None, .. }));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_queries_are_independent() {
    let first_server = MockServer::start().await;
    let second_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1, "name": "fcc"}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&first_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "name": "bcc"})))
        .expect(1)
        .mount(&second_server)
        .await;

    let first = rester_for(&first_server);
    let second = rester_for(&second_server);
    let params = HashMap::new();

    let (a, b) = tokio::join!(
        first.query("prototypes", &params),
        second.query("prototypes", &params)
    );

    assert_eq!(a.unwrap(), json!({"id": 1, "name": "fcc"}));
    assert_eq!(b.unwrap(), json!({"id": 2, "name": "bcc"}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cloned_rester_shares_transport_across_tasks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/generics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(4)
        .mount(&mock_server)
        .await;

    let rester = rester_for(&mock_server);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let rester = rester.clone();
            tokio::spawn(async move { rester.query("prototypes", &HashMap::new()).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), json!({"ok": true}));
    }
}
