//! Upstream client tests using wiremock.
//!
//! Verifies the fallback strategy: one relaxed retry on confirmed "no exact
//! match" signals, immediate propagation of everything else.

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use country_gateway::client::CountriesClient;
use country_gateway::config::Config;
use country_gateway::error::UpstreamError;

fn setup_client(mock_server: &MockServer) -> CountriesClient {
    let config = Config::for_testing(&mock_server.uri());
    CountriesClient::new(&config).unwrap()
}

fn sample_country(name: &str) -> serde_json::Value {
    json!({
        "name": {"common": name, "official": format!("Republic of {name}")},
        "cca2": "XX",
        "cca3": "XXX",
        "population": 1_000_000,
        "region": "Somewhere",
        "capital": ["Capital City"],
        "latlng": [1.0, 2.0]
    })
}

#[tokio::test]
async fn test_exact_match_needs_no_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/name/france"))
        .and(query_param("fullText", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([sample_country("France")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The relaxed form must never be issued.
    Mock::given(method("GET"))
        .and(path("/name/france"))
        .and(query_param_is_missing("fullText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let countries = client.fetch_by_name("france").await.unwrap();

    assert_eq!(countries.len(), 1);
    assert_eq!(countries[0].common_name(), "France");
}

#[tokio::test]
async fn test_fallback_on_400_surfaces_second_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/name/congo"))
        .and(query_param("fullText", "true"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/name/congo"))
        .and(query_param_is_missing("fullText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            sample_country("Republic of the Congo"),
            sample_country("DR Congo"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let countries = client.fetch_by_name("congo").await.unwrap();

    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0].common_name(), "Republic of the Congo");
}

#[tokio::test]
async fn test_fallback_on_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/name/united"))
        .and(query_param("fullText", "true"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/name/united"))
        .and(query_param_is_missing("fullText"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([sample_country("United Kingdom")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let countries = client.fetch_by_name("united").await.unwrap();

    assert_eq!(countries[0].common_name(), "United Kingdom");
}

#[tokio::test]
async fn test_500_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/name/congo"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let err = client.fetch_by_name("congo").await.unwrap_err();

    assert!(matches!(err, UpstreamError::Status { status: 500, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_empty_fallback_result_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/name/atlantis"))
        .and(query_param("fullText", "true"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/name/atlantis"))
        .and(query_param_is_missing("fullText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let err = client.fetch_by_name("atlantis").await.unwrap_err();

    assert!(matches!(err, UpstreamError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_404_on_both_attempts_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/name/atlantis"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let err = client.fetch_by_name("atlantis").await.unwrap_err();

    assert!(matches!(err, UpstreamError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_fetch_all_single_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            sample_country("France"),
            sample_country("Germany"),
            sample_country("Italy"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let countries = client.fetch_all().await.unwrap();

    assert_eq!(countries.len(), 3);
}

#[tokio::test]
async fn test_fetch_all_propagates_upstream_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/all"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let err = client.fetch_all().await.unwrap_err();

    assert!(matches!(err, UpstreamError::Status { status: 503, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_upstream_is_transport_error() {
    // Nothing listens here; the connection itself fails.
    let config = Config::for_testing("http://127.0.0.1:9");
    let client = CountriesClient::new(&config).unwrap();

    let err = client.fetch_all().await.unwrap_err();
    assert!(matches!(err, UpstreamError::Http(_)), "got {err:?}");

    use country_gateway::error::GatewayError;
    let classified: GatewayError = err.into();
    assert!(matches!(classified, GatewayError::UpstreamUnavailable { .. }), "got {classified:?}");
}

#[tokio::test]
async fn test_malformed_json_errors_gracefully() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/all"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ invalid json here"))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let result = client.fetch_all().await;

    assert!(result.is_err(), "malformed body must error, not panic");
}

#[tokio::test]
async fn test_name_with_spaces_is_percent_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/name/united%20states"))
        .and(query_param("fullText", "true"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([sample_country("United States")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let countries = client.fetch_by_name("united states").await.unwrap();

    assert_eq!(countries[0].common_name(), "United States");
}
