//! Tests for the source stage

use super::open_meteo::parse_hourly;
use super::*;
use arrow::array::Array;
use crate::batch::{column_names, float_column, string_column};
use crate::config::SourceConfig;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer) -> OpenMeteoSource {
    OpenMeteoSource::new(SourceConfig {
        endpoint: format!("{}/v1/forecast", server.uri()),
        latitude: 52.52,
        longitude: 13.41,
        ..SourceConfig::default()
    })
    .unwrap()
}

// ============================================================================
// Parsing Tests
// ============================================================================

#[test]
fn test_parse_hourly_columns_and_rows() {
    let batch = parse_hourly(json!({
        "latitude": 52.52,
        "hourly": {
            "time": ["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-01T02:00"],
            "temperature_2m": [1.5, 1.2, 0.9],
            "relativehumidity_2m": [90, 91, 93]
        }
    }))
    .unwrap();

    assert_eq!(batch.num_rows(), 3);
    assert_eq!(column_names(&batch), vec!["time", "temp", "humidity"]);
    assert_eq!(
        string_column(&batch, "time").unwrap().value(2),
        "2024-01-01T02:00"
    );
    assert_eq!(
        float_column(&batch, "humidity").unwrap().values().to_vec(),
        vec![90.0, 91.0, 93.0]
    );
}

#[test]
fn test_parse_hourly_nulls() {
    let batch = parse_hourly(json!({
        "hourly": {
            "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
            "temperature_2m": [null, 3.0],
            "relativehumidity_2m": [70, null]
        }
    }))
    .unwrap();

    let temp = float_column(&batch, "temp").unwrap();
    assert!(temp.is_null(0));
    assert_eq!(temp.value(1), 3.0);
    assert!(float_column(&batch, "humidity").unwrap().is_null(1));
}

#[test]
fn test_parse_hourly_empty() {
    let batch = parse_hourly(json!({
        "hourly": {"time": [], "temperature_2m": [], "relativehumidity_2m": []}
    }))
    .unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 3);
}

#[test]
fn test_parse_hourly_length_mismatch() {
    let err = parse_hourly(json!({
        "hourly": {
            "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
            "temperature_2m": [1.0],
            "relativehumidity_2m": [50, 60]
        }
    }))
    .unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(err.to_string().contains("temperature_2m=1"));
}

#[test]
fn test_parse_hourly_missing_block() {
    let err = parse_hourly(json!({"latitude": 52.52})).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn test_parse_hourly_missing_array() {
    let err = parse_hourly(json!({
        "hourly": {"time": ["2024-01-01T00:00"], "temperature_2m": [1.0]}
    }))
    .unwrap_err();
    assert!(err.to_string().contains("relativehumidity_2m"));
}

// ============================================================================
// HTTP Tests
// ============================================================================

#[tokio::test]
async fn test_extract_sends_query_and_builds_batch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.41"))
        .and(query_param("hourly", "temperature_2m,relativehumidity_2m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hourly": {
                "time": ["2024-01-01T00:00", "2024-01-01T12:00"],
                "temperature_2m": [10.0, 20.0],
                "relativehumidity_2m": [80, 40]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server);
    assert_eq!(source.name(), "open-meteo");

    let batch = source.extract().await.unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(column_names(&batch), vec!["time", "temp", "humidity"]);
}

#[tokio::test]
async fn test_extract_propagates_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server);
    let err = source.extract().await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

#[test]
fn test_new_rejects_bad_endpoint() {
    let result = OpenMeteoSource::new(SourceConfig {
        endpoint: "::nope::".to_string(),
        ..SourceConfig::default()
    });
    assert!(result.is_err());
}

#[test]
fn test_coordinates() {
    let source = OpenMeteoSource::new(SourceConfig {
        latitude: -23.55,
        longitude: -46.63,
        ..SourceConfig::default()
    })
    .unwrap();
    let coords = source.coordinates();
    assert_eq!(coords.latitude, -23.55);
    assert_eq!(coords.longitude, -46.63);
}
