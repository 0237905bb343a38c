//! Upstream adapter integration tests
//!
//! Points the clients at a local mock server speaking each provider's
//! wire format and checks the normalized output.

use axum::{extract::Query, routing::get, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;

use plantarium_common::records::PlantSource;
use plantarium_web::services::{PerenualClient, TrefleClient};

/// Serve a router on an ephemeral local port, returning its base URL
async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn trefle_search_normalizes_and_sends_credentials() {
    let router = Router::new().route(
        "/plants/search",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(params.get("token").map(String::as_str), Some("trefle-key"));
            assert_eq!(params.get("q").map(String::as_str), Some("monstera"));
            Json(json!({
                "data": [
                    {
                        "id": 192740,
                        "slug": "monstera-deliciosa",
                        "scientific_name": "Monstera deliciosa",
                        "common_name": "Swiss cheese plant",
                        "family": "Araceae",
                        "family_common_name": "Arum family",
                        "genus": "Monstera",
                        "image_url": "https://img.example/m.jpg",
                        "author": "Liebm.",
                        "year": 1849,
                        "synonyms": ["Philodendron pertusum"]
                    },
                    { "id": 1, "common_name": "nameless" }
                ],
                "meta": { "total": 2 }
            }))
        }),
    );
    let base_url = spawn_mock(router).await;

    let client = TrefleClient::new(Some("trefle-key".to_string()))
        .unwrap()
        .with_base_url(base_url);
    let records = client.search("monstera").await.unwrap();

    // The entry without a scientific name was dropped
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.scientific_name, "Monstera deliciosa");
    assert_eq!(record.source, Some(PlantSource::Trefle));
    assert_eq!(record.trefle_id, Some(192740));
    assert_eq!(record.slug.as_deref(), Some("monstera-deliciosa"));
    assert_eq!(record.year, Some(1849));
}

#[tokio::test]
async fn trefle_empty_query_falls_back_to_demo_search() {
    let router = Router::new().route(
        "/plants/search",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(params.get("q").map(String::as_str), Some("alocasia"));
            Json(json!({ "data": [] }))
        }),
    );
    let base_url = spawn_mock(router).await;

    let client = TrefleClient::new(Some("trefle-key".to_string()))
        .unwrap()
        .with_base_url(base_url);
    let records = client.search("").await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn trefle_upstream_failure_is_an_api_error() {
    let router = Router::new().route(
        "/plants/search",
        get(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream broke") }),
    );
    let base_url = spawn_mock(router).await;

    let client = TrefleClient::new(Some("trefle-key".to_string()))
        .unwrap()
        .with_base_url(base_url);

    let error = client.search("monstera").await.unwrap_err();
    assert!(error.to_string().contains("502"));
}

#[tokio::test]
async fn perenual_search_reshapes_the_response() {
    let router = Router::new().route(
        "/v2/species-list",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(params.get("key").map(String::as_str), Some("perenual-key"));
            Json(json!({
                "data": [
                    {
                        "id": 3,
                        "common_name": "monstera",
                        "scientific_name": ["Monstera deliciosa", "Monstera borsigiana"],
                        "family": "Araceae",
                        "genus": "Monstera",
                        "default_image": {
                            "regular_url": "https://perenual.example/regular/m.jpg",
                            "original_url": "https://perenual.example/og/m.jpg"
                        }
                    }
                ],
                "total": 1
            }))
        }),
    );
    let base_url = spawn_mock(router).await;

    let client = PerenualClient::new(Some("perenual-key".to_string()))
        .unwrap()
        .with_base_url(base_url);
    let records = client.search("monstera").await.unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.scientific_name, "Monstera deliciosa");
    assert_eq!(record.source, Some(PlantSource::Perenual));
    assert_eq!(record.perenual_id, Some(3));
    assert_eq!(
        record.image_url.as_deref(),
        Some("https://perenual.example/regular/m.jpg")
    );

    // Uniform shape: the fields Perenual never returns serialize as nulls
    let serialized = serde_json::to_value(record).unwrap();
    for field in ["year", "author", "bibliography", "synonyms", "family_common_name"] {
        assert_eq!(serialized[field], Value::Null, "{}", field);
    }
}

#[tokio::test]
async fn perenual_care_guide_is_fetched_and_parsed() {
    let router = Router::new().route(
        "/species-care-guide-list",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(params.get("species_id").map(String::as_str), Some("3"));
            assert_eq!(params.get("page").map(String::as_str), Some("1"));
            Json(json!({
                "data": [
                    {
                        "id": 55,
                        "species_id": 3,
                        "section": [
                            { "id": 1, "type": "watering", "description": "Water weekly." },
                            { "id": 2, "type": "sunlight", "description": "part shade, full sun" },
                            { "id": 3, "type": "pruning", "description": "Prune in spring." },
                            { "id": 4, "type": "hardiness", "description": "Zones 10 to 12" }
                        ]
                    }
                ]
            }))
        }),
    );
    let base_url = spawn_mock(router).await;

    let client = PerenualClient::new(Some("perenual-key".to_string()))
        .unwrap()
        .with_base_url(base_url);
    let guide = client.fetch_care_guide(3).await.unwrap().unwrap();

    assert_eq!(guide.watering.as_deref(), Some("Water weekly."));
    assert_eq!(
        guide.sunlight,
        Some(vec!["part shade".to_string(), "full sun".to_string()])
    );
    assert_eq!(guide.pruning.as_deref(), Some("Prune in spring."));
    assert_eq!(guide.hardiness.min.as_deref(), Some("10"));
    assert_eq!(guide.hardiness.max.as_deref(), Some("12"));
}

#[tokio::test]
async fn perenual_missing_care_guide_is_none() {
    let router = Router::new().route(
        "/species-care-guide-list",
        get(|| async { Json(json!({ "data": [] })) }),
    );
    let base_url = spawn_mock(router).await;

    let client = PerenualClient::new(Some("perenual-key".to_string()))
        .unwrap()
        .with_base_url(base_url);

    assert!(client.fetch_care_guide(42).await.unwrap().is_none());
}
