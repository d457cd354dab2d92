//! Cursor pagination tests across the supported page envelopes.
//!
//! These tests verify multi-page retrieval against a mock server:
//! - Cursor propagation between requests
//! - The `results`, `data`, and bare-array response shapes
//! - Termination on missing cursors and empty pages

mod common;

use common::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iga_sync::UserSyncService;

#[tokio::test]
async fn test_three_page_cursor_pagination() {
    let server = MockServer::start().await;

    // Cursor-specific mocks first so the catch-all serves only page one
    Mock::given(method("GET"))
        .and(path("/systemusers"))
        .and(query_param("cursor", "c2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(results_page(generate_users(5, 5), Some("c3"))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/systemusers"))
        .and(query_param("cursor", "c3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(results_page(generate_users(2, 10), None)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/systemusers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(results_page(generate_users(5, 0), Some("c2"))),
        )
        .mount(&server)
        .await;

    let mut service = UserSyncService::new(test_config(&server.uri())).unwrap();
    let users = service.retrieve_all_users().await.unwrap();

    assert_eq!(users.len(), 12);
    assert_eq!(users[0].id, "user-0");
    assert_eq!(users[11].id, "user-11");

    let stats = service.stats();
    assert_eq!(stats.api_calls, 3);
    assert_eq!(stats.total_users, 12);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_data_envelope_with_camel_case_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/systemusers"))
        .and(query_param("cursor", "d2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(data_page(generate_users(1, 3), None)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/systemusers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(data_page(generate_users(3, 0), Some("d2"))),
        )
        .mount(&server)
        .await;

    let mut service = UserSyncService::new(test_config(&server.uri())).unwrap();
    let users = service.retrieve_all_users().await.unwrap();

    assert_eq!(users.len(), 4);
    assert_eq!(users[3].id, "user-3");
    assert_eq!(service.stats().api_calls, 2);
}

#[tokio::test]
async fn test_bare_array_response_is_a_single_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/systemusers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(generate_users(3, 0))))
        .mount(&server)
        .await;

    let mut service = UserSyncService::new(test_config(&server.uri())).unwrap();
    let users = service.retrieve_all_users().await.unwrap();

    assert_eq!(users.len(), 3);
    assert_eq!(service.stats().api_calls, 1);
}

#[tokio::test]
async fn test_empty_page_with_cursor_terminates() {
    let server = MockServer::start().await;

    // A server that keeps handing out cursors with no records must not loop
    let responder = PaginatedResponder::new(vec![
        results_page(generate_users(2, 0), Some("c2")),
        json!({ "results": [], "next_cursor": "c3" }),
    ]);

    Mock::given(method("GET"))
        .and(path("/systemusers"))
        .respond_with(responder)
        .mount(&server)
        .await;

    let mut service = UserSyncService::new(test_config(&server.uri())).unwrap();
    let users = service.retrieve_all_users().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(service.stats().api_calls, 2);
}

#[tokio::test]
async fn test_exact_page_boundary_fetches_trailing_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/systemusers"))
        .and(query_param("limit", "2"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_page(vec![], None)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/systemusers"))
        .and(query_param("limit", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(results_page(generate_users(2, 0), Some("c2"))),
        )
        .mount(&server)
        .await;

    let config = test_config(&server.uri()).with_page_size(2);
    let mut service = UserSyncService::new(config).unwrap();
    let users = service.retrieve_all_users().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(service.stats().api_calls, 2);
}
