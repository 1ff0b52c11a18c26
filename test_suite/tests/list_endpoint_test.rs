// FilterOptions through an axum list endpoint
// Query parameters decode into criteria, search, sort and pagination; errors map to status codes

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

mod common;
use common::{CustomerPage, setup_test_app, setup_test_db};

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn encode(value: &str) -> String {
    url_escape::encode_component(value).to_string()
}

async fn get_page(uri: &str) -> CustomerPage {
    let (status, body) = get(uri).await;
    if status != StatusCode::OK {
        panic!(
            "Expected 200 OK for {uri}, got {status}: {}",
            String::from_utf8_lossy(&body)
        );
    }
    serde_json::from_slice(&body).expect("Failed to parse customer page")
}

async fn get_error(uri: &str, expected: StatusCode) -> String {
    let (status, body) = get(uri).await;
    assert_eq!(status, expected, "body: {}", String::from_utf8_lossy(&body));
    let body: Value = serde_json::from_slice(&body).expect("Failed to parse error body");
    body["error"].as_str().expect("error message").to_string()
}

#[tokio::test]
async fn test_default_list() {
    let page = get_page("/customers").await;
    assert_eq!(page.total, 6);
    assert_eq!(page.items.len(), 6);
}

#[tokio::test]
async fn test_filter_parameter() {
    let filter = encode(r#"{"age": {"gte": 30}, "deleted_at": null}"#);
    let page = get_page(&format!("/customers?filter={filter}")).await;
    assert_eq!(page.total, 2);
    let mut names: Vec<String> = page.items.into_iter().map(|c| c.name).collect();
    names.sort();
    assert_eq!(names, vec!["Alice Smith", "Carol Smith"]);
}

#[tokio::test]
async fn test_search_parameter() {
    let page = get_page("/customers?q=smith").await;
    assert_eq!(page.total, 3);

    let page = get_page("/customers?q=alice%20bob&search_mode=or").await;
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_sort_and_page_parameters() {
    let page = get_page("/customers?sort_by=age&order=DESC&page=2&per_page=2").await;
    assert_eq!(page.total, 6);
    let ages: Vec<i32> = page.items.iter().map(|c| c.age).collect();
    assert_eq!(ages, vec![34, 29]);
}

#[tokio::test]
async fn test_range_parameter() {
    let sort = encode(r#"["name","ASC"]"#);
    let range = encode("[1,2]");
    let page = get_page(&format!("/customers?sort={sort}&range={range}")).await;
    let names: Vec<&str> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Bob Jones", "Carol Smith"]);
}

#[tokio::test]
async fn test_invalid_filter_json_is_bad_request() {
    let filter = encode("{not json");
    let message = get_error(&format!("/customers?filter={filter}"), StatusCode::BAD_REQUEST).await;
    assert!(message.starts_with("Malformed criterion"), "message: {message}");
}

#[tokio::test]
async fn test_unknown_operator_is_bad_request() {
    let filter = encode(r#"{"age": {"foo": 1}}"#);
    let message = get_error(&format!("/customers?filter={filter}"), StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Unsupported operator 'foo' on field 'age'");
}

#[tokio::test]
async fn test_invalid_between_is_bad_request() {
    let filter = encode(r#"{"age": {"between": [1, 2, 3]}}"#);
    let message = get_error(&format!("/customers?filter={filter}"), StatusCode::BAD_REQUEST).await;
    assert_eq!(
        message,
        "Invalid value for 'between' on field 'age': expected exactly 2 values"
    );
}

#[tokio::test]
async fn test_database_error_is_sanitized() {
    let filter = encode(r#"{"secret_column": 1}"#);
    let message = get_error(
        &format!("/customers?filter={filter}"),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .await;
    assert_eq!(message, "A database error occurred");
}
