//! `RestTableSource` against a local PostgREST stand-in.

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use payhuk_query::{
    CacheRead, QueryClient, QueryError, RestConfig, RestTableSource, TableQuery, TableSource,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<(HeaderMap, Option<String>)>>>,
}

async fn products(
    State(seen): State<Seen>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Json<Value> {
    seen.requests.lock().unwrap().push((headers, query));
    Json(json!([{"id": "p1", "name": "Ebook"}]))
}

async fn forbidden() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "JWT expired"})),
    )
}

async fn garbled() -> &'static str {
    "<html>gateway</html>"
}

async fn serve(seen: Seen) -> String {
    let router = Router::new()
        .route("/rest/v1/products", get(products))
        .route("/rest/v1/orders", get(forbidden))
        .route("/rest/v1/broken", get(garbled))
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_select_returns_rows_and_sends_credentials() {
    let seen = Seen::default();
    let base = serve(seen.clone()).await;
    let source = RestTableSource::new(
        RestConfig::new(base, "anon-key").with_access_token("user-session"),
    )
    .unwrap();

    let query = TableQuery::new("products")
        .with_eq("store_id", "s1")
        .with_limit(5);
    let rows = source.select(&query).await.unwrap();

    assert_eq!(rows, json!([{"id": "p1", "name": "Ebook"}]));

    let requests = seen.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (headers, raw_query) = &requests[0];
    assert_eq!(headers["apikey"], "anon-key");
    assert_eq!(headers["authorization"], "Bearer user-session");
    assert_eq!(
        raw_query.as_deref(),
        Some("select=*&store_id=eq.s1&limit=5")
    );
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let base = serve(Seen::default()).await;
    let source = RestTableSource::new(RestConfig::new(base, "anon-key")).unwrap();

    let err = source.select(&TableQuery::new("orders")).await.unwrap_err();

    match err {
        QueryError::Upstream { status, message } => {
            assert_eq!(status, Some(401));
            assert!(message.contains("JWT expired"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let base = serve(Seen::default()).await;
    let source = RestTableSource::new(RestConfig::new(base, "anon-key")).unwrap();

    let err = source.select(&TableQuery::new("broken")).await.unwrap_err();

    assert!(matches!(err, QueryError::Decode { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_backend_is_upstream_error_without_status() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source =
        RestTableSource::new(RestConfig::new(format!("http://{}", addr), "anon-key")).unwrap();
    let err = source.select(&TableQuery::new("products")).await.unwrap_err();

    assert!(matches!(err, QueryError::Upstream { status: None, .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_facade_caches_rest_rows() {
    let seen = Seen::default();
    let base = serve(seen.clone()).await;
    let source = RestTableSource::new(RestConfig::new(base, "anon-key")).unwrap();
    let client = QueryClient::with_defaults();
    let query = TableQuery::new("products");

    let first: CacheRead<Value> = client.query_table(&source, &query, None).await.unwrap();
    let second: CacheRead<Value> = client.query_table(&source, &query, None).await.unwrap();

    assert!(first.was_cache_miss());
    assert!(second.was_cache_hit());
    assert_eq!(seen.requests.lock().unwrap().len(), 1);
}
