use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::warn;

use playtrace_common::Event;
use playtrace_store::{ArcAnalyticsStore, EventWriter, QueryGateway};

pub struct AppState {
    pub writer: EventWriter,
    pub gateway: QueryGateway,
    pub analytics: ArcAnalyticsStore,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/addEvent/{namespace}", post(add_event))
        .route("/query", post(run_query))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

const WELCOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>playtrace</title></head>
<body>
<h2>Welcome to the playtrace event tracker API</h2>
<p>POST /addEvent/{game} to record events, POST /query to run analytics queries.</p>
</body>
</html>"#;

async fn welcome() -> Html<&'static str> {
    Html(WELCOME_PAGE)
}

#[derive(Deserialize)]
struct QueryRequest {
    query_type: String,
    query: String,
}

/// Bodies are parsed by hand so malformed JSON follows the same 409 error
/// contract as every other request failure.
async fn add_event(
    State(state): State<Arc<AppState>>,
    Path(namespace): Path<String>,
    body: Bytes,
) -> Response {
    if let Err(error) = state.analytics.ping().await {
        warn!(%error, "analytics ping failed before ingest");
    }

    let event: Event = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => return error_response(format!("invalid event body: {e}")),
    };

    match state.writer.write(&namespace, &event).await {
        Ok(ack) => {
            let mut body = json!({"status": "ok"});
            if let Some(mirror_error) = ack.mirror_error {
                body["mirror_error"] = json!(mirror_error);
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(e.to_string()),
    }
}

async fn run_query(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: QueryRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return error_response(format!("invalid query body: {e}")),
    };

    match request.query_type.as_str() {
        "select" => match state.gateway.query_select(&request.query).await {
            Ok(rows) => (StatusCode::OK, Json(json!(rows))).into_response(),
            Err(e) => error_response(e.to_string()),
        },
        "exec" => match state.gateway.query_exec(&request.query).await {
            Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))).into_response(),
            Err(e) => error_response(e.to_string()),
        },
        _ => error_response("undefined query_type".to_string()),
    }
}

fn error_response(message: String) -> Response {
    (StatusCode::CONFLICT, Json(json!({"error": message}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use playtrace_store::testutil::{MockAnalytics, MockDocuments};
    use playtrace_store::SqlValue;

    fn test_state() -> (Arc<MockAnalytics>, Arc<MockDocuments>, Arc<AppState>) {
        let analytics = Arc::new(MockAnalytics::default());
        let documents = Arc::new(MockDocuments::default());
        let state = Arc::new(AppState {
            writer: EventWriter::new(analytics.clone(), documents.clone()),
            gateway: QueryGateway::new(analytics.clone()),
            analytics: analytics.clone(),
        });
        (analytics, documents, state)
    }

    async fn post_json(state: Arc<AppState>, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = router(state)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const SAMPLE_EVENT: &str = r#"{
        "player_id": "p1",
        "event_type": "login",
        "date_time": 1700000000,
        "event_data": {"x": 1}
    }"#;

    #[tokio::test]
    async fn first_event_provisions_and_writes_both_stores() {
        let (analytics, documents, state) = test_state();

        let (status, body) = post_json(state, "/addEvent/game1", SAMPLE_EVENT).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));

        let ddl = analytics.executed();
        assert_eq!(ddl.len(), 1);
        assert!(ddl[0].starts_with("CREATE TABLE IF NOT EXISTS game1"));
        assert_eq!(documents.indexes().len(), 2);

        let rows = analytics.inserted();
        assert_eq!(rows.len(), 1);
        let (_, values) = &rows[0];
        // date_time decodes to the corresponding timestamp...
        assert!(matches!(values[5], SqlValue::Timestamp(ts) if ts.timestamp() == 1_700_000_000));
        // ...and event_data is stored as serialized text in the analytics row.
        assert_eq!(values[2], SqlValue::Text("{\"x\":1}".into()));

        let docs = documents.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "game1");
        assert!(docs[0].1.get_document("event_data").is_ok());
    }

    #[tokio::test]
    async fn second_event_skips_provisioning() {
        let (analytics, _, state) = test_state();

        post_json(state.clone(), "/addEvent/game1", SAMPLE_EVENT).await;
        post_json(state, "/addEvent/game1", SAMPLE_EVENT).await;

        assert_eq!(analytics.executed().len(), 1);
        assert_eq!(analytics.inserted().len(), 2);
    }

    #[tokio::test]
    async fn mirror_failure_still_reports_success() {
        let (analytics, documents, state) = test_state();
        documents.fail_insert(true);

        let (status, body) = post_json(state, "/addEvent/game1", SAMPLE_EVENT).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["mirror_error"].is_string());
        assert_eq!(analytics.inserted().len(), 1);
    }

    #[tokio::test]
    async fn analytics_failure_maps_to_conflict() {
        let (analytics, documents, state) = test_state();
        analytics.fail_insert(true);

        let (status, body) = post_json(state, "/addEvent/game1", SAMPLE_EVENT).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("analytics insert failed"));
        assert!(documents.documents().is_empty());
    }

    #[tokio::test]
    async fn type_mismatch_maps_to_conflict_and_touches_no_store() {
        let (analytics, documents, state) = test_state();

        let (status, body) = post_json(
            state,
            "/addEvent/game1",
            r#"{"player_id":"p1","event_data":5}"#,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("event_data"));
        assert!(analytics.inserted().is_empty());
        assert!(documents.documents().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_maps_to_conflict() {
        let (_, _, state) = test_state();
        let (status, body) = post_json(state, "/addEvent/game1", "{not json").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn invalid_namespace_is_rejected() {
        let (analytics, _, state) = test_state();
        let (status, _) = post_json(state, "/addEvent/bad-name", SAMPLE_EVENT).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(analytics.executed().is_empty());
    }

    #[tokio::test]
    async fn query_select_returns_row_mappings() {
        let (analytics, _, state) = test_state();
        let mut row = serde_json::Map::new();
        row.insert("player_id".to_string(), json!("p1"));
        analytics.set_select_rows(vec![row]);

        let (status, body) = post_json(
            state,
            "/query",
            r#"{"query_type":"select","query":"SELECT player_id FROM game1"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"player_id": "p1"}]));
    }

    #[tokio::test]
    async fn query_exec_acknowledges() {
        let (analytics, _, state) = test_state();
        let (status, body) = post_json(
            state,
            "/query",
            r#"{"query_type":"exec","query":"OPTIMIZE TABLE game1"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
        assert_eq!(analytics.executed(), vec!["OPTIMIZE TABLE game1".to_string()]);
    }

    #[tokio::test]
    async fn unknown_query_type_is_rejected() {
        let (_, _, state) = test_state();
        let (status, body) = post_json(state, "/query", r#"{"query_type":"drop","query":"x"}"#).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"error": "undefined query_type"}));
    }

    #[tokio::test]
    async fn welcome_page_is_served() {
        let (_, _, state) = test_state();
        let resp = router(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(bytes.to_vec())
            .unwrap()
            .contains("event tracker API"));
    }
}
