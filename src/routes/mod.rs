//! Router assembly: HTTP endpoints, SSE streaming, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod sse;

/// Build the application router with:
/// - JSON API under `/api/...`
/// - SSE mentor stream at `/api/conversations/:id/messages`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers); adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/api/health", get(http::http_health))
        // Curriculum
        .route("/api/topics", get(http::http_list_topics))
        .route("/api/topics/:slug", get(http::http_get_topic))
        .route("/api/problems/:id", get(http::http_get_problem))
        // Workspace
        .route("/api/problems/:id/render", get(http::http_render_problem))
        .route("/api/problems/:id/boilerplate/:language", get(http::http_get_boilerplate))
        .route("/api/problems/:id/code/:language", get(http::http_get_code))
        .route("/api/problems/:id/run", post(http::http_post_run))
        .route("/api/problems/:id/submit", post(http::http_post_submit))
        .route("/api/leaderboard", get(http::http_get_leaderboard))
        .route("/api/inputs/parse", post(http::http_post_parse_inputs))
        // Mentor
        .route("/api/ai/chat", post(http::http_post_chat))
        .route("/api/conversations", post(http::http_create_conversation))
        .route("/api/conversations/:id", get(http::http_get_conversation))
        .route("/api/conversations/:id/messages", post(sse::sse_post_message))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::seeds::seed_curriculum;

    const TWO_SUM: &str = "arrays-and-hashing-two-sum";

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::from_parts(&AppConfig::default(), seed_curriculum(), None));
        (build_router(state.clone()), state)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = send(app, Request::get(uri).body(Body::empty()).unwrap()).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
        let req = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, req).await
    }

    #[tokio::test]
    async fn health_and_topics() {
        let (app, _) = app();
        let (status, health) = get_json(&app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["problems"], 2);
        assert_eq!(health["runner"], false);

        let (_, topics) = get_json(&app, "/api/topics").await;
        assert_eq!(topics[0]["slug"], "arrays-and-hashing");
        assert_eq!(topics[0]["problemCount"], 2);

        let (_, topic) = get_json(&app, "/api/topics/arrays-and-hashing").await;
        assert_eq!(topic["problems"][0]["id"], TWO_SUM);
        assert_eq!(topic["problems"][0]["badge"]["label"], "Easy");

        let (status, err) = get_json(&app, "/api/topics/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["error"], "topic 'nope' not found");
    }

    #[tokio::test]
    async fn problem_hides_hidden_cases() {
        let (app, _) = app();
        let (status, p) = get_json(&app, &format!("/api/problems/{TWO_SUM}")).await;
        assert_eq!(status, StatusCode::OK);
        let cases = p["testCases"].as_array().unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0]["input"], "nums = [2, 7, 11, 15], target = 9");
        assert_eq!(cases[2], json!({"index": 2, "hidden": true}));
    }

    #[tokio::test]
    async fn render_boilerplate_and_code() {
        let (app, _) = app();
        let (_, r) = get_json(&app, &format!("/api/problems/{TWO_SUM}/render?language=java")).await;
        assert_eq!(r["language"], "java");
        assert!(r["workedExample"]["html"].as_str().unwrap().contains("<table"));

        let (_, b) = get_json(&app, &format!("/api/problems/{TWO_SUM}/boilerplate/cpp")).await;
        assert!(b["code"].as_str().unwrap().starts_with("class Solution {"));

        let (status, c) = get_json(&app, &format!("/api/problems/{TWO_SUM}/code/python?type=solution")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(c["code"].as_str().unwrap().contains("def twoSum"));

        let (status, _) = get_json(&app, &format!("/api/problems/{TWO_SUM}/code/java")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get_json(&app, &format!("/api/problems/{TWO_SUM}/boilerplate/cobol")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn submit_without_runner_lands_on_leaderboard_only_when_accepted() {
        let (app, state) = app();
        let (status, body) = post_json(
            &app,
            &format!("/api/problems/{TWO_SUM}/submit"),
            json!({"code": "pass", "language": "python", "userId": "ann"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["status"], "runner_unavailable");
        assert_eq!(v["results"].as_array().unwrap().len(), 3);
        assert_eq!(state.submissions_snapshot().await.len(), 1);

        let (_, board) = get_json(&app, "/api/leaderboard").await;
        assert_eq!(board, json!([]));

        let (_, body) = post_json(&app, &format!("/api/problems/{TWO_SUM}/run"), json!({"code": "", "language": "js"})).await;
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["results"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn parse_inputs_endpoint() {
        let (app, _) = app();
        let (_, body) = post_json(&app, "/api/inputs/parse", json!({"input": "3\n1 2 3"})).await;
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["converted"], "n = 3\narr = [1, 2, 3]");
    }

    #[tokio::test]
    async fn chat_uses_stub_without_openai() {
        let (app, _) = app();
        let (status, body) =
            post_json(&app, "/api/ai/chat", json!({"message": "hint please", "context": {"page": "problem"}})).await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert!(v["response"].as_str().unwrap().starts_with("Here's a nudge"));
    }

    #[tokio::test]
    async fn conversation_streams_sse_and_stores_reply() {
        let (app, _) = app();
        let (_, body) = post_json(&app, "/api/conversations", json!({})).await;
        let id = serde_json::from_slice::<Value>(&body).unwrap()["id"].as_str().unwrap().to_string();

        let (status, body) =
            post_json(&app, &format!("/api/conversations/{id}/messages"), json!({"content": "I have a bug"})).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("data: {\"content\":"), "{text}");
        assert!(text.trim_end().ends_with("data: [DONE]"), "{text}");

        let (_, conv) = get_json(&app, &format!("/api/conversations/{id}")).await;
        let messages = conv["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["role"], "assistant");

        let (status, _) = post_json(&app, "/api/conversations/missing/messages", json!({"content": "hi"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
