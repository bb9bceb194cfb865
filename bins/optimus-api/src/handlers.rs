// HTTP route handlers for the judge API

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use optimus_common::types::{ExecutionOutcome, Language, TestCase};
use optimus_judge::evaluator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::{metrics, AppState};

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub input: Vec<TestCase>,
    /// Per-test-case timeout in milliseconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<ExecutionOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResponse {
    fn success(output: Vec<ExecutionOutcome>) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }
}

/// POST /run - Judge code against test cases
pub async fn run(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> (StatusCode, Json<RunResponse>) {
    judge(&state, "run", payload).await
}

/// POST /submit - Same contract as /run
pub async fn submit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> (StatusCode, Json<RunResponse>) {
    judge(&state, "submit", payload).await
}

async fn judge(
    state: &AppState,
    endpoint: &str,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> (StatusCode, Json<RunResponse>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(endpoint = endpoint, error = %rejection.body_text(), "Rejected request body");
            metrics::record_request_rejected("invalid_body");
            return (
                StatusCode::BAD_REQUEST,
                Json(RunResponse::failure(rejection.body_text())),
            );
        }
    };

    // Bounded label set for metrics
    let language_label = Language::from_str(&request.language)
        .map(|l| l.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let start_time = Instant::now();

    let result = state
        .judge
        .execute(&request.language, &request.code, &request.input, request.timeout)
        .await;
    let elapsed_ms = start_time.elapsed().as_millis() as f64;

    match result {
        Ok(outcomes) => {
            let summary = evaluator::summarize(&outcomes);
            info!(
                endpoint = endpoint,
                language = %language_label,
                passed = summary.passed,
                total = summary.total(),
                "Submission judged"
            );
            metrics::record_submission(&language_label, endpoint, "ok", elapsed_ms);
            metrics::record_verdicts(&language_label, &summary);

            (StatusCode::OK, Json(RunResponse::success(outcomes)))
        }
        Err(e) => {
            warn!(
                endpoint = endpoint,
                language = %request.language,
                error = %e,
                "Submission rejected"
            );
            metrics::record_submission(&language_label, endpoint, "rejected", elapsed_ms);

            (StatusCode::BAD_REQUEST, Json(RunResponse::failure(e.to_string())))
        }
    }
}

/// GET /health - Liveness with uptime
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let languages: Vec<String> = Language::all_variants()
        .iter()
        .map(|l| l.to_string())
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "OK",
            "uptime_seconds": state.start_time.elapsed().as_secs(),
            "languages": languages,
        })),
    )
}

/// GET /metrics - Prometheus text exposition
pub async fn prometheus_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render_metrics(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use optimus_common::config::Config;
    use optimus_judge::Judge;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = Arc::new(AppState {
            judge: Judge::new(Config::defaults()),
            start_time: Instant::now(),
        });
        Router::new().merge(routes::routes()).with_state(state)
    }

    async fn post_json(path: &str, body: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_run_success_shape() {
        let body = json!({
            "language": "scripted",
            "code": "function double(n) { return n * 2; }",
            "input": [{"args": 2, "expected": 4}, {"args": 3, "expected": 5}],
            "timeout": 1000
        });

        let (status, response) = post_json("/run", &body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response,
            json!({
                "success": true,
                "output": [
                    {"args": 2, "expected": 4, "output": 4, "result": true, "error": null},
                    {"args": 3, "expected": 5, "output": 6, "result": false, "error": null}
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_submit_matches_run() {
        let body = json!({
            "language": "javascript",
            "code": "function id(x) { return x; }",
            "input": [{"args": [[1, 2]], "expected": [1, 2]}]
        })
        .to_string();

        let (run_status, run_response) = post_json("/run", &body).await;
        let (submit_status, submit_response) = post_json("/submit", &body).await;

        assert_eq!(run_status, StatusCode::OK);
        assert_eq!(run_status, submit_status);
        assert_eq!(run_response, submit_response);
    }

    #[tokio::test]
    async fn test_unsupported_language_is_bad_request() {
        let body = json!({"language": "cobol", "code": "", "input": []}).to_string();

        let (status, response) = post_json("/run", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response,
            json!({"success": false, "error": "Unsupported language: cobol"})
        );
    }

    #[tokio::test]
    async fn test_missing_entry_point_is_bad_request() {
        let body = json!({
            "language": "js",
            "code": "const x = 1;",
            "input": [{"args": 1, "expected": 1}]
        })
        .to_string();

        let (status, response) = post_json("/submit", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["success"], json!(false));
        assert_eq!(
            response["error"],
            json!("No javascript entry point found in submitted code")
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, response) = post_json("/run", "{\"language\": ").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["success"], json!(false));
        assert!(response["error"].is_string());
    }

    #[tokio::test]
    async fn test_health_reports_uptime() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], json!("OK"));
        assert!(body["uptime_seconds"].is_u64());
        assert_eq!(body["languages"], json!(["javascript", "python", "java"]));
    }
}
