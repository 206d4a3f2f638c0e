//! HTTP API for generating pseudorandom sequences and testing them.
//!
//! Stateless: every request carries its own parameters or values, and nothing
//! is remembered between requests.

use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use prngbench_core::{GeneratorParameters, NormalSample, ScaleRange, Sequence};
use prngbench_tests::{DEFAULT_ALPHA, SuiteResults, TestSuiteConfig};

/// Upper bound on `count` for generation requests.
pub const MAX_COUNT: usize = 100_000;

const DEFAULT_COUNT: usize = 100;

/// Shared server state.
struct AppState {
    max_count: usize,
}

#[derive(Debug, Deserialize)]
struct NormalParams {
    mean: f64,
    std_dev: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(flatten)]
    params: GeneratorParameters,
    count: Option<usize>,
    /// Scale every `Ri` into this interval.
    range: Option<ScaleRange>,
    /// Box-Muller normal deviates from consecutive value pairs.
    normal: Option<NormalParams>,
}

#[derive(Debug, Deserialize)]
struct TestsRequest {
    values: Vec<f64>,
    alpha: Option<f64>,
    #[serde(default = "TestSuiteConfig::all")]
    tests: TestSuiteConfig,
    #[serde(default)]
    parallel: bool,
}

#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    #[serde(flatten)]
    params: GeneratorParameters,
    count: Option<usize>,
    range: Option<ScaleRange>,
    alpha: Option<f64>,
    #[serde(default = "TestSuiteConfig::all")]
    tests: TestSuiteConfig,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(flatten)]
    data: Option<T>,
    /// Error message if the request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateData {
    sequence: Sequence,
    /// Present when the sequence stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    normal: Option<Vec<NormalSample>>,
}

#[derive(Debug, Serialize)]
struct TestsData {
    sample_size: usize,
    alpha: f64,
    approved: usize,
    total: usize,
    results: SuiteResults,
}

#[derive(Debug, Serialize)]
struct EvaluateData {
    sequence: Sequence,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
    #[serde(flatten)]
    tests: TestsData,
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

trait JsonWithStatus<T> {
    fn with_status(self, status: StatusCode) -> (StatusCode, Json<T>);
}

impl<T> JsonWithStatus<T> for Json<T> {
    fn with_status(self, status: StatusCode) -> (StatusCode, Json<T>) {
        (status, self)
    }
}

fn ok<T>(data: T) -> ApiResult<T> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    })
    .with_status(StatusCode::OK)
}

fn bad_request<T>(error: impl std::fmt::Display) -> ApiResult<T> {
    let error = error.to_string();
    log::info!("rejected request: {error}");
    Json(ApiResponse {
        success: false,
        data: None,
        error: Some(error),
    })
    .with_status(StatusCode::BAD_REQUEST)
}

/// Generate, then optionally scale into `range`.
fn build_sequence(
    params: &GeneratorParameters,
    count: usize,
    range: Option<ScaleRange>,
) -> Result<Sequence, prngbench_core::GeneratorError> {
    let mut sequence = prngbench_core::generate(params, count)?;
    if let Some(range) = range {
        sequence.scale_into(range)?;
    }
    Ok(sequence)
}

fn notice(sequence: &Sequence) -> Option<String> {
    sequence.degeneracy.map(|d| {
        format!(
            "sequence stopped after {} of {} values: {d}",
            sequence.len(),
            sequence.requested
        )
    })
}

fn summarize(values: &[f64], alpha: f64, results: SuiteResults) -> TestsData {
    TestsData {
        sample_size: values.len(),
        alpha,
        approved: results.values().filter(|v| v.approved).count(),
        total: results.len(),
        results,
    }
}

async fn handle_generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<GenerateData> {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let count = req.count.unwrap_or(DEFAULT_COUNT).clamp(1, state.max_count);
    log::info!("generate {} x{count}", req.params.kind());

    let sequence = match build_sequence(&req.params, count, req.range) {
        Ok(sequence) => sequence,
        Err(e) => return bad_request(e),
    };
    let normal = match req.normal {
        Some(n) => match prngbench_core::normal(&sequence.values(), n.mean, n.std_dev) {
            Ok(samples) => Some(samples),
            Err(e) => return bad_request(e),
        },
        None => None,
    };

    ok(GenerateData {
        notice: notice(&sequence),
        sequence,
        normal,
    })
}

async fn handle_tests(payload: Result<Json<TestsRequest>, JsonRejection>) -> ApiResult<TestsData> {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let alpha = req.alpha.unwrap_or(DEFAULT_ALPHA);
    log::info!(
        "testing {} values with {} tests",
        req.values.len(),
        req.tests.enabled_count()
    );

    let results = if req.parallel {
        prngbench_tests::run_suite_parallel(&req.values, &req.tests, alpha)
    } else {
        prngbench_tests::run_suite(&req.values, &req.tests, alpha)
    };
    match results {
        Ok(results) => ok(summarize(&req.values, alpha, results)),
        Err(e) => bad_request(e),
    }
}

async fn handle_evaluate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> ApiResult<EvaluateData> {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let count = req.count.unwrap_or(DEFAULT_COUNT).clamp(1, state.max_count);
    let alpha = req.alpha.unwrap_or(DEFAULT_ALPHA);
    log::info!("evaluate {} x{count}", req.params.kind());

    let sequence = match build_sequence(&req.params, count, req.range) {
        Ok(sequence) => sequence,
        Err(e) => return bad_request(e),
    };
    let values = sequence.values();
    match prngbench_tests::run_suite(&values, &req.tests, alpha) {
        Ok(results) => ok(EvaluateData {
            notice: notice(&sequence),
            tests: summarize(&values, alpha, results),
            sequence,
        }),
        Err(e) => bad_request(e),
    }
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": prngbench_core::VERSION,
    }))
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "prngbench server",
        "version": prngbench_core::VERSION,
        "endpoints": {
            "/": "This API index",
            "/health": "Health check",
            "/api/v1/generate": {
                "method": "POST",
                "description": "Generate a pseudorandom sequence",
                "body": {
                    "method": "middle_square | linear_congruential | multiplicative_congruential",
                    "seed": "middle_square: initial state",
                    "x0, k, c, g": "linear_congruential: a = 1 + 2k, m = 2^g",
                    "x0, t, g": "multiplicative_congruential: a = 8t + 3, m = 2^g",
                    "count": format!("Number of values (1-{}, default: {DEFAULT_COUNT})", state.max_count),
                    "range": "Optional {lower, upper} to scale values into",
                    "normal": "Optional {mean, std_dev} for Box-Muller deviates",
                }
            },
            "/api/v1/tests": {
                "method": "POST",
                "description": "Run randomness tests on supplied values",
                "body": {
                    "values": "Array of numbers in [0, 1)",
                    "alpha": format!("Significance level (default: {DEFAULT_ALPHA})"),
                    "tests": "Map of test -> true | false | {k}; default: all tests",
                    "parallel": "Run tests on separate threads (default: false)",
                }
            },
            "/api/v1/evaluate": {
                "method": "POST",
                "description": "Generate a sequence and test it in one call",
            },
        },
        "tests": prngbench_tests::TestKind::ALL.iter().map(|t| t.id()).collect::<Vec<_>>(),
    }))
}

/// Build the axum router.
fn build_router(max_count: usize) -> Router {
    let state = Arc::new(AppState { max_count });

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/v1/generate", post(handle_generate))
        .route("/api/v1/tests", post(handle_tests))
        .route("/api/v1/evaluate", post(handle_evaluate))
        .with_state(state)
}

/// Run the HTTP server until it fails.
pub async fn run_server(host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(MAX_COUNT);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State<Arc<AppState>> {
        State(Arc::new(AppState { max_count: 1000 }))
    }

    fn body<T: serde::de::DeserializeOwned>(json: serde_json::Value) -> Result<Json<T>, JsonRejection> {
        Ok(Json(serde_json::from_value(json).unwrap()))
    }

    fn to_json<T: Serialize>(response: &ApiResponse<T>) -> serde_json::Value {
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn generate_lcg() {
        let (status, Json(resp)) = handle_generate(
            state(),
            body(serde_json::json!({
                "method": "lcg", "x0": 7, "k": 2, "c": 3, "g": 4, "count": 4
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json = to_json(&resp);
        assert_eq!(json["success"], true);
        assert_eq!(json["sequence"]["method"], "linear_congruential");
        let states: Vec<u64> = json["sequence"]["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["xi"].as_u64().unwrap())
            .collect();
        assert_eq!(states, vec![6, 1, 8, 11]);
        assert!(json.get("notice").is_none());
    }

    #[tokio::test]
    async fn generate_clamps_count() {
        let (_, Json(resp)) = handle_generate(
            state(),
            body(serde_json::json!({
                "method": "linear", "x0": 1, "k": 1, "c": 1, "g": 16, "count": 50_000
            })),
        )
        .await;
        let data = resp.data.unwrap();
        assert_eq!(data.sequence.len(), 1000);
    }

    #[tokio::test]
    async fn generate_scales_into_range() {
        let (_, Json(resp)) = handle_generate(
            state(),
            body(serde_json::json!({
                "method": "mcg", "x0": 5, "t": 1, "g": 5, "count": 3,
                "range": {"lower": 0.0, "upper": 10.0}
            })),
        )
        .await;
        let data = resp.data.unwrap();
        let scaled = data.sequence.scaled_values();
        assert_eq!(scaled.len(), 3);
        assert!(scaled.iter().all(|n| (0.0..=10.0).contains(n)));
    }

    #[tokio::test]
    async fn generate_reports_degeneracy() {
        let (status, Json(resp)) = handle_generate(
            state(),
            body(serde_json::json!({"method": "middle_square", "seed": 100, "count": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = resp.data.unwrap();
        assert!(data.sequence.is_degenerate());
        assert!(data.notice.unwrap().contains("fixed point"));
    }

    #[tokio::test]
    async fn generate_with_normal_deviates() {
        let (_, Json(resp)) = handle_generate(
            state(),
            body(serde_json::json!({
                "method": "lcg", "x0": 3, "k": 6, "c": 7, "g": 10, "count": 10,
                "normal": {"mean": 5.0, "std_dev": 2.0}
            })),
        )
        .await;
        assert_eq!(resp.data.unwrap().normal.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn generate_rejects_invalid_parameters() {
        let (status, Json(resp)) = handle_generate(
            state(),
            body(serde_json::json!({"method": "mcg", "x0": 0, "t": 1, "g": 8})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("x0"));
    }

    #[tokio::test]
    async fn tests_endpoint_runs_requested_tests() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        let (status, Json(resp)) = handle_tests(body(serde_json::json!({
            "values": values,
            "tests": {"means": true, "chi": {"k": 10}, "runs": false}
        })))
        .await;
        assert_eq!(status, StatusCode::OK);
        let json = to_json(&resp);
        assert_eq!(json["total"], 2);
        assert_eq!(json["results"]["means"]["approved"], true);
        assert_eq!(json["results"]["chi"]["statistics"]["intervals"], 10);
        assert!(json["results"].get("runs").is_none());
    }

    #[tokio::test]
    async fn tests_endpoint_defaults_to_all_tests() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 77) % 200) as f64 / 200.0).collect();
        let (_, Json(resp)) =
            handle_tests(body(serde_json::json!({"values": values, "parallel": true}))).await;
        let data = resp.data.unwrap();
        assert_eq!(data.total, 6);
        assert_eq!(data.alpha, DEFAULT_ALPHA);
    }

    #[tokio::test]
    async fn tests_endpoint_rejects_bad_config() {
        let (status, Json(resp)) = handle_tests(body(serde_json::json!({
            "values": [0.1, 0.2, 0.3],
            "alpha": 0.05,
            "tests": {"poker": {"k": 5}}
        })))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp.error.unwrap().contains("poker"));

        let (status, _) = handle_tests(body(serde_json::json!({
            "values": [0.1, 0.2, 0.3],
            "alpha": 1.5
        })))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn evaluate_generates_and_tests() {
        let (status, Json(resp)) = handle_evaluate(
            state(),
            body(serde_json::json!({
                "method": "lcg", "x0": 37, "k": 6, "c": 7, "g": 10, "count": 1000,
                "tests": {"means": true, "ks": {"k": 5}}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json = to_json(&resp);
        assert_eq!(json["sequence"]["records"].as_array().unwrap().len(), 1000);
        assert_eq!(json["total"], 2);
        assert_eq!(json["sample_size"], 1000);
    }

    #[tokio::test]
    async fn evaluate_reports_short_sequences_as_errors() {
        // Seed 3 squares to 9: nothing can be extracted, so no values at all.
        let (status, Json(resp)) = handle_evaluate(
            state(),
            body(serde_json::json!({"method": "middle_square", "seed": 3, "count": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp.error.unwrap().contains("needs at least"));
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let Json(index) = handle_index(state()).await;
        assert!(index["endpoints"].get("/api/v1/evaluate").is_some());
        assert_eq!(index["tests"].as_array().unwrap().len(), 6);
    }
}
