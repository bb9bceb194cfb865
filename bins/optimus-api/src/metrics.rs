// Prometheus metrics for the judge API

use lazy_static::lazy_static;
use optimus_judge::evaluator::Summary;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use tracing::warn;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Requests by language, endpoint and status (ok | rejected)
    pub static ref SUBMISSIONS: CounterVec = CounterVec::new(
        Opts::new("optimus_submissions_total", "Total number of submissions judged"),
        &["language", "endpoint", "status"]
    )
    .expect("metric can be created");

    // Test-case verdicts (passed | failed | errored)
    pub static ref TEST_CASES: CounterVec = CounterVec::new(
        Opts::new("optimus_test_cases_total", "Total number of test cases judged"),
        &["language", "verdict"]
    )
    .expect("metric can be created");

    pub static ref EXECUTION_TIME: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "optimus_execution_time_ms",
            "Submission execution time in milliseconds"
        )
        .buckets(vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0]),
        &["language"]
    )
    .expect("metric can be created");

    // Bodies that never reached the judge
    pub static ref REQUESTS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("optimus_requests_rejected_total", "Total requests rejected before judging"),
        &["reason"]
    )
    .expect("metric can be created");
}

/// Register every collector with the registry
pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(SUBMISSIONS.clone()))?;
    REGISTRY.register(Box::new(TEST_CASES.clone()))?;
    REGISTRY.register(Box::new(EXECUTION_TIME.clone()))?;
    REGISTRY.register(Box::new(REQUESTS_REJECTED.clone()))?;
    Ok(())
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

pub fn record_submission(language: &str, endpoint: &str, status: &str, execution_time_ms: f64) {
    SUBMISSIONS.with_label_values(&[language, endpoint, status]).inc();
    EXECUTION_TIME.with_label_values(&[language]).observe(execution_time_ms);
}

pub fn record_verdicts(language: &str, summary: &Summary) {
    TEST_CASES
        .with_label_values(&[language, "passed"])
        .inc_by(summary.passed as f64);
    TEST_CASES
        .with_label_values(&[language, "failed"])
        .inc_by(summary.failed as f64);
    TEST_CASES
        .with_label_values(&[language, "errored"])
        .inc_by(summary.errored as f64);
}

pub fn record_request_rejected(reason: &str) {
    REQUESTS_REJECTED.with_label_values(&[reason]).inc();
}
