// Prometheus metrics for the Gavel API

use gavel_common::types::Results;
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    // Global registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Jobs submitted total (counter with language label)
    pub static ref JOBS_SUBMITTED: CounterVec = CounterVec::new(
        Opts::new("gavel_jobs_submitted_total", "Total number of jobs submitted"),
        &["language"]
    )
    .expect("metric can be created");

    // Jobs completed total (counter with language and status labels)
    pub static ref JOBS_COMPLETED: CounterVec = CounterVec::new(
        Opts::new("gavel_jobs_completed_total", "Total number of jobs completed"),
        &["language", "status"]
    )
    .expect("metric can be created");

    // Job judging time histogram (in milliseconds)
    pub static ref JOB_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "gavel_job_duration_ms",
            "Wall-clock time to judge a job in milliseconds"
        )
        .buckets(vec![100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0]),
        &["language"]
    )
    .expect("metric can be created");

    // Per-test verdict counter
    pub static ref TEST_VERDICTS: CounterVec = CounterVec::new(
        Opts::new("gavel_test_verdicts_total", "Total test-case verdicts by bucket"),
        &["verdict"]
    )
    .expect("metric can be created");
}

/// Initialize metrics registry
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(JOBS_SUBMITTED.clone()))
        .expect("collector can be registered");

    REGISTRY
        .register(Box::new(JOBS_COMPLETED.clone()))
        .expect("collector can be registered");

    REGISTRY
        .register(Box::new(JOB_DURATION.clone()))
        .expect("collector can be registered");

    REGISTRY
        .register(Box::new(TEST_VERDICTS.clone()))
        .expect("collector can be registered");
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Record job submission
pub fn record_job_submitted(language: &str) {
    JOBS_SUBMITTED.with_label_values(&[language]).inc();
}

/// Record job completion
pub fn record_job_completed(language: &str, status: &str, duration_ms: f64) {
    JOBS_COMPLETED.with_label_values(&[language, status]).inc();
    JOB_DURATION.with_label_values(&[language]).observe(duration_ms);
}

/// Record the verdict buckets of one finished tally
pub fn record_verdicts(results: &Results) {
    TEST_VERDICTS
        .with_label_values(&["passed"])
        .inc_by(results.passed as f64);
    TEST_VERDICTS
        .with_label_values(&["failed"])
        .inc_by(results.failed as f64);
    TEST_VERDICTS
        .with_label_values(&["errored"])
        .inc_by(results.errored as f64);
}
