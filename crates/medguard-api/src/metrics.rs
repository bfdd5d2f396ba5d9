//! Prometheus metrics for the verification service.
use async_trait::async_trait;
use medguard_core::{InputType, Result, ScanLogEntry, ScanLogSink, VerificationResult};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiMetrics {
    registry: Registry,
    verifications: IntCounterVec,
    scan_log_failures: IntCounter,
}

impl ApiMetrics {
    pub fn new() -> std::result::Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("medguard".to_string()), None)?;
        let verifications = IntCounterVec::new(
            Opts::new("verifications_total", "Verification results by input and verdict"),
            &["input", "verdict"],
        )?;
        let scan_log_failures = IntCounter::new(
            "scan_log_failures_total",
            "Scan log appends that failed and were dropped",
        )?;
        registry.register(Box::new(verifications.clone()))?;
        registry.register(Box::new(scan_log_failures.clone()))?;
        Ok(Self {
            registry,
            verifications,
            scan_log_failures,
        })
    }

    pub fn observe(&self, input: InputType, result: &VerificationResult) {
        self.verifications
            .with_label_values(&[input.as_str(), result.verdict.as_str()])
            .inc();
    }

    pub fn verifications(&self, input: InputType, verdict: &str) -> u64 {
        self.verifications
            .with_label_values(&[input.as_str(), verdict])
            .get()
    }

    pub fn scan_log_failures(&self) -> u64 {
        self.scan_log_failures.get()
    }

    /// Text exposition format
    pub fn encode(&self) -> std::result::Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

/// Counts failed appends on the way through to the real sink
pub struct MeteredScanLog {
    inner: Arc<dyn ScanLogSink>,
    metrics: ApiMetrics,
}

impl MeteredScanLog {
    pub fn new(inner: Arc<dyn ScanLogSink>, metrics: ApiMetrics) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl ScanLogSink for MeteredScanLog {
    async fn append(&self, entry: ScanLogEntry) -> Result<String> {
        let appended = self.inner.append(entry).await;
        if appended.is_err() {
            self.metrics.scan_log_failures.inc();
        }
        appended
    }
}
