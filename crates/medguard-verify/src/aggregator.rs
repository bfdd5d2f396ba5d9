//! Evidence Aggregator
//!
//! Combines the database, registry and pattern signals for one batch into a
//! confidence score, a verdict, ordered reasoning and a deduplicated flag
//! list. Every collaborator failure degrades to "signal absent"; the caller
//! always receives a structured result.

use crate::barcode::TextBarcodeDecoder;
use crate::database::DatabaseEvidence;
use chrono::Utc;
use futures::FutureExt;
use medguard_core::{
    BarcodeDecoder, BrandMatch, BrandResolver, EvidenceSource, InputType, MedguardError,
    MedicineDetails, RecordStore, RequestContext, Result, ScanLogEntry, ScanLogSink,
    VerificationResult,
};
use medguard_patterns::{PatternAnalysis, PatternAnalyzer, BASELINE};
use medguard_policy::{clamp_confidence, recommend, round1, FlagSet, RiskFlag, ScoreCard, Verdict};
use medguard_registry::{BrandCatalog, ManufacturerRegistry, RegistryCheck};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::Instrument;

/// Weight of the authoritative signal when the database or registry matched
pub const AUTHORITATIVE_WEIGHT: f64 = 0.65;
/// Weight of the authoritative signal when neither matched
pub const UNMATCHED_WEIGHT: f64 = 0.4;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(1500);

/// What is being verified, after input normalization
#[derive(Debug, Clone)]
struct Subject<'a> {
    input_type: InputType,
    batch: Option<&'a str>,
    manufacturer: Option<&'a str>,
    medicine_name: Option<&'a str>,
    brand: Option<&'a BrandMatch>,
    extra_flags: FlagSet,
}

impl<'a> Subject<'a> {
    fn new(input_type: InputType, batch: Option<&'a str>, manufacturer: Option<&'a str>) -> Self {
        Self {
            input_type,
            batch: batch.map(str::trim).filter(|b| !b.is_empty()),
            manufacturer: manufacturer.map(str::trim).filter(|m| !m.is_empty()),
            medicine_name: None,
            brand: None,
            extra_flags: FlagSet::new(),
        }
    }

    fn with_medicine_name(mut self, name: &'a str) -> Self {
        self.medicine_name = Some(name);
        self
    }

    fn with_brand(mut self, brand: &'a BrandMatch) -> Self {
        self.brand = Some(brand);
        self
    }

    fn with_flag(mut self, flag: RiskFlag) -> Self {
        self.extra_flags.push(flag);
        self
    }
}

struct Outcome {
    result: VerificationResult,
    supply_id: Option<String>,
}

/// The verification entry point
pub struct EvidenceAggregator {
    store: Arc<dyn RecordStore>,
    scan_log: Arc<dyn ScanLogSink>,
    registry: Arc<ManufacturerRegistry>,
    analyzer: Arc<PatternAnalyzer>,
    brands: Arc<dyn BrandResolver>,
    decoder: Arc<dyn BarcodeDecoder>,
    lookup_timeout: Duration,
}

impl EvidenceAggregator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        scan_log: Arc<dyn ScanLogSink>,
        registry: ManufacturerRegistry,
    ) -> Self {
        Self {
            store,
            scan_log,
            registry: Arc::new(registry),
            analyzer: Arc::new(PatternAnalyzer::default()),
            brands: Arc::new(BrandCatalog::default()),
            decoder: Arc::new(TextBarcodeDecoder),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_analyzer(mut self, analyzer: PatternAnalyzer) -> Self {
        self.analyzer = Arc::new(analyzer);
        self
    }

    pub fn with_brands(mut self, brands: Arc<dyn BrandResolver>) -> Self {
        self.brands = brands;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn BarcodeDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Per-lookup timeout; a slow lookup counts as a failed one
    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    pub fn registry(&self) -> &ManufacturerRegistry {
        &self.registry
    }

    pub fn analyzer(&self) -> &PatternAnalyzer {
        &self.analyzer
    }

    /// Verify a batch number, optionally with the manufacturer printed on the pack
    pub async fn verify_by_batch(
        &self,
        batch_number: &str,
        manufacturer: Option<&str>,
        ctx: &RequestContext,
    ) -> VerificationResult {
        if batch_number.trim().is_empty() {
            return VerificationResult::rejected_input(
                RiskFlag::EmptyBatchNumber,
                "No batch number provided",
            );
        }
        let subject = Subject::new(InputType::Batch, Some(batch_number), manufacturer);
        self.run(subject, ctx).await
    }

    /// Decode a barcode payload, then verify the batch it carries
    pub async fn verify_by_barcode_image(
        &self,
        payload: &[u8],
        ctx: &RequestContext,
    ) -> VerificationResult {
        let decoding = timeout(self.lookup_timeout, self.decoder.decode(payload));
        let decoded = match AssertUnwindSafe(decoding).catch_unwind().await {
            Ok(Ok(Ok(decoded))) => decoded,
            Ok(Ok(Err(e))) => {
                tracing::warn!(trace_id = %ctx.trace_id, error = %e, "barcode decode failed");
                return barcode_failed("Barcode could not be decoded");
            }
            Ok(Err(_)) => {
                tracing::warn!(trace_id = %ctx.trace_id, "barcode decode timed out");
                return barcode_failed("Barcode could not be decoded");
            }
            Err(_) => {
                tracing::error!(trace_id = %ctx.trace_id, "barcode decoder panicked");
                return VerificationResult::rejected_input(
                    RiskFlag::SystemError,
                    "Barcode could not be decoded",
                );
            }
        };

        let batch = decoded.batch_number.as_deref().map(str::trim).unwrap_or("");
        if batch.is_empty() {
            return barcode_failed("Barcode does not carry a batch number");
        }
        let subject = Subject::new(InputType::Barcode, Some(batch), decoded.manufacturer.as_deref());
        self.run(subject, ctx).await
    }

    /// Resolve a brand name to its manufacturer, then verify
    pub async fn verify_by_medicine_name(
        &self,
        medicine_name: &str,
        batch_number: Option<&str>,
        ctx: &RequestContext,
    ) -> VerificationResult {
        let name = medicine_name.trim();
        if name.is_empty() {
            return VerificationResult::rejected_input(
                RiskFlag::EmptyMedicineName,
                "No medicine name provided",
            );
        }
        let batch = batch_number.map(str::trim).filter(|b| !b.is_empty());

        let resolving = AssertUnwindSafe(|| self.brands.resolve(name));
        let resolved = match std::panic::catch_unwind(resolving) {
            Ok(resolved) => resolved,
            Err(_) => {
                tracing::error!(trace_id = %ctx.trace_id, "brand resolver panicked");
                return match batch {
                    Some(batch) => {
                        let subject = Subject::new(InputType::MedicineName, Some(batch), None)
                            .with_medicine_name(name)
                            .with_flag(RiskFlag::SystemError);
                        self.run(subject, ctx).await
                    }
                    None => VerificationResult::rejected_input(
                        RiskFlag::SystemError,
                        "Verification could not be completed",
                    ),
                };
            }
        };

        match (resolved, batch) {
            (Some(brand), batch) => {
                let subject = Subject::new(
                    InputType::MedicineName,
                    batch,
                    brand.primary_manufacturer.as_deref(),
                )
                .with_medicine_name(name)
                .with_brand(&brand);
                self.run(subject, ctx).await
            }
            (None, Some(batch)) => {
                let subject = Subject::new(InputType::MedicineName, Some(batch), None)
                    .with_medicine_name(name)
                    .with_flag(RiskFlag::MedicineNotInBrandMapping);
                self.run(subject, ctx).await
            }
            (None, None) => VerificationResult::rejected_input(
                RiskFlag::MedicineNotInBrandMapping,
                format!("Medicine '{}' not found in brand catalog", name),
            ),
        }
    }

    async fn run(&self, subject: Subject<'_>, ctx: &RequestContext) -> VerificationResult {
        let span = tracing::info_span!(
            "verify",
            trace_id = %ctx.trace_id,
            input = subject.input_type.as_str()
        );

        async {
            let outcome = match AssertUnwindSafe(self.evaluate(&subject))
                .catch_unwind()
                .await
            {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "verification failed, using pattern fallback");
                    self.fallback(&subject)
                }
                Err(_) => {
                    tracing::error!("verification panicked, using pattern fallback");
                    self.fallback(&subject)
                }
            };

            tracing::info!(
                verdict = %outcome.result.verdict,
                confidence = outcome.result.confidence,
                flags = outcome.result.risk_flags.len(),
                "verification complete"
            );
            self.record(&subject, &outcome, ctx).await;
            outcome.result
        }
        .instrument(span)
        .await
    }

    async fn evaluate(&self, subject: &Subject<'_>) -> Result<Outcome> {
        let (database, pattern) = match subject.batch {
            Some(batch) => (
                self.lookup(batch).await,
                Some(self.analyzer.analyze(batch, subject.manufacturer)),
            ),
            None => (DatabaseEvidence::absent(), None),
        };
        let registry = subject
            .manufacturer
            .map(|name| self.registry.verify(Some(name)));

        let registry_matched = registry.as_ref().is_some_and(RegistryCheck::matched);
        let combined = database.delta() + registry.as_ref().map_or(0.0, |r| r.delta);
        let pattern_confidence = pattern.as_ref().map_or(BASELINE, |p| p.confidence);

        let weight = if database.is_found() || registry_matched {
            AUTHORITATIVE_WEIGHT
        } else {
            UNMATCHED_WEIGHT
        };
        let mut card = ScoreCard::new(0.0);
        card.add("authoritative", combined * weight)
            .add("pattern", pattern_confidence * (1.0 - weight));
        let raw = card.total();
        if !raw.is_finite() {
            return Err(MedguardError::Internal(format!("non-finite confidence {}", raw)));
        }
        let confidence = round1(clamp_confidence(raw));

        tracing::debug!(
            database = database.delta(),
            registry = registry.as_ref().map_or(0.0, |r| r.delta),
            pattern = pattern_confidence,
            weight,
            confidence,
            "signals merged"
        );

        let mut flags = FlagSet::new();
        flags.extend(database.flags.iter().cloned());
        if let Some(flag) = registry.as_ref().and_then(|r| r.flag.clone()) {
            flags.push(flag);
        }
        if let Some(pattern) = &pattern {
            flags.extend(pattern.flags.iter().cloned());
        }
        flags.extend(subject.extra_flags.iter().cloned());

        let verdict = Verdict::decide(confidence, &flags);
        let reasoning = explain(subject, &database, registry.as_ref(), pattern.as_ref());
        let sources = sources(subject, &database, registry_matched, pattern.is_some());
        let details = details(subject, &database, pattern.as_ref());

        Ok(Outcome {
            result: VerificationResult {
                verdict,
                confidence,
                recommendation: recommend(verdict, &flags),
                risk_flags: flags,
                reasoning,
                medicine_details: Some(details),
                sources,
            },
            supply_id: database.supply.as_ref().map(|s| s.id.clone()),
        })
    }

    /// Pattern Analyzer alone; it has no external dependency
    fn fallback(&self, subject: &Subject<'_>) -> Outcome {
        let Some(batch) = subject.batch else {
            return Outcome {
                result: VerificationResult::rejected_input(
                    RiskFlag::SystemError,
                    "Verification could not be completed",
                ),
                supply_id: None,
            };
        };

        let analysis = self.analyzer.analyze(batch, subject.manufacturer);
        let mut flags = FlagSet::new();
        flags.push(RiskFlag::SystemError);
        flags.extend(analysis.flags.iter().cloned());

        let verdict = Verdict::decide(analysis.confidence, &flags);
        let mut reasoning = vec!["Verification limited to batch pattern analysis".to_string()];
        reasoning.extend(analysis.reasoning.iter().cloned());

        Outcome {
            result: VerificationResult {
                verdict,
                confidence: analysis.confidence,
                recommendation: recommend(verdict, &flags),
                risk_flags: flags,
                reasoning,
                medicine_details: None,
                sources: vec![EvidenceSource::PatternAnalysis],
            },
            supply_id: None,
        }
    }

    async fn lookup(&self, batch: &str) -> DatabaseEvidence {
        let Some(supply) = self
            .guarded("supply", self.store.find_supply_by_batch(batch))
            .await
        else {
            return DatabaseEvidence::not_found();
        };

        let medicine = async {
            match supply.medicine_id.as_deref() {
                Some(id) => self.guarded("medicine", self.store.find_medicine(id)).await,
                None => None,
            }
        };
        let supplier = async {
            match supply.supplier_id.as_deref() {
                Some(id) => self.guarded("supplier", self.store.find_supplier(id)).await,
                None => None,
            }
        };
        let (medicine, supplier) = tokio::join!(medicine, supplier);

        DatabaseEvidence::found(supply, medicine, supplier, Utc::now())
    }

    /// Run a lookup under the timeout; errors and timeouts become `None`
    async fn guarded<T, F>(&self, what: &'static str, lookup: F) -> Option<T>
    where
        F: Future<Output = Result<Option<T>>>,
    {
        match timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                tracing::warn!(lookup = what, error = %e, "lookup failed, treating as absent");
                None
            }
            Err(_) => {
                tracing::warn!(lookup = what, "lookup timed out, treating as absent");
                None
            }
        }
    }

    /// Best effort; never affects the returned result
    async fn record(&self, subject: &Subject<'_>, outcome: &Outcome, ctx: &RequestContext) {
        let entry = ScanLogEntry::from_result(subject.input_type, &outcome.result, ctx)
            .with_batch(subject.batch)
            .with_manufacturer(subject.manufacturer)
            .with_medicine_name(subject.medicine_name)
            .with_supply(outcome.supply_id.as_deref());

        let append = AssertUnwindSafe(timeout(self.lookup_timeout, self.scan_log.append(entry)));
        match append.catch_unwind().await {
            Ok(Ok(Ok(id))) => tracing::debug!(scan_id = %id, "scan logged"),
            Ok(Ok(Err(e))) => tracing::warn!(error = %e, "scan log append failed"),
            Ok(Err(_)) => tracing::warn!("scan log append timed out"),
            Err(_) => tracing::warn!("scan log append panicked"),
        }
    }
}

fn barcode_failed(reason: &str) -> VerificationResult {
    VerificationResult::rejected_input(RiskFlag::BarcodeReadFailed, reason)
}

fn explain(
    subject: &Subject<'_>,
    database: &DatabaseEvidence,
    registry: Option<&RegistryCheck>,
    pattern: Option<&PatternAnalysis>,
) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(brand) = subject.brand {
        lines.push(format!(
            "Medicine '{}' recognized as {} ({})",
            subject.medicine_name.unwrap_or(brand.brand_name.as_str()),
            brand.brand_name,
            brand.category
        ));
    }
    if let Some(line) = registry.and_then(RegistryCheck::reasoning) {
        lines.push(line);
    }
    if database.consulted {
        lines.extend(database.reasoning.iter().cloned());
    } else {
        lines.push("No batch number provided; verdict based on manufacturer evidence".to_string());
    }
    if let Some(pattern) = pattern {
        lines.extend(pattern.reasoning.iter().cloned());
    }
    lines
}

fn sources(
    subject: &Subject<'_>,
    database: &DatabaseEvidence,
    registry_matched: bool,
    pattern_ran: bool,
) -> Vec<EvidenceSource> {
    let mut sources = Vec::new();
    if subject.brand.is_some() {
        sources.push(EvidenceSource::BrandMapping);
    }
    if database.is_found() {
        sources.push(EvidenceSource::Database);
    }
    if registry_matched {
        sources.push(EvidenceSource::Registry);
    }
    if pattern_ran {
        sources.push(EvidenceSource::PatternAnalysis);
    }
    sources
}

fn details(
    subject: &Subject<'_>,
    database: &DatabaseEvidence,
    pattern: Option<&PatternAnalysis>,
) -> MedicineDetails {
    let inferred = pattern.and_then(|p| p.inferred_manufacturer()).map(str::to_string);
    let medicine = database.medicine.as_ref();
    let supply = database.supply.as_ref();

    MedicineDetails {
        name: medicine
            .map(|m| m.name.clone())
            .or_else(|| subject.brand.map(|b| b.brand_name.clone()))
            .or_else(|| subject.medicine_name.map(str::to_string)),
        manufacturer: medicine
            .and_then(|m| m.manufacturer.clone())
            .or_else(|| subject.manufacturer.map(str::to_string))
            .or_else(|| inferred.clone()),
        batch_number: subject.batch.map(str::to_string),
        expiry_date: supply.and_then(|s| s.expiry_date),
        supplier: database.supplier.as_ref().map(|s| s.name.clone()),
        quantity: supply.map(|s| s.quantity),
        database_match: database.is_found(),
        pattern_confidence: pattern.map(|p| p.confidence),
        inferred_manufacturer: inferred,
        brand_name: subject.brand.map(|b| b.brand_name.clone()),
        category: subject.brand.map(|b| b.category.clone()),
        all_manufacturers: subject
            .brand
            .map(|b| b.manufacturers.clone())
            .unwrap_or_default(),
    }
}
