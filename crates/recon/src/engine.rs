use crate::classify::Thresholds;
use crate::config::{ClinicalColumns, InvoiceColumns, ReconConfig};
use crate::error::ReconError;
use crate::evidence::generate_summary_stats_with_observer;
use crate::matcher::{CandidateSet, Scorer};
use crate::model::{
    ClinicalLogEntry, DatasetOverview, InvoiceLine, MatchResult, ReconInput, ReconMeta, ReconResult,
    SummaryStats,
};
use crate::money::parse_money;
use crate::observer::{NoopObserver, ReconObserver};

/// Match every invoice line against the clinical log with the default
/// scorer and high-confidence threshold.
pub fn reconcile(
    invoices: &[InvoiceLine],
    clinical: &[ClinicalLogEntry],
    match_threshold: i32,
) -> Result<Vec<MatchResult>, ReconError> {
    ReconEngine::new(match_threshold).reconcile(invoices, clinical)
}

/// Thresholds + scorer. Holds no data between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconEngine {
    thresholds: Thresholds,
    scorer: Scorer,
}

impl ReconEngine {
    pub fn new(match_threshold: i32) -> Self {
        Self { thresholds: Thresholds::new(match_threshold), scorer: Scorer::default() }
    }

    pub fn from_config(config: &ReconConfig) -> Self {
        Self { thresholds: config.thresholds(), scorer: config.scorer }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    pub fn reconcile(
        &self,
        invoices: &[InvoiceLine],
        clinical: &[ClinicalLogEntry],
    ) -> Result<Vec<MatchResult>, ReconError> {
        self.reconcile_with_observer(invoices, clinical, &NoopObserver)
    }

    /// One result per invoice line, in invoice order. Nothing is matched if
    /// either table fails validation.
    pub fn reconcile_with_observer(
        &self,
        invoices: &[InvoiceLine],
        clinical: &[ClinicalLogEntry],
        observer: &dyn ReconObserver,
    ) -> Result<Vec<MatchResult>, ReconError> {
        if let Err(e) = validate_input(invoices, clinical) {
            observer.on_validation_failed(&e);
            return Err(e);
        }

        observer.on_start(invoices.len(), clinical.len(), &self.thresholds);
        if self.thresholds.is_inverted() {
            observer.on_threshold_inversion(&self.thresholds);
        }

        let candidates = CandidateSet::from_strs(
            clinical.iter().map(|c| c.clinical_item_description.as_str()),
            self.scorer,
        );

        let results = self.match_rows(invoices, &candidates, observer);
        observer.on_complete(results.len());
        Ok(results)
    }

    pub fn generate_summary_stats(&self, results: &[MatchResult]) -> SummaryStats {
        crate::evidence::generate_summary_stats(results)
    }

    /// Match, classify and assemble the result for a single line.
    pub fn match_row(&self, invoice: &InvoiceLine, candidates: &CandidateSet<'_>) -> MatchResult {
        let best = candidates.best_match(&invoice.vendor_item_description);
        let (status_label, risk_tier) = self.thresholds.classify(best.score);
        MatchResult {
            po_number: invoice.po_number.clone(),
            vendor_item_description: invoice.vendor_item_description.clone(),
            matched_clinical_description: best.candidate.map(str::to_string),
            confidence_score: best.score,
            cost_at_risk_cents: invoice.unit_cost_cents,
            status_label,
            risk_tier,
        }
    }

    #[cfg(feature = "parallel")]
    fn match_rows(
        &self,
        invoices: &[InvoiceLine],
        candidates: &CandidateSet<'_>,
        observer: &dyn ReconObserver,
    ) -> Vec<MatchResult> {
        use rayon::prelude::*;

        let total = invoices.len();
        // Indexed collect keeps invoice order.
        invoices
            .par_iter()
            .enumerate()
            .map(|(i, invoice)| {
                let result = self.match_row(invoice, candidates);
                observer.on_row(i, total, &result);
                result
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn match_rows(
        &self,
        invoices: &[InvoiceLine],
        candidates: &CandidateSet<'_>,
        observer: &dyn ReconObserver,
    ) -> Vec<MatchResult> {
        let total = invoices.len();
        invoices
            .iter()
            .enumerate()
            .map(|(i, invoice)| {
                let result = self.match_row(invoice, candidates);
                observer.on_row(i, total, &result);
                result
            })
            .collect()
    }
}

/// Both tables must have rows before any matching starts.
pub fn validate_input(invoices: &[InvoiceLine], clinical: &[ClinicalLogEntry]) -> Result<(), ReconError> {
    if invoices.is_empty() {
        return Err(ReconError::Validation("invoice data is empty".into()));
    }
    if clinical.is_empty() {
        return Err(ReconError::Validation("clinical data is empty".into()));
    }
    Ok(())
}

/// Reconcile per config. Returns results, summary and run metadata.
pub fn run(
    config: &ReconConfig,
    input: &ReconInput,
    observer: &dyn ReconObserver,
) -> Result<ReconResult, ReconError> {
    let engine = ReconEngine::from_config(config);
    let results = engine.reconcile_with_observer(&input.invoices, &input.clinical, observer)?;
    let summary = generate_summary_stats_with_observer(&results, observer);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            match_threshold: config.match_threshold,
            high_confidence_threshold: config.high_confidence_threshold,
            scorer: config.scorer.to_string(),
        },
        overview: DatasetOverview::compute(&input.invoices, &input.clinical),
        summary,
        results,
    })
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

struct Header {
    names: Vec<String>,
}

impl Header {
    fn read(reader: &mut csv::Reader<&[u8]>) -> Result<Self, ReconError> {
        let names = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Ok(Self { names })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|h| h == name)
    }

    /// Indices of all required columns, or every one that is missing.
    fn require<const N: usize>(&self, table: &str, required: [&str; N]) -> Result<[usize; N], ReconError> {
        let mut found = [0usize; N];
        let mut missing = Vec::new();
        for (slot, name) in found.iter_mut().zip(required) {
            match self.position(name) {
                Some(i) => *slot = i,
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(ReconError::MissingColumn { table: table.into(), columns: missing })
        }
    }
}

fn optional_field(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse invoice CSV text. The header is checked before any row is read.
pub fn load_invoice_rows(csv_data: &str, columns: &InvoiceColumns) -> Result<Vec<InvoiceLine>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let header = Header::read(&mut reader)?;
    let [po_idx, item_idx, cost_idx] = header.require("invoice", columns.required())?;
    let quantity_idx = header.position(&columns.quantity);
    let date_idx = header.position(&columns.invoice_date);

    let mut rows = Vec::new();
    for (n, record) in reader.records().enumerate() {
        let record = record?;

        let po_number = record.get(po_idx).unwrap_or("").trim().to_string();
        let vendor_item_description = record.get(item_idx).unwrap_or("").to_string();
        let cost_str = record.get(cost_idx).unwrap_or("");
        let unit_cost_cents = parse_money(cost_str).map_err(|_| ReconError::AmountParse {
            table: "invoice".into(),
            record: if po_number.is_empty() { format!("row {}", n + 1) } else { po_number.clone() },
            value: cost_str.into(),
        })?;

        rows.push(InvoiceLine {
            po_number,
            vendor_item_description,
            unit_cost_cents,
            quantity: optional_field(&record, quantity_idx),
            invoice_date: optional_field(&record, date_idx),
        });
    }

    Ok(rows)
}

/// Parse clinical CSV text. Only the description column is required.
pub fn load_clinical_rows(
    csv_data: &str,
    columns: &ClinicalColumns,
) -> Result<Vec<ClinicalLogEntry>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let header = Header::read(&mut reader)?;
    let [item_idx] = header.require("clinical", columns.required())?;
    let case_idx = header.position(&columns.case_id);
    let qty_idx = header.position(&columns.qty_used);
    let date_idx = header.position(&columns.implant_date);
    let po_ref_idx = header.position(&columns.po_ref);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(ClinicalLogEntry {
            clinical_item_description: record.get(item_idx).unwrap_or("").to_string(),
            case_id: optional_field(&record, case_idx),
            qty_used: optional_field(&record, qty_idx),
            implant_date: optional_field(&record, date_idx),
            po_ref: optional_field(&record, po_ref_idx),
        });
    }

    Ok(rows)
}
