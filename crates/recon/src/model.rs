use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// Rendered in place of a clinical description when nothing could be matched.
pub const NO_MATCH: &str = "No Match Found";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One billed item from a vendor invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLine {
    pub po_number: String,
    pub vendor_item_description: String,
    pub unit_cost_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<String>,
}

impl InvoiceLine {
    pub fn new(
        po_number: impl Into<String>,
        vendor_item_description: impl Into<String>,
        unit_cost_cents: i64,
    ) -> Self {
        Self {
            po_number: po_number.into(),
            vendor_item_description: vendor_item_description.into(),
            unit_cost_cents,
            quantity: None,
            invoice_date: None,
        }
    }
}

/// One documented procedure/item from the clinical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClinicalLogEntry {
    pub clinical_item_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implant_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_ref: Option<String>,
}

impl ClinicalLogEntry {
    pub fn new(clinical_item_description: impl Into<String>) -> Self {
        Self {
            clinical_item_description: clinical_item_description.into(),
            case_id: None,
            qty_used: None,
            implant_date: None,
            po_ref: None,
        }
    }
}

/// Both tables, already loaded and typed.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub invoices: Vec<InvoiceLine>,
    pub clinical: Vec<ClinicalLogEntry>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Financial risk bucket. `High` is the lowest-confidence bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    /// Report order: most at-risk first.
    pub const ALL: [RiskTier; 3] = [RiskTier::High, RiskTier::Medium, RiskTier::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown risk tier: {other}")),
        }
    }
}

/// Outcome for a single invoice line. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub po_number: String,
    pub vendor_item_description: String,
    /// `None` when no candidate was available. Serialized as the sentinel.
    #[serde(serialize_with = "serialize_clinical_match")]
    pub matched_clinical_description: Option<String>,
    pub confidence_score: u8,
    pub cost_at_risk_cents: i64,
    pub status_label: &'static str,
    pub risk_tier: RiskTier,
}

fn serialize_clinical_match<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.as_deref().unwrap_or(NO_MATCH))
}

impl MatchResult {
    /// Matched description, or the no-match sentinel.
    pub fn clinical_match(&self) -> &str {
        self.matched_clinical_description.as_deref().unwrap_or(NO_MATCH)
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub risk_tier: RiskTier,
    pub count: usize,
    pub total_cents: i64,
    pub avg_cents: i64,
}

impl SummaryEntry {
    pub fn zero(risk_tier: RiskTier) -> Self {
        Self { risk_tier, count: 0, total_cents: 0, avg_cents: 0 }
    }
}

/// Per-tier statistics. Always holds all three tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub tiers: BTreeMap<RiskTier, SummaryEntry>,
}

impl SummaryStats {
    pub fn get(&self, tier: RiskTier) -> SummaryEntry {
        self.tiers.get(&tier).copied().unwrap_or_else(|| SummaryEntry::zero(tier))
    }

    /// Entries in report order (High, Medium, Low).
    pub fn entries(&self) -> impl Iterator<Item = SummaryEntry> + '_ {
        RiskTier::ALL.into_iter().map(|t| self.get(t))
    }

    pub fn total_count(&self) -> usize {
        self.tiers.values().map(|e| e.count).sum()
    }
}

/// Headline figures shown before the detailed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetOverview {
    pub invoices_processed: usize,
    pub total_spend_cents: i64,
    pub clinical_logs: usize,
    /// Invoice rows minus clinical rows. Negative when clinical logs outnumber invoices.
    pub potential_gaps: i64,
}

impl DatasetOverview {
    pub fn compute(invoices: &[InvoiceLine], clinical: &[ClinicalLogEntry]) -> Self {
        let total_spend_cents = invoices
            .iter()
            .try_fold(0i64, |acc, inv| acc.checked_add(inv.unit_cost_cents))
            .unwrap_or(i64::MAX);
        Self {
            invoices_processed: invoices.len(),
            total_spend_cents,
            clinical_logs: clinical.len(),
            potential_gaps: invoices.len() as i64 - clinical.len() as i64,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub overview: DatasetOverview,
    pub summary: SummaryStats,
    pub results: Vec<MatchResult>,
}

impl ReconResult {
    pub fn has_leakage(&self) -> bool {
        self.summary.get(RiskTier::High).count > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub match_threshold: i32,
    pub high_confidence_threshold: i32,
    pub scorer: String,
}
