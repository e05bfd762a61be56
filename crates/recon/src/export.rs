//! CSV rendering of results and summaries.

use std::io::Write;

use chrono::NaiveDateTime;

use crate::error::ReconError;
use crate::model::{MatchResult, RiskTier, SummaryStats};
use crate::money::{format_amount, format_currency};

pub const RESULTS_HEADER: [&str; 9] = [
    "PO_Number",
    "Vendor_Item",
    "Clinical_Match",
    "Confidence_Score",
    "Confidence_Score_Numeric",
    "Unit_Cost",
    "Cost_At_Risk",
    "Status",
    "Risk_Level",
];

pub const SUMMARY_HEADER: [&str; 4] = ["Risk_Level", "count", "total_amount", "avg_amount"];

/// Timestamp embedded in exported file names.
pub const EXPORT_DATETIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The three downloadable reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    FullReport,
    HighRisk,
    Summary,
}

impl ExportKind {
    pub const ALL: [ExportKind; 3] = [ExportKind::FullReport, ExportKind::HighRisk, ExportKind::Summary];

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::FullReport => "revenue_leakage_audit_",
            Self::HighRisk => "high_risk_items_",
            Self::Summary => "summary_statistics_",
        }
    }

    /// e.g. `high_risk_items_20240115_093000.csv`
    pub fn file_name(&self, at: NaiveDateTime) -> String {
        format!("{}{}.csv", self.prefix(), at.format(EXPORT_DATETIME_FORMAT))
    }
}

/// Results restricted to one tier, order preserved.
pub fn filter_by_tier(results: &[MatchResult], tier: RiskTier) -> Vec<&MatchResult> {
    results.iter().filter(|r| r.risk_tier == tier).collect()
}

/// Write one row per result under [`RESULTS_HEADER`].
pub fn write_results_csv<'a, W, I>(writer: W, results: I) -> Result<(), ReconError>
where
    W: Write,
    I: IntoIterator<Item = &'a MatchResult>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(RESULTS_HEADER)?;

    for r in results {
        wtr.write_record([
            r.po_number.as_str(),
            r.vendor_item_description.as_str(),
            r.clinical_match(),
            format!("{}%", r.confidence_score).as_str(),
            r.confidence_score.to_string().as_str(),
            format_currency(r.cost_at_risk_cents).as_str(),
            format_amount(r.cost_at_risk_cents).as_str(),
            r.status_label,
            r.risk_tier.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// One row per tier, High first.
pub fn write_summary_csv<W: Write>(writer: W, summary: &SummaryStats) -> Result<(), ReconError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SUMMARY_HEADER)?;

    for entry in summary.entries() {
        wtr.write_record([
            entry.risk_tier.as_str(),
            entry.count.to_string().as_str(),
            format_amount(entry.total_cents).as_str(),
            format_amount(entry.avg_cents).as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
