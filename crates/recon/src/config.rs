use serde::Deserialize;

use crate::classify::{Thresholds, DEFAULT_MATCH_THRESHOLD, HIGH_CONFIDENCE_THRESHOLD};
use crate::error::ReconError;
use crate::matcher::Scorer;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default = "default_match_threshold")]
    pub match_threshold: i32,
    #[serde(default = "default_high_confidence_threshold")]
    pub high_confidence_threshold: i32,
    #[serde(default)]
    pub scorer: Scorer,
    pub invoices: InvoiceSource,
    pub clinical: ClinicalSource,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_match_threshold() -> i32 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_high_confidence_threshold() -> i32 {
    HIGH_CONFIDENCE_THRESHOLD
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceSource {
    pub file: String,
    #[serde(default)]
    pub columns: InvoiceColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClinicalSource {
    pub file: String,
    #[serde(default)]
    pub columns: ClinicalColumns,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Header names in the invoice CSV. The first three are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InvoiceColumns {
    pub po_number: String,
    pub vendor_item: String,
    pub unit_cost: String,
    pub quantity: String,
    pub invoice_date: String,
}

impl Default for InvoiceColumns {
    fn default() -> Self {
        Self {
            po_number: "PO_Number".into(),
            vendor_item: "Vendor_Item_Name".into(),
            unit_cost: "Unit_Cost".into(),
            quantity: "Quantity".into(),
            invoice_date: "Invoice_Date".into(),
        }
    }
}

impl InvoiceColumns {
    pub fn required(&self) -> [&str; 3] {
        [self.po_number.as_str(), self.vendor_item.as_str(), self.unit_cost.as_str()]
    }
}

/// Header names in the clinical CSV. Only `clinical_item` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClinicalColumns {
    pub clinical_item: String,
    pub case_id: String,
    pub qty_used: String,
    pub implant_date: String,
    pub po_ref: String,
}

impl Default for ClinicalColumns {
    fn default() -> Self {
        Self {
            clinical_item: "Clinical_Item_Desc".into(),
            case_id: "Case_ID".into(),
            qty_used: "Qty_Used".into(),
            implant_date: "Implant_Date".into(),
            po_ref: "PO_Ref_Optional".into(),
        }
    }
}

impl ClinicalColumns {
    pub fn required(&self) -> [&str; 1] {
        [self.clinical_item.as_str()]
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Files written after a run. Paths resolve against the config's directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Full report CSV.
    #[serde(default)]
    pub results: Option<String>,
    /// Per-tier summary CSV.
    #[serde(default)]
    pub summary: Option<String>,
    /// Report CSV restricted to High-risk rows.
    #[serde(default)]
    pub high_risk: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    /// Config with default thresholds and columns for two CSV files.
    pub fn new(name: impl Into<String>, invoice_file: impl Into<String>, clinical_file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            high_confidence_threshold: HIGH_CONFIDENCE_THRESHOLD,
            scorer: Scorer::default(),
            invoices: InvoiceSource { file: invoice_file.into(), columns: InvoiceColumns::default() },
            clinical: ClinicalSource { file: clinical_file.into(), columns: ClinicalColumns::default() },
            output: OutputConfig::default(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.match_threshold).with_high_confidence(self.high_confidence_threshold)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (key, value) in [
            ("match_threshold", self.match_threshold),
            ("high_confidence_threshold", self.high_confidence_threshold),
        ] {
            if !(0..=100).contains(&value) {
                return Err(ReconError::ConfigValidation(format!(
                    "{key} must be between 0 and 100, got {value}"
                )));
            }
        }

        if self.thresholds().is_inverted() {
            return Err(ReconError::ConfigValidation(format!(
                "match_threshold ({}) must not exceed high_confidence_threshold ({})",
                self.match_threshold, self.high_confidence_threshold
            )));
        }

        if self.invoices.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation("invoices.file is empty".into()));
        }
        if self.clinical.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation("clinical.file is empty".into()));
        }

        let cols = &self.invoices.columns;
        for (key, name) in [
            ("po_number", &cols.po_number),
            ("vendor_item", &cols.vendor_item),
            ("unit_cost", &cols.unit_cost),
        ] {
            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "invoices.columns.{key} is empty"
                )));
            }
        }
        if self.clinical.columns.clinical_item.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "clinical.columns.clinical_item is empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
