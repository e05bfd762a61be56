use std::path::PathBuf;

use revguard_recon::classify::{STATUS_MATCH_FOUND, STATUS_REVENUE_LEAKAGE, STATUS_REVIEW_REQUIRED};
use revguard_recon::config::{ClinicalColumns, InvoiceColumns, ReconConfig};
use revguard_recon::engine::{load_clinical_rows, load_invoice_rows, run, ReconEngine};
use revguard_recon::export::{filter_by_tier, write_results_csv, write_summary_csv, ExportKind};
use revguard_recon::model::{ReconInput, ReconResult, RiskTier};
use revguard_recon::{NoopObserver, ReconError, Scorer};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load(config: &ReconConfig) -> ReconInput {
    ReconInput {
        invoices: load_invoice_rows(&fixture(&config.invoices.file), &config.invoices.columns).unwrap(),
        clinical: load_clinical_rows(&fixture(&config.clinical.file), &config.clinical.columns).unwrap(),
    }
}

fn load_and_run(config_toml: &str) -> ReconResult {
    let config = ReconConfig::from_toml(config_toml).unwrap();
    run(&config, &load(&config), &NoopObserver).unwrap()
}

fn default_run() -> ReconResult {
    load_and_run(&fixture("bill-only.recon.toml"))
}

// -------------------------------------------------------------------------
// Classification
// -------------------------------------------------------------------------

#[test]
fn one_result_per_invoice_in_order() {
    let result = default_run();
    let pos: Vec<&str> = result.results.iter().map(|r| r.po_number.as_str()).collect();
    assert_eq!(
        pos,
        vec!["PO-2024-001", "PO-2024-002", "PO-2024-003", "PO-2024-004", "PO-2024-005", "PO-2024-006"]
    );
}

#[test]
fn reordered_and_recased_descriptions_are_confirmed() {
    let result = default_run();

    for po in ["PO-2024-001", "PO-2024-003", "PO-2024-004"] {
        let r = result.results.iter().find(|r| r.po_number == po).unwrap();
        assert_eq!(r.confidence_score, 100, "{po}");
        assert_eq!(r.risk_tier, RiskTier::Low, "{po}");
        assert_eq!(r.status_label, STATUS_MATCH_FOUND, "{po}");
    }

    let graft = &result.results[3];
    assert_eq!(graft.matched_clinical_description.as_deref(), Some("allograft bone graft 10cc"));
}

#[test]
fn partial_match_needs_review() {
    let result = default_run();
    let knee = &result.results[4];

    // Closer to the triathlon entry (79) than to "stryker knee total" (76).
    assert_eq!(knee.confidence_score, 79);
    assert_eq!(knee.matched_clinical_description.as_deref(), Some("triathlon knee system stryker"));
    assert_eq!(knee.risk_tier, RiskTier::Medium);
    assert_eq!(knee.status_label, STATUS_REVIEW_REQUIRED);
}

#[test]
fn undocumented_items_are_leakage() {
    let result = default_run();

    let hip = &result.results[1];
    assert_eq!(hip.risk_tier, RiskTier::High);
    assert_eq!(hip.status_label, STATUS_REVENUE_LEAKAGE);
    assert_eq!(hip.cost_at_risk_cents, 320050);
    // Best candidate is still reported.
    assert!(hip.matched_clinical_description.is_some());

    let stent = &result.results[5];
    assert_eq!(stent.risk_tier, RiskTier::High);
    assert!(stent.confidence_score < 70);
}

#[test]
fn raising_threshold_moves_review_to_leakage() {
    let toml = fixture("bill-only.recon.toml").replace("match_threshold = 70", "match_threshold = 80");
    let result = load_and_run(&toml);

    assert_eq!(result.results[4].risk_tier, RiskTier::High);
    assert_eq!(result.summary.get(RiskTier::Medium).count, 0);
    assert_eq!(result.summary.get(RiskTier::High).count, 3);
}

// -------------------------------------------------------------------------
// Summary + overview
// -------------------------------------------------------------------------

#[test]
fn summary_by_tier() {
    let result = default_run();
    let s = &result.summary;

    let high = s.get(RiskTier::High);
    assert_eq!(high.count, 2);
    assert_eq!(high.total_cents, 595050);
    assert_eq!(high.avg_cents, 297525);

    let medium = s.get(RiskTier::Medium);
    assert_eq!(medium.count, 1);
    assert_eq!(medium.total_cents, 450000);

    let low = s.get(RiskTier::Low);
    assert_eq!(low.count, 3);
    assert_eq!(low.total_cents, 655000);
    assert_eq!(low.avg_cents, 218333);

    assert_eq!(s.total_count(), result.results.len());
    assert!(result.has_leakage());
}

#[test]
fn overview_kpis() {
    let result = default_run();
    let o = result.overview;
    assert_eq!(o.invoices_processed, 6);
    assert_eq!(o.clinical_logs, 4);
    assert_eq!(o.total_spend_cents, 1700050);
    assert_eq!(o.potential_gaps, 2);
}

#[test]
fn meta_reflects_config() {
    let result = default_run();
    assert_eq!(result.meta.config_name, "Q1 bill-only implant audit");
    assert_eq!(result.meta.match_threshold, 70);
    assert_eq!(result.meta.high_confidence_threshold, 90);
    assert_eq!(result.meta.scorer, "token_sort");
    assert_eq!(result.meta.engine_version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn json_shape() {
    let result = default_run();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["results"].as_array().unwrap().len(), 6);
    assert_eq!(json["results"][1]["risk_tier"], "High");
    assert_eq!(json["results"][1]["status_label"], STATUS_REVENUE_LEAKAGE);
    assert_eq!(json["summary"]["tiers"]["High"]["count"], 2);
    assert_eq!(json["overview"]["potential_gaps"], 2);
}

// -------------------------------------------------------------------------
// Scorers
// -------------------------------------------------------------------------

#[test]
fn every_scorer_confirms_identical_descriptions() {
    for scorer in ["ratio", "levenshtein", "jaro_winkler"] {
        let toml = fixture("bill-only.recon.toml")
            .replace("scorer = \"token_sort\"", &format!("scorer = \"{scorer}\""));
        let result = load_and_run(&toml);

        // Recased only, so every scorer sees identical normalized text.
        let screw = &result.results[2];
        assert_eq!(screw.confidence_score, 100, "{scorer}");
        assert_eq!(screw.risk_tier, RiskTier::Low, "{scorer}");
        assert_eq!(result.meta.scorer, scorer);
    }
}

#[test]
fn plain_ratio_is_order_sensitive() {
    let config = ReconConfig::from_toml(&fixture("bill-only.recon.toml")).unwrap();
    let input = load(&config);

    let token_sort = ReconEngine::new(70).reconcile(&input.invoices, &input.clinical).unwrap();
    let ratio = ReconEngine::new(70)
        .with_scorer(Scorer::Ratio)
        .reconcile(&input.invoices, &input.clinical)
        .unwrap();

    assert_eq!(token_sort[0].confidence_score, 100);
    assert!(ratio[0].confidence_score < 100);
}

// -------------------------------------------------------------------------
// Loading failures
// -------------------------------------------------------------------------

#[test]
fn missing_unit_cost_rejected_before_matching() {
    let err = load_invoice_rows(&fixture("invoice_missing_cost.csv"), &InvoiceColumns::default()).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("Unit_Cost"), "{err}");
}

#[test]
fn header_only_clinical_log_fails_validation() {
    let clinical = load_clinical_rows(&fixture("header_only.csv"), &ClinicalColumns::default()).unwrap();
    assert!(clinical.is_empty());

    let invoices =
        load_invoice_rows(&fixture("vendor_invoice_data.csv"), &InvoiceColumns::default()).unwrap();
    let err = ReconEngine::default().reconcile(&invoices, &clinical).unwrap_err();
    assert_eq!(err, ReconError::Validation("clinical data is empty".into()));
}

#[test]
fn renamed_columns_via_config() {
    let toml = r#"
name = "Renamed"

[invoices]
file = "invoice_renamed_columns.csv"
[invoices.columns]
po_number = "Purchase Order"
vendor_item = "Description"
unit_cost = "Price"

[clinical]
file = "clinical_logs_data.csv"
"#;
    let result = load_and_run(toml);

    assert_eq!(result.results.len(), 2);
    assert_eq!(result.results[0].po_number, "AP-77");
    assert_eq!(result.results[0].cost_at_risk_cents, 450000);
    assert_eq!(result.results[0].risk_tier, RiskTier::Medium);
    assert_eq!(result.results[1].cost_at_risk_cents, 275000);
    assert_eq!(result.results[1].risk_tier, RiskTier::High);
}

// -------------------------------------------------------------------------
// Export
// -------------------------------------------------------------------------

#[test]
fn high_risk_export_contains_only_leakage() {
    let result = default_run();
    let mut buf = Vec::new();
    write_results_csv(&mut buf, filter_by_tier(&result.results, RiskTier::High)).unwrap();
    let out = String::from_utf8(buf).unwrap();

    let rows: Vec<&str> = out.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("PO-2024-002,Zimmer Hip Stem,"));
    assert!(rows[0].ends_with(",\"$3,200.50\",3200.50,❌ REVENUE LEAKAGE,High"));
    assert!(rows[1].starts_with("PO-2024-006,"));
}

#[test]
fn summary_export() {
    let result = default_run();
    let mut buf = Vec::new();
    write_summary_csv(&mut buf, &result.summary).unwrap();
    let out = String::from_utf8(buf).unwrap();

    assert_eq!(
        out,
        "Risk_Level,count,total_amount,avg_amount\n\
         High,2,5950.50,2975.25\n\
         Medium,1,4500.00,4500.00\n\
         Low,3,6550.00,2183.33\n"
    );
}

#[test]
fn full_report_written_to_timestamped_file() {
    let result = default_run();
    let dir = tempfile::tempdir().unwrap();
    let at = chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(17, 0, 0).unwrap();
    let path = dir.path().join(ExportKind::FullReport.file_name(at));

    let file = std::fs::File::create(&path).unwrap();
    write_results_csv(file, &result.results).unwrap();

    assert!(path.ends_with("revenue_leakage_audit_20240331_170000.csv"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 7);
    assert!(written.contains("PO-2024-005,Stryker Knee System,triathlon knee system stryker,79%,79,"));
}
