//! `revguard run|quick|validate`: bill-only reconciliation from the shell.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;
use revguard_recon::config::{ClinicalColumns, InvoiceColumns};
use revguard_recon::engine::{load_clinical_rows, load_invoice_rows};
use revguard_recon::export::{filter_by_tier, write_results_csv, write_summary_csv, ExportKind};
use revguard_recon::model::MatchResult;
use revguard_recon::money::format_currency;
use revguard_recon::{LogObserver, ReconConfig, ReconError, ReconInput, ReconResult, RiskTier};

use crate::exit_codes::EXIT_LEAKAGE_FOUND;
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile invoices against clinical logs from a TOML config file
    #[command(after_help = "\
Examples:
  revguard run audit.recon.toml
  revguard run audit.recon.toml --json
  revguard run audit.recon.toml --tier high
  revguard run audit.recon.toml --output result.json --out-dir exports/")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of the results table
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Only show (and export to the results CSV) items in this tier: high, medium, low
        #[arg(long)]
        tier: Option<RiskTier>,

        /// Also write timestamped full, high-risk and summary CSVs into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Reconcile two CSV files with default column names, no config needed
    #[command(after_help = "\
Examples:
  revguard quick vendor_invoice_data.csv clinical_logs_data.csv
  revguard quick invoices.csv clinical.csv --threshold 80 > audit.csv
  revguard quick invoices.csv clinical.csv --json")]
    Quick {
        /// Vendor invoice CSV (PO_Number, Vendor_Item_Name, Unit_Cost)
        invoices: PathBuf,

        /// Clinical log CSV (Clinical_Item_Desc)
        clinical: PathBuf,

        /// Review threshold: scores below it are flagged as leakage
        #[arg(long, default_value_t = 70, value_parser = clap::value_parser!(i32).range(0..=100))]
        threshold: i32,

        /// Output JSON to stdout instead of the results CSV
        #[arg(long)]
        json: bool,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  revguard validate audit.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { config, json, output, tier, out_dir } => {
            cmd_recon_run(config, json, output, tier, out_dir)
        }
        ReconCommands::Quick { invoices, clinical, threshold, json } => {
            cmd_recon_quick(invoices, clinical, threshold, json)
        }
        ReconCommands::Validate { config } => cmd_recon_validate(config),
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::runtime(format!("cannot read {}: {e}", path.display())))
}

fn load_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = read_file(config_path)?;
    Ok(ReconConfig::from_toml(&config_str)?)
}

fn load_input(
    invoice_path: &Path,
    invoice_columns: &InvoiceColumns,
    clinical_path: &Path,
    clinical_columns: &ClinicalColumns,
) -> Result<ReconInput, CliError> {
    let invoices = load_invoice_rows(&read_file(invoice_path)?, invoice_columns)?;
    let clinical = load_clinical_rows(&read_file(clinical_path)?, clinical_columns)?;
    Ok(ReconInput { invoices, clinical })
}

fn cmd_recon_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    tier: Option<RiskTier>,
    out_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let input = load_input(
        &base_dir.join(&config.invoices.file),
        &config.invoices.columns,
        &base_dir.join(&config.clinical.file),
        &config.clinical.columns,
    )?;

    let result = revguard_recon::run(&config, &input, &LogObserver::default())?;

    let selected: Vec<&MatchResult> = match tier {
        Some(t) => filter_by_tier(&result.results, t),
        None => result.results.iter().collect(),
    };

    // Output
    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    for path in output_file.into_iter().chain(config.output.json.as_ref().map(|p| base_dir.join(p))) {
        write_output(&path, |w| w.write_all(json_str.as_bytes()).map_err(ReconError::from))?;
    }

    if let Some(ref path) = config.output.results {
        write_output(&base_dir.join(path), |w| write_results_csv(w, selected.iter().copied()))?;
    }
    if let Some(ref path) = config.output.summary {
        write_output(&base_dir.join(path), |w| write_summary_csv(w, &result.summary))?;
    }
    if let Some(ref path) = config.output.high_risk {
        write_output(&base_dir.join(path), |w| {
            write_results_csv(w, filter_by_tier(&result.results, RiskTier::High))
        })?;
    }
    if let Some(ref dir) = out_dir {
        write_timestamped_exports(dir, &result)?;
    }

    if json_output {
        println!("{json_str}");
    } else {
        print_results_table(&mut io::stdout().lock(), &selected)
            .map_err(|e| CliError::runtime(format!("cannot write results: {e}")))?;
    }

    print_overview(&result);
    leakage_verdict(&result)
}

fn cmd_recon_quick(
    invoice_path: PathBuf,
    clinical_path: PathBuf,
    threshold: i32,
    json_output: bool,
) -> Result<(), CliError> {
    let mut config = ReconConfig::new(
        "quick",
        invoice_path.display().to_string(),
        clinical_path.display().to_string(),
    );
    config.match_threshold = threshold;

    let input = load_input(
        &invoice_path,
        &config.invoices.columns,
        &clinical_path,
        &config.clinical.columns,
    )?;

    let result = revguard_recon::run(&config, &input, &LogObserver::default())?;

    if json_output {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        write_results_csv(io::stdout().lock(), &result.results)?;
    }

    print_overview(&result);
    leakage_verdict(&result)
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: recon '{}' ({} vs {}), review >= {}, match >= {}, scorer {}",
        config.name,
        config.invoices.file,
        config.clinical.file,
        config.match_threshold,
        config.high_confidence_threshold,
        config.scorer,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn write_output<F>(path: &Path, write: F) -> Result<(), CliError>
where
    F: FnOnce(&mut File) -> Result<(), ReconError>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| CliError::runtime(format!("cannot create {}: {e}", parent.display())))?;
    }
    let mut file = File::create(path)
        .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
    write(&mut file).map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn write_timestamped_exports(dir: &Path, result: &ReconResult) -> Result<(), CliError> {
    let now = chrono::Local::now().naive_local();
    for kind in ExportKind::ALL {
        let path = dir.join(kind.file_name(now));
        match kind {
            ExportKind::FullReport => write_output(&path, |w| write_results_csv(w, &result.results))?,
            ExportKind::HighRisk => write_output(&path, |w| {
                write_results_csv(w, filter_by_tier(&result.results, RiskTier::High))
            })?,
            ExportKind::Summary => write_output(&path, |w| write_summary_csv(w, &result.summary))?,
        }
    }
    Ok(())
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values.map(|v| v.chars().count()).max().unwrap_or(0).max(header.len())
}

/// Fixed-width table of the review columns.
fn print_results_table(out: &mut impl Write, rows: &[&MatchResult]) -> io::Result<()> {
    let po_w = column_width("PO_Number", rows.iter().map(|r| r.po_number.as_str()));
    let item_w = column_width("Vendor_Item", rows.iter().map(|r| r.vendor_item_description.as_str()));
    let match_w = column_width("Clinical_Match", rows.iter().map(|r| r.clinical_match()));

    writeln!(
        out,
        "{:<po_w$}  {:<item_w$}  {:<match_w$}  {:>5}  {:>14}  Status",
        "PO_Number", "Vendor_Item", "Clinical_Match", "Score", "Unit_Cost"
    )?;
    for r in rows {
        writeln!(
            out,
            "{:<po_w$}  {:<item_w$}  {:<match_w$}  {:>4}%  {:>14}  {}",
            r.po_number,
            r.vendor_item_description,
            r.clinical_match(),
            r.confidence_score,
            format_currency(r.cost_at_risk_cents),
            r.status_label,
        )?;
    }
    Ok(())
}

/// KPI overview + per-tier summary, to stderr.
fn print_overview(result: &ReconResult) {
    let o = &result.overview;
    eprintln!(
        "{} invoices ({} total spend) vs {} clinical logs, {} potential gaps",
        o.invoices_processed,
        format_currency(o.total_spend_cents),
        o.clinical_logs,
        o.potential_gaps,
    );
    for entry in result.summary.entries() {
        eprintln!(
            "  {:<6}  {:>4} item(s)  {:>16} at risk  (avg {})",
            entry.risk_tier.as_str(),
            entry.count,
            format_currency(entry.total_cents),
            format_currency(entry.avg_cents),
        );
    }
}

fn leakage_verdict(result: &ReconResult) -> Result<(), CliError> {
    if !result.has_leakage() {
        return Ok(());
    }
    let high = result.summary.get(RiskTier::High);
    Err(CliError::new(
        EXIT_LEAKAGE_FOUND,
        format!(
            "revenue leakage: {} item(s) with no clinical documentation, {} at risk",
            high.count,
            format_currency(high.total_cents),
        ),
    ))
}
