// Revenue Guardian CLI - bill-only implant reconciliation

mod exit_codes;
mod recon;

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use exit_codes::{recon_exit_code, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};
use recon::ReconCommands;
use revguard_recon::ReconError;

#[derive(Parser)]
#[command(name = "revguard")]
#[command(about = "Find billed implants with no matching clinical documentation")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log engine progress to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<ReconCommands>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        None => {
            eprintln!("Usage: revguard <command> [options]");
            eprintln!("       revguard --help for more information");
            Err(CliError::new(EXIT_USAGE, ""))
        }
        Some(cmd) => recon::cmd_recon(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumn { table, .. } => {
                let section = if table == "clinical" { "[clinical.columns]" } else { "[invoices.columns]" };
                Some(format!("map the header names under {section} in the config"))
            }
            ReconError::AmountParse { .. } => {
                Some("unit costs must be non-negative amounts like 4500, 4500.00 or $4,500.00".to_string())
            }
            ReconError::ConfigValidation(msg) if msg.contains("must not exceed") => {
                Some("lower match_threshold or raise high_confidence_threshold".to_string())
            }
            _ => None,
        };
        let cli_err = Self::new(recon_exit_code(&err), err.to_string());
        match hint {
            Some(hint) => cli_err.with_hint(hint),
            None => cli_err,
        }
    }
}
