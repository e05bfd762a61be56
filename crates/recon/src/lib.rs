//! `revguard-recon`: bill-only implant reconciliation engine.
//!
//! Matches vendor invoice lines against clinical usage logs by fuzzy
//! description similarity and sorts every billed item into a revenue
//! leakage risk tier. Pure engine crate: receives CSV text or pre-loaded
//! records, returns classified results. No CLI or filesystem access.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod export;
pub mod matcher;
pub mod model;
pub mod money;
pub mod normalize;
pub mod observer;

pub use classify::{classify, Thresholds};
pub use config::ReconConfig;
pub use engine::{reconcile, run, ReconEngine};
pub use error::ReconError;
pub use evidence::generate_summary_stats;
pub use matcher::{best_match, BestMatch, CandidateSet, Scorer};
pub use model::{
    ClinicalLogEntry, DatasetOverview, InvoiceLine, MatchResult, ReconInput, ReconResult, RiskTier,
    SummaryEntry, SummaryStats,
};
pub use normalize::normalize;
pub use observer::{LogObserver, NoopObserver, ReconObserver};
