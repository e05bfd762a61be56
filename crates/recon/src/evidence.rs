use std::collections::BTreeMap;

use crate::model::{MatchResult, RiskTier, SummaryEntry, SummaryStats};
use crate::observer::{NoopObserver, ReconObserver};

/// Per-tier count, total and average cost at risk. All three tiers are
/// always present.
pub fn generate_summary_stats(results: &[MatchResult]) -> SummaryStats {
    generate_summary_stats_with_observer(results, &NoopObserver)
}

/// Like [`generate_summary_stats`]. A tier whose figures cannot be computed
/// is reported to `observer` and zeroed instead of failing the whole report.
pub fn generate_summary_stats_with_observer(
    results: &[MatchResult],
    observer: &dyn ReconObserver,
) -> SummaryStats {
    let mut tiers = BTreeMap::new();
    for tier in RiskTier::ALL {
        let entry = tier_entry(results, tier).unwrap_or_else(|reason| {
            observer.on_summary_degraded(tier, &reason);
            SummaryEntry::zero(tier)
        });
        tiers.insert(tier, entry);
    }
    SummaryStats { tiers }
}

fn tier_entry(results: &[MatchResult], tier: RiskTier) -> Result<SummaryEntry, String> {
    let mut count = 0usize;
    let mut total_cents = 0i64;
    for r in results.iter().filter(|r| r.risk_tier == tier) {
        count += 1;
        total_cents = total_cents.checked_add(r.cost_at_risk_cents).ok_or_else(|| {
            format!("cost total overflowed at PO '{}'", r.po_number)
        })?;
    }

    let avg_cents = average_cents(total_cents, count);

    Ok(SummaryEntry { risk_tier: tier, count, total_cents, avg_cents })
}

/// Integer mean, halves rounded away from zero. |mean| <= max |row|, so it fits in i64.
fn average_cents(total_cents: i64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    let total = i128::from(total_cents);
    let count = count as i128;
    let half = count / 2;
    let avg = if total >= 0 { (total + half) / count } else { (total - half) / count };
    avg as i64
}
