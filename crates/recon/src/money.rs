//! Dollar amounts as integer cents.
//!
//! Amounts enter as text (`4500`, `4500.5`, `$4,500.00`) and are carried as
//! `i64` cents. Formatting back to text happens only at the export boundary.

/// Parse a non-negative dollar amount into cents.
///
/// Accepts an optional leading `$`, thousands separators, and at most two
/// decimal places. Negative values are rejected.
pub fn parse_money(s: &str) -> Result<i64, String> {
    let s = s.trim();
    if s.starts_with('-') {
        return Err(format!("negative amount: {s}"));
    }
    let s = s.strip_prefix('$').unwrap_or(s).trim();
    let s: String = s.chars().filter(|c| *c != ',').collect();
    if s.is_empty() {
        return Err("empty amount".into());
    }

    let (dollars_str, frac) = match s.split_once('.') {
        Some((d, f)) => (d, f),
        None => (s.as_str(), ""),
    };
    if dollars_str.is_empty() && frac.is_empty() {
        return Err(format!("not a number: {s}"));
    }
    if !dollars_str.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("not a number: {s}"));
    }

    let dollars: i64 = if dollars_str.is_empty() {
        0
    } else {
        dollars_str.parse().map_err(|e| format!("bad dollars: {e}"))?
    };
    let cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|e| format!("bad cents: {e}"))? * 10,
        2 => frac.parse().map_err(|e| format!("bad cents: {e}"))?,
        _ => return Err(format!("too many decimal places: {s}")),
    };

    dollars
        .checked_mul(100)
        .and_then(|d| d.checked_add(cents))
        .ok_or_else(|| format!("amount out of range: {s}"))
}

/// Plain two-decimal rendering: `450000` -> `"4500.00"`.
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Currency rendering with thousands separators: `450000` -> `"$4,500.00"`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let digits = (abs / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}${grouped}.{:02}", abs % 100)
}
