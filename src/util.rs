// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" CSV/number/date/JSON handling so
// the calculators can assume clean, typed values.
use chrono::{DateTime, NaiveDate};
use num_format::{Locale, ToFormattedString};
use serde::de::DeserializeOwned;

/// Parse an embedded JSON field into `T`, or hand back `default`.
///
/// The field may be missing, blank, malformed, or the wrong shape; none of
/// these are errors. Exports sometimes double-encode blobs as a JSON string
/// holding JSON, so a string payload gets one more decoding attempt.
pub fn parse_json_or<T: DeserializeOwned>(raw: Option<&str>, default: T) -> T {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };
    match serde_json::from_str::<T>(s) {
        Ok(v) => v,
        Err(err) => {
            if let Ok(inner) = serde_json::from_str::<String>(s) {
                if let Ok(v) = serde_json::from_str::<T>(&inner) {
                    return v;
                }
            }
            tracing::debug!(error = %err, "embedded field did not parse, using default");
            default
        }
    }
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed or is not finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>().ok()
}

pub fn parse_bool_safe(s: Option<&str>) -> Option<bool> {
    match s?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Dates come either as `YYYY-MM-DD` or as full RFC 3339 timestamps; only the
/// calendar date is kept.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Trimmed, non-empty text or `None`.
pub fn clean_text(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn days_diff(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Round to `decimals` places; non-finite input collapses to 0.
pub fn round_to(n: f64, decimals: i32) -> f64 {
    if !n.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    (n * factor).round() / factor
}

/// `part / total * 100` rounded to one decimal, 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 / total as f64 * 100.0, 1)
}

/// One-decimal percentages for counts that partition a whole.
///
/// Largest-remainder rounding: every share is floored to a tenth, then the
/// leftover tenths go to the largest remainders, earliest index first on
/// ties, so the tenths always add up to exactly 1000. All zeros when the
/// counts sum to 0.
pub fn apportion_percentages(counts: &[usize]) -> Vec<f64> {
    const TENTHS: u128 = 1000;
    let total: u128 = counts.iter().map(|c| *c as u128).sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }

    let mut tenths: Vec<u128> = Vec::with_capacity(counts.len());
    let mut remainders: Vec<(u128, usize)> = Vec::with_capacity(counts.len());
    for (i, count) in counts.iter().enumerate() {
        let scaled = *count as u128 * TENTHS;
        tenths.push(scaled / total);
        remainders.push((scaled % total, i));
    }

    let leftover = TENTHS - tenths.iter().sum::<u128>();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    for (_, i) in remainders.into_iter().take(leftover as usize) {
        tenths[i] += 1;
    }

    tenths.into_iter().map(|t| t as f64 / 10.0).collect()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
