use chrono::{DateTime, Datelike, TimeZone};
use std::fmt::Display;

/// Currency every amount from the store is denominated in.
pub const CURRENCY: &str = "QAR";

/// Format an amount with thousands separators, e.g. "QAR 1,250.50"
pub fn format_amount(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let whole = (cents / 100).abs();
    let frac = (cents % 100).abs();

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if cents < 0 { "-" } else { "" };
    format!("{} {}{}.{:02}", CURRENCY, sign, grouped, frac)
}

/// Format a stay as "Sat 01 Mar - Tue 04 Mar 2025"; the year is repeated
/// on the check-in side only when the stay crosses a year boundary.
pub fn format_stay<Tz>(check_in: &DateTime<Tz>, check_out: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let start = if check_in.year() == check_out.year() {
        check_in.format("%a %d %b")
    } else {
        check_in.format("%a %d %b %Y")
    };
    format!("{} - {}", start, check_out.format("%a %d %b %Y"))
}

/// Format a duration as human-readable string (e.g., "2d 3h 15m")
pub fn format_duration(d: chrono::Duration) -> String {
    let total_mins = d.num_minutes().max(0);
    let days = total_mins / (24 * 60);
    let hours = (total_mins % (24 * 60)) / 60;
    let mins = total_mins % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, mins)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
