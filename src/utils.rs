//! Common utility functions used across modules.
//!
//! This module provides shared formatting helpers for the console report:
//! - [`format_count`] - Format counts with thousands separator (1,234,567)
//! - [`format_rate`] - Format a percentage with two decimals (90.00%)
//! - [`truncate`] - Truncate strings with ellipsis

/// Format a number with thousands separators (commas).
///
/// # Examples
/// ```
/// use shieldaudit::utils::format_count;
/// assert_eq!(format_count(1000), "1,000");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage with two decimals.
///
/// # Examples
/// ```
/// use shieldaudit::utils::format_rate;
/// assert_eq!(format_rate(90.0), "90.00%");
/// assert_eq!(format_rate(33.33), "33.33%");
/// ```
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate)
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated.
///
/// # Examples
/// ```
/// use shieldaudit::utils::truncate;
/// assert_eq!(truncate("short", 10), "short");
/// assert_eq!(truncate("this is long", 10), "this is...");
/// ```
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
