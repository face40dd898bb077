//! Money as integer cents.
//!
//! Every monetary value in the system is an `i64` count of cents; floats
//! never enter the arithmetic. Display conversion happens only at the
//! JSON boundary, always with exactly two decimals.

/// Format a cent amount as a two-decimal string, e.g. `2500` → `"25.00"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Line total of a single sale item.
pub fn line_total_cents(quantity: i32, unit_price_cents: i64) -> i64 {
    i64::from(quantity) * unit_price_cents
}
