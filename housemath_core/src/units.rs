//! # Unit Types
//!
//! Display wrappers for the two units every result card shows. They are
//! plain f64 newtypes: calculators work in raw numbers and wrap a value only
//! when it is rendered.
//!
//! ## Conventions
//!
//! - Money: US dollars, negative amounts rendered as `-$1,234.00`
//! - Rates: entered and stored as percents (6.5 means 6.5%)
//!
//! ## Example
//!
//! ```rust
//! use housemath_core::units::{Dollars, Percent};
//!
//! assert_eq!(Dollars(1438.92).to_string(), "$1,438.92");
//! assert_eq!(Dollars(-100.0).whole(), "-$100");
//! assert_eq!(Percent(6.0).to_string(), "6.00%");
//! ```

use std::fmt;

// ============================================================================
// Money
// ============================================================================

/// Amount in US dollars
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Dollars(pub f64);

impl fmt::Display for Dollars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&signed_dollars(self.0, 2))
    }
}

impl Dollars {
    /// Whole-dollar rendering, used for slider labels
    pub fn whole(self) -> String {
        signed_dollars(self.0, 0)
    }
}

/// `$` goes after the sign: `-$2,500`.
fn signed_dollars(value: f64, decimals: usize) -> String {
    let grouped = group_thousands(value, decimals);
    match grouped.strip_prefix('-') {
        Some(magnitude) => format!("-${}", magnitude),
        None => format!("${}", grouped),
    }
}

// ============================================================================
// Rates
// ============================================================================

/// Rate expressed as a percent (6.5 = 6.5%)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percent(pub f64);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

/// Format a number with comma thousands separators.
///
/// The sign is kept out of the digit groups, and a value that rounds to zero
/// loses it.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    if value < 0.0 && formatted.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollar_display() {
        assert_eq!(Dollars(0.0).to_string(), "$0.00");
        assert_eq!(Dollars(999.5).to_string(), "$999.50");
        assert_eq!(Dollars(1_234_567.891).to_string(), "$1,234,567.89");
        assert_eq!(Dollars(-2500.0).to_string(), "-$2,500.00");
        assert_eq!(Dollars(300_000.0).whole(), "$300,000");
        assert_eq!(Dollars(-100.0).whole(), "-$100");
    }

    #[test]
    fn test_group_thousands_negative() {
        assert_eq!(group_thousands(-100.0, 0), "-100");
        assert_eq!(group_thousands(-100_500.0, 0), "-100,500");
        assert_eq!(group_thousands(-1_234.5, 2), "-1,234.50");
        assert_eq!(group_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent(6.5).to_string(), "6.50%");
        assert_eq!(Percent(-1.25).to_string(), "-1.25%");
    }
}
