//! # Growth & Return Formulas
//!
//! ```text
//! FV        = PV·(1 + g)^t                 annual compounding
//! annual(R) = (1 + R)^(1/t) − 1            R = total return as a fraction
//! ```

/// Compound a value at an annual percent for `years` (annual compounding).
///
/// ```rust
/// use housemath_core::finance::compound;
///
/// let value = compound(300_000.0, 3.0, 5.0);
/// assert!((value - 347_782.22).abs() < 0.01);
/// ```
#[inline]
pub fn compound(present_value: f64, annual_rate_pct: f64, years: f64) -> f64 {
    present_value * (1.0 + annual_rate_pct / 100.0).powf(years)
}

/// Annualize a total return fraction earned over `years`.
///
/// Returns `None` when the period is not positive or the investment was
/// wiped out (a total return of −100% or worse has no real root).
pub fn annualized_return(total_return: f64, years: f64) -> Option<f64> {
    if years <= 0.0 || total_return <= -1.0 {
        return None;
    }
    Some((1.0 + total_return).powf(1.0 / years) - 1.0)
}

/// Months until a one-time cost is recovered by a monthly saving.
///
/// `None` when the saving never recovers the cost.
pub fn break_even_months(upfront_cost: f64, monthly_saving: f64) -> Option<f64> {
    if monthly_saving <= 0.0 {
        return if upfront_cost <= 0.0 { Some(0.0) } else { None };
    }
    Some((upfront_cost.max(0.0) / monthly_saving).ceil())
}

/// `numerator / denominator`, or 0.0 when the denominator is zero.
#[inline]
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound() {
        assert!((compound(100.0, 10.0, 2.0) - 121.0).abs() < 1e-9);
        assert_eq!(compound(100.0, 0.0, 30.0), 100.0);
    }

    #[test]
    fn test_annualized_return() {
        // Doubling over ~7.27 years is ~10%/yr
        let annual = annualized_return(1.0, 7.272_540_897).unwrap();
        assert!((annual - 0.10).abs() < 1e-6);
        assert!(annualized_return(0.5, 0.0).is_none());
        assert!(annualized_return(-1.0, 5.0).is_none());
    }

    #[test]
    fn test_break_even() {
        assert_eq!(break_even_months(3000.0, 100.0), Some(30.0));
        assert_eq!(break_even_months(3001.0, 100.0), Some(31.0));
        assert_eq!(break_even_months(3000.0, 0.0), None);
        assert_eq!(break_even_months(0.0, -50.0), Some(0.0));
    }

    #[test]
    fn test_ratio_or_zero() {
        assert_eq!(ratio_or_zero(5.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(5.0, 2.0), 2.5);
    }
}
