//! Internal Rate of Return (IRR) calculation
//!
//! Used for the before- and after-tax return of a hold-then-sell cashflow series

/// Bounds of the periodic rate search
const RATE_FLOOR: f64 = -0.99;
const RATE_CAP: f64 = 10.0;

/// Absolute NPV tolerance for an accepted root
const NPV_TOLERANCE: f64 = 1e-7;

const MAX_ITERATIONS: usize = 200;

/// Calculate the periodic Internal Rate of Return for a series of cash flows
/// using the Newton-Raphson method, falling back to bisection.
///
/// # Arguments
/// * `cashflows` - Cash flows by period, `cashflows[0]` being the initial outlay
///   (negative) and the last entry including any terminal sale value
///
/// # Returns
/// * `Some(0.0)` for fewer than two flows (no rate is defined)
/// * `Some(rate)` where NPV at `rate` is zero within tolerance
/// * `None` when no root exists in [-99%, 1000%] or the solvers do not converge
pub fn calculate_irr(cashflows: &[f64]) -> Option<f64> {
    if cashflows.len() < 2 {
        return Some(0.0);
    }

    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Some(0.0);
    }

    // At least one sign change is required for a root
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return None;
    }

    let tolerance = npv_tolerance(cashflows);
    let mut rate = 0.10;

    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if npv.abs() <= tolerance {
            return Some(rate);
        }

        if dnpv.abs() < 1e-20 || !dnpv.is_finite() {
            // Flat or degenerate slope, Newton cannot make progress
            break;
        }

        let new_rate = (rate - npv / dnpv).clamp(RATE_FLOOR, RATE_CAP);

        if (new_rate - rate).abs() < 1e-12 {
            if npv_at_rate(cashflows, new_rate).abs() <= tolerance {
                return Some(new_rate);
            }
            break;
        }

        rate = new_rate;
    }

    calculate_irr_bisection(cashflows, tolerance)
}

/// NPV tolerance: the absolute target, widened only when the flows are so large
/// that f64 rounding alone exceeds it
fn npv_tolerance(cashflows: &[f64]) -> f64 {
    let magnitude: f64 = cashflows.iter().map(|cf| cf.abs()).sum();
    NPV_TOLERANCE.max(magnitude * 1e-13)
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / ((1.0 + rate).powi(t as i32 + 1));
        }
    }

    (npv, dnpv)
}

/// Fallback IRR calculation using bisection method
fn calculate_irr_bisection(cashflows: &[f64], tolerance: f64) -> Option<f64> {
    let mut low = RATE_FLOOR;
    let mut high = RATE_CAP;

    let mut npv_low = npv_at_rate(cashflows, low);
    let npv_high = npv_at_rate(cashflows, high);

    // Check that we have a root in this interval
    if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() <= tolerance || (high - low) / 2.0 < 1e-15 {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

/// Calculate NPV at a given periodic rate
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        let irr = calculate_irr(&[-1000.0, 1100.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_multi_period_irr() {
        // 1000 grows to 1331 over three years at 10%
        let irr = calculate_irr(&[-1000.0, 0.0, 0.0, 1331.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_short_series_is_zero() {
        assert_eq!(calculate_irr(&[]), Some(0.0));
        assert_eq!(calculate_irr(&[-500.0]), Some(0.0));
    }

    #[test]
    fn test_no_sign_change_has_no_solution() {
        assert_eq!(calculate_irr(&[-1000.0, -50.0, -20.0]), None);
        assert_eq!(calculate_irr(&[0.0, 120.0]), None);
    }

    #[test]
    fn test_negative_return() {
        let irr = calculate_irr(&[-1000.0, 500.0]).unwrap();
        assert_abs_diff_eq!(irr, -0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_npv_is_zero_at_solution() {
        // Hold-and-sell shape: outlay, growing cash flows, sale in the last year
        let mut flows = vec![-92_000.0];
        flows.extend((1..=10).map(|y| 17_000.0 * 1.02_f64.powi(y - 1)));
        *flows.last_mut().unwrap() += 180_000.0;

        let irr = calculate_irr(&flows).unwrap();
        assert!(irr > 0.0);
        assert_abs_diff_eq!(npv_at_rate(&flows, irr), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bisection_fallback() {
        let flows = [-1000.0, 300.0, 400.0, 500.0];
        let tolerance = npv_tolerance(&flows);
        let irr = calculate_irr_bisection(&flows, tolerance).unwrap();
        assert_abs_diff_eq!(npv_at_rate(&flows, irr), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(irr, calculate_irr(&flows).unwrap(), epsilon = 1e-9);
    }
}
