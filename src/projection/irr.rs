//! Internal rate of return for periodic cash flows
//!
//! Used to express the seed investor's outcome as an annualized rate.

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;
const MIN_PERIODIC_RATE: f64 = -0.99;
const MAX_PERIODIC_RATE: f64 = 10.0;

/// Annualized IRR of `flows` (index = period, positive = inflow).
///
/// Newton-Raphson on the periodic rate, falling back to bisection.
/// `None` when the flows have no sign change or no root is bracketed.
pub fn annualized_irr(flows: &[f64], periods_per_year: u32) -> Option<f64> {
    if flows.is_empty() {
        return None;
    }
    if flows.iter().all(|cf| cf.abs() < TOLERANCE) {
        return Some(0.0);
    }
    let has_inflow = flows.iter().any(|&cf| cf > TOLERANCE);
    let has_outflow = flows.iter().any(|&cf| cf < -TOLERANCE);
    if !has_inflow || !has_outflow {
        return None;
    }

    let periodic = newton(flows, periods_per_year).or_else(|| bisection(flows))?;
    Some((1.0 + periodic).powi(periods_per_year as i32) - 1.0)
}

/// Annualized return of a seed investment paid out once after `months`
pub fn investor_irr(seed_investment: f64, payout: f64, months: u32) -> Option<f64> {
    if seed_investment <= 0.0 || months == 0 {
        return None;
    }
    let mut flows = vec![0.0; months as usize + 1];
    flows[0] = -seed_investment;
    flows[months as usize] = payout;
    annualized_irr(&flows, 12)
}

fn newton(flows: &[f64], periods_per_year: u32) -> Option<f64> {
    let mut rate = 0.05 / periods_per_year.max(1) as f64;

    for _ in 0..MAX_ITERATIONS {
        let (npv, slope) = npv_with_slope(flows, rate);
        if slope.abs() < 1e-20 {
            return None;
        }
        let next = (rate - npv / slope).clamp(MIN_PERIODIC_RATE, MAX_PERIODIC_RATE);
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }
    None
}

fn bisection(flows: &[f64]) -> Option<f64> {
    let mut low = MIN_PERIODIC_RATE;
    let mut high = MAX_PERIODIC_RATE;
    let mut npv_low = npv(flows, low);
    if npv_low * npv(flows, high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(flows, mid);
        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
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

fn npv_with_slope(flows: &[f64], rate: f64) -> (f64, f64) {
    flows.iter().enumerate().fold((0.0, 0.0), |(value, slope), (t, &cf)| {
        let discount = (1.0 + rate).powi(t as i32);
        (value + cf / discount, slope - t as f64 * cf / (discount * (1.0 + rate)))
    })
}

fn npv(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubling_over_one_year() {
        let irr = investor_irr(100_000.0, 200_000.0, 12).unwrap();
        assert!((irr - 1.0).abs() < 1e-6, "Expected ~100% IRR, got {}", irr);
    }

    #[test]
    fn test_loss_gives_negative_irr() {
        let irr = investor_irr(100_000.0, 50_000.0, 24).unwrap();
        assert!(irr < 0.0);
        assert!((irr - (0.5f64.sqrt() - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_no_sign_change() {
        assert_eq!(annualized_irr(&[100.0, 50.0], 12), None);
        assert_eq!(investor_irr(0.0, 1_000.0, 12), None);
        assert_eq!(investor_irr(1_000.0, 0.0, 12), None);
        assert_eq!(annualized_irr(&[0.0, 0.0], 12), Some(0.0));
    }
}
