//! Allocation decision engine
//!
//! Compares the horizon-end value of a forecast curve against the last known
//! closing price and produces a BUY / HOLD / SELL recommendation. Pure and
//! deterministic: identical inputs always yield the identical decision.

use crate::error::{DashboardError, Result};
use crate::models::{Action, AllocationDecision, ForecastPoint};

/// Relative upside at or above which the recommendation is BUY.
pub const BUY_THRESHOLD: f64 = 0.05;

/// Relative downside at or below which the recommendation is SELL.
pub const SELL_THRESHOLD: f64 = -0.05;

/// Derive a recommendation from a forecast curve and the last actual close.
///
/// Degenerate inputs (empty curve, zero/negative/non-finite last close) are
/// reported as `DecisionUnavailable` rather than risking a division by zero.
pub fn decide(
    curve: &[ForecastPoint],
    last_close: f64,
    horizon_days: u32,
) -> Result<AllocationDecision> {
    let Some(end) = curve.last() else {
        return Err(DashboardError::DecisionUnavailable(
            "forecast curve is empty".to_string(),
        ));
    };

    if !last_close.is_finite() || last_close <= 0.0 {
        return Err(DashboardError::DecisionUnavailable(format!(
            "last close {} is not a usable reference price",
            last_close
        )));
    }

    if !end.price.is_finite() {
        return Err(DashboardError::DecisionUnavailable(
            "forecast end value is not finite".to_string(),
        ));
    }

    let relative = (end.price - last_close) / last_close;
    let percent = relative * 100.0;

    let decision = if relative >= BUY_THRESHOLD {
        AllocationDecision {
            action: Action::Buy,
            justification: format!(
                "Expected upside of {:.2}% over {} days (forecast {:.2} vs last close {:.2}).",
                percent, horizon_days, end.price, last_close
            ),
        }
    } else if relative <= SELL_THRESHOLD {
        AllocationDecision {
            action: Action::Sell,
            justification: format!(
                "Expected downside of {:.2}% over {} days (forecast {:.2} vs last close {:.2}).",
                percent.abs(),
                horizon_days,
                end.price,
                last_close
            ),
        }
    } else {
        AllocationDecision {
            action: Action::Hold,
            justification: format!(
                "Projected move of {:+.2}% over {} days is within the +/-{:.0}% band.",
                percent,
                horizon_days,
                BUY_THRESHOLD * 100.0
            ),
        }
    };

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn curve(prices: &[f64]) -> Vec<ForecastPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| ForecastPoint {
                date: start + chrono::Days::new(i as u64),
                price: *p,
            })
            .collect()
    }

    #[test]
    fn test_buy_at_exact_threshold() {
        let decision = decide(&curve(&[101.0, 103.0, 105.0]), 100.0, 30).unwrap();
        assert_eq!(decision.action, Action::Buy);
        assert!(decision.justification.contains("30 days"));
    }

    #[test]
    fn test_hold_just_below_threshold() {
        let decision = decide(&curve(&[101.0, 104.99]), 100.0, 30).unwrap();
        assert_eq!(decision.action, Action::Hold);
    }

    #[test]
    fn test_sell_below_negative_threshold() {
        let decision = decide(&curve(&[98.0, 94.0]), 100.0, 14).unwrap();
        assert_eq!(decision.action, Action::Sell);
        assert!(decision.justification.contains("downside"));
    }

    #[test]
    fn test_only_end_value_matters() {
        // An interim dip does not change the terminal comparison.
        let decision = decide(&curve(&[80.0, 90.0, 106.0]), 100.0, 3).unwrap();
        assert_eq!(decision.action, Action::Buy);
    }

    #[test]
    fn test_deterministic() {
        let c = curve(&[100.0, 108.5]);
        let a = decide(&c, 100.0, 10).unwrap();
        let b = decide(&c, 100.0, 10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_curve_is_unavailable() {
        let err = decide(&[], 100.0, 30).unwrap_err();
        assert!(matches!(err, DashboardError::DecisionUnavailable(_)));
    }

    #[test]
    fn test_zero_last_close_is_unavailable() {
        let err = decide(&curve(&[105.0]), 0.0, 30).unwrap_err();
        assert!(matches!(err, DashboardError::DecisionUnavailable(_)));
    }

    #[test]
    fn test_nan_last_close_is_unavailable() {
        let err = decide(&curve(&[105.0]), f64::NAN, 30).unwrap_err();
        assert!(matches!(err, DashboardError::DecisionUnavailable(_)));
    }
}
