use crate::models::{ReturnsSummary, Trend};

/// Annualized volatility of a close series, in percent.
///
/// Uses day-over-day simple returns, the divisor is the number of returns,
/// and the result is scaled by sqrt(252) trading days. Series with fewer
/// than two points have no returns and report 0.
pub fn volatility(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = closes
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| (r - mean).powi(2))
        .sum::<f64>() / returns.len() as f64;

    variance.sqrt() * (252.0_f64).sqrt() * 100.0
}

/// Classify recent price direction.
///
/// Compares the mean of the last 10 closes against the mean of the up-to-10
/// closes before them. More than +5% relative change is Upward, less than
/// -5% is Downward, anything between is Sideways. Series shorter than 10
/// points are Neutral; at exactly 10 points there is no prior window to
/// compare against, which also reads as Sideways.
pub fn trend(closes: &[f64]) -> Trend {
    if closes.len() < 10 {
        return Trend::Neutral;
    }

    let len = closes.len();
    let recent = &closes[len - 10..];
    let older = &closes[len.saturating_sub(20)..len - 10];

    if older.is_empty() {
        return Trend::Sideways;
    }

    let recent_avg = mean(recent);
    let older_avg = mean(older);
    let change = (recent_avg - older_avg) / older_avg;

    if change > 0.05 {
        Trend::Upward
    } else if change < -0.05 {
        Trend::Downward
    } else {
        Trend::Sideways
    }
}

/// Total and annualized return plus volatility for a close series.
/// Annualization assumes 252 trading days against the series length.
pub fn returns(closes: &[f64]) -> ReturnsSummary {
    if closes.len() < 2 {
        return ReturnsSummary {
            total_return: 0.0,
            annualized_return: 0.0,
            volatility: 0.0,
        };
    }

    let initial = closes[0];
    let final_price = closes[closes.len() - 1];
    let total_return = (final_price - initial) / initial * 100.0;
    let annualized_return =
        ((final_price / initial).powf(252.0 / closes.len() as f64) - 1.0) * 100.0;

    ReturnsSummary {
        total_return,
        annualized_return,
        volatility: volatility(closes),
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volatility_zero_for_short_series() {
        assert_eq!(volatility(&[]), 0.0);
        assert_eq!(volatility(&[100.0]), 0.0);
    }

    #[test]
    fn test_volatility_zero_for_constant_returns() {
        // Same percentage move every day has zero dispersion
        let closes: Vec<f64> = (0..30).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        assert!(volatility(&closes).abs() < 1e-9);
    }

    #[test]
    fn test_volatility_known_value() {
        // Returns are +10% and -10%: mean 0, variance 0.01, daily std 0.1
        let closes = vec![100.0, 110.0, 99.0];
        let expected = 0.1 * (252.0_f64).sqrt() * 100.0;
        assert!((volatility(&closes) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_volatility_never_negative() {
        let closes = vec![480.0, 475.5, 491.2, 460.0, 470.3, 488.8, 465.1];
        assert!(volatility(&closes) >= 0.0);
    }

    #[test]
    fn test_trend_neutral_below_ten_points() {
        let closes = vec![100.0; 9];
        assert_eq!(trend(&closes), Trend::Neutral);
        assert_eq!(trend(&[]), Trend::Neutral);
    }

    #[test]
    fn test_trend_sideways_at_exactly_ten_points() {
        let closes = vec![100.0; 10];
        assert_eq!(trend(&closes), Trend::Sideways);
    }

    #[test]
    fn test_trend_upward_above_five_percent() {
        let mut closes = vec![100.0; 10];
        closes.extend(vec![106.0; 10]);
        assert_eq!(trend(&closes), Trend::Upward);
    }

    #[test]
    fn test_trend_downward_below_minus_five_percent() {
        let mut closes = vec![100.0; 10];
        closes.extend(vec![94.0; 10]);
        assert_eq!(trend(&closes), Trend::Downward);
    }

    #[test]
    fn test_trend_sideways_within_band() {
        let mut closes = vec![100.0; 10];
        closes.extend(vec![103.0; 10]);
        assert_eq!(trend(&closes), Trend::Sideways);

        // Exactly +5% is not "more than 5%"
        let mut closes = vec![100.0; 10];
        closes.extend(vec![105.0; 10]);
        assert_eq!(trend(&closes), Trend::Sideways);
    }

    #[test]
    fn test_trend_partial_prior_window() {
        // 15 points: prior window is only 5 closes, still comparable
        let mut closes = vec![100.0; 5];
        closes.extend(vec![110.0; 10]);
        assert_eq!(trend(&closes), Trend::Upward);
    }

    #[test]
    fn test_returns_zeros_for_short_series() {
        let summary = returns(&[100.0]);
        assert_eq!(summary.total_return, 0.0);
        assert_eq!(summary.annualized_return, 0.0);
        assert_eq!(summary.volatility, 0.0);
    }

    #[test]
    fn test_returns_total_return() {
        let closes = vec![100.0, 104.0, 110.0];
        let summary = returns(&closes);
        assert!((summary.total_return - 10.0).abs() < 1e-9);
        assert!(summary.annualized_return > 0.0);
    }

    #[test]
    fn test_returns_negative_when_price_falls() {
        let closes = vec![100.0, 95.0, 90.0];
        let summary = returns(&closes);
        assert!(summary.total_return < 0.0);
        assert!(summary.annualized_return < 0.0);
    }
}
