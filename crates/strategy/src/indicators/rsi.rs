/// RSI (Relative Strength Index) oscillator.
///
/// Wilder-smoothed, matching the standard charting definition. Threshold
/// interpretation (oversold/overbought) is the strategy's concern; this
/// type only produces the 0..=100 value.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period }
    }

    /// Compute RSI from a slice of close prices (oldest first).
    /// Returns `None` until `period + 1` values are available.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.period + 1 {
            return None;
        }

        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let seed = &changes[..self.period];

        let mut avg_gain =
            seed.iter().filter(|&&c| c > 0.0).sum::<f64>() / self.period as f64;
        let mut avg_loss = seed.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>()
            / self.period as f64;

        // Wilder smoothing over the remaining changes
        for &change in &changes[self.period..] {
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);
            avg_gain = (avg_gain * (self.period - 1) as f64 + gain) / self.period as f64;
            avg_loss = (avg_loss * (self.period - 1) as f64 + loss) / self.period as f64;
        }

        if avg_loss == 0.0 {
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_needs_period_plus_one_closes() {
        let rsi = RsiIndicator::new(14);
        assert!(rsi.compute(&vec![100.0; 14]).is_none());
        assert!(rsi.compute(&vec![100.0; 15]).is_some());
    }

    #[test]
    fn rsi_saturates_at_100_on_straight_gains() {
        let rsi = RsiIndicator::new(3);
        let closes: Vec<f64> = (0..6).map(|i| 10.0 + i as f64).collect();
        let value = rsi.compute(&closes).unwrap();
        assert!((value - 100.0).abs() < 1e-6, "expected ~100, got {value}");
    }

    #[test]
    fn rsi_goes_to_zero_on_straight_losses() {
        let rsi = RsiIndicator::new(3);
        let closes: Vec<f64> = (0..6).map(|i| 20.0 - i as f64).collect();
        let value = rsi.compute(&closes).unwrap();
        assert!(value.abs() < 1e-6, "expected ~0, got {value}");
    }

    #[test]
    fn rsi_stays_in_range_on_mixed_series() {
        let rsi = RsiIndicator::new(14);
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.15, 43.61, 44.33, 44.83,
            45.10, 45.15, 44.34, 44.09, 44.50, 43.90,
        ];
        let value = rsi.compute(&closes).unwrap();
        assert!((0.0..=100.0).contains(&value), "RSI out of range: {value}");
    }
}
