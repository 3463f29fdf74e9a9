use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

/// longest window any simulation or amortization schedule runs, 100 years
pub const MAX_MONTHS: u32 = 1_200;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// rows retained in each returned projection model
    pub projection_months: u32,
    /// months actually simulated, long enough to find payoff on slow loans
    pub simulation_months: u32,
    /// horizon summary lengths, in months
    pub horizons: Vec<u32>,
    /// trailing calendar months in the payment-consistency trend
    pub trend_months: u32,
    /// per-month cap applied to paid/expected before averaging
    pub consistency_ratio_cap: Decimal,
    /// outstanding at or below this is treated as paid off
    pub outstanding_epsilon: Decimal,
    /// loans at or below this outstanding are not strategy candidates
    pub strategy_min_outstanding: Decimal,
    /// subscription cycle assumed when no payment count is configured
    pub default_subscription_payments: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            projection_months: 36,
            simulation_months: 360,
            horizons: vec![12, 24, 36],
            trend_months: 12,
            consistency_ratio_cap: dec!(1.4),
            outstanding_epsilon: dec!(0.000001),
            strategy_min_outstanding: dec!(0.005),
            default_subscription_payments: 12,
        }
    }
}

impl EngineConfig {
    /// set the number of retained rows, clamped to `1..=MAX_MONTHS`
    pub fn with_projection_months(mut self, months: u32) -> Self {
        self.projection_months = months.clamp(1, MAX_MONTHS);
        self
    }

    /// set the simulated window, clamped to `1..=MAX_MONTHS`
    pub fn with_simulation_months(mut self, months: u32) -> Self {
        self.simulation_months = months.clamp(1, MAX_MONTHS);
        self
    }

    pub fn with_horizons(mut self, horizons: Vec<u32>) -> Self {
        self.horizons = horizons;
        self
    }

    pub fn with_trend_months(mut self, months: u32) -> Self {
        self.trend_months = months;
        self
    }

    /// months the simulator has to run to serve both the retained rows and the horizons
    pub fn months_to_simulate(&self) -> u32 {
        let longest_horizon = self.horizons.iter().copied().max().unwrap_or(0);
        self.simulation_months
            .max(self.projection_months)
            .max(longest_horizon)
            .clamp(1, MAX_MONTHS)
    }

    /// highest consistency score, `cap × 100`
    pub fn max_consistency_score(&self) -> Decimal {
        self.consistency_ratio_cap * Decimal::ONE_HUNDRED
    }

    /// check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.simulation_months == 0 {
            return Err(EngineError::InvalidConfiguration {
                message: "simulation_months must be at least 1".to_string(),
            });
        }
        if self.projection_months == 0 {
            return Err(EngineError::InvalidConfiguration {
                message: "projection_months must be at least 1".to_string(),
            });
        }
        if self.simulation_months > MAX_MONTHS || self.projection_months > MAX_MONTHS {
            return Err(EngineError::InvalidConfiguration {
                message: format!("simulated and retained months must not exceed {}", MAX_MONTHS),
            });
        }
        if self.horizons.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                message: "at least one horizon is required".to_string(),
            });
        }
        if let Some(h) = self.horizons.iter().find(|h| **h == 0 || **h > self.simulation_months) {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "horizon {} must be within 1..={} months",
                    h, self.simulation_months
                ),
            });
        }
        if self.consistency_ratio_cap <= Decimal::ZERO {
            return Err(EngineError::InvalidConfiguration {
                message: "consistency_ratio_cap must be positive".to_string(),
            });
        }
        if self.outstanding_epsilon.is_sign_negative() || self.strategy_min_outstanding.is_sign_negative() {
            return Err(EngineError::InvalidConfiguration {
                message: "thresholds must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.months_to_simulate(), 360);
        assert_eq!(config.max_consistency_score(), dec!(140.0));
    }

    #[test]
    fn test_months_to_simulate_covers_retained_rows() {
        let config = EngineConfig::default().with_projection_months(480);
        assert_eq!(config.months_to_simulate(), 480);

        let config = EngineConfig::default().with_projection_months(0);
        assert_eq!(config.projection_months, 1);
    }

    #[test]
    fn test_windows_are_bounded() {
        let config = EngineConfig::default()
            .with_projection_months(u32::MAX)
            .with_simulation_months(u32::MAX);
        assert_eq!(config.projection_months, MAX_MONTHS);
        assert_eq!(config.months_to_simulate(), MAX_MONTHS);
        assert!(config.validate().is_ok());

        let config = EngineConfig {
            simulation_months: 5_000,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_rejects_bad_horizons() {
        let config = EngineConfig::default().with_horizons(vec![]);
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfiguration { .. })));

        let config = EngineConfig::default().with_horizons(vec![12, 400]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserializes_from_json() {
        let json = serde_json::to_string(&EngineConfig::default()).unwrap();
        let parsed: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, EngineConfig::default());
    }
}
