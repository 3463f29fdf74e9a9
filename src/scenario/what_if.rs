use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::events::EventLog;
use crate::loan::{LoanRecord, ProjectionOverride};
use crate::portfolio::{build_portfolio_projection_on, LoanPortfolioProjection, OverrideMap};
use crate::types::ScenarioTarget;

/// deltas applied to one loan or to every loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfInput {
    pub target: ScenarioTarget,
    #[serde(default)]
    pub extra_payment_delta: Money,
    #[serde(default)]
    pub apr_delta: Rate,
    #[serde(default)]
    pub subscription_cost_delta: Money,
    #[serde(default)]
    pub due_day_shift: i32,
}

impl WhatIfInput {
    /// no-op deltas aimed at `target`
    pub fn new(target: ScenarioTarget) -> Self {
        Self {
            target,
            extra_payment_delta: Money::ZERO,
            apr_delta: Rate::ZERO,
            subscription_cost_delta: Money::ZERO,
            due_day_shift: 0,
        }
    }

    pub fn with_extra_payment(mut self, delta: Money) -> Self {
        self.extra_payment_delta = delta;
        self
    }

    pub fn with_apr_delta(mut self, delta: Rate) -> Self {
        self.apr_delta = delta;
        self
    }

    pub fn with_subscription_cost_delta(mut self, delta: Money) -> Self {
        self.subscription_cost_delta = delta;
        self
    }

    pub fn with_due_day_shift(mut self, shift: i32) -> Self {
        self.due_day_shift = shift;
        self
    }

    pub fn overrides(&self) -> ProjectionOverride {
        ProjectionOverride {
            extra_payment_delta: self.extra_payment_delta,
            apr_delta: self.apr_delta,
            subscription_cost_delta: self.subscription_cost_delta,
            due_day_shift: self.due_day_shift,
        }
    }
}

/// `scenario − baseline` for the headline figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WhatIfDeltas {
    pub next_month_interest: Money,
    pub annual_interest: Money,
    pub annual_payments: Money,
    pub total_outstanding: Money,
}

impl WhatIfDeltas {
    pub fn between(baseline: &LoanPortfolioProjection, scenario: &LoanPortfolioProjection) -> Self {
        Self {
            next_month_interest: scenario.next_month_interest - baseline.next_month_interest,
            annual_interest: scenario.annual_interest - baseline.annual_interest,
            annual_payments: scenario.annual_payments - baseline.annual_payments,
            total_outstanding: scenario.total_outstanding - baseline.total_outstanding,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == WhatIfDeltas::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanWhatIfResult {
    pub input: WhatIfInput,
    pub baseline: LoanPortfolioProjection,
    pub scenario: LoanPortfolioProjection,
    pub deltas: WhatIfDeltas,
}

impl LoanWhatIfResult {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// run the portfolio with and without the input's deltas
pub fn run_what_if(
    loans: &[LoanRecord],
    input: &WhatIfInput,
    events: EventLog<'_>,
    config: &EngineConfig,
    time_provider: &SafeTimeProvider,
) -> Result<LoanWhatIfResult> {
    let today = time_provider.now().date_naive();
    let overrides = override_map(loans, input)?;

    let baseline = build_portfolio_projection_on(loans, &OverrideMap::new(), events, config, today)?;
    let scenario = build_portfolio_projection_on(loans, &overrides, events, config, today)?;
    let deltas = WhatIfDeltas::between(&baseline, &scenario);

    debug!(
        target = ?input.target,
        annual_interest_delta = %deltas.annual_interest,
        "ran what-if scenario"
    );

    Ok(LoanWhatIfResult {
        input: *input,
        baseline,
        scenario,
        deltas,
    })
}

fn override_map(loans: &[LoanRecord], input: &WhatIfInput) -> Result<OverrideMap> {
    let overrides = input.overrides();
    match input.target {
        ScenarioTarget::All => Ok(loans.iter().map(|loan| (loan.id, overrides)).collect()),
        ScenarioTarget::Loan(id) => {
            if !loans.iter().any(|loan| loan.id == id) {
                return Err(EngineError::LoanNotFound { id });
            }
            Ok(OverrideMap::from([(id, overrides)]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn loans() -> Vec<LoanRecord> {
        vec![
            LoanRecord::builder()
                .name("Card")
                .balance(Money::from_major(1_200))
                .apr_percent(dec!(12))
                .fixed_minimum(Money::from_major(100))
                .build(),
            LoanRecord::builder()
                .name("Car")
                .balance(Money::from_major(6_000))
                .apr_percent(dec!(6))
                .fixed_minimum(Money::from_major(250))
                .build(),
        ]
    }

    #[test]
    fn test_zero_deltas_change_nothing() {
        let input = WhatIfInput::new(ScenarioTarget::All);
        let result = run_what_if(
            &loans(),
            &input,
            EventLog::default(),
            &EngineConfig::default(),
            &time(),
        )
        .unwrap();

        assert!(result.deltas.is_zero());
        assert_eq!(result.baseline, result.scenario);
    }

    #[test]
    fn test_apr_increase_on_one_loan() {
        let loans = loans();
        let input = WhatIfInput::new(ScenarioTarget::Loan(loans[0].id))
            .with_apr_delta(Rate::from_percent(dec!(12)));
        let result = run_what_if(
            &loans,
            &input,
            EventLog::default(),
            &EngineConfig::default(),
            &time(),
        )
        .unwrap();

        // 1200 at 24% instead of 12%
        assert_eq!(result.deltas.next_month_interest, Money::from_major(12));
        assert!(result.deltas.annual_interest.is_positive());
        assert_eq!(result.deltas.total_outstanding, Money::ZERO);
        assert_eq!(result.baseline.models[1], result.scenario.models[1]);
    }

    #[test]
    fn test_extra_payment_for_all_cuts_interest() {
        let input = WhatIfInput::new(ScenarioTarget::All).with_extra_payment(Money::from_major(50));
        let result = run_what_if(
            &loans(),
            &input,
            EventLog::default(),
            &EngineConfig::default(),
            &time(),
        )
        .unwrap();

        assert_eq!(result.deltas.next_month_interest, Money::ZERO);
        assert!(result.deltas.annual_interest.is_negative());
        assert!(result.deltas.annual_payments.is_positive());
    }

    #[test]
    fn test_unknown_loan_is_rejected() {
        let id = Uuid::new_v4();
        let input = WhatIfInput::new(ScenarioTarget::Loan(id));
        let err = run_what_if(
            &loans(),
            &input,
            EventLog::default(),
            &EngineConfig::default(),
            &time(),
        )
        .unwrap_err();

        assert_eq!(err, EngineError::LoanNotFound { id });
    }

    #[test]
    fn test_input_from_json() {
        let json = r#"{ "target": "all", "extra_payment_delta": "25" }"#;
        let input: WhatIfInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.target, ScenarioTarget::All);
        assert_eq!(input.extra_payment_delta, Money::from_major(25));
        assert_eq!(input.due_day_shift, 0);
    }
}
