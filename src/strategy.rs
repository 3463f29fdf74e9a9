use std::cmp::Ordering;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::balance::resolve_balances;
use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::events::EventLog;
use crate::loan::{LoanRecord, ProjectionOverride};
use crate::portfolio::{build_portfolio_projection_on, LoanPortfolioProjection, OverrideMap};
use crate::projection::LoanProjectionModel;
use crate::types::{LoanId, StrategyMode};

/// outcome of directing the whole budget at one target loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyCandidate {
    pub mode: StrategyMode,
    pub loan_id: LoanId,
    pub loan_name: String,
    pub apr: Rate,
    pub outstanding: Money,
    /// reduction in portfolio 12-month interest, never negative
    pub annual_interest_saving: Money,
    pub baseline_payoff_months: Option<u32>,
    pub scenario_payoff_months: Option<u32>,
}

impl StrategyCandidate {
    /// months the target's payoff moves forward, when both payoffs are known
    pub fn months_saved(&self) -> Option<u32> {
        match (self.baseline_payoff_months, self.scenario_payoff_months) {
            (Some(baseline), Some(scenario)) => Some(baseline.saturating_sub(scenario)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanStrategyResult {
    pub monthly_overpay_budget: Money,
    pub baseline_annual_interest: Money,
    pub avalanche: Option<StrategyCandidate>,
    pub snowball: Option<StrategyCandidate>,
    pub recommended_mode: StrategyMode,
}

impl LoanStrategyResult {
    pub fn recommended(&self) -> Option<&StrategyCandidate> {
        match self.recommended_mode {
            StrategyMode::Avalanche => self.avalanche.as_ref(),
            StrategyMode::Snowball => self.snowball.as_ref(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// compare avalanche and snowball targets for a fixed monthly overpayment budget
pub fn select_strategy(
    loans: &[LoanRecord],
    monthly_overpay_budget: Money,
    config: &EngineConfig,
    time_provider: &SafeTimeProvider,
) -> Result<LoanStrategyResult> {
    select_strategy_on(loans, monthly_overpay_budget, config, time_provider.now().date_naive())
}

fn select_strategy_on(
    loans: &[LoanRecord],
    monthly_overpay_budget: Money,
    config: &EngineConfig,
    today: NaiveDate,
) -> Result<LoanStrategyResult> {
    let budget = monthly_overpay_budget.non_negative();
    let events = EventLog::default();

    let active: Vec<LoanRecord> = loans
        .iter()
        .filter(|loan| {
            let subscription_cost = loan.terms(&ProjectionOverride::default()).subscription_cost;
            resolve_balances(loan, subscription_cost, config.default_subscription_payments)
                .total_outstanding()
                .as_decimal()
                > config.strategy_min_outstanding
        })
        .cloned()
        .collect();
    let baseline =
        build_portfolio_projection_on(&active, &OverrideMap::new(), events, config, today)?;

    let avalanche_target = baseline.models.iter().min_by(|a, b| avalanche_order(a, b));
    let snowball_target = baseline.models.iter().min_by(|a, b| snowball_order(a, b));

    let evaluate = |mode: StrategyMode,
                    target: Option<&LoanProjectionModel>|
     -> Result<Option<StrategyCandidate>> {
        target
            .map(|t| evaluate_target(mode, t, &active, &baseline, budget, config, today))
            .transpose()
    };
    let avalanche = evaluate(StrategyMode::Avalanche, avalanche_target)?;
    let snowball = evaluate(StrategyMode::Snowball, snowball_target)?;

    let recommended_mode = match (&avalanche, &snowball) {
        (Some(a), Some(s)) if s.annual_interest_saving > a.annual_interest_saving => {
            StrategyMode::Snowball
        }
        _ => StrategyMode::Avalanche,
    };

    debug!(
        budget = %budget,
        candidates = baseline.models.len(),
        recommended = ?recommended_mode,
        "selected payoff strategy"
    );

    Ok(LoanStrategyResult {
        monthly_overpay_budget: budget,
        baseline_annual_interest: baseline.annual_interest,
        avalanche,
        snowball,
        recommended_mode,
    })
}

/// highest APR, then larger outstanding, then name
fn avalanche_order(a: &LoanProjectionModel, b: &LoanProjectionModel) -> Ordering {
    b.effective_apr
        .cmp(&a.effective_apr)
        .then_with(|| b.current_outstanding.cmp(&a.current_outstanding))
        .then_with(|| a.name.cmp(&b.name))
}

/// smallest outstanding, then higher APR, then name
fn snowball_order(a: &LoanProjectionModel, b: &LoanProjectionModel) -> Ordering {
    a.current_outstanding
        .cmp(&b.current_outstanding)
        .then_with(|| b.effective_apr.cmp(&a.effective_apr))
        .then_with(|| a.name.cmp(&b.name))
}

fn evaluate_target(
    mode: StrategyMode,
    target: &LoanProjectionModel,
    loans: &[LoanRecord],
    baseline: &LoanPortfolioProjection,
    budget: Money,
    config: &EngineConfig,
    today: NaiveDate,
) -> Result<StrategyCandidate> {
    let mut overrides = OverrideMap::new();
    overrides.insert(
        target.loan_id,
        ProjectionOverride {
            extra_payment_delta: budget,
            ..Default::default()
        },
    );
    let scenario =
        build_portfolio_projection_on(loans, &overrides, EventLog::default(), config, today)?;

    Ok(StrategyCandidate {
        mode,
        loan_id: target.loan_id,
        loan_name: target.name.clone(),
        apr: target.effective_apr,
        outstanding: target.current_outstanding,
        annual_interest_saving: (baseline.annual_interest - scenario.annual_interest).non_negative(),
        baseline_payoff_months: target.payoff_months,
        scenario_payoff_months: scenario.model(target.loan_id).and_then(|m| m.payoff_months),
    })
}
