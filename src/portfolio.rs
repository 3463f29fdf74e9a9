use std::collections::HashMap;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::EventLog;
use crate::loan::{LoanRecord, ProjectionOverride};
use crate::projection::model::build_projection_model_on;
use crate::projection::LoanProjectionModel;
use crate::types::LoanId;

/// per-loan overrides for a portfolio run
pub type OverrideMap = HashMap<LoanId, ProjectionOverride>;

/// portfolio totals for one horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioHorizon {
    pub months: u32,
    pub total_interest: Money,
    pub total_payment: Money,
}

/// projection across every loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPortfolioProjection {
    pub total_outstanding: Money,
    pub next_month_interest: Money,
    /// interest over the first 12 months
    pub annual_interest: Money,
    /// loan and subscription payments over the first 12 months
    pub annual_payments: Money,
    pub horizons: Vec<PortfolioHorizon>,
    pub average_consistency_score: Decimal,
    /// latest payoff date, `None` if any loan outlives the simulation window
    pub debt_free_date: Option<NaiveDate>,
    pub models: Vec<LoanProjectionModel>,
}

impl LoanPortfolioProjection {
    /// sum already-built models
    pub fn from_models(models: Vec<LoanProjectionModel>, config: &EngineConfig) -> Self {
        let horizons = config
            .horizons
            .iter()
            .map(|&months| PortfolioHorizon {
                months,
                total_interest: models
                    .iter()
                    .filter_map(|m| m.horizon(months))
                    .map(|h| h.total_interest)
                    .sum(),
                total_payment: models
                    .iter()
                    .filter_map(|m| m.horizon(months))
                    .map(|h| h.total_payment)
                    .sum(),
            })
            .collect();

        let average_consistency_score = if models.is_empty() {
            Decimal::ZERO
        } else {
            let total: Decimal = models.iter().map(|m| m.consistency_score).sum();
            (total / Decimal::from(models.len())).round_dp(2)
        };

        let debt_free_date = models
            .iter()
            .map(|m| m.payoff_date)
            .collect::<Option<Vec<_>>>()
            .and_then(|dates| dates.into_iter().max());

        Self {
            total_outstanding: models.iter().map(|m| m.current_outstanding).sum(),
            next_month_interest: models.iter().map(|m| m.next_month_interest).sum(),
            annual_interest: models.iter().map(|m| m.annual_interest).sum(),
            annual_payments: models.iter().map(|m| m.annual_payments).sum(),
            horizons,
            average_consistency_score,
            debt_free_date,
            models,
        }
    }

    /// portfolio interest over a configured horizon
    pub fn interest_over(&self, months: u32) -> Option<Money> {
        self.horizons
            .iter()
            .find(|h| h.months == months)
            .map(|h| h.total_interest)
    }

    pub fn model(&self, loan_id: LoanId) -> Option<&LoanProjectionModel> {
        self.models.iter().find(|m| m.loan_id == loan_id)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// build a model per loan and sum the portfolio figures
pub fn build_portfolio_projection(
    loans: &[LoanRecord],
    overrides: &OverrideMap,
    events: EventLog<'_>,
    config: &EngineConfig,
    time_provider: &SafeTimeProvider,
) -> Result<LoanPortfolioProjection> {
    build_portfolio_projection_on(loans, overrides, events, config, time_provider.now().date_naive())
}

pub(crate) fn build_portfolio_projection_on(
    loans: &[LoanRecord],
    overrides: &OverrideMap,
    events: EventLog<'_>,
    config: &EngineConfig,
    today: NaiveDate,
) -> Result<LoanPortfolioProjection> {
    let models = loans
        .iter()
        .map(|loan| build_projection_model_on(loan, overrides.get(&loan.id), events, config, today))
        .collect::<Result<Vec<_>>>()?;

    let portfolio = LoanPortfolioProjection::from_models(models, config);
    debug!(
        loans = portfolio.models.len(),
        total_outstanding = %portfolio.total_outstanding,
        annual_interest = %portfolio.annual_interest,
        "built portfolio projection"
    );
    Ok(portfolio)
}
