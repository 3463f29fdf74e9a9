use chrono::{Datelike, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::events::EventLog;
use crate::loan::{LoanRecord, ProjectionOverride};

use super::consistency::payment_consistency;
use super::simulator::simulate_loan;
use super::summary::summarize;
use super::LoanProjectionModel;

/// build the projection model for one loan as of the provider's current date
pub fn build_projection_model(
    loan: &LoanRecord,
    overrides: Option<&ProjectionOverride>,
    events: EventLog<'_>,
    config: &EngineConfig,
    time_provider: &SafeTimeProvider,
) -> Result<LoanProjectionModel> {
    build_projection_model_on(
        loan,
        overrides,
        events,
        config,
        time_provider.now().date_naive(),
    )
}

/// build the projection model for one loan as of `today`
pub fn build_projection_model_on(
    loan: &LoanRecord,
    overrides: Option<&ProjectionOverride>,
    events: EventLog<'_>,
    config: &EngineConfig,
    today: NaiveDate,
) -> Result<LoanProjectionModel> {
    config.validate()?;
    let overrides = overrides.copied().unwrap_or_default();
    let simulation = simulate_loan(loan, config.months_to_simulate(), &overrides, config)?;
    let terms = simulation.terms;
    let balances = simulation.balances;
    let all_rows = simulation.rows;

    // horizons come from the full series so they are prefix sums of it
    let horizons = config
        .horizons
        .iter()
        .map(|months| summarize(&all_rows, *months))
        .collect();
    let annual = summarize(&all_rows, 12);

    let payoff_date = simulation
        .payoff_month
        .map(|months| payoff_date(today, months, terms.due_day))
        .transpose()?;

    let expected_monthly = all_rows
        .first()
        .map(|r| r.total_payment)
        .unwrap_or(Money::ZERO);
    let trend = payment_consistency(loan.id, expected_monthly, events, today, config);

    let subscription_payments_remaining =
        payments_remaining(balances.subscription_outstanding, terms.subscription_cost);

    let mut rows = all_rows;
    rows.truncate(config.projection_months.max(1) as usize);

    debug!(
        loan_id = %loan.id,
        payoff_months = ?simulation.payoff_month,
        annual_interest = %annual.total_interest,
        "built projection model"
    );

    Ok(LoanProjectionModel {
        loan_id: loan.id,
        name: loan.name.clone(),
        current_outstanding: balances.total_outstanding(),
        balances,
        effective_apr: terms.apr,
        monthly_rate: terms.monthly_rate,
        due_day: terms.due_day,
        occurrences_per_month: terms.occurrences_per_month,
        subscription_cost: terms.subscription_cost,
        subscription_payments_remaining,
        next_month_interest: rows
            .first()
            .map(|r| r.interest_accrued)
            .unwrap_or(Money::ZERO),
        annual_interest: annual.total_interest,
        annual_payments: annual.total_payment,
        payoff_months: simulation.payoff_month,
        payoff_date,
        consistency_score: trend.score,
        consistency_trend: trend.points,
        rows,
        horizons,
    })
}

/// date `months_ahead` months after `today`, on the due day clamped to that month's length
pub fn payoff_date(today: NaiveDate, months_ahead: u32, due_day: u32) -> Result<NaiveDate> {
    let index = today.year() as i64 * 12 + today.month0() as i64 + months_ahead as i64;
    let year = i32::try_from(index.div_euclid(12)).map_err(|_| EngineError::InvalidDate {
        message: format!("year out of range {} months after {}", months_ahead, today),
    })?;
    let month = index.rem_euclid(12) as u32 + 1;
    let day = due_day.clamp(1, 31).min(days_in_month(year, month)?);

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| EngineError::InvalidDate {
        message: format!("{}-{:02}-{:02}", year, month, day),
    })
}

fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .ok_or_else(|| EngineError::InvalidDate {
            message: format!("no calendar for {}-{:02}", year, month),
        })
}

/// whole payments left on a subscription, rounding a partial payment up
fn payments_remaining(outstanding: Money, cost: Money) -> u32 {
    match outstanding.ratio_to(cost) {
        Some(ratio) if cost.is_positive() => ratio.ceil().to_u32().unwrap_or(u32::MAX),
        _ => 0,
    }
}
