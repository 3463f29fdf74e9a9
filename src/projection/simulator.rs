use rust_decimal::Decimal;
use tracing::trace;

use crate::balance::{resolve_balances, ResolvedBalances};
use crate::config::{EngineConfig, MAX_MONTHS};
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::{LoanRecord, LoanTerms, ProjectionOverride};
use crate::payments::{AmountsDue, PaymentWaterfall};
use crate::types::MinimumPaymentType;

use super::ProjectionRow;

/// output of a single-loan simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub terms: LoanTerms,
    pub balances: ResolvedBalances,
    pub rows: Vec<ProjectionRow>,
    /// first month whose ending outstanding is settled
    pub payoff_month: Option<u32>,
}

/// simulate `months` months of amortization for one loan
///
/// `months` is clamped to `1..=MAX_MONTHS`. A loan balance never grows past
/// [`Money::CEILING`]; interest stops accruing there and the loan never pays off.
pub fn simulate_loan(
    loan: &LoanRecord,
    months: u32,
    overrides: &ProjectionOverride,
    config: &EngineConfig,
) -> Result<SimulationResult> {
    let months = months.clamp(1, MAX_MONTHS);
    let terms = loan.terms(overrides);
    let balances = resolve_balances(
        loan,
        terms.subscription_cost,
        config.default_subscription_payments,
    );
    let epsilon = config.outstanding_epsilon;
    let waterfall = PaymentWaterfall::interest_first();

    let mut principal = balances.principal;
    let mut interest = balances.accrued_interest;
    let mut subscription = balances.subscription_outstanding;
    let mut payoff_month = None;
    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let opening_loan_balance = principal + interest;
        let opening_outstanding = opening_loan_balance + subscription;

        if opening_outstanding.is_settled(epsilon) {
            rows.push(ProjectionRow::zero(month));
            if payoff_month.is_none() {
                payoff_month = Some(month);
            }
            continue;
        }

        let headroom = (Money::CEILING - opening_loan_balance).non_negative();
        let interest_accrued = opening_loan_balance
            .checked_mul(terms.monthly_rate.as_decimal())
            .unwrap_or(headroom)
            .min(headroom);
        let mut due = AmountsDue {
            interest: interest + interest_accrued,
            principal,
        };
        let due_balance = due.total();

        let minimum_due = minimum_due(&terms, principal, interest_accrued).clamp(Money::ZERO, due_balance);
        let planned_payment = due_balance.min(minimum_due + terms.monthly_extra_payment());
        let application = waterfall.apply(planned_payment, &mut due);

        let subscription_due = if terms.subscription_cost.is_positive() {
            subscription.min(terms.subscription_cost)
        } else {
            subscription
        };
        let ending_subscription = subscription - subscription_due;
        let ending_loan_balance = due.principal + due.interest;

        let row = ProjectionRow {
            month,
            opening_principal: principal,
            opening_interest: interest,
            opening_loan_balance,
            opening_subscription: subscription,
            opening_outstanding,
            interest_accrued,
            minimum_due,
            planned_payment,
            interest_paid: application.to_interest,
            principal_paid: application.to_principal,
            subscription_due,
            total_payment: planned_payment + subscription_due,
            ending_principal: due.principal,
            ending_interest: due.interest,
            ending_loan_balance,
            ending_subscription,
            ending_outstanding: ending_loan_balance + ending_subscription,
            payment_consistency_ratio: planned_payment
                .ratio_to(minimum_due)
                .map(|r| r.round_dp(4))
                .unwrap_or(Decimal::ONE),
        };
        row.verify(loan.id)?;

        if payoff_month.is_none() && row.ending_outstanding.is_settled(epsilon) {
            trace!(loan_id = %loan.id, month, "loan settled");
            payoff_month = Some(month);
        }

        principal = row.ending_principal;
        interest = row.ending_interest;
        subscription = row.ending_subscription;
        rows.push(row);
    }

    Ok(SimulationResult {
        terms,
        balances,
        rows,
        payoff_month,
    })
}

/// minimum due for the month before clamping to the balance
fn minimum_due(terms: &LoanTerms, principal: Money, interest_accrued: Money) -> Money {
    match terms.minimum_kind {
        MinimumPaymentType::PercentPlusInterest => {
            let share = terms.minimum_percent / Decimal::ONE_HUNDRED * terms.occurrences_per_month;
            principal * share + interest_accrued
        }
        MinimumPaymentType::Fixed => terms.minimum_fixed * terms.occurrences_per_month,
    }
}
