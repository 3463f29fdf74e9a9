pub mod consistency;
pub mod model;
pub mod simulator;
pub mod summary;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::ResolvedBalances;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::LoanId;

pub use consistency::{payment_consistency, ConsistencyPoint, ConsistencyTrend};
pub use model::{build_projection_model, payoff_date};
pub use simulator::{simulate_loan, SimulationResult};
pub use summary::{summarize, ProjectionSummary};

/// one simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    /// 1-based month index
    pub month: u32,
    pub opening_principal: Money,
    pub opening_interest: Money,
    pub opening_loan_balance: Money,
    pub opening_subscription: Money,
    pub opening_outstanding: Money,
    pub interest_accrued: Money,
    pub minimum_due: Money,
    pub planned_payment: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub subscription_due: Money,
    /// loan payment plus subscription
    pub total_payment: Money,
    pub ending_principal: Money,
    pub ending_interest: Money,
    pub ending_loan_balance: Money,
    pub ending_subscription: Money,
    pub ending_outstanding: Money,
    /// planned payment over minimum due, 1 when nothing is due
    pub payment_consistency_ratio: Decimal,
}

impl ProjectionRow {
    /// row for a month after the loan and subscription are settled
    pub fn zero(month: u32) -> Self {
        Self {
            month,
            opening_principal: Money::ZERO,
            opening_interest: Money::ZERO,
            opening_loan_balance: Money::ZERO,
            opening_subscription: Money::ZERO,
            opening_outstanding: Money::ZERO,
            interest_accrued: Money::ZERO,
            minimum_due: Money::ZERO,
            planned_payment: Money::ZERO,
            interest_paid: Money::ZERO,
            principal_paid: Money::ZERO,
            subscription_due: Money::ZERO,
            total_payment: Money::ZERO,
            ending_principal: Money::ZERO,
            ending_interest: Money::ZERO,
            ending_loan_balance: Money::ZERO,
            ending_subscription: Money::ZERO,
            ending_outstanding: Money::ZERO,
            payment_consistency_ratio: Decimal::ONE,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.opening_outstanding.is_zero()
            && self.ending_outstanding.is_zero()
            && self.total_payment.is_zero()
            && self.interest_accrued.is_zero()
    }

    /// check the row's balance identities hold to the cent
    pub fn verify(&self, loan_id: LoanId) -> Result<()> {
        let drift = |detail: String| EngineError::RoundingDrift {
            loan_id,
            month: self.month,
            detail,
        };

        if self.ending_principal + self.ending_interest != self.ending_loan_balance {
            return Err(drift(format!(
                "principal {} + interest {} != loan balance {}",
                self.ending_principal, self.ending_interest, self.ending_loan_balance
            )));
        }
        if self.ending_loan_balance + self.ending_subscription != self.ending_outstanding {
            return Err(drift(format!(
                "loan balance {} + subscription {} != outstanding {}",
                self.ending_loan_balance, self.ending_subscription, self.ending_outstanding
            )));
        }
        if self.interest_paid + self.principal_paid != self.planned_payment {
            return Err(drift(format!(
                "payment split {} + {} != planned {}",
                self.interest_paid, self.principal_paid, self.planned_payment
            )));
        }
        let expected_loan = self.opening_loan_balance + self.interest_accrued - self.planned_payment;
        if expected_loan != self.ending_loan_balance {
            return Err(drift(format!(
                "opening {} + interest {} - payment {} != ending {}",
                self.opening_loan_balance,
                self.interest_accrued,
                self.planned_payment,
                self.ending_loan_balance
            )));
        }
        if self.opening_subscription - self.subscription_due != self.ending_subscription {
            return Err(drift(format!(
                "subscription {} - due {} != ending {}",
                self.opening_subscription, self.subscription_due, self.ending_subscription
            )));
        }
        Ok(())
    }
}

/// projection of a single loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProjectionModel {
    pub loan_id: LoanId,
    pub name: String,
    /// balances at the start of the projection
    pub balances: ResolvedBalances,
    pub current_outstanding: Money,
    /// APR after overrides
    pub effective_apr: Rate,
    pub monthly_rate: Rate,
    /// due day after overrides
    pub due_day: u32,
    pub occurrences_per_month: Decimal,
    /// monthly subscription cost after overrides
    pub subscription_cost: Money,
    pub subscription_payments_remaining: u32,
    pub next_month_interest: Money,
    /// interest over the first 12 simulated months
    pub annual_interest: Money,
    /// total payments over the first 12 simulated months
    pub annual_payments: Money,
    pub payoff_months: Option<u32>,
    pub payoff_date: Option<NaiveDate>,
    pub consistency_score: Decimal,
    pub consistency_trend: Vec<ConsistencyPoint>,
    pub rows: Vec<ProjectionRow>,
    pub horizons: Vec<ProjectionSummary>,
}

impl LoanProjectionModel {
    /// summary for the horizon of `months`, if one was computed
    pub fn horizon(&self, months: u32) -> Option<&ProjectionSummary> {
        self.horizons.iter().find(|h| h.months == months)
    }

    pub fn is_paid_off(&self) -> bool {
        self.payoff_months.is_some()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn settled_row() -> ProjectionRow {
        let mut row = ProjectionRow::zero(3);
        row.opening_principal = Money::from_major(100);
        row.opening_loan_balance = Money::from_major(100);
        row.opening_outstanding = Money::from_major(100);
        row.planned_payment = Money::from_major(100);
        row.principal_paid = Money::from_major(100);
        row.total_payment = Money::from_major(100);
        row
    }

    #[test]
    fn test_consistent_row_verifies() {
        assert!(settled_row().verify(Uuid::nil()).is_ok());
    }

    #[test]
    fn test_stray_cent_is_reported_with_month() {
        let loan_id = Uuid::new_v4();
        let mut row = settled_row();
        row.ending_interest += Money::CENT;

        match row.verify(loan_id) {
            Err(EngineError::RoundingDrift {
                loan_id: id,
                month,
                detail,
            }) => {
                assert_eq!(id, loan_id);
                assert_eq!(month, 3);
                assert!(detail.contains("loan balance"));
            }
            other => panic!("expected rounding drift, got {:?}", other),
        }
    }

    #[test]
    fn test_balance_roll_forward_is_checked() {
        // every ending identity holds, but the balance does not follow from the opening
        let mut row = settled_row();
        row.ending_principal += Money::CENT;
        row.ending_loan_balance += Money::CENT;
        row.ending_outstanding += Money::CENT;

        let err = row.verify(Uuid::nil()).unwrap_err();
        assert!(matches!(err, EngineError::RoundingDrift { month: 3, .. }));
        assert!(err.to_string().contains("opening"));
    }
}
