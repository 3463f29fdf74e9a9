use serde::{Deserialize, Serialize};

use crate::decimal::Money;

use super::ProjectionRow;

/// totals over the first `months` rows of a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub months: u32,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_loan_payment: Money,
    pub total_subscription: Money,
    pub total_payment: Money,
    pub ending_outstanding: Money,
}

/// summarize a prefix of `rows`; never re-simulates
pub fn summarize(rows: &[ProjectionRow], months: u32) -> ProjectionSummary {
    let prefix = &rows[..rows.len().min(months as usize)];

    ProjectionSummary {
        months,
        total_interest: prefix.iter().map(|r| r.interest_accrued).sum(),
        total_principal: prefix.iter().map(|r| r.principal_paid).sum(),
        total_loan_payment: prefix.iter().map(|r| r.planned_payment).sum(),
        total_subscription: prefix.iter().map(|r| r.subscription_due).sum(),
        total_payment: prefix.iter().map(|r| r.total_payment).sum(),
        ending_outstanding: prefix
            .last()
            .map(|r| r.ending_outstanding)
            .unwrap_or(Money::ZERO),
    }
}
