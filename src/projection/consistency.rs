use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::{clamp_decimal, Money};
use crate::events::EventLog;
use crate::types::LoanId;

/// one calendar month of payment history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyPoint {
    pub year: i32,
    pub month: u32,
    pub expected: Money,
    pub paid: Money,
    /// paid over expected, 1 when either side is zero
    pub ratio: Decimal,
}

impl ConsistencyPoint {
    /// `YYYY-MM`
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyTrend {
    /// 0 to `cap × 100`, nominal 100
    pub score: Decimal,
    /// oldest month first, ending with the current month
    pub points: Vec<ConsistencyPoint>,
}

/// compare actual payments over the trailing calendar months with `expected` per month
pub fn payment_consistency(
    loan_id: LoanId,
    expected: Money,
    events: EventLog<'_>,
    today: NaiveDate,
    config: &EngineConfig,
) -> ConsistencyTrend {
    let cap = config.consistency_ratio_cap;
    let current = today.year() * 12 + today.month0() as i32;

    let points: Vec<ConsistencyPoint> = (0..config.trend_months as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            let year = index.div_euclid(12);
            let month = index.rem_euclid(12) as u32 + 1;
            let paid = events.paid_in_month(loan_id, year, month);
            let ratio = if expected.is_zero() || paid.is_zero() {
                Decimal::ONE
            } else {
                paid.ratio_to(expected).unwrap_or(cap).round_dp(4)
            };

            ConsistencyPoint {
                year,
                month,
                expected,
                paid,
                ratio,
            }
        })
        .collect();

    let score = if points.is_empty() {
        Decimal::ONE_HUNDRED
    } else {
        let capped: Decimal = points.iter().map(|p| p.ratio.min(cap)).sum();
        capped / Decimal::from(points.len()) * Decimal::ONE_HUNDRED
    };

    ConsistencyTrend {
        score: clamp_decimal(score, Decimal::ZERO, config.max_consistency_score()).round_dp(2),
        points,
    }
}
