use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EngineConfig, MAX_MONTHS};
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::events::EventLog;
use crate::loan::LoanRecord;
use crate::payments::AmortizationSchedule;
use crate::projection::{build_projection_model, LoanProjectionModel, ProjectionRow};
use crate::types::LoanId;

/// candidate refinance terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinanceOffer {
    pub apr: Rate,
    /// paid up front
    #[serde(default)]
    pub fees: Money,
    /// clamped to `1..=MAX_MONTHS` when analyzed
    pub term_months: u32,
}

impl RefinanceOffer {
    pub fn new(apr: Rate, fees: Money, term_months: u32) -> Self {
        Self {
            apr,
            fees,
            term_months,
        }
    }
}

/// cumulative cost of each path after `month` months, remaining balance included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinanceComparisonPoint {
    pub month: u32,
    pub refinance_cumulative: Money,
    pub current_cumulative: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRefinanceResult {
    pub loan_id: LoanId,
    pub offer: RefinanceOffer,
    /// loan balance moved onto the new terms
    pub principal: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_refinance_cost: Money,
    pub total_current_cost: Money,
    /// refinance minus current, negative when refinancing is cheaper
    pub total_cost_delta: Money,
    pub break_even_month: Option<u32>,
    /// planned loan payment in the current path's first month
    pub current_monthly_payment: Money,
    pub monthly_payment_delta: Money,
    pub points: Vec<RefinanceComparisonPoint>,
}

impl LoanRefinanceResult {
    pub fn is_cheaper(&self) -> bool {
        self.total_cost_delta.is_negative()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// compare an offer against an already-built projection model
///
/// Both paths carry the subscription dues of the current path, so only the
/// loan cash flows differ. Months past the model's retained rows hold the
/// current path at its last row.
pub fn analyze_refinance(
    model: &LoanProjectionModel,
    offer: &RefinanceOffer,
    config: &EngineConfig,
) -> LoanRefinanceResult {
    let offer = RefinanceOffer {
        apr: offer.apr.non_negative(),
        fees: offer.fees.non_negative(),
        term_months: offer.term_months.clamp(1, MAX_MONTHS),
    };
    let principal = model.balances.loan_balance;
    let schedule = AmortizationSchedule::generate(principal, offer.apr, offer.term_months);

    let mut current = CurrentPath::new(&model.rows, principal);
    let mut points = Vec::with_capacity(offer.term_months as usize);
    let mut break_even_month = None;

    for scheduled in &schedule.payments {
        current.advance(scheduled.payment_number);

        let refinance_cumulative = offer.fees
            + scheduled.cumulative_payment
            + current.subscription_paid
            + scheduled.ending_balance;
        let current_cumulative = current.cumulative();

        if break_even_month.is_none()
            && (refinance_cumulative - current_cumulative).as_decimal() <= config.outstanding_epsilon
        {
            break_even_month = Some(scheduled.payment_number);
        }

        points.push(RefinanceComparisonPoint {
            month: scheduled.payment_number,
            refinance_cumulative,
            current_cumulative,
        });
    }

    let total_refinance_cost = points
        .last()
        .map(|p| p.refinance_cumulative)
        .unwrap_or(offer.fees + principal);
    let total_current_cost = points
        .last()
        .map(|p| p.current_cumulative)
        .unwrap_or(principal);
    let current_monthly_payment = model
        .rows
        .first()
        .map(|r| r.planned_payment)
        .unwrap_or(Money::ZERO);

    debug!(
        loan_id = %model.loan_id,
        monthly_payment = %schedule.monthly_payment,
        break_even = ?break_even_month,
        "analyzed refinance offer"
    );

    LoanRefinanceResult {
        loan_id: model.loan_id,
        offer,
        principal,
        monthly_payment: schedule.monthly_payment,
        total_interest: schedule.total_interest,
        total_refinance_cost,
        total_current_cost,
        total_cost_delta: total_refinance_cost - total_current_cost,
        break_even_month,
        current_monthly_payment,
        monthly_payment_delta: schedule.monthly_payment - current_monthly_payment,
        points,
    }
}

/// build a model covering the offer's term, then compare
pub fn refinance_loan(
    loan: &LoanRecord,
    offer: &RefinanceOffer,
    events: EventLog<'_>,
    config: &EngineConfig,
    time_provider: &SafeTimeProvider,
) -> Result<LoanRefinanceResult> {
    let config = config
        .clone()
        .with_projection_months(config.projection_months.max(offer.term_months.clamp(1, MAX_MONTHS)));
    let model = build_projection_model(loan, None, events, &config, time_provider)?;
    Ok(analyze_refinance(&model, offer, &config))
}

/// running totals along the existing trajectory
struct CurrentPath<'a> {
    rows: &'a [ProjectionRow],
    payments: Money,
    subscription_paid: Money,
    loan_balance: Money,
}

impl<'a> CurrentPath<'a> {
    fn new(rows: &'a [ProjectionRow], opening_loan_balance: Money) -> Self {
        Self {
            rows,
            payments: Money::ZERO,
            subscription_paid: Money::ZERO,
            loan_balance: opening_loan_balance,
        }
    }

    /// fold in row `month` if the model retained it
    fn advance(&mut self, month: u32) {
        if let Some(row) = self.rows.get(month as usize - 1) {
            self.payments += row.total_payment;
            self.subscription_paid += row.subscription_due;
            self.loan_balance = row.ending_loan_balance;
        }
    }

    fn cumulative(&self) -> Money {
        self.payments + self.loan_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::SubscriptionTerms;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn loan() -> LoanRecord {
        // minimum matches a 12-month amortization at 12%
        LoanRecord::builder()
            .name("Personal")
            .balance(Money::from_major(10_000))
            .apr_percent(dec!(12))
            .fixed_minimum(Money::from_str_exact("888.49").unwrap())
            .build()
    }

    #[test]
    fn test_cheaper_offer_breaks_even_immediately() {
        let offer = RefinanceOffer::new(Rate::from_percentage(6), Money::ZERO, 12);
        let result = refinance_loan(
            &loan(),
            &offer,
            EventLog::default(),
            &EngineConfig::default(),
            &time(),
        )
        .unwrap();

        assert_eq!(result.principal, Money::from_major(10_000));
        assert_eq!(result.monthly_payment, Money::from_str_exact("860.66").unwrap());
        assert!(result.is_cheaper());
        assert_eq!(result.break_even_month, Some(1));
        assert_eq!(result.points.len(), 12);
        assert_eq!(result.current_monthly_payment, Money::from_str_exact("888.49").unwrap());
        assert!(result.monthly_payment_delta.is_negative());
    }

    #[test]
    fn test_fees_delay_break_even() {
        let offer = RefinanceOffer::new(Rate::from_percentage(6), Money::from_major(150), 12);
        let result = refinance_loan(
            &loan(),
            &offer,
            EventLog::default(),
            &EngineConfig::default(),
            &time(),
        )
        .unwrap();

        // month 1 saves 50 of interest against 150 of fees
        let month = result.break_even_month.unwrap();
        assert!(month > 1 && month <= 12);
        let point = &result.points[month as usize - 1];
        assert!(point.refinance_cumulative <= point.current_cumulative);
    }

    #[test]
    fn test_expensive_offer_never_breaks_even() {
        let offer = RefinanceOffer::new(Rate::from_percentage(18), Money::from_major(100), 12);
        let result = refinance_loan(
            &loan(),
            &offer,
            EventLog::default(),
            &EngineConfig::default(),
            &time(),
        )
        .unwrap();

        assert_eq!(result.break_even_month, None);
        assert!(result.total_cost_delta.is_positive());
    }

    #[test]
    fn test_zero_rate_offer_is_linear() {
        let offer = RefinanceOffer::new(Rate::ZERO, Money::ZERO, 10);
        let result = refinance_loan(
            &loan(),
            &offer,
            EventLog::default(),
            &EngineConfig::default(),
            &time(),
        )
        .unwrap();

        assert_eq!(result.monthly_payment, Money::from_major(1_000));
        assert_eq!(result.total_interest, Money::ZERO);
        assert_eq!(result.total_refinance_cost, Money::from_major(10_000));
    }

    #[test]
    fn test_term_longer_than_retained_rows() {
        let offer = RefinanceOffer::new(Rate::from_percentage(6), Money::ZERO, 60);
        let config = EngineConfig::default().with_projection_months(12);
        let result =
            refinance_loan(&loan(), &offer, EventLog::default(), &config, &time()).unwrap();
        assert_eq!(result.points.len(), 60);

        // a model that kept only 12 rows holds its last state
        let model = build_projection_model(&loan(), None, EventLog::default(), &config, &time()).unwrap();
        let short = analyze_refinance(&model, &offer, &config);
        assert_eq!(short.points[59].current_cumulative, short.points[11].current_cumulative);
    }

    #[test]
    fn test_term_is_capped() {
        let offer = RefinanceOffer::new(Rate::from_percentage(6), Money::ZERO, u32::MAX);
        let result = refinance_loan(
            &loan(),
            &offer,
            EventLog::default(),
            &EngineConfig::default(),
            &time(),
        )
        .unwrap();

        assert_eq!(result.offer.term_months, MAX_MONTHS);
        assert_eq!(result.points.len(), MAX_MONTHS as usize);
        assert_eq!(result.points.last().unwrap().month, MAX_MONTHS);
    }

    #[test]
    fn test_subscription_is_carried_on_both_paths() {
        let loan = LoanRecord::builder()
            .balance(Money::from_major(1_200))
            .apr_percent(dec!(12))
            .fixed_minimum(Money::from_major(100))
            .subscription(SubscriptionTerms {
                cost: Money::from_major(10),
                outstanding: Some(Money::from_major(60)),
                payment_count: Some(6),
            })
            .build();
        let offer = RefinanceOffer::new(Rate::from_percentage(12), Money::ZERO, 12);
        let result =
            refinance_loan(&loan, &offer, EventLog::default(), &EngineConfig::default(), &time())
                .unwrap();

        assert_eq!(result.principal, Money::from_major(1_200));
        let first = result.points[0];
        // same rate, same interest: both paths cost 1212 + 10 after month one
        assert_eq!(first.refinance_cumulative, Money::from_major(1_222));
        assert_eq!(first.current_cumulative, Money::from_major(1_222));
        assert_eq!(result.break_even_month, Some(1));
    }
}
