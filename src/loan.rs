use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cadence::occurrences_per_month;
use crate::decimal::{clamp_decimal, Money, Rate};
use crate::types::{Cadence, LoanId, MinimumPaymentType};

/// the two generations of balance fields a loan record may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoanBalanceSource {
    /// single balance, interest folded in
    Legacy { balance: Money },
    /// explicit principal and accrued interest; a missing half counts as zero
    Split {
        principal: Option<Money>,
        accrued_interest: Option<Money>,
    },
}

impl Default for LoanBalanceSource {
    fn default() -> Self {
        LoanBalanceSource::Legacy { balance: Money::ZERO }
    }
}

/// minimum payment rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumPaymentRule {
    pub kind: MinimumPaymentType,
    /// amount per occurrence for `Fixed`
    pub fixed_amount: Money,
    /// percent of principal per occurrence for `PercentPlusInterest`
    pub percent: Decimal,
}

impl MinimumPaymentRule {
    pub fn fixed(amount: Money) -> Self {
        Self {
            kind: MinimumPaymentType::Fixed,
            fixed_amount: amount,
            percent: Decimal::ZERO,
        }
    }

    pub fn percent_plus_interest(percent: Decimal) -> Self {
        Self {
            kind: MinimumPaymentType::PercentPlusInterest,
            fixed_amount: Money::ZERO,
            percent,
        }
    }
}

impl Default for MinimumPaymentRule {
    fn default() -> Self {
        MinimumPaymentRule::fixed(Money::ZERO)
    }
}

/// recurring subscription attached to a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionTerms {
    /// charge per month
    pub cost: Money,
    /// explicitly tracked amount still owed on the subscription
    pub outstanding: Option<Money>,
    /// configured number of payments in a subscription cycle
    pub payment_count: Option<u32>,
}

/// loan record supplied by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: LoanId,
    pub name: String,
    /// annual rate, a fraction in memory and a percentage in JSON (`"19.99"`)
    #[serde(with = "crate::decimal::percent")]
    pub apr: Rate,
    #[serde(default)]
    pub cadence: Cadence,
    pub due_day: u32,
    pub balance: LoanBalanceSource,
    #[serde(default)]
    pub minimum_payment: MinimumPaymentRule,
    /// overpayment per cadence occurrence
    #[serde(default)]
    pub extra_payment: Money,
    #[serde(default)]
    pub subscription: Option<SubscriptionTerms>,
}

impl LoanRecord {
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    /// configured subscription cost before overrides, zero when absent
    pub fn subscription_cost(&self) -> Money {
        self.subscription
            .map(|s| s.cost.non_negative())
            .unwrap_or(Money::ZERO)
    }

    /// normalize the record's terms with an override applied
    pub fn terms(&self, overrides: &ProjectionOverride) -> LoanTerms {
        let apr = (self.apr.non_negative() + overrides.apr_delta).non_negative();
        let minimum_percent = clamp_decimal(
            self.minimum_payment.percent,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        );
        let due_day = (self.due_day as i64 + overrides.due_day_shift as i64).clamp(1, 31) as u32;
        let extra_per_occurrence = (self.extra_payment.non_negative() + overrides.extra_payment_delta)
            .non_negative()
            .capped();
        let subscription_cost = (self.subscription_cost() + overrides.subscription_cost_delta)
            .non_negative()
            .capped();

        LoanTerms {
            apr,
            monthly_rate: apr.monthly_rate(),
            occurrences_per_month: occurrences_per_month(self.cadence),
            due_day,
            minimum_kind: self.minimum_payment.kind,
            minimum_fixed: self.minimum_payment.fixed_amount.non_negative().capped(),
            minimum_percent,
            extra_per_occurrence,
            subscription_cost,
        }
    }
}

/// deltas layered over a loan record for scenario runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectionOverride {
    /// added to the per-occurrence extra payment
    pub extra_payment_delta: Money,
    /// added to the APR, result floored at zero
    pub apr_delta: Rate,
    /// added to the monthly subscription cost
    pub subscription_cost_delta: Money,
    /// days added to the due day, result clamped to 1..=31
    pub due_day_shift: i32,
}

impl ProjectionOverride {
    pub fn is_noop(&self) -> bool {
        *self == ProjectionOverride::default()
    }
}

/// normalized terms the simulator works from; every clamp applied once here
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub apr: Rate,
    pub monthly_rate: Rate,
    pub occurrences_per_month: Decimal,
    pub due_day: u32,
    pub minimum_kind: MinimumPaymentType,
    pub minimum_fixed: Money,
    pub minimum_percent: Decimal,
    pub extra_per_occurrence: Money,
    pub subscription_cost: Money,
}

impl LoanTerms {
    /// extra payment scaled to a month
    pub fn monthly_extra_payment(&self) -> Money {
        self.extra_per_occurrence * self.occurrences_per_month
    }
}

/// builder for loan records
pub struct LoanBuilder {
    id: Option<LoanId>,
    name: Option<String>,
    apr: Option<Rate>,
    cadence: Option<Cadence>,
    due_day: Option<u32>,
    balance: Option<LoanBalanceSource>,
    minimum_payment: Option<MinimumPaymentRule>,
    extra_payment: Option<Money>,
    subscription: Option<SubscriptionTerms>,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            apr: None,
            cadence: None,
            due_day: None,
            balance: None,
            minimum_payment: None,
            extra_payment: None,
            subscription: None,
        }
    }

    pub fn id(mut self, id: LoanId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// APR as a percentage, e.g. `dec!(12)` for 12%
    pub fn apr_percent(mut self, percent: Decimal) -> Self {
        self.apr = Some(Rate::from_percent(percent));
        self
    }

    pub fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = Some(cadence);
        self
    }

    pub fn due_day(mut self, day: u32) -> Self {
        self.due_day = Some(day);
        self
    }

    /// legacy single balance
    pub fn balance(mut self, balance: Money) -> Self {
        self.balance = Some(LoanBalanceSource::Legacy { balance });
        self
    }

    /// explicit principal and accrued interest
    pub fn split_balance(mut self, principal: Money, accrued_interest: Money) -> Self {
        self.balance = Some(LoanBalanceSource::Split {
            principal: Some(principal),
            accrued_interest: Some(accrued_interest),
        });
        self
    }

    pub fn balance_source(mut self, source: LoanBalanceSource) -> Self {
        self.balance = Some(source);
        self
    }

    pub fn fixed_minimum(mut self, amount: Money) -> Self {
        self.minimum_payment = Some(MinimumPaymentRule::fixed(amount));
        self
    }

    pub fn percent_plus_interest_minimum(mut self, percent: Decimal) -> Self {
        self.minimum_payment = Some(MinimumPaymentRule::percent_plus_interest(percent));
        self
    }

    pub fn extra_payment(mut self, amount: Money) -> Self {
        self.extra_payment = Some(amount);
        self
    }

    pub fn subscription(mut self, terms: SubscriptionTerms) -> Self {
        self.subscription = Some(terms);
        self
    }

    pub fn build(self) -> LoanRecord {
        LoanRecord {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name.unwrap_or_else(|| "Loan".to_string()),
            apr: self.apr.unwrap_or(Rate::ZERO),
            cadence: self.cadence.unwrap_or_default(),
            due_day: self.due_day.unwrap_or(1),
            balance: self.balance.unwrap_or_default(),
            minimum_payment: self.minimum_payment.unwrap_or_default(),
            extra_payment: self.extra_payment.unwrap_or(Money::ZERO),
            subscription: self.subscription,
        }
    }
}

impl Default for LoanBuilder {
    fn default() -> Self {
        Self::new()
    }
}
