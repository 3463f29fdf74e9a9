use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::loan::{LoanBalanceSource, LoanRecord};

/// canonical balances every downstream computation works from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedBalances {
    pub principal: Money,
    pub accrued_interest: Money,
    /// principal plus accrued interest
    pub loan_balance: Money,
    pub subscription_outstanding: Money,
}

impl ResolvedBalances {
    /// loan balance plus subscription outstanding
    pub fn total_outstanding(&self) -> Money {
        self.loan_balance + self.subscription_outstanding
    }
}

/// resolve a record's balances, using `subscription_cost` as the effective monthly charge
pub fn resolve_balances(
    loan: &LoanRecord,
    subscription_cost: Money,
    default_subscription_payments: u32,
) -> ResolvedBalances {
    let (principal, accrued_interest) = match loan.balance {
        LoanBalanceSource::Split {
            principal,
            accrued_interest,
        } => (
            principal.unwrap_or(Money::ZERO).non_negative().capped(),
            accrued_interest.unwrap_or(Money::ZERO).non_negative(),
        ),
        LoanBalanceSource::Legacy { balance } => (balance.non_negative().capped(), Money::ZERO),
    };
    // the loan balance as a whole stays within the ceiling
    let accrued_interest = accrued_interest.min(Money::CEILING - principal);

    ResolvedBalances {
        principal,
        accrued_interest,
        loan_balance: principal + accrued_interest,
        subscription_outstanding: resolve_subscription_outstanding(
            loan,
            subscription_cost,
            default_subscription_payments,
        ),
    }
}

fn resolve_subscription_outstanding(
    loan: &LoanRecord,
    cost: Money,
    default_payments: u32,
) -> Money {
    let cost = cost.non_negative().capped();
    if !cost.is_positive() {
        return Money::ZERO;
    }

    let (outstanding, payment_count) = match loan.subscription {
        Some(terms) => (terms.outstanding, terms.payment_count),
        None => (None, None),
    };

    let outstanding = match outstanding {
        // one payment left with no configured cycle: start a fresh default cycle
        Some(outstanding) if payment_count.is_none() && outstanding.non_negative() <= cost => {
            cost * Decimal::from(default_payments)
        }
        Some(outstanding) => outstanding.non_negative(),
        None => cost * Decimal::from(payment_count.unwrap_or(default_payments)),
    };
    outstanding.capped()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::SubscriptionTerms;

    fn loan_with_subscription(terms: Option<SubscriptionTerms>) -> LoanRecord {
        let mut builder = LoanRecord::builder().balance(Money::from_major(1_000));
        if let Some(terms) = terms {
            builder = builder.subscription(terms);
        }
        builder.build()
    }

    #[test]
    fn test_legacy_balance_is_all_principal() {
        let loan = LoanRecord::builder().balance(Money::from_str_exact("1500.505").unwrap()).build();
        let resolved = resolve_balances(&loan, Money::ZERO, 12);
        assert_eq!(resolved.principal, Money::from_cents(150051));
        assert_eq!(resolved.accrued_interest, Money::ZERO);
        assert_eq!(resolved.loan_balance, resolved.principal);
    }

    #[test]
    fn test_split_balance_is_authoritative_and_clamped() {
        let loan = LoanRecord::builder()
            .balance_source(LoanBalanceSource::Split {
                principal: Some(Money::from_major(800)),
                accrued_interest: Some(Money::from_major(-15)),
            })
            .build();
        let resolved = resolve_balances(&loan, Money::ZERO, 12);
        assert_eq!(resolved.principal, Money::from_major(800));
        assert_eq!(resolved.accrued_interest, Money::ZERO);

        let loan = LoanRecord::builder()
            .balance_source(LoanBalanceSource::Split {
                principal: None,
                accrued_interest: Some(Money::from_major(30)),
            })
            .build();
        let resolved = resolve_balances(&loan, Money::ZERO, 12);
        assert_eq!(resolved.principal, Money::ZERO);
        assert_eq!(resolved.loan_balance, Money::from_major(30));
    }

    #[test]
    fn test_subscription_defaults_to_twelve_payments() {
        let loan = loan_with_subscription(Some(SubscriptionTerms {
            cost: Money::from_major(10),
            outstanding: None,
            payment_count: None,
        }));
        let resolved = resolve_balances(&loan, Money::from_major(10), 12);
        assert_eq!(resolved.subscription_outstanding, Money::from_major(120));
    }

    #[test]
    fn test_subscription_payment_count_used_when_no_outstanding() {
        let loan = loan_with_subscription(Some(SubscriptionTerms {
            cost: Money::from_major(10),
            outstanding: None,
            payment_count: Some(6),
        }));
        let resolved = resolve_balances(&loan, Money::from_major(10), 12);
        assert_eq!(resolved.subscription_outstanding, Money::from_major(60));
    }

    #[test]
    fn test_single_remaining_payment_resets_cycle_without_count() {
        let loan = loan_with_subscription(Some(SubscriptionTerms {
            cost: Money::from_major(10),
            outstanding: Some(Money::from_major(10)),
            payment_count: None,
        }));
        let resolved = resolve_balances(&loan, Money::from_major(10), 12);
        assert_eq!(resolved.subscription_outstanding, Money::from_major(120));

        // an explicit count keeps the supplied outstanding
        let loan = loan_with_subscription(Some(SubscriptionTerms {
            cost: Money::from_major(10),
            outstanding: Some(Money::from_major(10)),
            payment_count: Some(3),
        }));
        let resolved = resolve_balances(&loan, Money::from_major(10), 12);
        assert_eq!(resolved.subscription_outstanding, Money::from_major(10));
    }

    #[test]
    fn test_zero_cost_means_no_subscription() {
        let loan = loan_with_subscription(Some(SubscriptionTerms {
            cost: Money::ZERO,
            outstanding: Some(Money::from_major(90)),
            payment_count: None,
        }));
        let resolved = resolve_balances(&loan, Money::ZERO, 12);
        assert_eq!(resolved.subscription_outstanding, Money::ZERO);
        assert_eq!(resolved.total_outstanding(), Money::from_major(1_000));
    }

    #[test]
    fn test_balances_are_capped_at_ceiling() {
        let loan = LoanRecord::builder()
            .balance_source(LoanBalanceSource::Split {
                principal: Some(Money::CEILING - Money::from_major(10)),
                accrued_interest: Some(Money::from_major(25)),
            })
            .subscription(SubscriptionTerms {
                cost: Money::from_decimal(Decimal::MAX),
                outstanding: None,
                payment_count: Some(12),
            })
            .build();
        let resolved = resolve_balances(&loan, loan.subscription_cost(), 12);
        assert_eq!(resolved.accrued_interest, Money::from_major(10));
        assert_eq!(resolved.loan_balance, Money::CEILING);
        assert_eq!(resolved.subscription_outstanding, Money::CEILING);
    }
}
