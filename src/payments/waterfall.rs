use serde::{Deserialize, Serialize};

use crate::decimal::Money;

/// balance components a payment can be applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentComponent {
    Interest,
    Principal,
}

/// how a single payment was split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentApplication {
    pub to_interest: Money,
    pub to_principal: Money,
    /// amount beyond what was owed; never carried forward
    pub excess: Money,
}

impl PaymentApplication {
    pub fn total_applied(&self) -> Money {
        self.to_interest + self.to_principal
    }
}

/// outstanding amounts a payment is applied against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountsDue {
    pub interest: Money,
    pub principal: Money,
}

impl AmountsDue {
    pub fn total(&self) -> Money {
        self.interest + self.principal
    }
}

/// payment waterfall: components are paid in order until the payment runs out
#[derive(Debug, Clone)]
pub struct PaymentWaterfall {
    order: [PaymentComponent; 2],
}

impl PaymentWaterfall {
    /// interest first, then principal
    pub fn interest_first() -> Self {
        Self {
            order: [PaymentComponent::Interest, PaymentComponent::Principal],
        }
    }

    pub fn order(&self) -> &[PaymentComponent] {
        &self.order
    }

    /// apply `amount` against `due`, reducing it in place
    pub fn apply(&self, amount: Money, due: &mut AmountsDue) -> PaymentApplication {
        let mut remaining = amount.non_negative();
        let mut application = PaymentApplication::default();

        for component in self.order {
            let (balance, applied) = match component {
                PaymentComponent::Interest => (&mut due.interest, &mut application.to_interest),
                PaymentComponent::Principal => (&mut due.principal, &mut application.to_principal),
            };

            let payment = remaining.min(*balance);
            *balance -= payment;
            *applied = payment;
            remaining -= payment;

            if remaining.is_zero() {
                break;
            }
        }

        application.excess = remaining;
        application
    }
}

impl Default for PaymentWaterfall {
    fn default() -> Self {
        Self::interest_first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interest_paid_before_principal() {
        let waterfall = PaymentWaterfall::interest_first();
        let mut due = AmountsDue {
            interest: Money::from_major(12),
            principal: Money::from_major(1_200),
        };

        let application = waterfall.apply(Money::from_major(100), &mut due);
        assert_eq!(application.to_interest, Money::from_major(12));
        assert_eq!(application.to_principal, Money::from_major(88));
        assert_eq!(application.excess, Money::ZERO);
        assert_eq!(due.interest, Money::ZERO);
        assert_eq!(due.principal, Money::from_major(1_112));
    }

    #[test]
    fn test_short_payment_only_touches_interest() {
        let waterfall = PaymentWaterfall::interest_first();
        let mut due = AmountsDue {
            interest: Money::from_major(30),
            principal: Money::from_major(500),
        };

        let application = waterfall.apply(Money::from_major(20), &mut due);
        assert_eq!(application.to_interest, Money::from_major(20));
        assert_eq!(application.to_principal, Money::ZERO);
        assert_eq!(due.interest, Money::from_major(10));
    }

    #[test]
    fn test_excess_is_reported_not_applied() {
        let waterfall = PaymentWaterfall::interest_first();
        let mut due = AmountsDue {
            interest: Money::from_major(5),
            principal: Money::from_major(50),
        };

        let application = waterfall.apply(Money::from_major(80), &mut due);
        assert_eq!(application.total_applied(), Money::from_major(55));
        assert_eq!(application.excess, Money::from_major(25));
        assert_eq!(due.total(), Money::ZERO);
    }
}
