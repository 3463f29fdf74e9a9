use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::MAX_MONTHS;
use crate::decimal::{Money, Rate};

/// scheduled payment in a fixed-term amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_payment: Money,
}

/// fixed-term, equal-installment amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub monthly_payment: Money,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate the schedule; term is clamped to `1..=MAX_MONTHS`
    pub fn generate(principal: Money, interest_rate: Rate, term_months: u32) -> Self {
        let principal = principal.non_negative().capped();
        let interest_rate = interest_rate.non_negative();
        let term_months = term_months.clamp(1, MAX_MONTHS);
        let monthly_rate = interest_rate.monthly_rate().as_decimal();
        let monthly_payment = amortized_payment(principal, interest_rate, term_months);

        let mut payments = Vec::with_capacity(term_months as usize);
        let mut balance = principal;
        let mut cumulative_interest = Money::ZERO;
        let mut cumulative_payment = Money::ZERO;

        for i in 1..=term_months {
            let interest_portion = balance * monthly_rate;
            let owed = balance + interest_portion;

            // the last installment clears whatever rounding left behind
            let payment_amount = if i == term_months {
                owed
            } else {
                monthly_payment.min(owed)
            };
            let principal_portion = (payment_amount - interest_portion).clamp(Money::ZERO, balance);
            let ending_balance = balance - principal_portion;

            cumulative_interest += interest_portion.min(payment_amount);
            cumulative_payment += payment_amount;

            payments.push(ScheduledPayment {
                payment_number: i,
                beginning_balance: balance,
                payment_amount,
                principal_portion,
                interest_portion,
                ending_balance,
                cumulative_interest,
                cumulative_payment,
            });

            balance = ending_balance;
        }

        Self {
            principal,
            interest_rate,
            term_months,
            monthly_payment,
            payments,
            total_interest: cumulative_interest,
            total_payment: cumulative_payment,
        }
    }

    /// get payment for specific period
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        if payment_number == 0 {
            return None;
        }
        self.payments.get((payment_number - 1) as usize)
    }

    /// remaining balance after the final installment
    pub fn remaining_balance(&self) -> Money {
        self.payments
            .last()
            .map(|p| p.ending_balance)
            .unwrap_or(self.principal)
    }
}

/// level monthly payment that retires `principal` over `months`:
/// `P·r / (1 − (1 + r)^−n)`, or `P / n` when the rate is zero
pub fn amortized_payment(principal: Money, annual_rate: Rate, months: u32) -> Money {
    let months = months.clamp(1, MAX_MONTHS);
    let principal = principal.non_negative().capped();
    let r = annual_rate.non_negative().monthly_rate().as_decimal();
    let linear = principal / Decimal::from(months);

    if r.is_zero() {
        return linear;
    }

    let interest_only = principal.checked_mul(r).unwrap_or(Money::CEILING);
    let base = Decimal::ONE.saturating_add(r);
    let mut compound = Decimal::ONE;
    for _ in 0..months {
        match compound.checked_mul(base) {
            Some(next) => compound = next,
            // (1 + r)^n out of range: the level payment is the interest alone
            None => return interest_only,
        }
    }

    // P·r·c / (c − 1) with c = (1 + r)^n; c rounds to 1 for vanishing rates
    match compound.checked_div(compound - Decimal::ONE) {
        Some(factor) => principal
            .as_decimal()
            .checked_mul(r)
            .and_then(|pr| pr.checked_mul(factor))
            .map(Money::from_decimal)
            .unwrap_or(Money::CEILING),
        None => linear,
    }
}
