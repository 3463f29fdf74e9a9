use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanEventType, LoanId};

/// historical event recorded against a loan by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanEvent {
    pub loan_id: LoanId,
    pub event_type: LoanEventType,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
}

impl LoanEvent {
    pub fn payment(loan_id: LoanId, amount: Money, timestamp: DateTime<Utc>) -> Self {
        Self {
            loan_id,
            event_type: LoanEventType::Payment,
            amount,
            timestamp,
        }
    }

    pub fn is_payment(&self) -> bool {
        self.event_type == LoanEventType::Payment
    }
}

/// read-only view over a history of loan events
#[derive(Debug, Clone, Copy, Default)]
pub struct EventLog<'a> {
    events: &'a [LoanEvent],
}

impl<'a> EventLog<'a> {
    pub fn new(events: &'a [LoanEvent]) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &'a [LoanEvent] {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// payment events for one loan
    pub fn payments_for(&self, loan_id: LoanId) -> impl Iterator<Item = &'a LoanEvent> + 'a {
        self.events
            .iter()
            .filter(move |e| e.loan_id == loan_id && e.is_payment())
    }

    /// total paid on a loan during a calendar month (UTC)
    pub fn paid_in_month(&self, loan_id: LoanId, year: i32, month: u32) -> Money {
        self.payments_for(loan_id)
            .filter(|e| e.timestamp.year() == year && e.timestamp.month() == month)
            .map(|e| e.amount.non_negative())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_paid_in_month_only_counts_payments_for_loan() {
        let loan = Uuid::new_v4();
        let other = Uuid::new_v4();
        let march = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let late_march = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap();
        let april = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        let events = vec![
            LoanEvent::payment(loan, Money::from_major(40), march),
            LoanEvent::payment(loan, Money::from_major(60), late_march),
            LoanEvent::payment(loan, Money::from_major(70), april),
            LoanEvent::payment(other, Money::from_major(500), march),
            LoanEvent {
                loan_id: loan,
                event_type: LoanEventType::Charge,
                amount: Money::from_major(25),
                timestamp: march,
            },
        ];
        let log = EventLog::new(&events);

        assert_eq!(log.paid_in_month(loan, 2024, 3), Money::from_major(100));
        assert_eq!(log.paid_in_month(loan, 2024, 4), Money::from_major(70));
        assert_eq!(log.paid_in_month(loan, 2024, 5), Money::ZERO);
        assert_eq!(log.payments_for(loan).count(), 3);
    }
}
