use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Cadence, CadenceUnit};

/// equivalent monthly occurrence rate of a payment cadence
pub fn occurrences_per_month(cadence: Cadence) -> Decimal {
    match cadence {
        Cadence::Weekly => dec!(52) / dec!(12),
        Cadence::Biweekly => dec!(26) / dec!(12),
        Cadence::Monthly => Decimal::ONE,
        Cadence::Quarterly => Decimal::ONE / dec!(3),
        Cadence::Yearly => Decimal::ONE / dec!(12),
        Cadence::OneTime => Decimal::ZERO,
        Cadence::Custom { interval, unit } => {
            let interval = Decimal::from(interval.max(1));
            match unit {
                CadenceUnit::Days => dec!(365) / dec!(12) / interval,
                CadenceUnit::Weeks => dec!(52) / dec!(12) / interval,
                CadenceUnit::Months => Decimal::ONE / interval,
                CadenceUnit::Years => Decimal::ONE / (dec!(12) * interval),
            }
        }
    }
}
