use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unit for custom cadences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// how often a loan's regular payment recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
    /// single payment, never recurs
    OneTime,
    /// every `interval` units
    Custom { interval: u32, unit: CadenceUnit },
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Monthly
    }
}

/// minimum payment rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumPaymentType {
    /// fixed amount per occurrence
    Fixed,
    /// percent of principal per occurrence plus the month's interest
    PercentPlusInterest,
}

/// historical loan event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanEventType {
    Payment,
    Charge,
    Fee,
    InterestAdjustment,
    Other,
}

/// payoff strategy modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    /// highest APR first
    Avalanche,
    /// smallest balance first
    Snowball,
}

/// which loans a what-if scenario touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioTarget {
    All,
    Loan(LoanId),
}
